//! Remote resource fetching.

use crate::error::{Error, Result};
use std::time::Duration;

/// Fetches the bytes behind a remote locator.
///
/// Implementations must honour `timeout`. The registry treats any error as
/// "resource unavailable" and keeps a reference-only record.
pub trait Fetch: Send + Sync {
    /// Fetch `url`, giving up after `timeout`.
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>>;
}

/// Blocking HTTP fetcher.
#[cfg(feature = "remote")]
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    _private: (),
}

#[cfg(feature = "remote")]
impl HttpFetcher {
    /// Create a new HTTP fetcher.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(feature = "remote")]
impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("docbridge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let response = client.get(url).send()?;
        if !response.status().is_success() {
            return Err(Error::Fetch(format!("{} returned {}", url, response.status())));
        }
        Ok(response.bytes()?.to_vec())
    }
}

/// Fetcher that refuses every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetch;

impl Fetch for NoFetch {
    fn fetch(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>> {
        Err(Error::Fetch(format!("remote fetching is disabled: {}", url)))
    }
}

/// The default fetcher for this build.
pub fn default_fetcher() -> Box<dyn Fetch> {
    #[cfg(feature = "remote")]
    {
        Box::new(HttpFetcher::new())
    }
    #[cfg(not(feature = "remote"))]
    {
        Box::new(NoFetch)
    }
}
