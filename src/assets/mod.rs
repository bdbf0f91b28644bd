//! Resource registry and asset extraction.
//!
//! The [`ResourceRegistry`] assigns stable IDs to images, code snippets,
//! diagrams, fonts and other files, deduplicating by content signature.
//! It optionally materializes copies into a managed asset directory.

pub mod extractor;
mod fetch;
mod registry;
mod snapshot;

pub use extractor::{extract_assets, ExtractedAssets, ImageRef};
#[cfg(feature = "remote")]
pub use fetch::HttpFetcher;
pub use fetch::{default_fetcher, Fetch, NoFetch};
pub use registry::{
    code_extension, content_signature, diagram_extension, normalize_locator, RegistryConfig,
    ResourceRegistry,
};
pub use snapshot::RegistrySnapshot;
