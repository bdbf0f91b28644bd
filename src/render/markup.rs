//! Styled markup layer generation.
//!
//! Blocks are rendered to a small HTML subset. Code blocks, diagram blocks
//! and images that were registered as resources are replaced by
//! placeholders of the form `<asset-ref id="ID" kind="KIND"/>`.

use super::MarkupOptions;
use crate::assets::normalize_locator;
use crate::model::{Block, BlockKind, ResourceKind, Table};
use crate::parser::line::parse_list_marker;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static INLINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"!\[(?P<img_alt>[^\]]*)\]\((?P<img_src>[^)]*)\)",
        r"|(?P<img_tag><img\b[^>]*>)",
        r"|`(?P<code>[^`]+)`",
        r"|\[(?P<link_text>[^\]]*)\]\((?P<link_href>[^)]*)\)",
    ))
    .unwrap()
});

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?P<name>src|alt)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#).unwrap()
});

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<asset-ref id="(?P<id>[^"]+)" kind="[a-z]+"/>"#).unwrap());

static STRONG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(?P<a>[^*]+)\*\*|__(?P<b>[^_]+)__").unwrap());

static EM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(?P<a>[^*\s][^*]*)\*|\b_(?P<b>[^_]+)_\b").unwrap());

/// Placeholder for a resource in the markup layer.
pub fn placeholder(id: &str, kind: ResourceKind) -> String {
    format!("<asset-ref id=\"{}\" kind=\"{}\"/>", id, kind)
}

/// IDs referenced by placeholders in `markup`, in order of appearance.
pub fn placeholder_ids(markup: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(markup)
        .map(|c| c["id"].to_string())
        .collect()
}

/// Resource IDs that replace blocks and inline images in the markup layer.
#[derive(Debug, Clone, Default)]
pub struct AssetRefs {
    blocks: HashMap<usize, (String, ResourceKind)>,
    images: HashMap<String, String>,
}

impl AssetRefs {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a block index to a resource.
    pub fn insert_block(&mut self, index: usize, id: impl Into<String>, kind: ResourceKind) {
        self.blocks.insert(index, (id.into(), kind));
    }

    /// Map a normalized image locator to a resource.
    pub fn insert_image(&mut self, locator: impl Into<String>, id: impl Into<String>) {
        self.images.insert(locator.into(), id.into());
    }

    /// Resource replacing the block at `index`.
    pub fn block(&self, index: usize) -> Option<(&str, ResourceKind)> {
        self.blocks.get(&index).map(|(id, kind)| (id.as_str(), *kind))
    }

    /// Resource for an image locator (normalized before lookup).
    pub fn image(&self, locator: &str) -> Option<&str> {
        self.images
            .get(&normalize_locator(locator))
            .map(String::as_str)
    }

    /// Check if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.images.is_empty()
    }
}

/// An inline span within one line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline<'a> {
    /// Plain text
    Text(&'a str),
    /// Backtick code span
    Code(&'a str),
    /// `[text](href)`
    Link { text: &'a str, href: &'a str },
    /// `![alt](src)` or `<img src alt>`
    Image { alt: &'a str, src: &'a str },
}

/// Split a line into inline spans.
pub fn inline_tokens(line: &str) -> Vec<Inline<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in INLINE_RE.captures_iter(line) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Inline::Text(&line[last..whole.start()]));
        }
        last = whole.end();

        if let Some(src) = caps.name("img_src") {
            let alt = caps.name("img_alt").map(|m| m.as_str()).unwrap_or("");
            tokens.push(Inline::Image {
                alt,
                src: src.as_str(),
            });
        } else if let Some(tag) = caps.name("img_tag") {
            let (src, alt) = img_tag_attrs(tag.as_str());
            tokens.push(Inline::Image { alt, src });
        } else if let Some(code) = caps.name("code") {
            tokens.push(Inline::Code(code.as_str()));
        } else if let Some(href) = caps.name("link_href") {
            let text = caps.name("link_text").map(|m| m.as_str()).unwrap_or("");
            tokens.push(Inline::Link {
                text,
                href: href.as_str(),
            });
        }
    }

    if last < line.len() {
        tokens.push(Inline::Text(&line[last..]));
    }
    tokens
}

/// Read `src` and `alt` from an `<img>` tag. Missing attributes are empty.
pub fn img_tag_attrs(tag: &str) -> (&str, &str) {
    let mut src = "";
    let mut alt = "";
    for caps in ATTR_RE.captures_iter(tag) {
        let value = caps
            .name("dq")
            .or_else(|| caps.name("sq"))
            .map(|m| m.as_str())
            .unwrap_or("");
        if caps["name"].eq_ignore_ascii_case("src") {
            src = value;
        } else {
            alt = value;
        }
    }
    (src, alt)
}

/// Render blocks into the markup layer.
pub fn render_markup(blocks: &[Block], refs: &AssetRefs, options: &MarkupOptions) -> String {
    let mut out = String::new();
    let mut sections = 0;

    for (index, block) in blocks.iter().enumerate() {
        if let Some((id, kind)) = refs.block(index) {
            out.push_str(&placeholder(id, kind));
            out.push('\n');
            continue;
        }

        match block.kind {
            BlockKind::Heading => {
                sections += 1;
                let level = block.level.unwrap_or(1).clamp(1, 6);
                if options.heading_anchors {
                    out.push_str(&format!("<h{} id=\"sec-{}\">", level, sections));
                } else {
                    out.push_str(&format!("<h{}>", level));
                }
                out.push_str(&render_inline(&block.content, refs));
                out.push_str(&format!("</h{}>\n", level));
            }
            BlockKind::Paragraph => {
                let sep = if options.preserve_line_breaks {
                    "<br/>\n"
                } else {
                    "\n"
                };
                let lines: Vec<String> = block
                    .content
                    .lines()
                    .map(|l| render_inline(l, refs))
                    .collect();
                out.push_str("<p>");
                out.push_str(&lines.join(sep));
                out.push_str("</p>\n");
            }
            BlockKind::List => render_list(&mut out, &block.content, refs, options.indent_unit),
            BlockKind::Table => render_table(&mut out, &block.content, refs),
            BlockKind::CodeBlock => {
                render_literal(&mut out, None, block.language.as_deref(), &block.content)
            }
            BlockKind::DiagramBlock => render_literal(
                &mut out,
                Some("diagram"),
                block.language.as_deref(),
                &block.content,
            ),
        }
    }

    out
}

fn render_literal(out: &mut String, class: Option<&str>, language: Option<&str>, content: &str) {
    match class {
        Some(class) => out.push_str(&format!("<pre class=\"{}\">", class)),
        None => out.push_str("<pre>"),
    }
    match language {
        Some(lang) => out.push_str(&format!("<code class=\"language-{}\">", escape_html(lang))),
        None => out.push_str("<code>"),
    }
    out.push_str(&escape_html(content));
    out.push_str("</code></pre>\n");
}

fn render_list(out: &mut String, content: &str, refs: &AssetRefs, indent_unit: usize) {
    // (depth, ordered) of each open list
    let mut stack: Vec<(usize, bool)> = Vec::new();
    let tag = |ordered: bool| if ordered { "ol" } else { "ul" };

    for line in content.lines() {
        let Some(marker) = parse_list_marker(line) else {
            // Continuation of the current item
            if !stack.is_empty() {
                out.push(' ');
                out.push_str(&render_inline(line.trim(), refs));
            }
            continue;
        };
        let depth = marker.indent / indent_unit.max(1);

        while let Some(&(d, o)) = stack.last() {
            if d > depth {
                out.push_str(&format!("</li></{}>", tag(o)));
                stack.pop();
            } else {
                break;
            }
        }

        match stack.last().copied() {
            Some((d, o)) if d == depth && o == marker.ordered => out.push_str("</li>\n"),
            Some((d, o)) if d == depth => {
                out.push_str(&format!("</li></{}>\n<{}>", tag(o), tag(marker.ordered)));
                stack.pop();
                stack.push((depth, marker.ordered));
            }
            _ => {
                out.push_str(&format!("<{}>", tag(marker.ordered)));
                stack.push((depth, marker.ordered));
            }
        }
        out.push_str("<li>");
        out.push_str(&render_inline(marker.text, refs));
    }

    while let Some((_, o)) = stack.pop() {
        out.push_str(&format!("</li></{}>", tag(o)));
    }
    out.push('\n');
}

fn render_table(out: &mut String, content: &str, refs: &AssetRefs) {
    let table = Table::parse(content);
    out.push_str("<table>\n");

    let cell = |out: &mut String, tag: &str, col: usize, text: &str| {
        let align = table.alignment(col);
        if table.has_separator && align != crate::model::Alignment::Left {
            out.push_str(&format!("<{} style=\"text-align: {}\">", tag, align.as_css()));
        } else {
            out.push_str(&format!("<{}>", tag));
        }
        out.push_str(&render_inline(text, refs));
        out.push_str(&format!("</{}>", tag));
    };

    let header = table.header();
    if !header.is_empty() {
        out.push_str("<thead>\n");
        for row in header {
            out.push_str("<tr>");
            for (col, text) in row.cells.iter().enumerate() {
                cell(out, "th", col, text);
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</thead>\n");
    }

    out.push_str("<tbody>\n");
    for row in table.body() {
        out.push_str("<tr>");
        for (col, text) in row.cells.iter().enumerate() {
            cell(out, "td", col, text);
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}

/// Render one line of inline text.
pub fn render_inline(line: &str, refs: &AssetRefs) -> String {
    let mut out = String::new();
    for token in inline_tokens(line) {
        match token {
            Inline::Text(text) => out.push_str(&emphasis(&escape_html(text))),
            Inline::Code(code) => {
                out.push_str("<code>");
                out.push_str(&escape_html(code));
                out.push_str("</code>");
            }
            Inline::Link { text, href } => {
                out.push_str(&format!("<a href=\"{}\">", escape_html(href.trim())));
                out.push_str(&emphasis(&escape_html(text)));
                out.push_str("</a>");
            }
            Inline::Image { alt, src } => match refs.image(src) {
                Some(id) => out.push_str(&placeholder(id, ResourceKind::Image)),
                None => out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\"/>",
                    escape_html(&normalize_locator(src)),
                    escape_html(alt)
                )),
            },
        }
    }
    out
}

fn emphasis(escaped: &str) -> String {
    let strong = STRONG_RE.replace_all(escaped, |caps: &regex::Captures| {
        let inner = caps.name("a").or_else(|| caps.name("b")).map(|m| m.as_str()).unwrap_or("");
        format!("<strong>{}</strong>", inner)
    });
    EM_RE
        .replace_all(&strong, |caps: &regex::Captures| {
            let inner = caps.name("a").or_else(|| caps.name("b")).map(|m| m.as_str()).unwrap_or("");
            format!("<em>{}</em>", inner)
        })
        .into_owned()
}

/// Escape text for inclusion in markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
