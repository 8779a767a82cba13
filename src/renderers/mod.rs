//! Text tree renderers and post-render text filters
//!
//! A renderer turns a filtered tree into text (TEI, plain text, JSON).
//! Its output then goes through the configured [`TextFilter`]s, which
//! rewrite placeholders such as `#[seg/...]#` once every id is known.

pub mod json;
pub mod plain;
pub mod tei_linear;
pub mod tei_parallel;
pub mod text_filters;

pub use json::{JsonRendererOptions, JsonTextTreeRenderer};
pub use plain::{PlainRendererOptions, PlainTextTreeRenderer};
pub use tei_linear::{TeiLinearOptions, TeiLinearTextTreeRenderer};
pub use tei_parallel::{TeiParallelOptions, TeiParallelTextTreeRenderer};
pub use text_filters::{ReplaceTextFilter, ReplaceTextFilterOptions, SourceIdTextFilter, SourceIdTextFilterOptions, TextFilter};

use crate::context::RendererContext;
use crate::error::Result;
use crate::models::{AUTHOR_TAG_PREFIX, WITNESS_TAG_PREFIX};
use crate::tree::TextTree;

pub trait TextTreeRenderer: Send + Sync {
    fn render(&self, tree: &TextTree, context: &RendererContext) -> Result<String>;
}

/// Escape text for XML content and attribute values
pub(crate) fn xml_escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Space-separated `#id` list, as used by TEI pointer attributes
pub(crate) fn pointers<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    ids.into_iter()
        .map(|id| format!("#{}", xml_escape(id)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split version tags into witness and author ids; tags outside both
/// namespaces count as witnesses
pub(crate) fn split_tags(tags: &[String]) -> (Vec<&str>, Vec<&str>) {
    let mut witnesses = Vec::new();
    let mut authors = Vec::new();
    for tag in tags {
        if let Some(author) = tag.strip_prefix(AUTHOR_TAG_PREFIX) {
            authors.push(author);
        } else {
            witnesses.push(tag.strip_prefix(WITNESS_TAG_PREFIX).unwrap_or(tag));
        }
    }
    (witnesses, authors)
}

/// ` wit="..." resp="..."` attributes for the given witness and author ids,
/// omitting empty lists
pub(crate) fn wit_resp_attributes(witnesses: &[&str], authors: &[&str]) -> String {
    let mut attributes = String::new();
    if !witnesses.is_empty() {
        attributes.push_str(&format!(" wit=\"{}\"", pointers(witnesses.iter().copied())));
    }
    if !authors.is_empty() {
        attributes.push_str(&format!(" resp=\"{}\"", pointers(authors.iter().copied())));
    }
    attributes
}
