//! Post-render text filters
//!
//! String rewrites applied to each renderer's output, in configuration
//! order.

use regex::Regex;
use serde::Deserialize;

use crate::context::RendererContext;
use crate::error::{ExportError, Result};

pub trait TextFilter: Send + Sync {
    fn apply(&self, text: &str, context: &RendererContext) -> Result<String>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceIdTextFilterOptions {
    pub open: String,
    pub close: String,
    /// Drop keys not found in the id map instead of passing them through
    pub omit_missing: bool,
}

impl Default for SourceIdTextFilterOptions {
    fn default() -> Self {
        Self {
            open: "#[".to_string(),
            close: "]#".to_string(),
            omit_missing: false,
        }
    }
}

/// Replaces `#[map/sourceId]#` placeholders with the short id the context
/// id map assigned to `(map, sourceId)`, e.g. `seg3`.
///
/// The source id runs up to the next `/`; anything from there on is a
/// suffix copied after the short id. Nested delimiters are not supported,
/// and an unclosed placeholder takes the rest of the text as its key.
#[derive(Debug, Clone, Default)]
pub struct SourceIdTextFilter {
    options: SourceIdTextFilterOptions,
}

impl SourceIdTextFilter {
    pub fn new(options: SourceIdTextFilterOptions) -> Result<Self> {
        if options.open.is_empty() || options.close.is_empty() {
            return Err(ExportError::InvalidArgument(
                "source id delimiters cannot be empty".to_string(),
            ));
        }
        Ok(Self { options })
    }

    fn resolve(&self, key: &str, context: &RendererContext) -> Option<String> {
        let (map, rest) = key.split_once('/')?;
        let (source, suffix) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };
        let id = context.id_map.get_id(map, source)?;
        Some(format!("{}{}{}", map, id, suffix))
    }
}

impl TextFilter for SourceIdTextFilter {
    fn apply(&self, text: &str, context: &RendererContext) -> Result<String> {
        let open = self.options.open.as_str();
        let close = self.options.close.as_str();
        let mut output = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(open) {
            output.push_str(&rest[..start]);
            let after = &rest[start + open.len()..];
            let (key, next) = match after.find(close) {
                Some(end) => (&after[..end], &after[end + close.len()..]),
                None => (after, ""),
            };
            match self.resolve(key, context) {
                Some(id) => output.push_str(&id),
                None if self.options.omit_missing => {
                    log::debug!("Omitting unmapped source id {}", key);
                }
                None => output.push_str(key),
            }
            rest = next;
        }
        output.push_str(rest);
        Ok(output)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplaceTextFilterOptions {
    pub pattern: String,
    pub replacement: String,
    /// Maximum number of replacements; 0 replaces all matches
    pub max_count: usize,
}

/// Regular expression replacement
#[derive(Debug, Clone)]
pub struct ReplaceTextFilter {
    regex: Regex,
    replacement: String,
    max_count: usize,
}

impl ReplaceTextFilter {
    pub fn new(options: ReplaceTextFilterOptions) -> Result<Self> {
        let regex = Regex::new(&options.pattern)
            .map_err(|e| ExportError::InvalidArgument(format!("bad pattern \"{}\": {}", options.pattern, e)))?;
        Ok(Self {
            regex,
            replacement: options.replacement,
            max_count: options.max_count,
        })
    }
}

impl TextFilter for ReplaceTextFilter {
    fn apply(&self, text: &str, _context: &RendererContext) -> Result<String> {
        Ok(self
            .regex
            .replacen(text, self.max_count, self.replacement.as_str())
            .into_owned())
    }
}
