//! Plain text renderer
//!
//! Writes the text of the first branch of the tree, with a line break
//! after every span flagged as before-EOL.

use serde::Deserialize;

use crate::context::RendererContext;
use crate::error::Result;
use crate::text::DEFAULT_LINE_SEPARATOR;
use crate::tree::TextTree;

use super::TextTreeRenderer;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlainRendererOptions {
    pub line_separator: char,
}

impl Default for PlainRendererOptions {
    fn default() -> Self {
        Self {
            line_separator: DEFAULT_LINE_SEPARATOR,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlainTextTreeRenderer {
    line_separator: char,
}

impl PlainTextTreeRenderer {
    pub fn new() -> Self {
        Self {
            line_separator: DEFAULT_LINE_SEPARATOR,
        }
    }

    pub fn with_line_separator(line_separator: char) -> Self {
        Self { line_separator }
    }

    pub fn with_options(options: PlainRendererOptions) -> Self {
        Self::with_line_separator(options.line_separator)
    }
}

impl Default for PlainTextTreeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTreeRenderer for PlainTextTreeRenderer {
    fn render(&self, tree: &TextTree, _context: &RendererContext) -> Result<String> {
        let mut text = String::new();
        for span in tree.chain_data() {
            text.push_str(&span.text);
            if span.is_before_eol {
                text.push(self.line_separator);
            }
        }
        Ok(text)
    }
}
