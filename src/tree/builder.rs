//! Linear tree builder
//!
//! Turns the merged range sequence into a single-branch tree: the blank
//! root, then one node per range in text order.

use crate::error::{ExportError, Result};
use crate::text::{map_non_printables, TextRange, DEFAULT_LINE_SEPARATOR};

use super::span::TextSpan;
use super::TextTree;

#[derive(Debug, Clone)]
pub struct LinearTreeBuilder {
    line_separator: char,
    map_space: bool,
}

impl LinearTreeBuilder {
    pub fn new() -> Self {
        Self {
            line_separator: DEFAULT_LINE_SEPARATOR,
            map_space: false,
        }
    }

    pub fn with_line_separator(mut self, line_separator: char) -> Self {
        self.line_separator = line_separator;
        self
    }

    /// Also show spaces as visible glyphs in node labels
    pub fn with_mapped_spaces(mut self, map_space: bool) -> Self {
        self.map_space = map_space;
        self
    }

    /// Build the chain for `ranges`, whose text must already be assigned.
    ///
    /// Node ids are 1-based in range order; a span is before EOL when the
    /// character following its range in `full_text` is a line break.
    pub fn build(&self, ranges: Vec<TextRange>, full_text: &str) -> Result<TextTree> {
        let chars: Vec<char> = full_text.chars().collect();
        let mut nodes = Vec::with_capacity(ranges.len());

        for (i, range) in ranges.into_iter().enumerate() {
            if range.text.is_none() {
                return Err(ExportError::InvalidArgument(format!(
                    "range {}-{} has no text assigned",
                    range.start, range.end
                )));
            }
            let is_before_eol = chars.get(range.end + 1) == Some(&self.line_separator);
            let mut span = TextSpan::from_range(range);
            span.is_before_eol = is_before_eol;
            let label = map_non_printables(&span.text, self.map_space);
            nodes.push((i as u32 + 1, Some(label), span));
        }

        log::debug!("Built linear tree with {} nodes", nodes.len());
        Ok(TextTree::linear(nodes))
    }
}

impl Default for LinearTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{assign_text, merge_ranges};

    fn build(text: &str, raw: &[TextRange]) -> TextTree {
        let len = text.chars().count();
        let mut ranges = merge_ranges(0, len - 1, raw).unwrap();
        assign_text(&mut ranges, text).unwrap();
        LinearTreeBuilder::new().build(ranges, text).unwrap()
    }

    #[test]
    fn test_one_node_per_range() {
        let tree = build("ab\ncd", &[TextRange::with_fragment(0, 1, "x")]);
        let chain = tree.chain();
        assert_eq!(chain.len(), 2);

        let first = tree.node(chain[0]);
        assert_eq!(first.id, 1);
        assert_eq!(first.label.as_deref(), Some("ab"));
        let span = first.data.as_ref().unwrap();
        assert_eq!(span.text, "ab");
        assert!(span.is_before_eol);

        let second = tree.node(chain[1]);
        assert_eq!(second.id, 2);
        assert_eq!(second.label.as_deref(), Some("↵cd"));
        assert!(!second.data.as_ref().unwrap().is_before_eol);
    }

    #[test]
    fn test_root_has_no_payload() {
        let tree = build("abc", &[]);
        assert!(tree.root().is_blank());
        assert_eq!(tree.chain().len(), 1);
    }

    #[test]
    fn test_unassigned_text_is_rejected() {
        let ranges = vec![TextRange::new(0, 2)];
        let result = LinearTreeBuilder::new().build(ranges, "abc");
        assert!(matches!(result, Err(ExportError::InvalidArgument(_))));
    }

    #[test]
    fn test_mapped_space_labels() {
        let mut ranges = vec![TextRange::new(0, 2)];
        assign_text(&mut ranges, "a b").unwrap();
        let tree = LinearTreeBuilder::new().with_mapped_spaces(true).build(ranges, "a b").unwrap();
        assert_eq!(tree.node(tree.chain()[0]).label.as_deref(), Some("a·b"));
    }
}
