//! Block-splitting filter
//!
//! Splits every span of a linear tree whose text contains line breaks into
//! a chain of spans, one per line segment. Line breaks leave the text and
//! become `is_before_eol` flags, so that concatenating each span's text
//! followed by a newline when flagged reproduces the original text.

use serde::Deserialize;

use crate::context::RendererContext;
use crate::error::Result;
use crate::text::{map_non_printables, DEFAULT_LINE_SEPARATOR};
use crate::tree::{TextSpan, TextTree};

use super::TextTreeFilter;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockFilterOptions {
    pub line_separator: char,
}

impl Default for BlockFilterOptions {
    fn default() -> Self {
        Self {
            line_separator: DEFAULT_LINE_SEPARATOR,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlockLinearTextTreeFilter {
    options: BlockFilterOptions,
}

impl BlockLinearTextTreeFilter {
    pub fn new(options: BlockFilterOptions) -> Self {
        Self { options }
    }

    /// Segments of `text` with their before-EOL flag, or `None` when the
    /// text has no line break. `eol` is the flag of the unsplit span.
    fn split(&self, text: &str, eol: bool) -> Option<Vec<(String, bool)>> {
        let sep = self.options.line_separator;
        if !text.contains(sep) {
            return None;
        }
        let ends_with_break = text.ends_with(sep);
        let mut segments: Vec<&str> = text.split(sep).collect();
        // a single trailing break just flags the last segment
        if ends_with_break && !eol {
            segments.pop();
        }
        let count = segments.len();
        Some(
            segments
                .into_iter()
                .enumerate()
                .map(|(i, segment)| (segment.to_string(), i + 1 < count || ends_with_break || eol))
                .collect(),
        )
    }
}

impl TextTreeFilter for BlockLinearTextTreeFilter {
    fn apply(&self, mut tree: TextTree, _context: &RendererContext) -> Result<TextTree> {
        let sep = self.options.line_separator;
        let mut previous_eol = false;
        let mut split_count = 0;
        let mut changed = false;

        for ix in tree.chain() {
            let Some(span) = tree.data(ix) else {
                continue;
            };
            let eol = span.is_before_eol;
            let mut text = span.text.as_str();
            // the predecessor's flag already stands for this leading break
            if previous_eol {
                text = text.strip_prefix(sep).unwrap_or(text);
            }
            previous_eol = eol;

            let Some(segments) = self.split(text, eol) else {
                if text.len() != span.text.len() {
                    let text = text.to_string();
                    if let Some(span) = tree.data_mut(ix) {
                        span.text = text;
                    }
                    changed = true;
                }
                continue;
            };

            let template: TextSpan = span.clone();
            let mut spans = segments.into_iter().map(|(segment, is_before_eol)| {
                let mut span = template.with_text(segment);
                span.is_before_eol = is_before_eol;
                span
            });

            if let (Some(first), Some(data)) = (spans.next(), tree.data_mut(ix)) {
                *data = first;
            }
            let children = tree.take_children(ix);
            let mut last = ix;
            for span in spans {
                last = tree.add_child(last, 0, None, Some(span));
            }
            tree.set_children(last, children);
            split_count += 1;
            changed = true;
        }

        if changed {
            // renumber the chain and refresh labels
            for (i, ix) in tree.chain().into_iter().enumerate() {
                let label = tree.data(ix).map(|span| map_non_printables(&span.text, false));
                let node = tree.node_mut(ix);
                node.id = i as u32 + 1;
                node.label = label;
            }
            log::debug!("Block filter split {} spans", split_count);
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextRange;

    fn chain_of(texts: &[(&str, bool)]) -> TextTree {
        TextTree::linear(texts.iter().enumerate().map(|(i, (text, eol))| {
            let mut range = TextRange::new(0, 0);
            range.text = Some(text.to_string());
            let mut span = TextSpan::from_range(range);
            span.is_before_eol = *eol;
            (i as u32 + 1, Some(text.to_string()), span)
        }))
    }

    fn apply(texts: &[(&str, bool)]) -> Vec<(String, bool)> {
        let tree = BlockLinearTextTreeFilter::default()
            .apply(chain_of(texts), &RendererContext::new())
            .unwrap();
        tree.chain_data()
            .into_iter()
            .map(|s| (s.text.clone(), s.is_before_eol))
            .collect()
    }

    fn owned(expected: &[(&str, bool)]) -> Vec<(String, bool)> {
        expected.iter().map(|(t, e)| (t.to_string(), *e)).collect()
    }

    #[test]
    fn test_split_on_line_breaks() {
        assert_eq!(
            apply(&[("ab\ncd\nef", false)]),
            owned(&[("ab", true), ("cd", true), ("ef", false)])
        );
    }

    #[test]
    fn test_single_trailing_break_is_not_split() {
        assert_eq!(apply(&[("ab\n", false), ("cd", false)]), owned(&[("ab", true), ("cd", false)]));
    }

    #[test]
    fn test_blank_lines_are_kept() {
        assert_eq!(
            apply(&[("a\n\nb", false)]),
            owned(&[("a", true), ("", true), ("b", false)])
        );
    }

    #[test]
    fn test_leading_break_after_flagged_span_is_consumed() {
        // "ab" | "\ncd": the builder flagged "ab" for the break opening "\ncd"
        assert_eq!(apply(&[("ab", true), ("\ncd", false)]), owned(&[("ab", true), ("cd", false)]));
    }

    #[test]
    fn test_trailing_break_before_flagged_break() {
        // "ab\n" | "\ncd" = "ab\n\ncd"
        assert_eq!(
            apply(&[("ab\n", true), ("\ncd", false)]),
            owned(&[("ab", true), ("", true), ("cd", false)])
        );
    }

    #[test]
    fn test_payload_is_copied_and_children_moved() {
        let mut tree = chain_of(&[("a\nb", false), ("c", false)]);
        let first = tree.chain()[0];
        tree.data_mut(first).unwrap().kind = Some("milestone".to_string());

        let tree = BlockLinearTextTreeFilter::default()
            .apply(tree, &RendererContext::new())
            .unwrap();
        let chain = tree.chain();
        assert_eq!(chain.len(), 3);
        assert!(tree.is_linear());
        assert_eq!(tree.data(chain[1]).unwrap().kind.as_deref(), Some("milestone"));
        assert_eq!(tree.data(chain[2]).unwrap().text, "c");
        let ids: Vec<u32> = chain.iter().map(|&ix| tree.node(ix).id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_no_breaks_leaves_tree_untouched() {
        let input = [("ab", false), ("cd", false)];
        assert_eq!(apply(&input), owned(&input));
    }
}
