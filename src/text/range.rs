//! Fragment-annotated text ranges and their merging
//!
//! Every layer fragment resolves to one raw range of the flattened base
//! text. Raw ranges from different layers overlap freely; merging them
//! yields the finest partition of the text compatible with every raw
//! boundary, each piece listing the fragments covering it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Inclusive character interval of the flattened text with the ids of the
/// fragments covering it. `text` is empty until [`assign_text`] runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
    pub fragment_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            fragment_ids: Vec::new(),
            text: None,
        }
    }

    pub fn with_fragment(start: usize, end: usize, fragment_id: impl Into<String>) -> Self {
        Self {
            start,
            end,
            fragment_ids: vec![fragment_id.into()],
            text: None,
        }
    }

    /// Number of characters covered
    pub fn width(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }

    pub fn covers(&self, start: usize, end: usize) -> bool {
        self.start <= start && self.end >= end
    }

    /// Add a fragment id keeping ids unique and in insertion order
    pub fn add_fragment_id(&mut self, id: &str) {
        if !self.fragment_ids.iter().any(|f| f == id) {
            self.fragment_ids.push(id.to_string());
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Merge raw, possibly overlapping ranges into disjoint ranges covering
/// `[lower, upper]` exactly once.
///
/// Boundaries are every `start` and `end + 1` of the input plus the outer
/// bounds. Each output range gets, in input order, the ids of all input
/// ranges containing it. Adjacent outputs with equal id lists are kept
/// apart when a boundary falls between them.
pub fn merge_ranges(lower: usize, upper: usize, ranges: &[TextRange]) -> Result<Vec<TextRange>> {
    if upper < lower {
        return Err(ExportError::InvalidArgument(format!(
            "upper bound {} is lower than lower bound {}",
            upper, lower
        )));
    }

    let limit = upper + 1;
    let mut boundaries = BTreeSet::from([lower, limit]);
    for range in ranges {
        if range.start > range.end {
            return Err(ExportError::InvalidArgument(format!(
                "range {}-{} ends before it starts",
                range.start, range.end
            )));
        }
        boundaries.insert(range.start.clamp(lower, limit));
        boundaries.insert((range.end + 1).clamp(lower, limit));
    }

    let bounds: Vec<usize> = boundaries.into_iter().collect();
    let merged = bounds
        .windows(2)
        .map(|pair| {
            let (start, end) = (pair[0], pair[1] - 1);
            let mut merged = TextRange::new(start, end);
            for range in ranges.iter().filter(|r| r.covers(start, end)) {
                for id in &range.fragment_ids {
                    merged.add_fragment_id(id);
                }
            }
            merged
        })
        .collect();
    Ok(merged)
}

/// Assign to each range its slice of the flattened `text`
pub fn assign_text(ranges: &mut [TextRange], text: &str) -> Result<()> {
    let chars: Vec<char> = text.chars().collect();
    for range in ranges.iter_mut() {
        if range.end >= chars.len() {
            return Err(ExportError::OutOfRange(format!(
                "range {}-{} exceeds text length {}",
                range.start,
                range.end,
                chars.len()
            )));
        }
        range.text = Some(chars[range.start..=range.end].iter().collect());
    }
    Ok(())
}
