//! Token text flattener
//!
//! Joins the base text lines into a single string and resolves every layer
//! fragment location into a raw character range of that string.

use crate::error::{ExportError, Result};
use crate::models::{Item, Part, TokenTextLocation, TokenTextPart, TokenTextPoint};

use super::range::TextRange;

/// Default character joining base text lines
pub const DEFAULT_LINE_SEPARATOR: char = '\n';

/// Character offsets of one line and its tokens
struct LineIndex {
    start: usize,
    // (start within line, length) per token
    tokens: Vec<(usize, usize)>,
}

impl LineIndex {
    fn new(start: usize, text: &str) -> Self {
        let mut tokens = Vec::new();
        let mut offset = 0;
        for token in text.split(' ') {
            let len = token.chars().count();
            tokens.push((offset, len));
            offset += len + 1;
        }
        Self { start, tokens }
    }
}

/// Flattener for token-based base texts
#[derive(Debug, Clone)]
pub struct TokenTextFlattener {
    line_separator: char,
}

impl TokenTextFlattener {
    pub fn new() -> Self {
        Self {
            line_separator: DEFAULT_LINE_SEPARATOR,
        }
    }

    pub fn with_line_separator(line_separator: char) -> Self {
        Self { line_separator }
    }

    pub fn line_separator(&self) -> char {
        self.line_separator
    }

    /// Flatten the base text and resolve the fragments of the given layer
    /// parts, in the order supplied, into raw ranges.
    ///
    /// Parts which are not layers are ignored. Each range carries the id of
    /// the fragment it comes from.
    pub fn flatten(&self, base: &TokenTextPart, layers: &[&Part]) -> Result<(String, Vec<TextRange>)> {
        let mut text = String::new();
        let mut index = Vec::with_capacity(base.lines.len());
        let mut offset = 0;
        for (i, line) in base.lines.iter().enumerate() {
            if i > 0 {
                text.push(self.line_separator);
                offset += 1;
            }
            index.push(LineIndex::new(offset, &line.text));
            text.push_str(&line.text);
            offset += line.text.chars().count();
        }

        let mut ranges = Vec::new();
        for part in layers {
            let Some(layer) = part.as_layer() else {
                log::debug!("Skipping non-layer part {} in flattening", part.id);
                continue;
            };
            for (i, fragment) in layer.fragments.iter().enumerate() {
                let location = TokenTextLocation::parse(fragment.location())?;
                let (start, end) = resolve(&index, &location)?;
                ranges.push(TextRange::with_fragment(start, end, part.fragment_id(i)));
            }
        }

        Ok((text, ranges))
    }

    /// Flatten an item using all its layer parts in item order. Returns
    /// `None` when the item has no base text.
    pub fn flatten_item(&self, item: &Item) -> Result<Option<(String, Vec<TextRange>)>> {
        let Some((_, base)) = item.base_text() else {
            return Ok(None);
        };
        let layers: Vec<&Part> = item.layers().map(|(part, _)| part).collect();
        self.flatten(base, &layers).map(Some)
    }
}

impl Default for TokenTextFlattener {
    fn default() -> Self {
        Self::new()
    }
}

fn token_of<'a>(index: &'a [LineIndex], point: &TokenTextPoint) -> Result<(&'a LineIndex, (usize, usize))> {
    let line = index
        .get((point.y as usize).wrapping_sub(1))
        .ok_or_else(|| ExportError::OutOfRange(format!("line {} in {}", point.y, point)))?;
    let token = line
        .tokens
        .get((point.x as usize).wrapping_sub(1))
        .copied()
        .ok_or_else(|| ExportError::OutOfRange(format!("token {} in {}", point.x, point)))?;
    Ok((line, token))
}

fn point_start(index: &[LineIndex], point: &TokenTextPoint) -> Result<usize> {
    let (line, (token_start, token_len)) = token_of(index, point)?;
    if point.is_partial() {
        if point.at as usize > token_len {
            return Err(ExportError::OutOfRange(format!("character {} in {}", point.at, point)));
        }
        return Ok(line.start + token_start + point.at as usize - 1);
    }
    Ok(line.start + token_start)
}

fn point_end(index: &[LineIndex], point: &TokenTextPoint) -> Result<usize> {
    let (line, (token_start, token_len)) = token_of(index, point)?;
    if point.is_partial() {
        let last = point.at as usize + point.portion_len() as usize - 1;
        if last > token_len {
            return Err(ExportError::OutOfRange(format!("run past token end in {}", point)));
        }
        return Ok(line.start + token_start + last - 1);
    }
    if token_len == 0 {
        return Err(ExportError::OutOfRange(format!("empty token at {}", point)));
    }
    Ok(line.start + token_start + token_len - 1)
}

fn resolve(index: &[LineIndex], location: &TokenTextLocation) -> Result<(usize, usize)> {
    let start = point_start(index, &location.start)?;
    let end = point_end(index, location.end.as_ref().unwrap_or(&location.start))?;
    if end < start {
        return Err(ExportError::OutOfRange(format!("location {} is empty", location)));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommentFragment, Fragment, COMMENT_ROLE_ID};

    fn layer(locations: &[&str]) -> Part {
        let fragments = locations
            .iter()
            .map(|loc| Fragment::Comment(CommentFragment::new(*loc, "")))
            .collect();
        Part::layer("p2", COMMENT_ROLE_ID, fragments)
    }

    fn flatten(lines: &[&str], locations: &[&str]) -> Result<(String, Vec<(usize, usize)>)> {
        let base = TokenTextPart::from_lines(lines.iter().copied());
        let part = layer(locations);
        let (text, ranges) = TokenTextFlattener::new().flatten(&base, &[&part])?;
        Ok((text, ranges.iter().map(|r| (r.start, r.end)).collect()))
    }

    #[test]
    fn test_lines_joined_by_separator() {
        let base = TokenTextPart::from_lines(["ab cd", "ef"]);
        let (text, ranges) = TokenTextFlattener::new().flatten(&base, &[]).unwrap();
        assert_eq!(text, "ab cd\nef");
        assert!(ranges.is_empty());

        let (text, _) = TokenTextFlattener::with_line_separator('|').flatten(&base, &[]).unwrap();
        assert_eq!(text, "ab cd|ef");
    }

    #[test]
    fn test_whole_token_locations() {
        // "que bixit\nannos XX"
        let (_, ranges) = flatten(&["que bixit", "annos XX"], &["1.2", "2.1", "2.2"]).unwrap();
        assert_eq!(ranges, vec![(4, 8), (10, 14), (16, 17)]);
    }

    #[test]
    fn test_partial_token_locations() {
        let (_, ranges) = flatten(&["que bixit"], &["1.2@1", "1.2@2x3", "1.1@2-2"]).unwrap();
        assert_eq!(ranges, vec![(4, 4), (5, 7), (1, 2)]);
    }

    #[test]
    fn test_cross_line_range() {
        let (text, ranges) = flatten(&["que bixit", "annos XX"], &["1.2-2.1", "1.2@3-2.1@2x2"]).unwrap();
        assert_eq!(ranges, vec![(4, 14), (6, 12)]);
        let chars: Vec<char> = text.chars().collect();
        let slice: String = chars[6..=12].iter().collect();
        assert_eq!(slice, "xit\nann");
    }

    #[test]
    fn test_fragment_ids_carry_part_and_index() {
        let base = TokenTextPart::from_lines(["a b"]);
        let part = layer(&["1.1", "1.2"]);
        let (_, ranges) = TokenTextFlattener::new().flatten(&base, &[&part]).unwrap();
        assert_eq!(ranges[1].fragment_ids, vec![part.fragment_id(1)]);
    }

    #[test]
    fn test_out_of_range_locations() {
        for loc in ["2.1", "1.3", "1.1@4", "1.1@2x3"] {
            assert!(
                matches!(flatten(&["abc de"], &[loc]), Err(ExportError::OutOfRange(_))),
                "{}",
                loc
            );
        }
    }

    #[test]
    fn test_malformed_location_fails() {
        assert!(matches!(flatten(&["abc"], &["1-x"]), Err(ExportError::Format(_))));
    }
}
