//! Visible renditions of non-printable characters for diagnostic labels

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Glyph shown for a space when spaces are mapped
pub const SPACE_GLYPH: char = '·';

static CONTROL_GLYPHS: Lazy<HashMap<char, char>> = Lazy::new(|| {
    // C0 controls map to the Unicode "control pictures" block
    let mut map: HashMap<char, char> = (0u32..0x20)
        .filter_map(|code| Some((char::from_u32(code)?, char::from_u32(0x2400 + code)?)))
        .collect();
    map.insert('\t', '→');
    map.insert('\r', '⏎');
    map.insert('\n', '↵');
    map.insert('\u{7f}', '␡');
    map
});

/// Replace control characters (and optionally spaces) with visible glyphs
pub fn map_non_printables(text: &str, map_space: bool) -> String {
    text.chars()
        .map(|c| match c {
            ' ' if map_space => SPACE_GLYPH,
            _ => CONTROL_GLYPHS.get(&c).copied().unwrap_or(c),
        })
        .collect()
}
