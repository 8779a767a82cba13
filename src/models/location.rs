//! Token-based text locations
//!
//! Fragments address the base text by line and token rather than by
//! character offset:
//!
//! - `2.3` is the third token of the second line;
//! - `2.3@2` is the second character of that token;
//! - `2.3@2x3` (or `2.3@2-3`) is a run of three characters starting there;
//! - `1.2-2.1` is a range from the first point to the second.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// A point in a token-based text: line `y`, token `x`, plus an optional
/// character portion of the token (`at` is 1-based, 0 = whole token).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenTextPoint {
    pub y: u32,
    pub x: u32,
    pub at: u32,
    pub run: u32,
}

impl TokenTextPoint {
    pub fn new(y: u32, x: u32) -> Self {
        Self { y, x, at: 0, run: 0 }
    }

    pub fn with_portion(y: u32, x: u32, at: u32, run: u32) -> Self {
        Self { y, x, at, run }
    }

    /// True when the point targets only part of its token
    pub fn is_partial(&self) -> bool {
        self.at > 0
    }

    /// Number of characters in the portion (1 when `@at` has no run)
    pub fn portion_len(&self) -> u32 {
        self.run.max(1)
    }
}

impl fmt::Display for TokenTextPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.y, self.x)?;
        if self.at > 0 {
            write!(f, "@{}", self.at)?;
            if self.run > 1 {
                write!(f, "x{}", self.run)?;
            }
        }
        Ok(())
    }
}

impl FromStr for TokenTextPoint {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (yx, portion) = match s.split_once('@') {
            Some((yx, portion)) => (yx, Some(portion)),
            None => (s, None),
        };

        let (y, x) = yx
            .split_once('.')
            .ok_or_else(|| ExportError::Format(format!("missing token in point \"{}\"", s)))?;
        let y = parse_ordinal(y, s)?;
        let x = parse_ordinal(x, s)?;

        let Some(portion) = portion else {
            return Ok(Self::new(y, x));
        };
        let (at, run) = match portion.find(['x', '-']) {
            Some(i) => (
                parse_ordinal(&portion[..i], s)?,
                parse_ordinal(&portion[i + 1..], s)?,
            ),
            None => (parse_ordinal(portion, s)?, 1),
        };
        Ok(Self::with_portion(y, x, at, run))
    }
}

/// A token-based location: a single point or a `start-end` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenTextLocation {
    pub start: TokenTextPoint,
    pub end: Option<TokenTextPoint>,
}

impl TokenTextLocation {
    pub fn point(start: TokenTextPoint) -> Self {
        Self { start, end: None }
    }

    pub fn range(start: TokenTextPoint, end: TokenTextPoint) -> Self {
        Self { start, end: Some(end) }
    }

    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }

    /// Parse a location string, failing with [`ExportError::Format`] when
    /// malformed or when a range ends before it starts.
    pub fn parse(text: &str) -> Result<Self> {
        text.parse()
    }
}

impl fmt::Display for TokenTextLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}", self.start),
        }
    }
}

impl FromStr for TokenTextLocation {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ExportError::Format("empty location".to_string()));
        }

        // a '-' opens the range end only when followed by "y.x"; otherwise
        // it is a run separator inside the start point
        let split = s
            .match_indices('-')
            .map(|(i, _)| i)
            .find(|&i| i > 0 && starts_with_point(&s[i + 1..]));

        match split {
            Some(i) => {
                let start: TokenTextPoint = s[..i].parse()?;
                let end: TokenTextPoint = s[i + 1..].parse()?;
                if (end.y, end.x) < (start.y, start.x) {
                    return Err(ExportError::Format(format!(
                        "location range \"{}\" ends before it starts",
                        s
                    )));
                }
                Ok(Self::range(start, end))
            }
            None => Ok(Self::point(s.parse()?)),
        }
    }
}

fn starts_with_point(s: &str) -> bool {
    let digits = s.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && s[digits..].starts_with('.')
}

fn parse_ordinal(value: &str, source: &str) -> Result<u32> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ExportError::Format(format!(
            "invalid ordinal \"{}\" in location \"{}\"",
            value, source
        ))),
    }
}
