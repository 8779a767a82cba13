//! Critical apparatus layer fragments
//!
//! One fragment groups the entries (variants, notes) attached to a
//! single location of the base text.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Kind of apparatus entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ApparatusEntryType {
    /// Variant reading replacing the base text
    #[default]
    Replacement = 0,
    /// Text added before the base text
    AdditionBefore = 1,
    /// Text added after the base text
    AdditionAfter = 2,
    /// Annotation only: keeps the base text
    Note = 3,
}

/// A witness or author reference with an optional note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AnnotatedValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            note: None,
        }
    }

    pub fn with_note(value: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            note: Some(note.into()),
        }
    }
}

/// A single apparatus entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApparatusEntry {
    #[serde(rename = "type", default)]
    pub kind: ApparatusEntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norm_value: Option<String>,
    /// Accepted entries represent the base reading (the lemma)
    #[serde(default)]
    pub is_accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub witnesses: Vec<AnnotatedValue>,
    #[serde(default)]
    pub authors: Vec<AnnotatedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ApparatusEntry {
    pub fn new(kind: ApparatusEntryType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Entry for the accepted (base) reading
    pub fn accepted() -> Self {
        Self {
            is_accepted: true,
            ..Self::default()
        }
    }

    /// Replacement entry with the given variant value
    pub fn replacement(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn witness(mut self, value: AnnotatedValue) -> Self {
        self.witnesses.push(value);
        self
    }

    pub fn author(mut self, value: AnnotatedValue) -> Self {
        self.authors.push(value);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// True if this entry is attributed to the given version tag
    /// (`w:` witness or `a:` author namespace)
    pub fn has_tag(&self, tag: &str) -> bool {
        if let Some(witness) = tag.strip_prefix(WITNESS_TAG_PREFIX) {
            self.witnesses.iter().any(|w| w.value == witness)
        } else if let Some(author) = tag.strip_prefix(AUTHOR_TAG_PREFIX) {
            self.authors.iter().any(|a| a.value == author)
        } else {
            false
        }
    }

    /// Version tags for all witnesses then all authors of this entry
    pub fn tags(&self) -> impl Iterator<Item = String> + '_ {
        self.witnesses
            .iter()
            .map(|w| format!("{}{}", WITNESS_TAG_PREFIX, w.value))
            .chain(
                self.authors
                    .iter()
                    .map(|a| format!("{}{}", AUTHOR_TAG_PREFIX, a.value)),
            )
    }
}

/// Tag namespace for witnesses
pub const WITNESS_TAG_PREFIX: &str = "w:";
/// Tag namespace for authors
pub const AUTHOR_TAG_PREFIX: &str = "a:";

/// Apparatus fragment: all the entries at one location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApparatusFragment {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub entries: Vec<ApparatusEntry>,
}

impl ApparatusFragment {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            tag: None,
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, entry: ApparatusEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// First entry attributed to the given version tag
    pub fn entry_for_tag(&self, tag: &str) -> Option<&ApparatusEntry> {
        self.entries.iter().find(|e| e.has_tag(tag))
    }
}
