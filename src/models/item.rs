//! Items and their parts
//!
//! An item is an ordered list of parts. One part carries the base text
//! (role [`BASE_TEXT_ROLE_ID`]); layer parts (role prefixed with
//! [`FRAGMENT_ROLE_PREFIX`]) carry fragments anchored to that text.

use serde::{Deserialize, Serialize};

use super::apparatus::ApparatusFragment;
use super::comment::CommentFragment;
use crate::error::{ExportError, Result};

/// Role id reserved for the base text part
pub const BASE_TEXT_ROLE_ID: &str = "base-text";
/// Prefix of every layer part role id
pub const FRAGMENT_ROLE_PREFIX: &str = "fr.";

pub const TOKEN_TEXT_PART_TYPE_ID: &str = "it.vedph.token-text";
pub const TOKEN_TEXT_LAYER_PART_TYPE_ID: &str = "it.vedph.token-text-layer";
pub const APPARATUS_ROLE_ID: &str = "fr.it.vedph.apparatus";
pub const COMMENT_ROLE_ID: &str = "fr.it.vedph.comment";

/// One line of a token-based text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    pub y: u32,
    pub text: String,
}

/// Base text made of lines of whitespace-separated tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTextPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    pub lines: Vec<TextLine>,
}

impl TokenTextPart {
    /// Build a part from line texts, numbering lines from 1
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            citation: None,
            lines: lines
                .into_iter()
                .enumerate()
                .map(|(i, text)| TextLine {
                    y: i as u32 + 1,
                    text: text.into(),
                })
                .collect(),
        }
    }
}

/// Fragment of any supported layer type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Fragment {
    Apparatus(ApparatusFragment),
    Comment(CommentFragment),
}

impl Fragment {
    pub fn location(&self) -> &str {
        match self {
            Fragment::Apparatus(fr) => &fr.location,
            Fragment::Comment(fr) => &fr.location,
        }
    }

    pub fn as_apparatus(&self) -> Option<&ApparatusFragment> {
        match self {
            Fragment::Apparatus(fr) => Some(fr),
            _ => None,
        }
    }
}

/// Layer part: an ordered list of fragments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLayerPart {
    pub fragments: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum PartContent {
    TokenText(TokenTextPart),
    Layer(TextLayerPart),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: String,
    pub type_id: String,
    #[serde(default)]
    pub role_id: String,
    pub content: PartContent,
}

impl Part {
    /// Base text part
    pub fn token_text(id: impl Into<String>, text: TokenTextPart) -> Self {
        Self {
            id: id.into(),
            type_id: TOKEN_TEXT_PART_TYPE_ID.to_string(),
            role_id: BASE_TEXT_ROLE_ID.to_string(),
            content: PartContent::TokenText(text),
        }
    }

    /// Token-based layer part with the given role (e.g. [`APPARATUS_ROLE_ID`])
    pub fn layer(id: impl Into<String>, role_id: impl Into<String>, fragments: Vec<Fragment>) -> Self {
        Self {
            id: id.into(),
            type_id: TOKEN_TEXT_LAYER_PART_TYPE_ID.to_string(),
            role_id: role_id.into(),
            content: PartContent::Layer(TextLayerPart { fragments }),
        }
    }

    pub fn is_layer(&self) -> bool {
        self.role_id.starts_with(FRAGMENT_ROLE_PREFIX)
    }

    pub fn as_layer(&self) -> Option<&TextLayerPart> {
        match &self.content {
            PartContent::Layer(layer) if self.is_layer() => Some(layer),
            _ => None,
        }
    }

    /// Prefix shared by the ids of all fragments of this part: `typeId:roleId@`
    pub fn fragment_id_prefix(&self) -> String {
        format!("{}:{}@", self.type_id, self.role_id)
    }

    /// Id of the fragment at `index` in this part
    pub fn fragment_id(&self, index: usize) -> String {
        format!("{}{}", self.fragment_id_prefix(), index)
    }
}

/// Split a fragment id into its `typeId:roleId@` prefix and fragment index
pub fn parse_fragment_id(id: &str) -> Result<(&str, usize)> {
    let malformed = || ExportError::Format(format!("malformed fragment id \"{}\"", id));
    let at = id.rfind('@').ok_or_else(malformed)?;
    let prefix = &id[..=at];
    if !prefix.contains(':') {
        return Err(malformed());
    }
    let index = id[at + 1..].parse::<usize>().map_err(|_| malformed())?;
    Ok((prefix, index))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// The base text part, if any
    pub fn base_text(&self) -> Option<(&Part, &TokenTextPart)> {
        self.parts.iter().find_map(|part| match &part.content {
            PartContent::TokenText(text) if part.role_id == BASE_TEXT_ROLE_ID => Some((part, text)),
            _ => None,
        })
    }

    /// All layer parts in item order
    pub fn layers(&self) -> impl Iterator<Item = (&Part, &TextLayerPart)> {
        self.parts
            .iter()
            .filter_map(|part| part.as_layer().map(|layer| (part, layer)))
    }

    /// The first layer part with the given role
    pub fn layer(&self, role_id: &str) -> Option<(&Part, &TextLayerPart)> {
        self.layers().find(|(part, _)| part.role_id == role_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_id_round_trip() {
        let part = Part::layer("p2", APPARATUS_ROLE_ID, Vec::new());
        let id = part.fragment_id(12);
        assert_eq!(id, "it.vedph.token-text-layer:fr.it.vedph.apparatus@12");

        let (prefix, index) = parse_fragment_id(&id).unwrap();
        assert_eq!(prefix, part.fragment_id_prefix());
        assert_eq!(index, 12);
    }

    #[test]
    fn test_malformed_fragment_ids() {
        for id in ["", "no-at", "type@1", "t:r@", "t:r@x"] {
            assert!(matches!(parse_fragment_id(id), Err(ExportError::Format(_))), "{}", id);
        }
    }

    #[test]
    fn test_item_part_lookup() {
        let item = Item::new("i1", "Catullus")
            .with_part(Part::layer("p2", COMMENT_ROLE_ID, Vec::new()))
            .with_part(Part::token_text("p1", TokenTextPart::from_lines(["a b"])))
            .with_part(Part::layer("p3", APPARATUS_ROLE_ID, Vec::new()));

        let (base, text) = item.base_text().unwrap();
        assert_eq!(base.id, "p1");
        assert_eq!(text.lines[0].y, 1);

        let roles: Vec<&str> = item.layers().map(|(p, _)| p.role_id.as_str()).collect();
        assert_eq!(roles, vec![COMMENT_ROLE_ID, APPARATUS_ROLE_ID]);
        assert_eq!(item.layer(APPARATUS_ROLE_ID).unwrap().0.id, "p3");
        assert!(item.layer("fr.missing").is_none());
    }

    #[test]
    fn test_item_deserializes_from_json() {
        let json = r#"{
            "id": "i1",
            "title": "t",
            "parts": [
                {"id": "p1", "typeId": "it.vedph.token-text", "roleId": "base-text",
                 "content": {"kind": "tokenText", "data": {"lines": [{"y": 1, "text": "a b"}]}}},
                {"id": "p2", "typeId": "it.vedph.token-text-layer", "roleId": "fr.it.vedph.comment",
                 "content": {"kind": "layer", "data": {"fragments": [
                    {"kind": "comment", "location": "1.1", "text": "hello"}
                 ]}}}
            ]
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.base_text().is_some());
        let (_, layer) = item.layer(COMMENT_ROLE_ID).unwrap();
        assert_eq!(layer.fragments[0].location(), "1.1");
    }
}
