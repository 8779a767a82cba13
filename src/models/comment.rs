//! Comment layer fragments

use serde::{Deserialize, Serialize};

/// Free text comment anchored to a location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFragment {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl CommentFragment {
    pub fn new(location: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            tag: None,
            text: text.into(),
        }
    }
}
