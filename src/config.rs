//! Pipeline configuration
//!
//! A pipeline is described in JSON: the tree filters to run in order, the
//! renderers keyed by output name, the text filters applied to every
//! rendered output and the head/tail templates wrapping a composed file.
//! Components are referenced by id and built through the
//! [`ComponentRegistry`](crate::registry::ComponentRegistry).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::text::DEFAULT_LINE_SEPARATOR;

/// A component id with its options
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentSpec {
    pub id: String,
    #[serde(default)]
    pub options: Value,
}

impl ComponentSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(id: impl Into<String>, options: Value) -> Self {
        Self {
            id: id.into(),
            options,
        }
    }

    /// Copy of this spec with `key` set to `value` unless the options
    /// already carry it. Non-object options are left alone.
    pub fn with_default_option(&self, key: &str, value: Value) -> Self {
        let mut spec = self.clone();
        if spec.options.is_null() {
            spec.options = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut spec.options {
            map.entry(key).or_insert(value);
        }
        spec
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Character joining base text lines
    pub line_separator: char,
    /// Show spaces as visible glyphs in node labels
    pub map_spaces: bool,
    pub tree_filters: Vec<ComponentSpec>,
    /// Renderers by output key
    pub renderers: BTreeMap<String, ComponentSpec>,
    pub text_filters: Vec<ComponentSpec>,
    /// Mustache template written before the first item
    pub text_head: Option<String>,
    /// Mustache template written after the last item
    pub text_tail: Option<String>,
    /// Values published to the context of every item and to the templates
    pub data: BTreeMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            line_separator: DEFAULT_LINE_SEPARATOR,
            map_spaces: false,
            tree_filters: Vec::new(),
            renderers: BTreeMap::new(),
            text_filters: Vec::new(),
            text_head: None,
            text_tail: None,
            data: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading pipeline configuration from {}", path.as_ref().display());
        Self::from_json(&json)
    }
}
