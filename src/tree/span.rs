//! Text span payload shared by every tree filter and renderer

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::text::TextRange;

/// A named value attached to a span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub value: String,
    /// Locator of the data this feature comes from (e.g. a fragment id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Feature {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            source: None,
        }
    }

    pub fn with_source(name: impl Into<String>, value: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            source: Some(source.into()),
        }
    }
}

/// Features forming one logical annotation entry (e.g. one apparatus entry)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub features: Vec<Feature>,
}

impl FeatureSet {
    pub fn new(key: impl Into<String>, source: Option<String>) -> Self {
        Self {
            key: key.into(),
            source,
            features: Vec::new(),
        }
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.features.iter().any(|f| f.name == name)
    }

    /// Values of all the features with the given name, in order
    pub fn values<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.features
            .iter()
            .filter(move |f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.values(name).next()
    }
}

/// Payload of a text tree node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpan {
    /// Source range; `None` only for synthetic spans
    pub range: Option<TextRange>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Working copy of the range text; diverges from it after splitting
    pub text: String,
    pub is_before_eol: bool,
    pub features: Vec<Feature>,
    /// Entry feature sets by key; keys sort in entry order (`e000`, `e001`...)
    pub feature_sets: BTreeMap<String, FeatureSet>,
    /// Version tags this span belongs to, in arrival order
    pub tags: Vec<String>,
}

impl TextSpan {
    /// Span for a range whose text has been assigned
    pub fn from_range(range: TextRange) -> Self {
        Self {
            text: range.text().to_string(),
            range: Some(range),
            ..Self::default()
        }
    }

    pub fn synthetic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn fragment_ids(&self) -> &[String] {
        self.range.as_ref().map(|r| r.fragment_ids.as_slice()).unwrap_or_default()
    }

    /// Fragment ids starting with the given prefix
    pub fn fragment_ids_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fragment_ids()
            .iter()
            .filter(move |id| id.starts_with(prefix))
            .map(String::as_str)
    }

    pub fn has_fragment_prefix(&self, prefix: &str) -> bool {
        self.fragment_ids_with_prefix(prefix).next().is_some()
    }

    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Add a feature both to the flat list and to the set `key`, creating
    /// the set with `source` when missing.
    pub fn add_set_feature(&mut self, key: &str, source: Option<&str>, feature: Feature) {
        self.feature_sets
            .entry(key.to_string())
            .or_insert_with(|| FeatureSet::new(key, source.map(str::to_string)))
            .features
            .push(feature.clone());
        self.features.push(feature);
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.features.iter().any(|f| f.name == name)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a version tag; tags are never removed
    pub fn add_tag(&mut self, tag: &str) {
        if !self.has_tag(tag) {
            self.tags.push(tag.to_string());
        }
    }

    /// Shallow copy of this span with a different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_features_also_land_in_flat_list() {
        let mut span = TextSpan::synthetic("illuc");
        span.add_set_feature("e001", Some("fr@0"), Feature::new("variant", "illud"));
        span.add_set_feature("e000", Some("fr@0"), Feature::new("witness", "O1"));
        span.add_set_feature("e001", Some("fr@0"), Feature::new("witness", "O"));

        let names: Vec<&str> = span.features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["variant", "witness", "witness"]);

        let keys: Vec<&String> = span.feature_sets.keys().collect();
        assert_eq!(keys, vec!["e000", "e001"]);
        let set = &span.feature_sets["e001"];
        assert_eq!(set.source.as_deref(), Some("fr@0"));
        assert_eq!(set.first_value("variant"), Some("illud"));
        assert_eq!(set.values("witness").collect::<Vec<_>>(), vec!["O"]);
    }

    #[test]
    fn test_values_outlive_the_queried_name() {
        let mut set = FeatureSet::new("e000", None);
        set.features.push(Feature::new("witness", "O"));
        set.features.push(Feature::new("witness", "G"));

        let first = {
            let name = String::from("witness");
            set.first_value(&name)
        };
        assert_eq!(first, Some("O"));
        let all: Vec<&str> = {
            let name = String::from("witness");
            set.values(&name).collect()
        };
        assert_eq!(all, vec!["O", "G"]);
        assert_eq!(set.first_value("note"), None);
    }

    #[test]
    fn test_tags_are_unique() {
        let mut span = TextSpan::synthetic("a");
        span.add_tag("w:O");
        span.add_tag("w:O");
        span.add_tag("a:X");
        assert_eq!(span.tags, vec!["w:O", "a:X"]);
    }

    #[test]
    fn test_fragment_prefix_lookup() {
        let mut range = TextRange::with_fragment(0, 4, "t:fr.a@0");
        range.add_fragment_id("t:fr.b@3");
        range.text = Some("illuc".to_string());
        let span = TextSpan::from_range(range);
        assert_eq!(span.text, "illuc");
        assert_eq!(span.fragment_ids_with_prefix("t:fr.b@").collect::<Vec<_>>(), vec!["t:fr.b@3"]);
        assert!(!span.has_fragment_prefix("t:fr.c@"));
    }
}
