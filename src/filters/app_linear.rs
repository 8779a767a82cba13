//! Apparatus feature filter for linear trees
//!
//! Tags every span linked to an apparatus fragment with the features of
//! the fragment's entries: one feature set per entry, keyed `e000`,
//! `e001`... in entry order, so that renderers can rebuild lemma and
//! readings in their original order.

use serde::Deserialize;

use crate::context::RendererContext;
use crate::error::{ExportError, Result};
use crate::models::{
    parse_fragment_id, ApparatusEntry, ApparatusEntryType, ApparatusFragment, Fragment, TextLayerPart,
    APPARATUS_ROLE_ID,
};
use crate::tree::{Feature, TextTree};

use super::{
    TextTreeFilter, FEATURE_AUTHOR, FEATURE_AUTHOR_NOTE, FEATURE_NOTE, FEATURE_VARIANT, FEATURE_WITNESS,
    FEATURE_WITNESS_NOTE,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppFilterOptions {
    /// Role of the apparatus layer part
    pub role_id: String,
}

impl Default for AppFilterOptions {
    fn default() -> Self {
        Self {
            role_id: APPARATUS_ROLE_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppLinearTextTreeFilter {
    options: AppFilterOptions,
}

impl AppLinearTextTreeFilter {
    pub fn new(options: AppFilterOptions) -> Self {
        Self { options }
    }
}

/// Apparatus fragment addressed by `fragment_id` inside `layer`
pub(crate) fn apparatus_fragment<'a>(layer: &'a TextLayerPart, fragment_id: &str) -> Result<&'a ApparatusFragment> {
    let (_, index) = parse_fragment_id(fragment_id)?;
    layer
        .fragments
        .get(index)
        .and_then(Fragment::as_apparatus)
        .ok_or_else(|| ExportError::Format(format!("no apparatus fragment for id \"{}\"", fragment_id)))
}

/// Variant text an entry gives for a span reading `base`, if any
pub(crate) fn variant_text(entry: &ApparatusEntry, base: &str) -> Option<String> {
    if entry.is_accepted {
        return None;
    }
    let value = entry.value.as_deref().unwrap_or_default();
    match entry.kind {
        ApparatusEntryType::Replacement => Some(value.to_string()),
        ApparatusEntryType::AdditionBefore => Some(format!("{} {}", value, base)),
        ApparatusEntryType::AdditionAfter => Some(format!("{} {}", base, value)),
        ApparatusEntryType::Note => None,
    }
}

fn entry_features(entry: &ApparatusEntry, base: &str) -> Vec<Feature> {
    let mut features = Vec::new();
    if let Some(variant) = variant_text(entry, base) {
        features.push(Feature::new(FEATURE_VARIANT, variant));
    }
    for witness in &entry.witnesses {
        features.push(Feature::new(FEATURE_WITNESS, &witness.value));
        if let Some(note) = &witness.note {
            features.push(Feature::new(FEATURE_WITNESS_NOTE, note));
        }
    }
    for author in &entry.authors {
        features.push(Feature::new(FEATURE_AUTHOR, &author.value));
        if let Some(note) = &author.note {
            features.push(Feature::new(FEATURE_AUTHOR_NOTE, note));
        }
    }
    if let Some(note) = &entry.note {
        features.push(Feature::new(FEATURE_NOTE, note));
    }
    features
}

impl TextTreeFilter for AppLinearTextTreeFilter {
    fn apply(&self, mut tree: TextTree, context: &RendererContext) -> Result<TextTree> {
        let Some((part, layer)) = context.item().and_then(|item| item.layer(&self.options.role_id)) else {
            return Ok(tree);
        };
        let prefix = part.fragment_id_prefix();

        for ix in tree.depth_first() {
            let Some(span) = tree.data(ix) else {
                continue;
            };
            let fragment_ids: Vec<String> = span.fragment_ids_with_prefix(&prefix).map(str::to_string).collect();
            if fragment_ids.is_empty() {
                continue;
            }
            let base = span.text.clone();

            // entry keys run on across fragments overlapping the same span
            let mut sets = Vec::new();
            for fragment_id in &fragment_ids {
                let fragment = apparatus_fragment(layer, fragment_id)?;
                for entry in &fragment.entries {
                    sets.push((fragment_id, entry_features(entry, &base)));
                }
            }

            if let Some(span) = tree.data_mut(ix) {
                for (n, (source, features)) in sets.into_iter().enumerate() {
                    let key = format!("e{:03}", n);
                    for feature in features {
                        span.add_set_feature(&key, Some(source), feature);
                    }
                }
            }
        }
        Ok(tree)
    }
}
