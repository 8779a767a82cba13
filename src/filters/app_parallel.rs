//! Apparatus version filter
//!
//! Turns a linear tree into a branching one with a branch per reading.
//! Every witness and author of the apparatus (tags `w:X` and `a:X`) gets
//! its own linear version of the text, where each span linked to an entry
//! attributed to that tag reads the entry's variant instead of the base
//! text. The versions are then folded together by [`TreeMerger`].

use std::collections::HashMap;

use serde::Deserialize;

use crate::context::RendererContext;
use crate::error::Result;
use crate::models::{ApparatusEntryType, Fragment, TextLayerPart, APPARATUS_ROLE_ID};
use crate::text::map_non_printables;
use crate::tree::{NodeIx, TextTree, TreeMerger};

use super::app_linear::apparatus_fragment;
use super::TextTreeFilter;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppParallelFilterOptions {
    /// Role of the apparatus layer part
    pub role_id: String,
    /// Bound fan-out to two children per node
    pub binary: bool,
    /// Tag merged first, reading the unchanged base text
    pub base_tag: Option<String>,
}

impl Default for AppParallelFilterOptions {
    fn default() -> Self {
        Self {
            role_id: APPARATUS_ROLE_ID.to_string(),
            binary: true,
            base_tag: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppParallelTextTreeFilter {
    options: AppParallelFilterOptions,
}

impl AppParallelTextTreeFilter {
    pub fn new(options: AppParallelFilterOptions) -> Self {
        Self { options }
    }

    /// Version tags in first-seen order, the base tag first when set
    fn collect_tags(&self, layer: &TextLayerPart) -> Vec<String> {
        let mut tags: Vec<String> = self.options.base_tag.iter().cloned().collect();
        let entries = layer
            .fragments
            .iter()
            .filter_map(Fragment::as_apparatus)
            .flat_map(|fragment| fragment.entries.iter());
        for tag in entries.flat_map(|entry| entry.tags()) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Linear tree with the readings of `tag`
    fn build_version(
        &self,
        tree: &TextTree,
        chain: &[NodeIx],
        bounds: &HashMap<String, (usize, usize)>,
        layer: &TextLayerPart,
        prefix: &str,
        tag: &str,
    ) -> Result<TextTree> {
        let is_base = self.options.base_tag.as_deref() == Some(tag);
        let mut nodes = Vec::with_capacity(chain.len());

        for (pos, &ix) in chain.iter().enumerate() {
            let node = tree.node(ix);
            let Some(span) = node.data.as_ref() else {
                continue;
            };
            let mut text = span.text.clone();
            let mut changed = false;

            for fragment_id in span.fragment_ids_with_prefix(prefix).filter(|_| !is_base) {
                let fragment = apparatus_fragment(layer, fragment_id)?;
                let Some(entry) = fragment.entry_for_tag(tag) else {
                    continue;
                };
                if entry.is_accepted {
                    continue;
                }
                let (first, last) = bounds.get(fragment_id).copied().unwrap_or((pos, pos));
                let value = entry.value.as_deref().unwrap_or_default();
                match entry.kind {
                    // the variant replaces the whole fragment, so it sits
                    // on its first span and empties the others
                    ApparatusEntryType::Replacement => {
                        text = if pos == first { value.to_string() } else { String::new() };
                        changed = true;
                    }
                    ApparatusEntryType::AdditionBefore if pos == first => {
                        text = format!("{} {}", value, text);
                        changed = true;
                    }
                    ApparatusEntryType::AdditionAfter if pos == last => {
                        text = format!("{} {}", text, value);
                        changed = true;
                    }
                    _ => {}
                }
            }

            if changed {
                let label = Some(map_non_printables(&text, false));
                nodes.push((0, label, span.with_text(text)));
            } else {
                nodes.push((node.id, node.label.clone(), span.clone()));
            }
        }
        Ok(TextTree::linear(nodes))
    }
}

/// First and last chain position of every fragment starting with `prefix`
fn fragment_bounds(tree: &TextTree, chain: &[NodeIx], prefix: &str) -> HashMap<String, (usize, usize)> {
    let mut bounds: HashMap<String, (usize, usize)> = HashMap::new();
    for (pos, &ix) in chain.iter().enumerate() {
        let Some(span) = tree.data(ix) else {
            continue;
        };
        for id in span.fragment_ids_with_prefix(prefix) {
            bounds
                .entry(id.to_string())
                .and_modify(|(_, last)| *last = pos)
                .or_insert((pos, pos));
        }
    }
    bounds
}

impl TextTreeFilter for AppParallelTextTreeFilter {
    fn apply(&self, tree: TextTree, context: &RendererContext) -> Result<TextTree> {
        let Some((part, layer)) = context.item().and_then(|item| item.layer(&self.options.role_id)) else {
            return Ok(tree);
        };
        let tags = self.collect_tags(layer);
        if tags.is_empty() {
            return Ok(tree);
        }

        let prefix = part.fragment_id_prefix();
        let chain = tree.chain();
        let bounds = fragment_bounds(&tree, &chain, &prefix);
        log::debug!("Merging {} versions: {}", tags.len(), tags.join(", "));

        TreeMerger::with_binary(self.options.binary).merge(&tree, &tags, |tag| {
            self.build_version(&tree, &chain, &bounds, layer, &prefix, tag)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnnotatedValue, ApparatusEntry, ApparatusFragment, Item, Part};
    use crate::text::TextRange;
    use crate::tree::TextSpan;

    fn linear(part: &Part, words: &[(&str, Option<usize>)]) -> TextTree {
        TextTree::linear(words.iter().enumerate().map(|(i, (word, fragment))| {
            let mut range = TextRange::new(i, i);
            if let Some(index) = fragment {
                range.add_fragment_id(&part.fragment_id(*index));
            }
            range.text = Some(word.to_string());
            (i as u32 + 1, Some(word.to_string()), TextSpan::from_range(range))
        }))
    }

    fn readings(tree: &TextTree, tag: &str) -> Vec<String> {
        tree.depth_first()
            .into_iter()
            .filter_map(|ix| tree.data(ix))
            .filter(|span| span.has_tag(tag))
            .map(|span| span.text.clone())
            .collect()
    }

    fn apply(options: AppParallelFilterOptions, part: Part, tree: TextTree) -> TextTree {
        let item = Item::new("i", "t").with_part(part);
        AppParallelTextTreeFilter::new(options)
            .apply(tree, &RendererContext::for_item(&item))
            .unwrap()
    }

    #[test]
    fn test_each_tag_gets_a_branch() {
        let fragment = ApparatusFragment::new("1.2")
            .entry(ApparatusEntry::accepted().witness(AnnotatedValue::new("A")))
            .entry(ApparatusEntry::replacement("x").witness(AnnotatedValue::new("B")));
        let part = Part::layer("p2", APPARATUS_ROLE_ID, vec![Fragment::Apparatus(fragment)]);
        let tree = linear(&part, &[("a", None), ("b", Some(0)), ("c", None)]);

        let merged = apply(AppParallelFilterOptions::default(), part, tree);
        assert_eq!(readings(&merged, "w:A"), vec!["a", "b", "c"]);
        assert_eq!(readings(&merged, "w:B"), vec!["a", "x", "c"]);
        assert!(!merged.is_linear());
        for ix in merged.depth_first() {
            assert!(merged.children(ix).len() <= 2);
        }
    }

    #[test]
    fn test_replacement_spanning_spans_sits_on_first() {
        let fragment = ApparatusFragment::new("1.1-1.2")
            .entry(ApparatusEntry::replacement("xy").witness(AnnotatedValue::new("B")));
        let part = Part::layer("p2", APPARATUS_ROLE_ID, vec![Fragment::Apparatus(fragment)]);
        let tree = linear(&part, &[("a", Some(0)), ("b", Some(0)), ("c", None)]);

        let options = AppParallelFilterOptions {
            base_tag: Some("base".to_string()),
            ..Default::default()
        };
        let merged = apply(options, part, tree);
        assert_eq!(readings(&merged, "base"), vec!["a", "b", "c"]);
        assert_eq!(readings(&merged, "w:B"), vec!["xy", "", "c"]);
    }

    #[test]
    fn test_additions_go_on_fragment_edges() {
        let fragment = ApparatusFragment::new("1.1-1.2")
            .entry(ApparatusEntry {
                value: Some("et".to_string()),
                ..ApparatusEntry::new(ApparatusEntryType::AdditionBefore)
            }
            .witness(AnnotatedValue::new("B")))
            .entry(ApparatusEntry {
                value: Some("que".to_string()),
                ..ApparatusEntry::new(ApparatusEntryType::AdditionAfter)
            }
            .witness(AnnotatedValue::new("C")));
        let part = Part::layer("p2", APPARATUS_ROLE_ID, vec![Fragment::Apparatus(fragment)]);
        let tree = linear(&part, &[("a", Some(0)), ("b", Some(0))]);

        let merged = apply(AppParallelFilterOptions::default(), part, tree);
        assert_eq!(readings(&merged, "w:B"), vec!["et a", "b"]);
        assert_eq!(readings(&merged, "w:C"), vec!["a", "b que"]);
    }

    #[test]
    fn test_without_tags_tree_is_unchanged() {
        let fragment = ApparatusFragment::new("1.1").entry(ApparatusEntry::replacement("x"));
        let part = Part::layer("p2", APPARATUS_ROLE_ID, vec![Fragment::Apparatus(fragment)]);
        let tree = linear(&part, &[("a", Some(0))]);

        let merged = apply(AppParallelFilterOptions::default(), part, tree);
        assert!(merged.is_linear());
        assert_eq!(merged.chain_data()[0].text, "a");
        assert!(merged.chain_data()[0].tags.is_empty());
    }

    #[test]
    fn test_non_binary_merge_fans_out() {
        let fragment = ApparatusFragment::new("1.1")
            .entry(ApparatusEntry::replacement("x").witness(AnnotatedValue::new("B")))
            .entry(ApparatusEntry::replacement("y").witness(AnnotatedValue::new("C")));
        let part = Part::layer("p2", APPARATUS_ROLE_ID, vec![Fragment::Apparatus(fragment)]);
        let tree = linear(&part, &[("a", Some(0))]);

        let options = AppParallelFilterOptions {
            binary: false,
            base_tag: Some("base".to_string()),
            ..Default::default()
        };
        let merged = apply(options, part, tree);
        assert_eq!(merged.children(TextTree::ROOT).len(), 3);
    }
}
