//! Item composer
//!
//! Drives the whole export of an item: flatten the base text with its
//! layers, merge the fragment ranges, build the linear tree, run the tree
//! filters, then every renderer followed by the text filters.
//!
//! Items are composed one at a time; the renderer context is reset before
//! each of them.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use crate::config::{ComponentSpec, PipelineConfig};
use crate::context::RendererContext;
use crate::error::Result;
use crate::filters::TextTreeFilter;
use crate::models::Item;
use crate::registry::{ComponentRegistry, BLOCK_LINEAR_FILTER_ID, PLAIN_RENDERER_ID};
use crate::renderers::{TextFilter, TextTreeRenderer};
use crate::text::{assign_text, merge_ranges, TokenTextFlattener};
use crate::tree::LinearTreeBuilder;

/// Template data key holding the number of composed items (tail only)
pub const ITEM_COUNT_KEY: &str = "item-count";

/// Rendered outputs of one item, by renderer key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedItem {
    pub item_id: String,
    pub outputs: BTreeMap<String, String>,
}

impl ComposedItem {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.outputs.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

pub struct ItemComposer {
    flattener: TokenTextFlattener,
    builder: LinearTreeBuilder,
    tree_filters: Vec<Box<dyn TextTreeFilter>>,
    renderers: Vec<(String, Box<dyn TextTreeRenderer>)>,
    text_filters: Vec<Box<dyn TextFilter>>,
    text_head: Option<String>,
    text_tail: Option<String>,
    data: BTreeMap<String, String>,
    context: RendererContext,
}

impl ItemComposer {
    /// Composer with no filters nor renderers
    pub fn new() -> Self {
        Self {
            flattener: TokenTextFlattener::new(),
            builder: LinearTreeBuilder::new(),
            tree_filters: Vec::new(),
            renderers: Vec::new(),
            text_filters: Vec::new(),
            text_head: None,
            text_tail: None,
            data: BTreeMap::new(),
            context: RendererContext::new(),
        }
    }

    /// Composer with the components named by `config`
    pub fn from_config(config: &PipelineConfig, registry: &ComponentRegistry) -> Result<Self> {
        let mut composer = Self::new();
        composer.flattener = TokenTextFlattener::with_line_separator(config.line_separator);
        composer.builder = LinearTreeBuilder::new()
            .with_line_separator(config.line_separator)
            .with_mapped_spaces(config.map_spaces);

        let separator = config.line_separator;
        for spec in &config.tree_filters {
            let spec = with_line_separator(spec, separator);
            composer.tree_filters.push(registry.create_tree_filter(&spec)?);
        }
        for (key, spec) in &config.renderers {
            let spec = with_line_separator(spec, separator);
            composer.renderers.push((key.clone(), registry.create_renderer(&spec)?));
        }
        for spec in &config.text_filters {
            composer.text_filters.push(registry.create_text_filter(spec)?);
        }
        composer.text_head = config.text_head.clone();
        composer.text_tail = config.text_tail.clone();
        composer.data = config.data.clone();

        log::debug!(
            "Composer ready: {} tree filters, {} renderers, {} text filters",
            composer.tree_filters.len(),
            composer.renderers.len(),
            composer.text_filters.len()
        );
        Ok(composer)
    }

    pub fn with_tree_filter(mut self, filter: impl TextTreeFilter + 'static) -> Self {
        self.tree_filters.push(Box::new(filter));
        self
    }

    pub fn with_renderer(mut self, key: impl Into<String>, renderer: impl TextTreeRenderer + 'static) -> Self {
        self.renderers.push((key.into(), Box::new(renderer)));
        self
    }

    pub fn with_text_filter(mut self, filter: impl TextFilter + 'static) -> Self {
        self.text_filters.push(Box::new(filter));
        self
    }

    pub fn with_head_tail(mut self, head: Option<String>, tail: Option<String>) -> Self {
        self.text_head = head;
        self.text_tail = tail;
        self
    }

    /// Context of the last composed item
    pub fn context(&self) -> &RendererContext {
        &self.context
    }

    /// Render `item` with every renderer. An item without base text
    /// yields no output.
    pub fn compose(&mut self, item: &Item) -> Result<ComposedItem> {
        self.context.reset();
        self.context.data.extend(self.data.clone());
        self.context.set_item(item);

        let mut composed = ComposedItem::new(&item.id);
        let Some((text, raw_ranges)) = self.flattener.flatten_item(item)? else {
            log::debug!("Item {} has no base text", item.id);
            return Ok(composed);
        };
        let len = text.chars().count();
        if len == 0 {
            log::debug!("Item {} has an empty base text", item.id);
            return Ok(composed);
        }

        let mut ranges = merge_ranges(0, len - 1, &raw_ranges)?;
        assign_text(&mut ranges, &text)?;
        let mut tree = self.builder.build(ranges, &text)?;
        for filter in &self.tree_filters {
            tree = filter.apply(tree, &self.context)?;
        }

        for (key, renderer) in &self.renderers {
            let mut output = renderer.render(&tree, &self.context)?;
            for filter in &self.text_filters {
                output = filter.apply(&output, &self.context)?;
            }
            composed.outputs.insert(key.clone(), output);
        }
        Ok(composed)
    }

    /// Write head, the `key` output of each item and tail to `writer`.
    ///
    /// Items failing to compose are logged and skipped. Returns the number
    /// of items written.
    pub fn compose_to<'a, I, W>(&mut self, items: I, key: &str, writer: &mut W) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Item>,
        W: Write,
    {
        if let Some(head) = &self.text_head {
            writer.write_all(render_template(head, &self.data)?.as_bytes())?;
        }

        let mut count = 0;
        for item in items {
            let composed = match self.compose(item) {
                Ok(composed) => composed,
                Err(e) => {
                    log::error!("Skipping item {}: {}", item.id, e);
                    continue;
                }
            };
            if let Some(output) = composed.get(key) {
                writer.write_all(output.as_bytes())?;
                writer.write_all(b"\n")?;
                count += 1;
            }
        }

        if let Some(tail) = &self.text_tail {
            let mut data = self.data.clone();
            data.insert(ITEM_COUNT_KEY.to_string(), count.to_string());
            writer.write_all(render_template(tail, &data)?.as_bytes())?;
        }
        writer.flush()?;
        log::info!("Composed {} items", count);
        Ok(count)
    }

    /// [`compose_to`](Self::compose_to) a new file at `path`
    pub fn compose_to_file<'a, I>(&mut self, items: I, key: &str, path: impl AsRef<Path>) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.compose_to(items, key, &mut writer)
    }
}

impl Default for ItemComposer {
    fn default() -> Self {
        Self::new()
    }
}

/// Components splitting or restoring lines follow the pipeline separator
/// unless their own options name one
fn with_line_separator(spec: &ComponentSpec, separator: char) -> ComponentSpec {
    match spec.id.as_str() {
        BLOCK_LINEAR_FILTER_ID | PLAIN_RENDERER_ID => {
            spec.with_default_option("lineSeparator", Value::String(separator.to_string()))
        }
        _ => spec.clone(),
    }
}

fn render_template(template: &str, data: &BTreeMap<String, String>) -> Result<String> {
    let template = mustache::compile_str(template)?;
    Ok(template.render_to_string(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ITEM_ID_KEY;
    use crate::models::{CommentFragment, Fragment, Part, TokenTextPart, COMMENT_ROLE_ID};
    use crate::renderers::PlainTextTreeRenderer;

    fn item(id: &str, lines: &[&str]) -> Item {
        Item::new(id, "t").with_part(Part::token_text("p1", TokenTextPart::from_lines(lines.iter().copied())))
    }

    #[test]
    fn test_item_without_base_text_is_empty() {
        let mut composer = ItemComposer::new().with_renderer("txt", PlainTextTreeRenderer::new());
        let composed = composer.compose(&Item::new("i1", "t")).unwrap();
        assert!(composed.is_empty());
        assert_eq!(composer.context().data.get(ITEM_ID_KEY).map(String::as_str), Some("i1"));
    }

    #[test]
    fn test_plain_output_round_trips_lines() {
        let mut composer = ItemComposer::new().with_renderer("txt", PlainTextTreeRenderer::new());
        let composed = composer.compose(&item("i1", &["arma virumque", "cano"])).unwrap();
        assert_eq!(composed.get("txt"), Some("arma virumque\ncano"));
    }

    #[test]
    fn test_compose_to_writes_head_items_tail() {
        let mut composer = ItemComposer::new()
            .with_renderer("txt", PlainTextTreeRenderer::new())
            .with_head_tail(Some("<head>\n".to_string()), Some("<tail n=\"{{item-count}}\"/>".to_string()));
        let items = vec![item("a", &["x"]), item("b", &["y z"])];

        let mut out = Vec::new();
        let count = composer.compose_to(&items, "txt", &mut out).unwrap();
        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "<head>\nx\ny z\n<tail n=\"2\"/>");
    }

    #[test]
    fn test_config_line_separator_reaches_every_stage() {
        let config = PipelineConfig::from_json(
            r#"{
                "lineSeparator": "|",
                "treeFilters": [{"id": "it.vedph.text-tree-filter.block-linear"}],
                "renderers": {"txt": {"id": "it.vedph.text-tree-renderer.txt"}}
            }"#,
        )
        .unwrap();
        let mut composer = ItemComposer::from_config(&config, &ComponentRegistry::new()).unwrap();
        let item = item("i1", &["ab", "cd"]).with_part(Part::layer(
            "p2",
            COMMENT_ROLE_ID,
            vec![Fragment::Comment(CommentFragment::new("1.1", "x"))],
        ));

        let composed = composer.compose(&item).unwrap();
        assert_eq!(composed.get("txt"), Some("ab|cd"));
    }

    #[test]
    fn test_explicit_component_separator_wins() {
        let spec = ComponentSpec::with_options(PLAIN_RENDERER_ID, serde_json::json!({"lineSeparator": "/"}));
        assert_eq!(with_line_separator(&spec, '|').options["lineSeparator"], "/");

        let spec = ComponentSpec::new(BLOCK_LINEAR_FILTER_ID);
        assert_eq!(with_line_separator(&spec, '|').options["lineSeparator"], "|");

        let spec = ComponentSpec::new("it.vedph.text-tree-renderer.json");
        assert!(with_line_separator(&spec, '|').options.is_null());
    }
}
