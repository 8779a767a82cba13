//! Component registry
//!
//! Maps component ids to constructors taking the component's JSON options.
//! [`ComponentRegistry::new`] knows every built-in component; callers may
//! register their own under new ids or replace built-in ones.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ComponentSpec;
use crate::error::{ExportError, Result};
use crate::filters::{AppLinearTextTreeFilter, AppParallelTextTreeFilter, BlockLinearTextTreeFilter, TextTreeFilter};
use crate::renderers::{
    JsonTextTreeRenderer, PlainTextTreeRenderer, ReplaceTextFilter, SourceIdTextFilter, TeiLinearTextTreeRenderer,
    TeiParallelTextTreeRenderer, TextFilter, TextTreeRenderer,
};

pub const BLOCK_LINEAR_FILTER_ID: &str = "it.vedph.text-tree-filter.block-linear";
pub const APP_LINEAR_FILTER_ID: &str = "it.vedph.text-tree-filter.app-linear";
pub const APP_PARALLEL_FILTER_ID: &str = "it.vedph.text-tree-filter.app-parallel";
pub const TEI_LINEAR_RENDERER_ID: &str = "it.vedph.text-tree-renderer.tei-app-linear";
pub const TEI_PARALLEL_RENDERER_ID: &str = "it.vedph.text-tree-renderer.tei-app-parallel";
pub const PLAIN_RENDERER_ID: &str = "it.vedph.text-tree-renderer.txt";
pub const JSON_RENDERER_ID: &str = "it.vedph.text-tree-renderer.json";
pub const SOURCE_ID_TEXT_FILTER_ID: &str = "it.vedph.renderer-filter.mapped-ids";
pub const REPLACE_TEXT_FILTER_ID: &str = "it.vedph.renderer-filter.replace";

type TreeFilterFactory = Box<dyn Fn(&Value) -> Result<Box<dyn TextTreeFilter>> + Send + Sync>;
type RendererFactory = Box<dyn Fn(&Value) -> Result<Box<dyn TextTreeRenderer>> + Send + Sync>;
type TextFilterFactory = Box<dyn Fn(&Value) -> Result<Box<dyn TextFilter>> + Send + Sync>;

/// Deserialize component options; missing options mean defaults
pub fn options<O: DeserializeOwned + Default>(value: &Value) -> Result<O> {
    if value.is_null() {
        return Ok(O::default());
    }
    Ok(serde_json::from_value(value.clone())?)
}

pub struct ComponentRegistry {
    tree_filters: HashMap<String, TreeFilterFactory>,
    renderers: HashMap<String, RendererFactory>,
    text_filters: HashMap<String, TextFilterFactory>,
}

impl ComponentRegistry {
    /// Registry with all the built-in components
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register_tree_filter(BLOCK_LINEAR_FILTER_ID, |o| {
            Ok(Box::new(BlockLinearTextTreeFilter::new(options(o)?)))
        });
        registry.register_tree_filter(APP_LINEAR_FILTER_ID, |o| {
            Ok(Box::new(AppLinearTextTreeFilter::new(options(o)?)))
        });
        registry.register_tree_filter(APP_PARALLEL_FILTER_ID, |o| {
            Ok(Box::new(AppParallelTextTreeFilter::new(options(o)?)))
        });

        registry.register_renderer(TEI_LINEAR_RENDERER_ID, |o| {
            Ok(Box::new(TeiLinearTextTreeRenderer::new(options(o)?)))
        });
        registry.register_renderer(TEI_PARALLEL_RENDERER_ID, |o| {
            Ok(Box::new(TeiParallelTextTreeRenderer::new(options(o)?)))
        });
        registry.register_renderer(PLAIN_RENDERER_ID, |o| {
            Ok(Box::new(PlainTextTreeRenderer::with_options(options(o)?)))
        });
        registry.register_renderer(JSON_RENDERER_ID, |o| Ok(Box::new(JsonTextTreeRenderer::new(options(o)?))));

        registry.register_text_filter(SOURCE_ID_TEXT_FILTER_ID, |o| {
            Ok(Box::new(SourceIdTextFilter::new(options(o)?)?))
        });
        registry.register_text_filter(REPLACE_TEXT_FILTER_ID, |o| {
            Ok(Box::new(ReplaceTextFilter::new(options(o)?)?))
        });
        registry
    }

    /// Registry without any component
    pub fn empty() -> Self {
        Self {
            tree_filters: HashMap::new(),
            renderers: HashMap::new(),
            text_filters: HashMap::new(),
        }
    }

    pub fn register_tree_filter<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(&Value) -> Result<Box<dyn TextTreeFilter>> + Send + Sync + 'static,
    {
        self.tree_filters.insert(id.to_string(), Box::new(factory));
    }

    pub fn register_renderer<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(&Value) -> Result<Box<dyn TextTreeRenderer>> + Send + Sync + 'static,
    {
        self.renderers.insert(id.to_string(), Box::new(factory));
    }

    pub fn register_text_filter<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(&Value) -> Result<Box<dyn TextFilter>> + Send + Sync + 'static,
    {
        self.text_filters.insert(id.to_string(), Box::new(factory));
    }

    pub fn create_tree_filter(&self, spec: &ComponentSpec) -> Result<Box<dyn TextTreeFilter>> {
        let factory = self
            .tree_filters
            .get(&spec.id)
            .ok_or_else(|| ExportError::UnknownComponent(spec.id.clone()))?;
        factory(&spec.options)
    }

    pub fn create_renderer(&self, spec: &ComponentSpec) -> Result<Box<dyn TextTreeRenderer>> {
        let factory = self
            .renderers
            .get(&spec.id)
            .ok_or_else(|| ExportError::UnknownComponent(spec.id.clone()))?;
        factory(&spec.options)
    }

    pub fn create_text_filter(&self, spec: &ComponentSpec) -> Result<Box<dyn TextFilter>> {
        let factory = self
            .text_filters
            .get(&spec.id)
            .ok_or_else(|| ExportError::UnknownComponent(spec.id.clone()))?;
        factory(&spec.options)
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
