//! JSON renderer
//!
//! Serializes every node but the root as a flat list, depth-first, for
//! front-end components that rebuild the tree from parent ids.

use serde::{Deserialize, Serialize};

use crate::context::RendererContext;
use crate::error::Result;
use crate::tree::{TextSpan, TextTree};

use super::TextTreeRenderer;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonRendererOptions {
    pub pretty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonNode<'a> {
    id: u32,
    parent_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(flatten)]
    span: Option<&'a TextSpan>,
}

#[derive(Serialize)]
struct JsonTree<'a> {
    nodes: Vec<JsonNode<'a>>,
}

#[derive(Debug, Clone, Default)]
pub struct JsonTextTreeRenderer {
    options: JsonRendererOptions,
}

impl JsonTextTreeRenderer {
    pub fn new(options: JsonRendererOptions) -> Self {
        Self { options }
    }
}

impl TextTreeRenderer for JsonTextTreeRenderer {
    fn render(&self, tree: &TextTree, _context: &RendererContext) -> Result<String> {
        let nodes = tree
            .depth_first()
            .into_iter()
            .filter_map(|ix| {
                let parent = tree.parent(ix)?;
                let node = tree.node(ix);
                Some(JsonNode {
                    id: node.id,
                    parent_id: tree.node(parent).id,
                    label: node.label.as_deref(),
                    span: node.data.as_ref(),
                })
            })
            .collect();

        let json = JsonTree { nodes };
        let text = if self.options.pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        Ok(text)
    }
}
