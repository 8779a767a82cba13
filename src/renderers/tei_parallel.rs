//! TEI parallel-segmentation renderer for merged version trees
//!
//! Text shared by all versions is written as is. Wherever the tree forks,
//! an `<app>` gets one `<rdg>` per branch, attributed to the versions
//! passing through it; nested forks are flattened into the same `<app>`.
//! Line ends become `<lb/>`.

use serde::Deserialize;

use crate::context::RendererContext;
use crate::error::Result;
use crate::tree::{NodeIx, TextTree};

use super::{split_tags, wit_resp_attributes, xml_escape, TextTreeRenderer};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeiParallelOptions {
    /// Element wrapping the whole output
    pub root_name: String,
}

impl Default for TeiParallelOptions {
    fn default() -> Self {
        Self {
            root_name: "p".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeiParallelTextTreeRenderer {
    options: TeiParallelOptions,
}

impl TeiParallelTextTreeRenderer {
    pub fn new(options: TeiParallelOptions) -> Self {
        Self { options }
    }

    /// Write the branch starting at `ix` down to its end
    fn render_branch(&self, tree: &TextTree, mut ix: NodeIx, xml: &mut String) {
        loop {
            if let Some(span) = tree.data(ix) {
                xml.push_str(&xml_escape(&span.text));
                if span.is_before_eol {
                    xml.push_str("<lb/>");
                }
            }
            match tree.children(ix) {
                [] => return,
                [only] if !is_fork(tree, *only) => ix = *only,
                _ => {
                    xml.push_str("<app>");
                    for head in branch_heads(tree, ix) {
                        let tags = tree.data(head).map(|span| span.tags.as_slice()).unwrap_or_default();
                        let (witnesses, authors) = split_tags(tags);
                        xml.push_str(&format!("<rdg{}>", wit_resp_attributes(&witnesses, &authors)));
                        self.render_branch(tree, head, xml);
                        xml.push_str("</rdg>");
                    }
                    xml.push_str("</app>");
                    return;
                }
            }
        }
    }
}

fn is_fork(tree: &TextTree, ix: NodeIx) -> bool {
    tree.node(ix).is_blank() && tree.children(ix).len() > 1
}

/// Payload nodes heading the branches below `ix`, looking through forks
fn branch_heads(tree: &TextTree, ix: NodeIx) -> Vec<NodeIx> {
    let mut heads = Vec::new();
    let mut stack: Vec<NodeIx> = tree.children(ix).iter().rev().copied().collect();
    while let Some(child) = stack.pop() {
        if tree.node(child).is_blank() {
            stack.extend(tree.children(child).iter().rev());
        } else {
            heads.push(child);
        }
    }
    heads
}

impl TextTreeRenderer for TeiParallelTextTreeRenderer {
    fn render(&self, tree: &TextTree, _context: &RendererContext) -> Result<String> {
        let name = &self.options.root_name;
        let mut xml = format!("<{}>", name);
        self.render_branch(tree, TextTree::ROOT, &mut xml);
        xml.push_str(&format!("</{}>", name));
        Ok(xml)
    }
}
