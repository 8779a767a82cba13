//! Version tree merger
//!
//! Folds several linear "version" trees (one per witness or author tag)
//! into one tree. Versions share the longest common prefix already in the
//! merged tree and fork where they diverge. In binary mode no node gets
//! more than two children: blank fork nodes are inserted to keep the
//! fan-out bounded.
//!
//! Every payload node carries the tags of all versions passing through it.
//! Tags only propagate upward (to payload ancestors), so an ancestor's tag
//! set always includes its descendants' tags.

use std::collections::HashSet;

use crate::error::Result;

use super::node::{NodeIx, Tree};
use super::span::TextSpan;

/// Payload operations needed to merge versions
pub trait VersionPayload: Clone {
    /// True when two payloads carry the same reading and can be shared
    fn is_same_reading(&self, other: &Self) -> bool;

    fn add_tag(&mut self, tag: &str);
}

impl VersionPayload for TextSpan {
    fn is_same_reading(&self, other: &Self) -> bool {
        self.text == other.text
    }

    fn add_tag(&mut self, tag: &str) {
        TextSpan::add_tag(self, tag);
    }
}

#[derive(Debug, Clone)]
pub struct TreeMerger {
    binary: bool,
}

impl TreeMerger {
    /// Merger bounding fan-out to two children per node
    pub fn new() -> Self {
        Self { binary: true }
    }

    /// With `binary` off, diverging versions are appended as further
    /// children of the divergence node
    pub fn with_binary(binary: bool) -> Self {
        Self { binary }
    }

    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Merge the versions resolved for each of `tags`, in order.
    ///
    /// Node ids coming from the versions are kept the first time they are
    /// seen; nodes without id (forks, rewritten spans, repeated ids) are
    /// numbered depth-first after the highest id of `base`.
    pub fn merge<T, F>(&self, base: &Tree<T>, tags: &[String], mut resolve: F) -> Result<Tree<T>>
    where
        T: VersionPayload,
        F: FnMut(&str) -> Result<Tree<T>>,
    {
        let base_len = base.chain().len();
        let mut merged = Tree::new();
        let mut used_ids = HashSet::new();

        for tag in tags {
            let version = resolve(tag)?;
            let version_len = version.chain().len();
            if version_len != base_len {
                log::warn!(
                    "Version {} has {} nodes while base has {}; merging the matching prefix",
                    tag,
                    version_len,
                    base_len
                );
            }
            self.merge_version(&mut merged, &mut used_ids, tag, &version);
        }

        assign_ids(&mut merged, base.max_id());
        Ok(merged)
    }

    fn merge_version<T: VersionPayload>(
        &self,
        merged: &mut Tree<T>,
        used_ids: &mut HashSet<u32>,
        tag: &str,
        version: &Tree<T>,
    ) {
        let sequence: Vec<NodeIx> = version
            .chain()
            .into_iter()
            .filter(|&ix| !version.node(ix).is_blank())
            .collect();
        let payloads: Vec<&T> = sequence.iter().filter_map(|&ix| version.data(ix)).collect();

        let (matched, end) = longest_prefix(merged, &payloads);
        let path: Vec<NodeIx> = merged.self_and_ancestors(end).collect();
        for ix in path {
            if let Some(data) = merged.data_mut(ix) {
                data.add_tag(tag);
            }
        }

        log::debug!("Version {} shares {} of {} nodes", tag, matched, payloads.len());
        if matched == payloads.len() {
            return;
        }

        // the unmatched suffix becomes a new detached chain
        let mut head = None;
        let mut last = None;
        for &ix in &sequence[matched..] {
            let node = version.node(ix);
            let id = if node.id != 0 && used_ids.insert(node.id) {
                node.id
            } else {
                0
            };
            let mut data = node.data.clone();
            if let Some(data) = data.as_mut() {
                data.add_tag(tag);
            }
            let new_ix = match last {
                Some(parent) => merged.add_child(parent, id, node.label.clone(), data),
                None => merged.add_detached(id, node.label.clone(), data),
            };
            head.get_or_insert(new_ix);
            last = Some(new_ix);
        }

        if let Some(head) = head {
            self.attach(merged, end, head);
        }
    }

    /// Attach the chain starting at `head` below the divergence node `at`
    fn attach<T>(&self, tree: &mut Tree<T>, at: NodeIx, head: NodeIx) {
        let children = tree.children(at).to_vec();
        if !self.binary {
            tree.append_child(at, head);
            return;
        }

        match children.as_slice() {
            [] => tree.append_child(at, head),
            [only] if tree.node(*only).is_blank() && tree.children(*only).len() < 2 => {
                tree.append_child(*only, head);
            }
            _ => {
                // wrap what is there (a payload child, a full fork, or
                // several children) under a new fork sitting beside the chain
                let fork = tree.add_detached(0, None, None);
                if let [only] = children.as_slice() {
                    tree.set_children(at, vec![fork]);
                    tree.set_children(fork, vec![*only, head]);
                } else {
                    tree.set_children(fork, children);
                    tree.set_children(at, vec![fork, head]);
                }
            }
        }
    }
}

impl Default for TreeMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// Deepest node matching a prefix of `sequence`, walking from the root.
///
/// Blank fork nodes are transparent: every branch below them is tried and
/// the longest match wins; among equal matches the first branch wins.
fn longest_prefix<T: VersionPayload>(tree: &Tree<T>, sequence: &[&T]) -> (usize, NodeIx) {
    let mut best = (0, Tree::<T>::ROOT);
    let mut stack = vec![(Tree::<T>::ROOT, 0)];

    while let Some((ix, depth)) = stack.pop() {
        if depth > best.0 {
            best = (depth, ix);
        }
        for &child in tree.children(ix).iter().rev() {
            match tree.data(child) {
                None => stack.push((child, depth)),
                Some(data) if depth < sequence.len() && data.is_same_reading(sequence[depth]) => {
                    stack.push((child, depth + 1));
                }
                Some(_) => {}
            }
        }
    }
    best
}

/// Give ids to the nodes still lacking one, depth-first
fn assign_ids<T>(tree: &mut Tree<T>, seed: u32) {
    let mut next = seed.max(tree.max_id()) + 1;
    for ix in tree.depth_first() {
        if ix != Tree::<T>::ROOT && tree.node(ix).id == 0 {
            tree.node_mut(ix).id = next;
            next += 1;
        }
    }
}
