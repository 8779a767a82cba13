//! Arena-backed tree of payload nodes
//!
//! Nodes live in a single vector owned by the [`Tree`] and refer to each
//! other by index. A parent exclusively owns its children; the parent index
//! stored in each node is a back-reference used only for upward walks.
//! Nodes unlinked from the root stay in the arena but are never visited.

/// Index of a node inside its tree's arena
pub type NodeIx = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    /// Opaque node id; 0 means "not yet assigned"
    pub id: u32,
    /// Diagnostic label
    pub label: Option<String>,
    /// Payload; `None` for the root and for synthetic fork nodes
    pub data: Option<T>,
    parent: Option<NodeIx>,
    children: Vec<NodeIx>,
}

impl<T> TreeNode<T> {
    fn new(id: u32, label: Option<String>, data: Option<T>) -> Self {
        Self {
            id,
            label,
            data,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeIx> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIx] {
        &self.children
    }

    /// True for nodes without payload (root and forks)
    pub fn is_blank(&self) -> bool {
        self.data.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Tree<T> {
    nodes: Vec<TreeNode<T>>,
}

impl<T> Tree<T> {
    pub const ROOT: NodeIx = 0;

    /// A tree with just its blank root (id 0)
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode::new(0, None, None)],
        }
    }

    /// Build a single-branch tree from `(id, label, payload)` triples
    pub fn linear<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (u32, Option<String>, T)>,
    {
        let mut tree = Self::new();
        let mut last = Self::ROOT;
        for (id, label, data) in nodes {
            last = tree.add_child(last, id, label, Some(data));
        }
        tree
    }

    pub fn root(&self) -> &TreeNode<T> {
        &self.nodes[Self::ROOT]
    }

    pub fn get(&self, ix: NodeIx) -> Option<&TreeNode<T>> {
        self.nodes.get(ix)
    }

    /// Node at `ix`; indexes come from this tree, so a bad one is a bug
    pub fn node(&self, ix: NodeIx) -> &TreeNode<T> {
        &self.nodes[ix]
    }

    pub fn node_mut(&mut self, ix: NodeIx) -> &mut TreeNode<T> {
        &mut self.nodes[ix]
    }

    pub fn data(&self, ix: NodeIx) -> Option<&T> {
        self.nodes[ix].data.as_ref()
    }

    pub fn data_mut(&mut self, ix: NodeIx) -> Option<&mut T> {
        self.nodes[ix].data.as_mut()
    }

    pub fn children(&self, ix: NodeIx) -> &[NodeIx] {
        &self.nodes[ix].children
    }

    pub fn parent(&self, ix: NodeIx) -> Option<NodeIx> {
        self.nodes[ix].parent
    }

    /// Create a node not yet linked to any parent
    pub fn add_detached(&mut self, id: u32, label: Option<String>, data: Option<T>) -> NodeIx {
        self.nodes.push(TreeNode::new(id, label, data));
        self.nodes.len() - 1
    }

    /// Append a new node as last child of `parent`
    pub fn add_child(&mut self, parent: NodeIx, id: u32, label: Option<String>, data: Option<T>) -> NodeIx {
        let ix = self.add_detached(id, label, data);
        self.nodes[ix].parent = Some(parent);
        self.nodes[parent].children.push(ix);
        ix
    }

    /// Append an existing node as last child of `parent`, unlinking it from
    /// its previous parent
    pub fn append_child(&mut self, parent: NodeIx, child: NodeIx) {
        if let Some(old) = self.nodes[child].parent {
            self.nodes[old].children.retain(|&c| c != child);
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Unlink and return all children of `ix`
    pub fn take_children(&mut self, ix: NodeIx) -> Vec<NodeIx> {
        let children = std::mem::take(&mut self.nodes[ix].children);
        for &child in &children {
            self.nodes[child].parent = None;
        }
        children
    }

    /// Replace the children of `parent`, moving each new child away from its
    /// previous parent.
    pub fn set_children(&mut self, parent: NodeIx, children: Vec<NodeIx>) {
        self.take_children(parent);
        for &child in &children {
            if let Some(old) = self.nodes[child].parent {
                self.nodes[old].children.retain(|&c| c != child);
            }
            self.nodes[child].parent = Some(parent);
        }
        self.nodes[parent].children = children;
    }

    /// `ix` followed by its ancestors up to the root
    pub fn self_and_ancestors(&self, ix: NodeIx) -> impl Iterator<Item = NodeIx> + '_ {
        std::iter::successors(Some(ix), move |&n| self.nodes[n].parent)
    }

    /// All nodes reachable from the root, depth-first pre-order, root first
    pub fn depth_first(&self) -> Vec<NodeIx> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(ix) = stack.pop() {
            order.push(ix);
            stack.extend(self.nodes[ix].children.iter().rev());
        }
        order
    }

    /// Nodes along the first-child path below the root
    pub fn chain(&self) -> Vec<NodeIx> {
        std::iter::successors(self.nodes[Self::ROOT].children.first().copied(), |&ix| {
            self.nodes[ix].children.first().copied()
        })
        .collect()
    }

    /// True when no reachable node has more than one child
    pub fn is_linear(&self) -> bool {
        self.depth_first().iter().all(|&ix| self.nodes[ix].children.len() <= 1)
    }

    /// Number of nodes reachable from the root, root included
    pub fn node_count(&self) -> usize {
        self.depth_first().len()
    }

    pub fn max_id(&self) -> u32 {
        self.depth_first().iter().map(|&ix| self.nodes[ix].id).max().unwrap_or(0)
    }

    /// Payloads along the chain below the root
    pub fn chain_data(&self) -> Vec<&T> {
        self.chain().into_iter().filter_map(|ix| self.nodes[ix].data.as_ref()).collect()
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}
