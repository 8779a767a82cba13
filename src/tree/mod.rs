//! Text trees
//!
//! The merged ranges of an item become a linear tree of [`TextSpan`]
//! nodes, which filters then split, annotate or merge into branching
//! version trees before rendering.
//!
//! # Modules
//!
//! - **node**: arena tree with parent back-references
//! - **span**: the span payload with features and version tags
//! - **builder**: ranges -> linear tree
//! - **merger**: version trees -> one branching tree

pub mod builder;
pub mod merger;
pub mod node;
pub mod span;

pub use builder::LinearTreeBuilder;
pub use merger::{TreeMerger, VersionPayload};
pub use node::{NodeIx, Tree, TreeNode};
pub use span::{Feature, FeatureSet, TextSpan};

/// Tree of text spans, the structure all filters and renderers work on
pub type TextTree = Tree<TextSpan>;
