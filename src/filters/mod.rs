//! Text tree filters
//!
//! Filters run in sequence between building the linear tree and rendering
//! it. Each one takes the tree by value and returns the transformed tree.

pub mod app_linear;
pub mod app_parallel;
pub mod block;

pub use app_linear::{AppFilterOptions, AppLinearTextTreeFilter};
pub use app_parallel::{AppParallelFilterOptions, AppParallelTextTreeFilter};
pub use block::{BlockFilterOptions, BlockLinearTextTreeFilter};

use crate::context::RendererContext;
use crate::error::Result;
use crate::tree::TextTree;

/// Apparatus entry variant text
pub const FEATURE_VARIANT: &str = "variant";
pub const FEATURE_WITNESS: &str = "witness";
pub const FEATURE_WITNESS_NOTE: &str = "witness-note";
pub const FEATURE_AUTHOR: &str = "author";
pub const FEATURE_AUTHOR_NOTE: &str = "author-note";
/// Apparatus entry note
pub const FEATURE_NOTE: &str = "note";

pub trait TextTreeFilter: Send + Sync {
    fn apply(&self, tree: TextTree, context: &RendererContext) -> Result<TextTree>;
}
