//! Cadmus Text Export
//!
//! Exports the base text of a Cadmus item together with its layers
//! (critical apparatus, comments) as TEI, plain text or JSON. The base text
//! is flattened, fragment locations become merged character ranges, and
//! the ranges become a tree of text spans that filters annotate or fold
//! into a branching tree of textual versions before rendering.

pub mod composer;
pub mod config;
pub mod context;
pub mod error;
pub mod filters;
pub mod models;
pub mod registry;
pub mod renderers;
pub mod text;
pub mod tree;

// Re-export commonly used types
pub use composer::{ComposedItem, ItemComposer};
pub use config::{ComponentSpec, PipelineConfig};
pub use context::{IdMap, RendererContext};
pub use error::{ExportError, Result};
pub use registry::ComponentRegistry;
pub use tree::{TextSpan, TextTree, Tree, TreeMerger};
