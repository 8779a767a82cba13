//! Flattened text and fragment ranges
//!
//! ## Modules
//!
//! - `flattener`: base text + layers -> flat string and raw ranges
//! - `range`: `TextRange`, range merging and text assignment
//! - `labels`: visible glyphs for control characters in node labels

pub mod flattener;
pub mod labels;
pub mod range;

// Re-exports for convenience
pub use flattener::{TokenTextFlattener, DEFAULT_LINE_SEPARATOR};
pub use labels::map_non_printables;
pub use range::{assign_text, merge_ranges, TextRange};
