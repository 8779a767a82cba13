//! Item and layer models consumed by the export pipeline
//!
//! These are the collaborators the pipeline reads from: an item with its
//! base text part and layer parts, the fragments in each layer and the
//! token-based locations anchoring them.

pub mod apparatus;
pub mod comment;
pub mod item;
pub mod location;

// Re-export commonly used types
pub use apparatus::{
    AnnotatedValue, ApparatusEntry, ApparatusEntryType, ApparatusFragment, AUTHOR_TAG_PREFIX,
    WITNESS_TAG_PREFIX,
};
pub use comment::CommentFragment;
pub use item::{
    parse_fragment_id, Fragment, Item, Part, PartContent, TextLayerPart, TextLine, TokenTextPart,
    APPARATUS_ROLE_ID, BASE_TEXT_ROLE_ID, COMMENT_ROLE_ID, FRAGMENT_ROLE_PREFIX,
    TOKEN_TEXT_LAYER_PART_TYPE_ID, TOKEN_TEXT_PART_TYPE_ID,
};
pub use location::{TokenTextLocation, TokenTextPoint};
