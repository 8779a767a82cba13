//! Rendering context
//!
//! Carries per-session state across filters and renderers: a string
//! metadata dictionary, the id map used for short output ids and the item
//! being composed. The composer resets it before each item.

pub mod id_map;

use std::collections::BTreeMap;

pub use id_map::IdMap;

use crate::models::Item;

/// Context data key holding the current item id
pub const ITEM_ID_KEY: &str = "item-id";
/// Context data key holding the current item title
pub const ITEM_TITLE_KEY: &str = "item-title";

#[derive(Debug, Default)]
pub struct RendererContext {
    pub data: BTreeMap<String, String>,
    pub id_map: IdMap,
    item: Option<Item>,
}

impl RendererContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a single item, as the composer would prepare it
    pub fn for_item(item: &Item) -> Self {
        let mut context = Self::new();
        context.set_item(item);
        context
    }

    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    /// Make `item` current and publish its id and title
    pub fn set_item(&mut self, item: &Item) {
        self.data.insert(ITEM_ID_KEY.to_string(), item.id.clone());
        self.data.insert(ITEM_TITLE_KEY.to_string(), item.title.clone());
        self.item = Some(item.clone());
    }

    /// Clear data, ids and current item
    pub fn reset(&mut self) {
        self.data.clear();
        self.id_map.reset(None);
        self.item = None;
    }

    pub fn map_source_id(&self, prefix: &str, key: &str) -> u32 {
        self.id_map.map_source_id(prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_everything() {
        let mut context = RendererContext::for_item(&Item::new("i1", "Title"));
        context.map_source_id("seg", "x");
        assert_eq!(context.data.get(ITEM_ID_KEY).map(String::as_str), Some("i1"));
        assert!(context.item().is_some());

        context.reset();
        assert!(context.data.is_empty());
        assert!(context.item().is_none());
        assert_eq!(context.id_map.count(), 0);
    }
}
