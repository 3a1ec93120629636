//! Item catalogs keyed by natural identity
//!
//! Applications, inputs and schedules are listed by the device in bulk. A
//! [`Catalog`] keeps the latest listing so lookups by key do not touch the
//! network. [`Catalog::refresh`] replaces the contents wholesale: entries
//! missing from the new listing are evicted.

use std::collections::HashMap;

use bravia_api::operations::app_control::Application;
use bravia_api::operations::av_content::ExternalInput;
use bravia_api::operations::recording::ScheduleItem;

/// An item with a stable identity across listings
pub trait CatalogItem {
    fn key(&self) -> &str;
}

impl CatalogItem for Application {
    fn key(&self) -> &str {
        &self.uri
    }
}

impl CatalogItem for ExternalInput {
    fn key(&self) -> &str {
        &self.uri
    }
}

impl CatalogItem for ScheduleItem {
    fn key(&self) -> &str {
        &self.id
    }
}

/// What a refresh changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogUpdate {
    pub added: Vec<String>,
    pub evicted: Vec<String>,
}

/// Items in listing order with an index by key
#[derive(Debug, Clone)]
pub struct Catalog<T: CatalogItem> {
    items: Vec<T>,
    index: HashMap<String, usize>,
    loaded: bool,
}

impl<T: CatalogItem> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            loaded: false,
        }
    }
}

impl<T: CatalogItem> Catalog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `items`
    ///
    /// When the listing repeats a key, the first occurrence wins.
    pub fn refresh(&mut self, items: Vec<T>) -> CatalogUpdate {
        let mut next_items = Vec::with_capacity(items.len());
        let mut next_index = HashMap::with_capacity(items.len());
        for item in items {
            if next_index.contains_key(item.key()) {
                continue;
            }
            next_index.insert(item.key().to_string(), next_items.len());
            next_items.push(item);
        }

        let added = next_items
            .iter()
            .map(|item| item.key())
            .filter(|key| !self.index.contains_key(*key))
            .map(str::to_string)
            .collect();
        let evicted = self
            .items
            .iter()
            .map(|item| item.key())
            .filter(|key| !next_index.contains_key(*key))
            .map(str::to_string)
            .collect();

        self.items = next_items;
        self.index = next_index;
        self.loaded = true;

        CatalogUpdate { added, evicted }
    }

    /// Drop everything; the next access should refresh
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
        self.loaded = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| predicate(item))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(title: &str, uri: &str) -> Application {
        Application {
            title: title.to_string(),
            uri: uri.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_refresh_indexes_by_uri() {
        let mut catalog = Catalog::new();
        assert!(!catalog.is_loaded());

        let update = catalog.refresh(vec![app("Netflix", "app:netflix"), app("YouTube", "app:youtube")]);

        assert!(catalog.is_loaded());
        assert_eq!(update.added, vec!["app:netflix", "app:youtube"]);
        assert!(update.evicted.is_empty());
        assert_eq!(catalog.get("app:youtube").map(|a| a.title.as_str()), Some("YouTube"));
    }

    #[test]
    fn test_refresh_evicts_missing_entries() {
        let mut catalog = Catalog::new();
        catalog.refresh(vec![app("Netflix", "app:netflix"), app("YouTube", "app:youtube")]);

        let update = catalog.refresh(vec![app("YouTube (new)", "app:youtube"), app("Prime", "app:prime")]);

        assert_eq!(update.added, vec!["app:prime"]);
        assert_eq!(update.evicted, vec!["app:netflix"]);
        assert!(catalog.get("app:netflix").is_none());
        assert_eq!(catalog.get("app:youtube").unwrap().title, "YouTube (new)");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_duplicate_keys_keep_first() {
        let mut catalog = Catalog::new();
        catalog.refresh(vec![app("A", "app:x"), app("B", "app:x")]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("app:x").unwrap().title, "A");
    }

    #[test]
    fn test_schedules_key_by_id() {
        let mut catalog = Catalog::new();
        catalog.refresh(vec![ScheduleItem {
            id: "42".to_string(),
            title: "Film".to_string(),
            ..Default::default()
        }]);
        assert!(catalog.get("42").is_some());
        assert!(catalog.find(|s| s.title == "Film").is_some());

        catalog.clear();
        assert!(catalog.is_empty());
        assert!(!catalog.is_loaded());
    }
}
