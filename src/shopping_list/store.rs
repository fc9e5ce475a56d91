//! In-memory item store
//!
//! Holds every item together with the listing order and the id counter.
//! All three live behind a single lock so that creating an item (bump the
//! counter, insert, prepend) and toggling its status are each atomic.

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::models::{Item, NewItem};

/// Errors raised by store lookups and mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("item {0} not found")]
    NotFound(String),
}

#[derive(Debug, Default)]
struct Inner {
    items: HashMap<String, Item>,
    /// Ids, newest first
    order: VecDeque<String>,
    next_id: u64,
}

/// The shopping list itself
#[derive(Debug, Default)]
pub struct Store {
    inner: RwLock<Inner>,
}

impl Store {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the two starter items, both stamped `added`:
    /// `"1"` "Buy Beer!" (open) and `"2"` "Buy Hairspray" (purchased).
    pub fn seeded(added: DateTime<Utc>) -> Self {
        let seeds = [("1", "Buy Beer!", false), ("2", "Buy Hairspray", true)];

        let mut inner = Inner::default();
        for (id, description, purchased) in seeds {
            inner.items.insert(
                id.to_string(),
                Item {
                    id: id.to_string(),
                    description: description.to_string(),
                    purchased,
                    added,
                },
            );
            inner.order.push_back(id.to_string());
        }
        inner.next_id = seeds.len() as u64;

        Self {
            inner: RwLock::new(inner),
        }
    }

    // Every mutation leaves `Inner` consistent before it can panic, so a
    // poisoned lock still guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns all items, newest first
    pub fn list(&self) -> Vec<Item> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.items.get(id).cloned())
            .collect()
    }

    /// Returns the item with the given id
    pub fn get(&self, id: &str) -> Result<Item, StoreError> {
        self.read()
            .items
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Inserts a new, unpurchased item under a fresh id and puts it at the
    /// head of the listing.
    pub fn create(&self, new_item: NewItem) -> Item {
        let mut inner = self.write();

        inner.next_id += 1;
        let id = inner.next_id.to_string();

        let item = Item {
            id: id.clone(),
            description: new_item.description,
            purchased: false,
            added: new_item.added,
        };

        inner.items.insert(id.clone(), item.clone());
        inner.order.push_front(id);

        item
    }

    /// Sets the purchased flag of an existing item and returns the result.
    /// Unknown ids are reported without touching the store.
    pub fn set_purchased(&self, id: &str, purchased: bool) -> Result<Item, StoreError> {
        let mut inner = self.write();
        let item = inner
            .items
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        item.purchased = purchased;
        Ok(item.clone())
    }

    /// Flags the item as bought
    pub fn mark_purchased(&self, id: &str) -> Result<Item, StoreError> {
        self.set_purchased(id, true)
    }

    /// Puts the item back on the list
    pub fn mark_unpurchased(&self, id: &str) -> Result<Item, StoreError> {
        self.set_purchased(id, false)
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    /// Whether the store holds no items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn new_item(description: &str) -> NewItem {
        NewItem {
            description: description.into(),
            added: at(12),
        }
    }

    #[test]
    fn seeded_store_lists_starter_items_in_order() {
        let store = Store::seeded(at(8));
        let items = store.list();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "1");
        assert_eq!(items[0].description, "Buy Beer!");
        assert!(!items[0].purchased);
        assert_eq!(items[1].id, "2");
        assert_eq!(items[1].description, "Buy Hairspray");
        assert!(items[1].purchased);
        assert!(items.iter().all(|i| i.added == at(8)));
    }

    #[test]
    fn create_assigns_fresh_ids_and_prepends() {
        let store = Store::seeded(at(8));

        let first = store.create(new_item("Buy milk"));
        let second = store.create(new_item("Buy bread"));

        assert_eq!(first.id, "3");
        assert_eq!(second.id, "4");
        assert!(!first.purchased);
        assert_eq!(first.added, at(12));

        let ids: Vec<_> = store.list().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["4", "3", "1", "2"]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn empty_store_starts_ids_at_one() {
        let store = Store::new();
        assert!(store.is_empty());

        let item = store.create(new_item("Eggs"));
        assert_eq!(item.id, "1");
        assert_eq!(store.get("1").unwrap(), item);
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = Store::seeded(at(8));
        assert_eq!(store.get("99"), Err(StoreError::NotFound("99".into())));
    }

    #[test]
    fn toggling_purchase_status_is_idempotent() {
        let store = Store::seeded(at(8));

        let once = store.mark_purchased("1").unwrap();
        let twice = store.mark_purchased("1").unwrap();
        assert!(once.purchased);
        assert_eq!(once, twice);

        let reverted = store.mark_unpurchased("2").unwrap();
        assert!(!reverted.purchased);
        assert!(!store.get("2").unwrap().purchased);
    }

    #[test]
    fn toggling_unknown_id_leaves_store_untouched() {
        let store = Store::seeded(at(8));
        let before = store.list();

        assert_eq!(
            store.set_purchased("42", true),
            Err(StoreError::NotFound("42".into()))
        );
        assert_eq!(store.list(), before);
    }

    #[test]
    fn concurrent_creates_never_share_an_id() {
        let store = Arc::new(Store::new());

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| store.create(new_item(&format!("Item {n}"))).id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .map(|id| id.parse().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 200);
        assert_eq!(store.list().len(), 200);
    }
}
