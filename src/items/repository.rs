//! In-memory item store.
//!
//! # Responsibilities
//! - Own the ordered list of items (insertion order is listing order)
//! - Assign fresh UUIDs on insert; never reuse or reassign them
//! - Look up, patch and remove items by id
//!
//! # Design Decisions
//! - A single `RwLock` guards the list; no guard is held across an await
//! - Callers only ever receive clones, never references into the list
//! - State lives for the process lifetime; nothing is persisted

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use uuid::Uuid;

use crate::items::model::{Item, ItemPatch, ItemQuality, ItemWithId};

/// Errors raised by the item store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Unable to find item with id {0}")]
    NotFound(String),
    #[error("Error updating item with id {0}")]
    UpdateFailed(String),
}

/// The in-memory item store.
#[derive(Debug, Default)]
pub struct ItemRepository {
    items: RwLock<Vec<ItemWithId>>,
}

impl ItemRepository {
    /// Create a store holding `items` in the given order.
    pub fn new(items: Vec<ItemWithId>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Create a store with the fixed sample data.
    pub fn seeded() -> Self {
        Self::new(seed_items())
    }

    // Poisoning is ignored: no mutation leaves the list half-written.
    fn read(&self) -> RwLockReadGuard<'_, Vec<ItemWithId>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<ItemWithId>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// All items in insertion order.
    pub fn list_all(&self) -> Vec<ItemWithId> {
        self.read().clone()
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// The item with the given id.
    pub fn get_by_id(&self, id: &str) -> Result<ItemWithId, RepositoryError> {
        self.read()
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    /// Append `item` under a fresh id and return the whole updated list.
    pub fn add(&self, item: Item) -> Vec<ItemWithId> {
        let mut items = self.write();

        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if !items.iter().any(|existing| existing.id == candidate) {
                break candidate;
            }
        };

        tracing::debug!(id = %id, name = %item.name, "Item added");
        items.push(ItemWithId { id, item });
        items.clone()
    }

    /// Overwrite the supplied fields of the item with the given id.
    pub fn update_by_id(&self, id: &str, patch: ItemPatch) -> Result<ItemWithId, RepositoryError> {
        let mut items = self.write();
        let entry = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| RepositoryError::UpdateFailed(id.to_string()))?;

        patch.apply_to(&mut entry.item);
        tracing::debug!(id = %id, "Item updated");
        Ok(entry.clone())
    }

    /// Remove the item with the given id, keeping the order of the rest.
    pub fn delete_by_id(&self, id: &str) -> Result<ItemWithId, RepositoryError> {
        let mut items = self.write();
        let index = items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        let removed = items.remove(index);
        tracing::debug!(id = %id, remaining = items.len(), "Item deleted");
        Ok(removed)
    }
}

/// Sample data the service starts with.
pub fn seed_items() -> Vec<ItemWithId> {
    vec![
        ItemWithId::new(
            "615a0e18-415c-41ba-9c51-3b403deec651",
            "bronze sword",
            ItemQuality::Common,
            10.0,
        ),
        ItemWithId::new(
            "bebaf5f9-2cbe-4c84-a472-4bd11dadec79",
            "Poseidon's Trident",
            ItemQuality::Legendary,
            1000.0,
        ),
        ItemWithId::new(
            "eb425a54-9966-4b70-a64b-8020e3ce5995",
            "greater health potion",
            ItemQuality::Uncommon,
            100.0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    const TRIDENT: &str = "bebaf5f9-2cbe-4c84-a472-4bd11dadec79";

    fn sword() -> Item {
        Item {
            name: "Cool Sword".into(),
            quality: ItemQuality::Uncommon,
            value: 150.0,
        }
    }

    #[test]
    fn test_seeded_listing_order() {
        let repo = ItemRepository::seeded();
        let names: Vec<_> = repo.list_all().into_iter().map(|i| i.item.name).collect();
        assert_eq!(names, vec!["bronze sword", "Poseidon's Trident", "greater health potion"]);
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let repo = ItemRepository::default();
        assert!(repo.list_all().is_empty());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_get_by_id() {
        let repo = ItemRepository::seeded();
        let item = repo.get_by_id(TRIDENT).unwrap();
        assert_eq!(item.item.name, "Poseidon's Trident");
        assert_eq!(item.item.quality, ItemQuality::Legendary);

        assert_eq!(
            repo.get_by_id("missing"),
            Err(RepositoryError::NotFound("missing".into()))
        );
    }

    #[test]
    fn test_add_appends_with_fresh_id() {
        let repo = ItemRepository::seeded();
        let items = repo.add(sword());

        assert_eq!(items.len(), 4);
        let added = items.last().unwrap();
        assert_eq!(added.item, sword());
        assert!(Uuid::parse_str(&added.id).is_ok());
        assert_eq!(repo.len(), 4);
    }

    #[test]
    fn test_ids_unique() {
        let repo = ItemRepository::default();
        for _ in 0..100 {
            repo.add(sword());
        }
        let ids: HashSet<_> = repo.list_all().into_iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_update_changes_only_supplied_fields() {
        let repo = ItemRepository::seeded();
        let updated = repo
            .update_by_id(
                TRIDENT,
                ItemPatch {
                    name: Some("Poseidon's Spear".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, TRIDENT);
        assert_eq!(updated.item.name, "Poseidon's Spear");
        assert_eq!(updated.item.quality, ItemQuality::Legendary);
        assert_eq!(updated.item.value, 1000.0);
        assert_eq!(repo.get_by_id(TRIDENT).unwrap(), updated);
    }

    #[test]
    fn test_update_applies_zero_value() {
        let repo = ItemRepository::seeded();
        let updated = repo
            .update_by_id(
                TRIDENT,
                ItemPatch {
                    value: Some(0.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.item.value, 0.0);
    }

    #[test]
    fn test_update_missing() {
        let repo = ItemRepository::seeded();
        assert_eq!(
            repo.update_by_id("missing", ItemPatch::default()),
            Err(RepositoryError::UpdateFailed("missing".into()))
        );
        assert_eq!(repo.list_all(), seed_items());
    }

    #[test]
    fn test_delete_preserves_order() {
        let repo = ItemRepository::seeded();
        let removed = repo.delete_by_id(TRIDENT).unwrap();
        assert_eq!(removed.item.name, "Poseidon's Trident");

        let ids: Vec<_> = repo.list_all().into_iter().map(|i| i.id).collect();
        assert_eq!(
            ids,
            vec![
                "615a0e18-415c-41ba-9c51-3b403deec651",
                "eb425a54-9966-4b70-a64b-8020e3ce5995",
            ]
        );
        assert_eq!(
            repo.delete_by_id(TRIDENT),
            Err(RepositoryError::NotFound(TRIDENT.into()))
        );
    }

    #[test]
    fn test_concurrent_adds() {
        let repo = Arc::new(ItemRepository::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        repo.add(sword());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(repo.len(), 200);
    }
}
