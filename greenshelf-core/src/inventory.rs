//! In-memory inventory: reference catalog, batch records and shelf layout.
//!
//! Each batch sits behind its own `Mutex`, so a reading ingest (read,
//! append, recompute) is atomic per batch while different batches update
//! concurrently. The id and shelf indexes are behind `RwLock`s that are
//! only held long enough to clone handles out. Lock order is always
//! batches index, then shelves index, then a single batch.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::batch::Batch;
use crate::error::{CoreError, CoreResult};
use crate::profile::{Catalog, PricingProfile, ProductProfile};

/// Shared, lockable batch record.
pub type BatchHandle = Arc<Mutex<Batch>>;

/// Lock a batch, recovering the data if a previous holder panicked.
pub fn lock_batch(handle: &BatchHandle) -> MutexGuard<'_, Batch> {
    handle.lock().unwrap_or_else(|poisoned| {
        log::warn!("Batch lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        log::warn!("Inventory read lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        log::warn!("Inventory write lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

pub struct InventoryStore {
    catalog: Catalog,
    batches: RwLock<HashMap<String, BatchHandle>>,
    /// shelf id -> batch ids in receiving order
    shelves: RwLock<BTreeMap<String, Vec<String>>>,
}

impl InventoryStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            batches: RwLock::new(HashMap::new()),
            shelves: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn product_profile(&self, sku: &str) -> Option<&ProductProfile> {
        self.catalog.product(sku)
    }

    pub fn pricing_profile(&self, sku: &str) -> Option<&PricingProfile> {
        self.catalog.pricing(sku)
    }

    /// Register a batch and append it to its shelf.
    pub fn insert(&self, batch: Batch) -> CoreResult<BatchHandle> {
        let mut batches = write(&self.batches);
        if batches.contains_key(&batch.instance_id) {
            return Err(CoreError::DuplicateBatch(batch.instance_id));
        }
        let id = batch.instance_id.clone();
        let shelf_id = batch.shelf_id.clone();
        let handle: BatchHandle = Arc::new(Mutex::new(batch));
        batches.insert(id.clone(), Arc::clone(&handle));

        write(&self.shelves).entry(shelf_id).or_default().push(id);
        Ok(handle)
    }

    /// Declare a shelf that may stay empty.
    pub fn add_shelf(&self, shelf_id: &str) {
        write(&self.shelves).entry(shelf_id.to_string()).or_default();
    }

    pub fn get_batch(&self, batch_id: &str) -> CoreResult<BatchHandle> {
        read(&self.batches)
            .get(batch_id)
            .cloned()
            .ok_or_else(|| CoreError::UnknownBatch(batch_id.to_string()))
    }

    /// Point-in-time copy of a batch.
    pub fn snapshot(&self, batch_id: &str) -> CoreResult<Batch> {
        let handle = self.get_batch(batch_id)?;
        let batch = lock_batch(&handle).clone();
        Ok(batch)
    }

    /// Batch ids on a shelf in receiving order.
    pub fn shelf_batch_ids(&self, shelf_id: &str) -> CoreResult<Vec<String>> {
        read(&self.shelves)
            .get(shelf_id)
            .cloned()
            .ok_or_else(|| CoreError::UnknownShelf(shelf_id.to_string()))
    }

    /// Handles for every batch on a shelf in receiving order.
    pub fn shelf_batches(&self, shelf_id: &str) -> CoreResult<Vec<BatchHandle>> {
        let ids = self.shelf_batch_ids(shelf_id)?;
        let batches = read(&self.batches);
        Ok(ids.iter().filter_map(|id| batches.get(id).cloned()).collect())
    }

    /// All shelf ids, sorted.
    pub fn shelf_ids(&self) -> Vec<String> {
        read(&self.shelves).keys().cloned().collect()
    }

    pub fn batch_count(&self) -> usize {
        read(&self.batches).len()
    }

    /// Drop every batch and shelf. The catalog is kept.
    pub fn reset(&self) {
        let mut batches = write(&self.batches);
        let mut shelves = write(&self.shelves);
        batches.clear();
        shelves.clear();
        log::info!("inventory reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{NewBatch, SensorReading};
    use crate::profile::demo_catalog;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn batch(id: &str, shelf: &str) -> Batch {
        Batch::received(
            NewBatch {
                instance_id: id.into(),
                sku: "SKU_DAIRY_MILK1G".into(),
                shelf_id: shelf.into(),
                received_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                printed_expiry_date: NaiveDate::from_ymd_opt(2025, 6, 13).unwrap(),
                quantity: 6,
                initial_reading: SensorReading::new(
                    Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap(),
                    3.5,
                    None,
                ),
                original_price: None,
            },
            "Whole Milk (1 Gallon)",
        )
    }

    #[test]
    fn shelf_preserves_receiving_order() {
        let store = InventoryStore::new(demo_catalog());
        for id in ["c", "a", "b"] {
            store.insert(batch(id, "ShelfA1_Dairy")).unwrap();
        }
        assert_eq!(store.shelf_batch_ids("ShelfA1_Dairy").unwrap(), vec!["c", "a", "b"]);
        let handles = store.shelf_batches("ShelfA1_Dairy").unwrap();
        assert_eq!(lock_batch(&handles[0]).instance_id, "c");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let store = InventoryStore::new(demo_catalog());
        store.insert(batch("x", "S1")).unwrap();
        let err = store.insert(batch("x", "S2")).unwrap_err();
        assert_eq!(err, CoreError::DuplicateBatch("x".into()));
        assert_eq!(store.shelf_ids(), vec!["S1"]);
    }

    #[test]
    fn lookups_miss_with_not_found() {
        let store = InventoryStore::new(demo_catalog());
        assert!(store.get_batch("nope").unwrap_err().is_not_found());
        assert!(store.shelf_batch_ids("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn empty_shelves_can_be_declared() {
        let store = InventoryStore::new(demo_catalog());
        store.add_shelf("Empty");
        assert!(store.shelf_batch_ids("Empty").unwrap().is_empty());
    }

    #[test]
    fn reset_clears_batches_but_keeps_catalog() {
        let store = InventoryStore::new(demo_catalog());
        store.insert(batch("x", "S1")).unwrap();
        store.reset();
        assert_eq!(store.batch_count(), 0);
        assert!(store.shelf_ids().is_empty());
        assert!(store.product_profile("SKU_DAIRY_MILK1G").is_some());
        store.insert(batch("x", "S1")).unwrap();
    }

    #[test]
    fn handles_are_shared() {
        let store = InventoryStore::new(demo_catalog());
        let handle = store.insert(batch("x", "S1")).unwrap();
        lock_batch(&handle).quantity = 2;
        assert_eq!(store.snapshot("x").unwrap().quantity, 2);
    }
}
