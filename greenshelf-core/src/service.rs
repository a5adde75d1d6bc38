//! `GreenShelfService`: the operations the rest of the system calls.
//!
//! Wires the inventory store to the spoilage estimator and the pricing
//! engine, with the clock, sensor feed and demand signal injected.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::batch::{Batch, BatchSummary, NewBatch, SensorReading};
use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, CoreResult};
use crate::feed::{DemandSource, ReadingSource, SimulatedSensorFeed, StatusDemandModel};
use crate::inventory::{lock_batch, BatchHandle, InventoryStore};
use crate::pricing::{self, DiscountResult, PricingRules};
use crate::spoilage;
use crate::status::{worst_status, StatusColor};

const UNKNOWN_PRODUCT: &str = "Unknown Product";

pub struct GreenShelfService {
    store: Arc<InventoryStore>,
    clock: Arc<dyn Clock>,
    sensors: Arc<dyn ReadingSource>,
    demand: Arc<dyn DemandSource>,
    rules: PricingRules,
}

impl GreenShelfService {
    /// Service over `store` with the system clock, an unseeded sensor
    /// simulator, the status demand model and the default tier table.
    pub fn new(store: Arc<InventoryStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            sensors: Arc::new(SimulatedSensorFeed::from_entropy()),
            demand: Arc::new(StatusDemandModel::from_entropy()),
            rules: PricingRules::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sensor_feed(mut self, sensors: Arc<dyn ReadingSource>) -> Self {
        self.sensors = sensors;
        self
    }

    pub fn with_demand_source(mut self, demand: Arc<dyn DemandSource>) -> Self {
        self.demand = demand;
        self
    }

    pub fn with_rules(mut self, rules: PricingRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.store
    }

    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Receive a batch onto its shelf and compute its first prediction.
    pub fn receive_batch(&self, new: NewBatch) -> CoreResult<BatchSummary> {
        if new.printed_expiry_date < new.received_date {
            return Err(CoreError::InvalidBatch {
                id: new.instance_id,
                reason: format!(
                    "printed expiry {} is before received date {}",
                    new.printed_expiry_date, new.received_date
                ),
            });
        }

        let profile = self.store.product_profile(&new.sku);
        let name = profile.map(|p| p.name.as_str()).unwrap_or(UNKNOWN_PRODUCT);
        let mut batch = Batch::received(new, name);
        spoilage::refresh(&mut batch, profile, self.today());
        let summary = batch.summary();

        log::info!(
            "received batch={} sku={} shelf={} qty={} status={}",
            batch.instance_id,
            batch.sku,
            batch.shelf_id,
            batch.quantity,
            batch.status
        );
        self.store.insert(batch)?;
        Ok(summary)
    }

    /// Record a reading for a batch and recompute its status.
    pub fn ingest_reading(&self, batch_id: &str, reading: SensorReading) -> CoreResult<BatchSummary> {
        let handle = self.store.get_batch(batch_id)?;
        let mut batch = lock_batch(&handle);
        let profile = self.store.product_profile(&batch.sku);
        Ok(spoilage::ingest_reading(&mut batch, reading, profile, self.today()))
    }

    /// Pull the next reading from the sensor feed and ingest it. When the
    /// feed has nothing, the batch is still re-evaluated against today.
    pub fn simulate_reading(&self, batch_id: &str) -> CoreResult<BatchSummary> {
        let handle = self.store.get_batch(batch_id)?;
        Ok(self.simulate_locked(&handle))
    }

    fn simulate_locked(&self, handle: &BatchHandle) -> BatchSummary {
        let mut batch = lock_batch(handle);
        let profile = self.store.product_profile(&batch.sku);
        let today = self.today();
        match self.sensors.next_reading(&batch, profile, self.clock.now()) {
            Some(reading) => spoilage::ingest_reading(&mut batch, reading, profile, today),
            None => {
                spoilage::refresh(&mut batch, profile, today);
                batch.summary()
            }
        }
    }

    /// Simulate one reading for every batch on a shelf.
    pub fn refresh_shelf(&self, shelf_id: &str) -> CoreResult<Vec<BatchSummary>> {
        let handles = self.store.shelf_batches(shelf_id)?;
        Ok(handles.iter().map(|h| self.simulate_locked(h)).collect())
    }

    /// Price one batch and record the price on it.
    pub fn price_batch(&self, batch_id: &str, demand_factor: Option<f64>) -> CoreResult<DiscountResult> {
        let handle = self.store.get_batch(batch_id)?;
        let mut batch = lock_batch(&handle);
        Ok(self.price_with(&mut batch, demand_factor))
    }

    /// Re-evaluate a locked batch against today. Status is only as fresh
    /// as the last recompute, and the clock may have moved since.
    fn reclassify(&self, batch: &mut Batch) {
        let profile = self.store.product_profile(&batch.sku);
        spoilage::refresh(batch, profile, self.today());
    }

    fn price_with(&self, batch: &mut Batch, demand_factor: Option<f64>) -> DiscountResult {
        self.reclassify(batch);
        let profile = self.store.pricing_profile(&batch.sku);
        let result = pricing::price_batch(batch, profile, demand_factor, &self.rules, self.today());
        pricing::apply_to_batch(batch, &result);
        result
    }

    /// Price every batch on a shelf in receiving order, each with the
    /// demand factor the demand source assigns it. With `simulate`, each
    /// batch first takes a reading from the sensor feed.
    pub fn price_shelf(&self, shelf_id: &str, simulate: bool) -> CoreResult<Vec<DiscountResult>> {
        let handles = self.store.shelf_batches(shelf_id)?;
        let results = handles
            .iter()
            .map(|handle| {
                if simulate {
                    self.simulate_locked(handle);
                }
                let mut batch = lock_batch(handle);
                self.reclassify(&mut batch);
                let factor = self.demand.demand_factor(&batch);
                self.price_with(&mut batch, Some(factor))
            })
            .collect();
        Ok(results)
    }

    /// Worst status color on a shelf as of today; `Unknown` when the shelf
    /// is empty.
    pub fn worst_status(&self, shelf_id: &str) -> CoreResult<StatusColor> {
        let handles = self.store.shelf_batches(shelf_id)?;
        Ok(worst_status(handles.iter().map(|h| {
            let mut batch = lock_batch(h);
            self.reclassify(&mut batch);
            batch.status
        })))
    }

    /// Snapshots of a shelf's batches, optionally after a simulated reading.
    pub fn shelf_items(&self, shelf_id: &str, simulate: bool) -> CoreResult<Vec<Batch>> {
        let handles = self.store.shelf_batches(shelf_id)?;
        Ok(handles
            .iter()
            .map(|h| {
                if simulate {
                    self.simulate_locked(h);
                }
                let mut batch = lock_batch(h);
                self.reclassify(&mut batch);
                batch.clone()
            })
            .collect())
    }

    /// Snapshot of one batch, optionally after a simulated reading.
    pub fn batch_details(&self, batch_id: &str, simulate: bool) -> CoreResult<Batch> {
        let handle = self.store.get_batch(batch_id)?;
        if simulate {
            self.simulate_locked(&handle);
        }
        let mut batch = lock_batch(&handle);
        self.reclassify(&mut batch);
        Ok(batch.clone())
    }

    /// Worst color for every shelf in the store.
    pub fn layout_summary(&self, simulate: bool) -> BTreeMap<String, StatusColor> {
        let mut summary = BTreeMap::new();
        for shelf_id in self.store.shelf_ids() {
            if simulate {
                // The shelf id came from the store itself; a concurrent reset is the only miss.
                if let Err(err) = self.refresh_shelf(&shelf_id) {
                    log::warn!("layout summary skipped refresh: {}", err);
                }
            }
            let color = self.worst_status(&shelf_id).unwrap_or(StatusColor::Unknown);
            summary.insert(shelf_id, color);
        }
        summary
    }

    pub fn reset(&self) {
        self.store.reset();
    }
}
