//! Batch records and their bounded sensor history.

use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{FreshnessStatus, StatusColor};
use crate::thresholds::HISTORY_CAPACITY;

/// A single temperature (and optionally humidity) observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<f64>,
}

impl SensorReading {
    pub fn new(timestamp: DateTime<Utc>, temperature_c: f64, humidity_pct: Option<f64>) -> Self {
        Self {
            timestamp,
            temperature_c,
            humidity_pct,
        }
    }
}

/// Fixed-capacity FIFO of recent readings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadingHistory {
    readings: VecDeque<SensorReading>,
    capacity: usize,
}

impl Default for ReadingHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl ReadingHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading, evicting the oldest when full.
    pub fn push(&mut self, reading: SensorReading) {
        while self.readings.len() >= self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SensorReading> {
        self.readings.iter()
    }

    /// Arithmetic mean temperature, `None` when empty.
    pub fn mean_temperature(&self) -> Option<f64> {
        if self.readings.is_empty() {
            return None;
        }
        let total: f64 = self.readings.iter().map(|r| r.temperature_c).sum();
        Some(total / self.readings.len() as f64)
    }
}

/// Input for receiving a new batch onto a shelf.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBatch {
    pub instance_id: String,
    pub sku: String,
    pub shelf_id: String,
    pub received_date: NaiveDate,
    pub printed_expiry_date: NaiveDate,
    pub quantity: u32,
    pub initial_reading: SensorReading,
    /// Fallback price used when the SKU has no pricing profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
}

/// A tracked quantity of one SKU received together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub instance_id: String,
    pub sku: String,
    pub product_name: String,
    pub shelf_id: String,
    pub printed_expiry_date: NaiveDate,
    pub received_date: NaiveDate,
    pub quantity: u32,
    pub current_reading: SensorReading,
    #[serde(skip)]
    pub history: ReadingHistory,
    pub predicted_spoilage_date: NaiveDate,
    pub status: FreshnessStatus,
    pub status_color: StatusColor,
    pub original_price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub discounted_price: Option<f64>,
}

impl Batch {
    /// Build a batch from receiving data. The initial reading is both the
    /// current reading and the only history entry; the prediction starts
    /// at the printed expiry until the estimator refreshes it.
    pub fn received(new: NewBatch, product_name: impl Into<String>) -> Self {
        let mut history = ReadingHistory::default();
        history.push(new.initial_reading.clone());
        Self {
            instance_id: new.instance_id,
            sku: new.sku,
            product_name: product_name.into(),
            shelf_id: new.shelf_id,
            printed_expiry_date: new.printed_expiry_date,
            received_date: new.received_date,
            quantity: new.quantity,
            current_reading: new.initial_reading,
            history,
            predicted_spoilage_date: new.printed_expiry_date,
            status: FreshnessStatus::Normal,
            status_color: StatusColor::Green,
            original_price: new.original_price,
            discount_percentage: None,
            discounted_price: None,
        }
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            instance_id: self.instance_id.clone(),
            status: self.status,
            status_color: self.status_color,
            predicted_spoilage_date: self.predicted_spoilage_date,
        }
    }
}

/// What `ingest_reading` reports back to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub instance_id: String,
    pub status: FreshnessStatus,
    pub status_color: StatusColor,
    pub predicted_spoilage_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(temp: f64) -> SensorReading {
        SensorReading::new(Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap(), temp, None)
    }

    #[test]
    fn history_evicts_oldest_first() {
        let mut history = ReadingHistory::with_capacity(3);
        for t in 1..=5 {
            history.push(reading(t as f64));
        }
        assert_eq!(history.len(), 3);
        let temps: Vec<f64> = history.iter().map(|r| r.temperature_c).collect();
        assert_eq!(temps, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn default_capacity_is_24() {
        let mut history = ReadingHistory::default();
        for t in 0..30 {
            history.push(reading(t as f64));
        }
        assert_eq!(history.len(), 24);
        assert_eq!(history.iter().next().unwrap().temperature_c, 6.0);
    }

    #[test]
    fn mean_temperature_of_empty_history_is_none() {
        let history = ReadingHistory::default();
        assert!(history.mean_temperature().is_none());
    }

    #[test]
    fn received_batch_seeds_history_with_initial_reading() {
        let new = NewBatch {
            instance_id: "B1".into(),
            sku: "SKU".into(),
            shelf_id: "S1".into(),
            received_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            printed_expiry_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            quantity: 4,
            initial_reading: reading(4.5),
            original_price: None,
        };
        let batch = Batch::received(new, "Milk");
        assert_eq!(batch.history.len(), 1);
        assert_eq!(batch.predicted_spoilage_date, batch.printed_expiry_date);
        assert_eq!(batch.product_name, "Milk");
        assert!(batch.discount_percentage.is_none());
    }
}
