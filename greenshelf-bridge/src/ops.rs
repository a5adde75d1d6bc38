//! The closed set of operations a client may request.
//!
//! Requests name an `op` and carry its `params`. Anything that does not
//! deserialize into one of these variants is rejected before it reaches
//! the inventory.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use greenshelf_core::{NewBatch, SensorReading};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "params")]
pub enum ShelfOperation {
    // ========================================
    // RECEIVING AND SENSING (mutating)
    // ========================================
    /// Put a new batch on its shelf.
    ReceiveBatch { batch: BatchInput },

    /// Record a sensor reading for a batch and recompute its status.
    IngestReading { batch_id: String, reading: ReadingInput },

    /// Pull the next reading for a batch from the sensor feed.
    SimulateReading { batch_id: String },

    /// Drop every batch and shelf.
    Reset,

    // ========================================
    // PRICING (writes the price back)
    // ========================================
    PriceBatch {
        batch_id: String,
        #[serde(default)]
        demand_factor: Option<f64>,
    },

    PriceShelf {
        shelf_id: String,
        #[serde(default = "default_true")]
        simulate_updates: bool,
    },

    // ========================================
    // QUERIES (read-only unless simulating)
    // ========================================
    WorstStatus { shelf_id: String },

    ShelfItems {
        shelf_id: String,
        #[serde(default = "default_true")]
        simulate_updates: bool,
    },

    BatchDetails {
        batch_id: String,
        #[serde(default = "default_true")]
        simulate_updates: bool,
    },

    LayoutSummary {
        #[serde(default = "default_true")]
        simulate_updates: bool,
    },
}

/// A reading as submitted by a client. The timestamp defaults to the
/// service clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingInput {
    pub temperature_c: f64,
    #[serde(default)]
    pub humidity_pct: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A batch as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    pub instance_id: String,
    pub sku: String,
    pub shelf_id: String,
    pub received_date: NaiveDate,
    pub printed_expiry_date: NaiveDate,
    pub quantity: u32,
    pub initial_reading: ReadingInput,
    #[serde(default)]
    pub original_price: Option<f64>,
}

impl BatchInput {
    /// Receiving input for the service. A dock reading without a
    /// timestamp is stamped at midnight UTC of the received date.
    pub fn to_new_batch(&self) -> NewBatch {
        let reading = &self.initial_reading;
        let timestamp = reading
            .timestamp
            .unwrap_or_else(|| self.received_date.and_time(NaiveTime::MIN).and_utc());
        NewBatch {
            instance_id: self.instance_id.clone(),
            sku: self.sku.clone(),
            shelf_id: self.shelf_id.clone(),
            received_date: self.received_date,
            printed_expiry_date: self.printed_expiry_date,
            quantity: self.quantity,
            initial_reading: SensorReading::new(timestamp, reading.temperature_c, reading.humidity_pct),
            original_price: self.original_price,
        }
    }
}

impl ShelfOperation {
    /// Operation name as it appears in the `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            ShelfOperation::ReceiveBatch { .. } => "ReceiveBatch",
            ShelfOperation::IngestReading { .. } => "IngestReading",
            ShelfOperation::SimulateReading { .. } => "SimulateReading",
            ShelfOperation::Reset => "Reset",
            ShelfOperation::PriceBatch { .. } => "PriceBatch",
            ShelfOperation::PriceShelf { .. } => "PriceShelf",
            ShelfOperation::WorstStatus { .. } => "WorstStatus",
            ShelfOperation::ShelfItems { .. } => "ShelfItems",
            ShelfOperation::BatchDetails { .. } => "BatchDetails",
            ShelfOperation::LayoutSummary { .. } => "LayoutSummary",
        }
    }

    /// Read-only operations never change batch state. Queries that
    /// simulate a reading first are not read-only.
    pub fn is_read_only(&self) -> bool {
        match self {
            ShelfOperation::WorstStatus { .. } => true,
            ShelfOperation::ShelfItems { simulate_updates, .. }
            | ShelfOperation::BatchDetails { simulate_updates, .. }
            | ShelfOperation::LayoutSummary { simulate_updates } => !simulate_updates,
            _ => false,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ShelfOperation::ReceiveBatch { batch } => format!(
                "Receive batch '{}' ({} x {}) onto '{}'",
                batch.instance_id, batch.quantity, batch.sku, batch.shelf_id
            ),
            ShelfOperation::IngestReading { batch_id, reading } => {
                format!("Ingest {:.1}C reading for '{batch_id}'", reading.temperature_c)
            }
            ShelfOperation::SimulateReading { batch_id } => {
                format!("Simulate reading for '{batch_id}'")
            }
            ShelfOperation::Reset => "Reset inventory".into(),
            ShelfOperation::PriceBatch {
                batch_id,
                demand_factor: Some(f),
            } => format!("Price '{batch_id}' at demand {f:.2}"),
            ShelfOperation::PriceBatch { batch_id, .. } => format!("Price '{batch_id}'"),
            ShelfOperation::PriceShelf { shelf_id, .. } => format!("Price shelf '{shelf_id}'"),
            ShelfOperation::WorstStatus { shelf_id } => {
                format!("Worst status on '{shelf_id}'")
            }
            ShelfOperation::ShelfItems { shelf_id, .. } => format!("List items on '{shelf_id}'"),
            ShelfOperation::BatchDetails { batch_id, .. } => format!("Details for '{batch_id}'"),
            ShelfOperation::LayoutSummary { .. } => "Store layout summary".into(),
        }
    }
}
