//! Typed responses, one variant per kind of answer.

use std::collections::BTreeMap;

use greenshelf_core::{Batch, BatchSummary, DiscountResult, StatusColor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OperationResult {
    /// Batch accepted, with its initial status.
    Received { summary: BatchSummary },

    /// Status after a reading was ingested or simulated.
    StatusUpdate { summary: BatchSummary },

    Priced { result: DiscountResult },

    ShelfPriced {
        shelf_id: String,
        results: Vec<DiscountResult>,
    },

    ShelfStatus { shelf_id: String, color: StatusColor },

    ShelfItems { shelf_id: String, items: Vec<Batch> },

    BatchDetails { batch: Batch },

    /// Worst color per shelf, shelves sorted.
    Layout { shelves: BTreeMap<String, StatusColor> },

    ResetDone { batches_cleared: usize },
}
