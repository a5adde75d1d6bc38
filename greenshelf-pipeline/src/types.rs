use std::fmt;

use chrono::NaiveDate;
use greenshelf_core::{FreshnessStatus, StatusColor};
use serde::Serialize;

use crate::candidate_pipeline::HasRequestId;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Request for a store-wide markdown digest.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestQuery {
    pub request_id: String,
    /// Shelves to cover. Empty means every shelf in the store.
    pub shelf_ids: Vec<String>,
    /// Day the digest is priced as of. Hydration sets it to the service
    /// clock's today, replacing any other value.
    pub as_of: Option<NaiveDate>,
    /// Pull a fresh sensor reading for each batch before pricing.
    pub simulate_updates: bool,
    /// Restrict the digest to these statuses.
    pub status_filter: Option<Vec<FreshnessStatus>>,
}

impl DigestQuery {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Self::default()
        }
    }
}

impl HasRequestId for DigestQuery {
    fn request_id(&self) -> &str {
        &self.request_id
    }
}

// ---------------------------------------------------------------------------
// Candidate types
// ---------------------------------------------------------------------------

/// What a store associate should do with a batch today.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ShelfAction {
    /// Apply the computed markdown price.
    Markdown,
    /// Pull for food-bank donation.
    Donate,
    /// Pull and discard.
    Discard,
    None,
}

impl ShelfAction {
    pub fn for_status(status: FreshnessStatus, discount_percentage: f64) -> Self {
        match status {
            FreshnessStatus::Spoiled => ShelfAction::Discard,
            FreshnessStatus::CriticalDonate => ShelfAction::Donate,
            _ if discount_percentage > 0.0 => ShelfAction::Markdown,
            _ => ShelfAction::None,
        }
    }
}

impl fmt::Display for ShelfAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShelfAction::Markdown => write!(f, "Markdown"),
            ShelfAction::Donate => write!(f, "Donate"),
            ShelfAction::Discard => write!(f, "Discard"),
            ShelfAction::None => write!(f, "No Action"),
        }
    }
}

/// One priced batch under consideration for the digest.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownCandidate {
    pub instance_id: String,
    pub shelf_id: String,
    pub sku: String,
    pub product_name: String,
    pub quantity: u32,
    pub status: FreshnessStatus,
    pub status_color: StatusColor,
    pub predicted_spoilage_date: NaiveDate,
    pub days_remaining: i64,
    pub original_price: f64,
    pub discount_percentage: f64,
    pub discounted_price: f64,
    pub reason: String,

    // Populated by hydrators
    pub action: Option<ShelfAction>,
    /// Shelf value of the batch at its original price.
    pub value_at_risk: Option<f64>,

    // Populated by scorers
    pub risk_score: Option<f64>,
}

impl Default for MarkdownCandidate {
    fn default() -> Self {
        Self {
            instance_id: String::new(),
            shelf_id: String::new(),
            sku: String::new(),
            product_name: String::new(),
            quantity: 0,
            status: FreshnessStatus::Normal,
            status_color: StatusColor::Green,
            predicted_spoilage_date: NaiveDate::MIN,
            days_remaining: 0,
            original_price: 0.0,
            discount_percentage: 0.0,
            discounted_price: 0.0,
            reason: String::new(),
            action: None,
            value_at_risk: None,
            risk_score: None,
        }
    }
}
