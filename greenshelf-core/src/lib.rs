//! GreenShelf core: batch freshness tracking and markdown pricing.
//!
//! Two engines share one inventory:
//! - the spoilage estimator turns temperature history into a predicted
//!   spoilage date and a freshness status per batch
//! - the pricing engine turns that status into a discount, adjusted for
//!   demand and floored by the product's margin
//!
//! [`GreenShelfService`] is the entry point for everything else.

pub mod batch;
pub mod clock;
pub mod error;
pub mod feed;
pub mod inventory;
pub mod pricing;
pub mod profile;
pub mod service;
pub mod spoilage;
pub mod status;
pub mod thresholds;

pub use batch::{Batch, BatchSummary, NewBatch, ReadingHistory, SensorReading};
pub use clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use feed::{
    DemandSource, FixedDemand, ReadingSource, ScriptedReadings, SimulatedSensorFeed,
    StatusDemandModel,
};
pub use inventory::{lock_batch, BatchHandle, InventoryStore};
pub use pricing::{price_batch, DiscountResult, DiscountTier, PricingRules};
pub use profile::{demo_catalog, Catalog, PricingProfile, ProductProfile};
pub use service::GreenShelfService;
pub use spoilage::{ingest_reading, SpoilageEstimate};
pub use status::{classify, days_to_spoilage, worst_status, FreshnessStatus, StatusColor};
