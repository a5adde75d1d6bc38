//! Centralized tunables for spoilage classification and markdown pricing.
//!
//! These values are calibrated for a grocery perishables floor (dairy,
//! produce, meat, bakery). Changing a boundary here affects BOTH status
//! classification (in `status.rs`) and the default tier table (in
//! `pricing.rs`), which are keyed by the same statuses.

/// Maximum number of sensor readings retained per batch. Older readings
/// are evicted first.
pub const HISTORY_CAPACITY: usize = 24;

/// Upper bound (inclusive) of days-to-spoilage for `CriticalDonate`
/// (spoils today or tomorrow).
pub const CRITICAL_MAX_DAYS: i64 = 1;

/// Upper bound (inclusive) of days-to-spoilage for `NearingExpiry`.
pub const NEARING_EXPIRY_MAX_DAYS: i64 = 3;

/// Upper bound (inclusive) of days-to-spoilage for `Approaching`.
/// Anything beyond is `Normal`.
pub const APPROACHING_MAX_DAYS: i64 = 5;

/// Absolute maximum discount fraction the pricing engine will ever emit.
pub const MAX_DISCOUNT: f64 = 0.90;

/// Neutral demand multiplier: leaves the tier discount untouched.
pub const DEFAULT_DEMAND_FACTOR: f64 = 1.0;

/// Assumed cost as a fraction of the batch's own original price when the
/// SKU has no pricing profile.
pub const FALLBACK_COST_RATIO: f64 = 0.5;

/// Minimum margin assumed when the SKU has no pricing profile.
pub const FALLBACK_MIN_MARGIN: f64 = 0.05;

/// Decimal places kept on the emitted discount fraction.
pub const DISCOUNT_DECIMALS: i32 = 4;

/// Decimal places kept on the emitted discounted price.
pub const PRICE_DECIMALS: i32 = 2;
