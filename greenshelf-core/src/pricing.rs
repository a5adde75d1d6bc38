//! Discount-tier pricing with demand adjustment and margin protection.
//!
//! Pricing a batch runs four steps:
//! 1. Tier lookup: the first rule (smallest threshold) for the batch's
//!    status whose threshold is >= days remaining. No match is 0%.
//! 2. Demand: outside Critical/Spoiled, `discount / demand_factor`.
//! 3. Cap to `[0, MAX_DISCOUNT]`.
//! 4. Margin protection: never price below `cost * (1 + min_margin)` when
//!    the item is profitable at all; fall back to selling at cost.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::batch::Batch;
use crate::profile::PricingProfile;
use crate::status::{classify, days_to_spoilage, FreshnessStatus, StatusColor};
use crate::thresholds::{
    DEFAULT_DEMAND_FACTOR, DISCOUNT_DECIMALS, FALLBACK_COST_RATIO, FALLBACK_MIN_MARGIN,
    MAX_DISCOUNT, PRICE_DECIMALS,
};

pub const STANDARD_PRICE: &str = "Standard Price";
pub const PRICING_UNAVAILABLE: &str = "Pricing info unavailable";
pub const MARGIN_PROTECTED: &str = " (Margin Protected)";
pub const NEAR_COST: &str = " (Near Cost)";

/// One row of the tier table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountTier {
    /// Applies while `days_remaining <= max_days_remaining`.
    pub max_days_remaining: i64,
    pub discount: f64,
    /// Reason text; `{product_name}` is substituted.
    pub label: String,
}

impl DiscountTier {
    pub fn new(max_days_remaining: i64, discount: f64, label: impl Into<String>) -> Self {
        Self {
            max_days_remaining,
            discount,
            label: label.into(),
        }
    }

    fn reason(&self, product_name: &str) -> String {
        self.label.replace("{product_name}", product_name)
    }
}

/// Tier table and caps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingRules {
    tiers: HashMap<FreshnessStatus, Vec<DiscountTier>>,
    pub max_discount: f64,
    pub default_demand_factor: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self::new()
            .with_tiers(
                FreshnessStatus::CriticalDonate,
                vec![
                    DiscountTier::new(0, 0.75, "75% Off - Today Only for {product_name}!"),
                    DiscountTier::new(1, 0.60, "60% Off - Expires Tomorrow: {product_name}!"),
                ],
            )
            .with_tiers(
                FreshnessStatus::NearingExpiry,
                vec![
                    DiscountTier::new(2, 0.40, "40% Off - Freshness Deal on {product_name}!"),
                    DiscountTier::new(3, 0.25, "25% Off - Great Value {product_name}!"),
                ],
            )
            .with_tiers(
                FreshnessStatus::Approaching,
                vec![DiscountTier::new(5, 0.10, "10% Off - Early Bird deal for {product_name}!")],
            )
    }
}

impl PricingRules {
    /// Empty table with the standard caps.
    pub fn new() -> Self {
        Self {
            tiers: HashMap::new(),
            max_discount: MAX_DISCOUNT,
            default_demand_factor: DEFAULT_DEMAND_FACTOR,
        }
    }

    /// Replace the tiers for `status`. Stored ascending by threshold.
    pub fn with_tiers(mut self, status: FreshnessStatus, mut tiers: Vec<DiscountTier>) -> Self {
        tiers.sort_by_key(|t| t.max_days_remaining);
        self.tiers.insert(status, tiers);
        self
    }

    pub fn tiers(&self, status: FreshnessStatus) -> &[DiscountTier] {
        self.tiers.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First tier whose threshold covers `days_remaining`.
    pub fn lookup(&self, status: FreshnessStatus, days_remaining: i64) -> Option<&DiscountTier> {
        self.tiers(status)
            .iter()
            .find(|t| days_remaining <= t.max_days_remaining)
    }

    fn clamp(&self, discount: f64) -> f64 {
        discount.min(self.max_discount).max(0.0)
    }
}

/// Price decision for one batch. Transient, recomputed per request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResult {
    pub instance_id: String,
    pub sku: String,
    pub product_name: String,
    pub original_price: f64,
    pub discount_percentage: f64,
    pub discounted_price: f64,
    pub reason: String,
    pub predicted_spoilage_date: NaiveDate,
    pub status: FreshnessStatus,
    pub status_color: StatusColor,
}

impl DiscountResult {
    /// Whether the engine actually priced the batch (as opposed to the
    /// "unavailable" degradation).
    pub fn is_priced(&self) -> bool {
        self.reason != PRICING_UNAVAILABLE
    }
}

/// Half-to-even, so 0.625 prices at 0.62.
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Resolve the pricing profile to use: the SKU's own, else one synthesized
/// from the batch's fallback price.
fn effective_profile(batch: &Batch, pricing: Option<&PricingProfile>) -> Option<PricingProfile> {
    if let Some(profile) = pricing {
        return Some(profile.clone());
    }
    batch.original_price.map(|price| PricingProfile {
        sku: batch.sku.clone(),
        original_price: price,
        cost_price: price * FALLBACK_COST_RATIO,
        min_margin_fraction: FALLBACK_MIN_MARGIN,
    })
}

/// Compute the discount for `batch` as seen on `today`. Status is
/// classified from the predicted spoilage date and `today`, not read from
/// the batch, so a batch last refreshed days ago still prices correctly.
///
/// Never fails: a batch that cannot be priced yields a zero-discount
/// result tagged [`PRICING_UNAVAILABLE`].
pub fn price_batch(
    batch: &Batch,
    pricing: Option<&PricingProfile>,
    demand_factor: Option<f64>,
    rules: &PricingRules,
    today: NaiveDate,
) -> DiscountResult {
    let status = classify(today, batch.predicted_spoilage_date);
    let Some(profile) = effective_profile(batch, pricing) else {
        log::warn!(
            "batch={} sku={} has no pricing profile or fallback price",
            batch.instance_id,
            batch.sku
        );
        return DiscountResult {
            instance_id: batch.instance_id.clone(),
            sku: batch.sku.clone(),
            product_name: batch.product_name.clone(),
            original_price: 0.0,
            discount_percentage: 0.0,
            discounted_price: 0.0,
            reason: PRICING_UNAVAILABLE.to_string(),
            predicted_spoilage_date: batch.predicted_spoilage_date,
            status,
            status_color: status.color(),
        };
    };

    let days_remaining = days_to_spoilage(today, batch.predicted_spoilage_date);
    let (base_discount, mut reason) = match rules.lookup(status, days_remaining) {
        Some(tier) => (tier.discount, tier.reason(&batch.product_name)),
        None => (0.0, STANDARD_PRICE.to_string()),
    };

    let mut factor = demand_factor.unwrap_or(rules.default_demand_factor);
    if !factor.is_finite() || factor <= 0.0 {
        log::warn!(
            "batch={} ignoring demand factor {} (must be positive)",
            batch.instance_id,
            factor
        );
        factor = rules.default_demand_factor;
    }

    let mut discount = base_discount;
    if factor != 1.0 && base_discount > 0.0 && !status.is_terminal() {
        discount = base_discount / factor;
    }
    discount = rules.clamp(discount);

    let candidate_price = profile.original_price * (1.0 - discount);
    let min_profitable = profile.min_profitable_price();
    if candidate_price < min_profitable && profile.original_price > profile.cost_price {
        if profile.original_price > min_profitable {
            discount = (profile.original_price - min_profitable) / profile.original_price;
            reason.push_str(MARGIN_PROTECTED);
        } else {
            // Margin is unreachable; sell at cost as the last resort.
            discount = (profile.original_price - profile.cost_price) / profile.original_price;
            reason.push_str(NEAR_COST);
        }
        discount = rules.clamp(discount);
    }

    let discount_percentage = round_to(discount, DISCOUNT_DECIMALS);
    let discounted_price = round_to(
        profile.original_price * (1.0 - discount_percentage),
        PRICE_DECIMALS,
    );

    DiscountResult {
        instance_id: batch.instance_id.clone(),
        sku: batch.sku.clone(),
        product_name: batch.product_name.clone(),
        original_price: profile.original_price,
        discount_percentage,
        discounted_price,
        reason,
        predicted_spoilage_date: batch.predicted_spoilage_date,
        status,
        status_color: status.color(),
    }
}

/// Record a priced result on the batch. Unavailable results are not
/// written back.
pub fn apply_to_batch(batch: &mut Batch, result: &DiscountResult) {
    if !result.is_priced() {
        return;
    }
    batch.original_price = Some(result.original_price);
    batch.discount_percentage = Some(result.discount_percentage);
    batch.discounted_price = Some(result.discounted_price);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{NewBatch, SensorReading};
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn batch_spoiling_in(days: i64, original_price: Option<f64>) -> Batch {
        let predicted = today() + chrono::Duration::days(days);
        let mut batch = Batch::received(
            NewBatch {
                instance_id: "B-1".into(),
                sku: "SKU_DAIRY_MILK1G".into(),
                shelf_id: "ShelfA1_Dairy".into(),
                received_date: today() - chrono::Duration::days(5),
                printed_expiry_date: predicted,
                quantity: 8,
                initial_reading: SensorReading::new(
                    Utc.with_ymd_and_hms(2025, 6, 10, 7, 0, 0).unwrap(),
                    4.0,
                    None,
                ),
                original_price,
            },
            "Whole Milk (1 Gallon)",
        );
        batch.predicted_spoilage_date = predicted;
        batch.status = classify(today(), predicted);
        batch.status_color = batch.status.color();
        batch
    }

    fn profile(original: f64, cost: f64, min_margin: f64) -> PricingProfile {
        PricingProfile {
            sku: "SKU_DAIRY_MILK1G".into(),
            original_price: original,
            cost_price: cost,
            min_margin_fraction: min_margin,
        }
    }

    fn cheap_cost() -> PricingProfile {
        profile(10.0, 0.50, 0.10)
    }

    #[test]
    fn tier_lookup_picks_smallest_covering_threshold() {
        let rules = PricingRules::default();
        let hit = rules.lookup(FreshnessStatus::NearingExpiry, 2).unwrap();
        assert_eq!(hit.discount, 0.40);
        let hit = rules.lookup(FreshnessStatus::NearingExpiry, 3).unwrap();
        assert_eq!(hit.discount, 0.25);
        let hit = rules.lookup(FreshnessStatus::CriticalDonate, 0).unwrap();
        assert_eq!(hit.discount, 0.75);
        assert!(rules.lookup(FreshnessStatus::Normal, 9).is_none());
        assert!(rules.lookup(FreshnessStatus::Spoiled, -1).is_none());
    }

    #[test]
    fn tiers_are_sorted_on_insert() {
        let rules = PricingRules::new().with_tiers(
            FreshnessStatus::Approaching,
            vec![DiscountTier::new(5, 0.1, "late"), DiscountTier::new(4, 0.2, "early")],
        );
        assert_eq!(rules.lookup(FreshnessStatus::Approaching, 3).unwrap().label, "early");
    }

    #[test]
    fn nearing_expiry_two_days_gets_forty_percent() {
        let batch = batch_spoiling_in(2, None);
        assert_eq!(batch.status, FreshnessStatus::NearingExpiry);
        let result = price_batch(&batch, Some(&cheap_cost()), Some(1.0), &PricingRules::default(), today());
        assert_eq!(result.discount_percentage, 0.40);
        assert_eq!(result.discounted_price, 6.0);
        assert_eq!(result.reason, "40% Off - Freshness Deal on Whole Milk (1 Gallon)!");
    }

    #[test]
    fn normal_batch_is_standard_price() {
        let batch = batch_spoiling_in(9, None);
        let result = price_batch(&batch, Some(&cheap_cost()), None, &PricingRules::default(), today());
        assert_eq!(result.discount_percentage, 0.0);
        assert_eq!(result.discounted_price, 10.0);
        assert_eq!(result.reason, STANDARD_PRICE);
        assert_eq!(result.status_color, StatusColor::Green);
    }

    #[test]
    fn high_demand_shrinks_discount() {
        let batch = batch_spoiling_in(2, None);
        let result = price_batch(&batch, Some(&cheap_cost()), Some(2.0), &PricingRules::default(), today());
        assert_eq!(result.discount_percentage, 0.20);
    }

    #[test]
    fn low_demand_grows_discount_up_to_cap() {
        let batch = batch_spoiling_in(2, None);
        let result = price_batch(&batch, Some(&cheap_cost()), Some(0.25), &PricingRules::default(), today());
        assert_eq!(result.discount_percentage, 0.90);
        assert_eq!(result.discounted_price, 1.0);
    }

    #[test]
    fn demand_ignored_for_critical_batches() {
        let batch = batch_spoiling_in(0, None);
        assert_eq!(batch.status, FreshnessStatus::CriticalDonate);
        let result = price_batch(&batch, Some(&cheap_cost()), Some(3.0), &PricingRules::default(), today());
        assert_eq!(result.discount_percentage, 0.75);
        assert_eq!(result.reason, "75% Off - Today Only for Whole Milk (1 Gallon)!");
    }

    #[test]
    fn non_positive_demand_factor_is_ignored() {
        let batch = batch_spoiling_in(2, None);
        let rules = PricingRules::default();
        let zero = price_batch(&batch, Some(&cheap_cost()), Some(0.0), &rules, today());
        let negative = price_batch(&batch, Some(&cheap_cost()), Some(-2.0), &rules, today());
        assert_eq!(zero.discount_percentage, 0.40);
        assert_eq!(negative.discount_percentage, 0.40);
    }

    #[test]
    fn margin_protection_recomputes_discount() {
        // 3.99 retail, 2.00 cost, 10% margin -> floor 2.20.
        let batch = batch_spoiling_in(0, None);
        let result = price_batch(&batch, Some(&profile(3.99, 2.00, 0.10)), None, &PricingRules::default(), today());
        assert_eq!(result.discount_percentage, 0.4486);
        assert_eq!(result.discounted_price, 2.2);
        assert!(result.reason.ends_with(MARGIN_PROTECTED));
    }

    #[test]
    fn unreachable_margin_sells_at_cost() {
        // Retail 2.10 is above cost 2.00 but below the 2.20 floor.
        let batch = batch_spoiling_in(2, None);
        let result = price_batch(&batch, Some(&profile(2.10, 2.00, 0.10)), None, &PricingRules::default(), today());
        assert!(result.reason.ends_with(NEAR_COST));
        assert_eq!(result.discounted_price, 2.0);
    }

    #[test]
    fn unprofitable_item_keeps_its_discount() {
        // Retail below cost: margin protection does not engage.
        let batch = batch_spoiling_in(2, None);
        let result = price_batch(&batch, Some(&profile(1.50, 2.00, 0.10)), None, &PricingRules::default(), today());
        assert_eq!(result.discount_percentage, 0.40);
        assert_eq!(result.discounted_price, 0.9);
        assert!(!result.reason.ends_with(MARGIN_PROTECTED));
        assert!(!result.reason.ends_with(NEAR_COST));
    }

    #[test]
    fn price_ties_round_half_to_even() {
        // 2.50 at 75% off is exactly 0.625.
        let batch = batch_spoiling_in(0, None);
        let result = price_batch(&batch, Some(&profile(2.50, 0.10, 0.10)), None, &PricingRules::default(), today());
        assert_eq!(result.discount_percentage, 0.75);
        assert_eq!(result.discounted_price, 0.62);
    }

    #[test]
    fn stale_cached_status_is_reclassified() {
        // Cached as Nearing Expiry two days out; four days later it has spoiled.
        let batch = batch_spoiling_in(2, None);
        assert_eq!(batch.status, FreshnessStatus::NearingExpiry);
        let later = today() + chrono::Duration::days(4);
        let result = price_batch(&batch, Some(&cheap_cost()), None, &PricingRules::default(), later);
        assert_eq!(result.status, FreshnessStatus::Spoiled);
        assert_eq!(result.status_color, StatusColor::DarkRed);
        assert_eq!(result.discount_percentage, 0.0);
        assert_eq!(result.reason, STANDARD_PRICE);
    }

    #[test]
    fn missing_profile_without_fallback_is_unavailable() {
        let batch = batch_spoiling_in(2, None);
        let result = price_batch(&batch, None, None, &PricingRules::default(), today());
        assert_eq!(result.reason, PRICING_UNAVAILABLE);
        assert_eq!(result.discount_percentage, 0.0);
        assert_eq!(result.original_price, 0.0);
        assert!(!result.is_priced());
    }

    #[test]
    fn fallback_price_synthesizes_profile() {
        // 4.00 retail -> cost 2.00, margin 5% -> floor 2.10; 40% off = 2.40 is fine.
        let batch = batch_spoiling_in(2, Some(4.0));
        let result = price_batch(&batch, None, None, &PricingRules::default(), today());
        assert_eq!(result.original_price, 4.0);
        assert_eq!(result.discount_percentage, 0.40);
        assert_eq!(result.discounted_price, 2.4);
    }

    #[test]
    fn apply_writes_back_only_priced_results() {
        let mut batch = batch_spoiling_in(2, None);
        let rules = PricingRules::default();
        let unavailable = price_batch(&batch, None, None, &rules, today());
        apply_to_batch(&mut batch, &unavailable);
        assert!(batch.discount_percentage.is_none());

        let priced = price_batch(&batch, Some(&cheap_cost()), None, &rules, today());
        apply_to_batch(&mut batch, &priced);
        assert_eq!(batch.original_price, Some(10.0));
        assert_eq!(batch.discount_percentage, Some(0.40));
        assert_eq!(batch.discounted_price, Some(6.0));
    }

    #[test]
    fn result_serializes_camel_case() {
        let batch = batch_spoiling_in(2, None);
        let result = price_batch(&batch, Some(&cheap_cost()), None, &PricingRules::default(), today());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["instanceId"], "B-1");
        assert_eq!(json["discountPercentage"], 0.4);
        assert_eq!(json["status"], "Nearing Expiry");
        assert_eq!(json["statusColor"], "orange");
        assert_eq!(json["predictedSpoilageDate"], "2025-06-12");
    }
}
