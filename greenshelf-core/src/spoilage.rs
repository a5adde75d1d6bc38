//! Spoilage estimation from temperature exposure.
//!
//! The model: base shelf life from the received date, shortened by the
//! cumulative heat stress the batch has seen while on the shelf.
//!
//! ```text
//! deviation  = max(0, mean_temp - ideal_temp)
//! days_lost  = days_since_received * deviation * sensitivity
//! life       = max(0, round(base_shelf_life - days_lost))
//! predicted  = min(received + life, printed_expiry)
//! ```
//!
//! Colder-than-ideal storage never extends life. Rounding is half-to-even.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::batch::{Batch, BatchSummary, SensorReading};
use crate::profile::ProductProfile;
use crate::status::classify;

/// Intermediate values of one prediction, kept for diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpoilageEstimate {
    pub days_since_received: i64,
    pub avg_temp_exposure: f64,
    pub temp_deviation: f64,
    pub days_lost: f64,
    pub effective_shelf_life_days: u64,
    pub predicted_spoilage_date: NaiveDate,
}

/// Mean temperature the batch has been exposed to. Falls back to the
/// current reading while the history holds one entry or fewer.
pub fn average_exposure(batch: &Batch) -> f64 {
    if batch.history.len() > 1 {
        batch
            .history
            .mean_temperature()
            .unwrap_or(batch.current_reading.temperature_c)
    } else {
        batch.current_reading.temperature_c
    }
}

/// Compute the predicted spoilage date of `batch` as seen on `today`.
pub fn estimate(batch: &Batch, profile: &ProductProfile, today: NaiveDate) -> SpoilageEstimate {
    // A received date in the future counts as zero days on the shelf.
    let days_since_received = (today - batch.received_date).num_days().max(0);

    let avg_temp_exposure = average_exposure(batch);
    let temp_deviation = (avg_temp_exposure - profile.ideal_temp_c).max(0.0);
    let days_lost = days_since_received as f64 * temp_deviation * profile.temp_sensitivity_factor;

    let remaining = (profile.base_shelf_life_days as f64 - days_lost).round_ties_even();
    let effective_shelf_life_days = if remaining.is_finite() && remaining > 0.0 {
        remaining as u64
    } else {
        0
    };

    let modeled = batch
        .received_date
        .checked_add_days(Days::new(effective_shelf_life_days))
        .unwrap_or(batch.printed_expiry_date);

    SpoilageEstimate {
        days_since_received,
        avg_temp_exposure,
        temp_deviation,
        days_lost,
        effective_shelf_life_days,
        predicted_spoilage_date: modeled.min(batch.printed_expiry_date),
    }
}

/// Recompute prediction and status in place.
///
/// Without a product profile there is nothing to model, so the prediction
/// falls back to the printed expiry and status is classified from that.
pub fn refresh(batch: &mut Batch, profile: Option<&ProductProfile>, today: NaiveDate) {
    batch.predicted_spoilage_date = match profile {
        Some(profile) => {
            let est = estimate(batch, profile, today);
            log::debug!(
                "batch={} avg_temp={:.2} deviation={:.2} days_lost={:.2} life={}d predicted={}",
                batch.instance_id,
                est.avg_temp_exposure,
                est.temp_deviation,
                est.days_lost,
                est.effective_shelf_life_days,
                est.predicted_spoilage_date
            );
            est.predicted_spoilage_date
        }
        None => {
            log::warn!(
                "batch={} sku={} has no product profile, using printed expiry",
                batch.instance_id,
                batch.sku
            );
            batch.printed_expiry_date
        }
    };
    batch.status = classify(today, batch.predicted_spoilage_date);
    batch.status_color = batch.status.color();
}

/// Record a new reading and recompute prediction and status.
///
/// Readings are accepted unconditionally; range clamping is the feed's job.
pub fn ingest_reading(
    batch: &mut Batch,
    reading: SensorReading,
    profile: Option<&ProductProfile>,
    today: NaiveDate,
) -> BatchSummary {
    batch.history.push(reading.clone());
    batch.current_reading = reading;
    refresh(batch, profile, today);
    batch.summary()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::NewBatch;
    use crate::status::{FreshnessStatus, StatusColor};
    use chrono::{TimeZone, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn reading(temp: f64) -> SensorReading {
        SensorReading::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(), temp, None)
    }

    fn milk() -> ProductProfile {
        ProductProfile {
            sku: "SKU_DAIRY_MILK1G".into(),
            name: "Whole Milk (1 Gallon)".into(),
            category: "Dairy".into(),
            ideal_temp_c: 3.0,
            base_shelf_life_days: 12,
            temp_sensitivity_factor: 0.25,
        }
    }

    fn milk_batch(received: NaiveDate, expiry: NaiveDate, temp: f64) -> Batch {
        Batch::received(
            NewBatch {
                instance_id: "MILK-1".into(),
                sku: "SKU_DAIRY_MILK1G".into(),
                shelf_id: "ShelfA1_Dairy".into(),
                received_date: received,
                printed_expiry_date: expiry,
                quantity: 10,
                initial_reading: reading(temp),
                original_price: None,
            },
            "Whole Milk (1 Gallon)",
        )
    }

    #[test]
    fn worked_example_loses_four_days() {
        // ideal 3C, 12d life, 0.25 sensitivity, received 5 days ago at 6C:
        // deviation 3 -> lost 3.75 -> round(8.25) = 8 -> received + 8d.
        let today = d(2025, 6, 10);
        let received = d(2025, 6, 5);
        let batch = milk_batch(received, d(2025, 6, 30), 6.0);
        let est = estimate(&batch, &milk(), today);
        assert_eq!(est.days_since_received, 5);
        assert!((est.temp_deviation - 3.0).abs() < 1e-12);
        assert!((est.days_lost - 3.75).abs() < 1e-12);
        assert_eq!(est.effective_shelf_life_days, 8);
        assert_eq!(est.predicted_spoilage_date, d(2025, 6, 13));
    }

    #[test]
    fn cold_storage_never_extends_life() {
        let today = d(2025, 6, 10);
        let received = d(2025, 6, 5);
        let batch = milk_batch(received, d(2025, 6, 30), -1.0);
        let est = estimate(&batch, &milk(), today);
        assert_eq!(est.temp_deviation, 0.0);
        assert_eq!(est.predicted_spoilage_date, d(2025, 6, 17));
    }

    #[test]
    fn prediction_is_capped_by_printed_expiry() {
        let today = d(2025, 6, 6);
        let received = d(2025, 6, 5);
        let batch = milk_batch(received, d(2025, 6, 9), 3.0);
        let est = estimate(&batch, &milk(), today);
        assert_eq!(est.predicted_spoilage_date, d(2025, 6, 9));
    }

    #[test]
    fn extreme_heat_clamps_life_to_zero() {
        let today = d(2025, 6, 25);
        let received = d(2025, 6, 5);
        let batch = milk_batch(received, d(2025, 6, 30), 40.0);
        let est = estimate(&batch, &milk(), today);
        assert_eq!(est.effective_shelf_life_days, 0);
        assert_eq!(est.predicted_spoilage_date, received);
    }

    #[test]
    fn rounding_is_half_to_even() {
        // lost = 2 * 1.0 * 0.25 = 0.5 -> 11.5 rounds to 12; 4 * 1.0 * 0.25 = 1.0 -> 11.
        let received = d(2025, 6, 5);
        let batch = milk_batch(received, d(2025, 7, 30), 4.0);
        let est = estimate(&batch, &milk(), d(2025, 6, 7));
        assert_eq!(est.effective_shelf_life_days, 12);
        // lost = 6 * 1.0 * 0.25 = 1.5 -> 10.5 rounds to 10.
        let est = estimate(&batch, &milk(), d(2025, 6, 11));
        assert_eq!(est.effective_shelf_life_days, 10);
    }

    #[test]
    fn future_received_date_counts_as_day_zero() {
        let batch = milk_batch(d(2025, 6, 12), d(2025, 6, 30), 9.0);
        let est = estimate(&batch, &milk(), d(2025, 6, 10));
        assert_eq!(est.days_since_received, 0);
        assert_eq!(est.effective_shelf_life_days, 12);
    }

    #[test]
    fn single_entry_history_uses_current_reading() {
        let mut batch = milk_batch(d(2025, 6, 5), d(2025, 6, 30), 3.0);
        batch.current_reading = reading(7.0);
        assert_eq!(average_exposure(&batch), 7.0);
    }

    #[test]
    fn ingest_averages_full_history() {
        let today = d(2025, 6, 9);
        let mut batch = milk_batch(d(2025, 6, 5), d(2025, 6, 30), 3.0);
        let summary = ingest_reading(&mut batch, reading(9.0), Some(&milk()), today);
        // mean(3, 9) = 6 -> deviation 3 -> lost 4*3*0.25 = 3 -> 9d life.
        assert_eq!(batch.history.len(), 2);
        assert_eq!(batch.current_reading.temperature_c, 9.0);
        assert_eq!(summary.predicted_spoilage_date, d(2025, 6, 14));
        assert_eq!(summary.status, FreshnessStatus::Approaching);
        assert_eq!(summary.status_color, StatusColor::Yellow);
    }

    #[test]
    fn missing_profile_falls_back_to_printed_expiry() {
        let today = d(2025, 6, 9);
        let mut batch = milk_batch(d(2025, 6, 5), d(2025, 6, 10), 3.0);
        let summary = ingest_reading(&mut batch, reading(20.0), None, today);
        assert_eq!(summary.predicted_spoilage_date, d(2025, 6, 10));
        assert_eq!(summary.status, FreshnessStatus::CriticalDonate);
        assert_eq!(batch.history.len(), 2);
    }
}
