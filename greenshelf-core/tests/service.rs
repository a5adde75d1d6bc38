//! End-to-end tests of `GreenShelfService` over the demo catalog.

use std::sync::Arc;
use std::thread;

use chrono::{Duration, NaiveDate};
use greenshelf_core::{
    classify, demo_catalog, Clock, CoreError, FixedClock, FixedDemand, FreshnessStatus,
    GreenShelfService, InventoryStore, ManualClock, NewBatch, ScriptedReadings, SensorReading,
    SimulatedSensorFeed, StatusColor, StatusDemandModel,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::on(today()))
}

fn reading(temp: f64) -> SensorReading {
    SensorReading::new(clock().now(), temp, Some(60.0))
}

fn new_batch(id: &str, sku: &str, shelf: &str, age_days: i64, life: i64, temp: f64) -> NewBatch {
    let received = today() - Duration::days(age_days);
    NewBatch {
        instance_id: id.into(),
        sku: sku.into(),
        shelf_id: shelf.into(),
        received_date: received,
        printed_expiry_date: received + Duration::days(life),
        quantity: 12,
        initial_reading: reading(temp),
        original_price: None,
    }
}

/// Dairy and produce shelves with one batch in every status band.
fn stocked_service() -> GreenShelfService {
    let svc = GreenShelfService::new(Arc::new(InventoryStore::new(demo_catalog())))
        .with_clock(clock())
        .with_sensor_feed(Arc::new(ScriptedReadings::new()))
        .with_demand_source(Arc::new(FixedDemand(1.0)));

    // Milk at ideal: predicted = received + 12.
    svc.receive_batch(new_batch("MILK-FRESH", "SKU_DAIRY_MILK1G", "ShelfA1_Dairy", 1, 12, 3.0))
        .unwrap();
    svc.receive_batch(new_batch("MILK-2D", "SKU_DAIRY_MILK1G", "ShelfA1_Dairy", 10, 12, 3.0))
        .unwrap();
    // Lettuce at ideal: predicted = received + 10.
    svc.receive_batch(new_batch("LETTUCE-5D", "SKU_VEG_LETTUCE", "ShelfB2_Produce", 5, 10, 2.0))
        .unwrap();
    svc.receive_batch(new_batch("LETTUCE-OLD", "SKU_VEG_LETTUCE", "ShelfB2_Produce", 11, 10, 2.0))
        .unwrap();
    svc
}

// ---------------------------------------------------------------------------
// Estimator through the service
// ---------------------------------------------------------------------------

#[test]
fn received_batches_are_classified() {
    let svc = stocked_service();
    let status = |id: &str| svc.batch_details(id, false).unwrap().status;
    assert_eq!(status("MILK-FRESH"), FreshnessStatus::Normal);
    assert_eq!(status("MILK-2D"), FreshnessStatus::NearingExpiry);
    assert_eq!(status("LETTUCE-5D"), FreshnessStatus::Approaching);
    assert_eq!(status("LETTUCE-OLD"), FreshnessStatus::Spoiled);
}

#[test]
fn duplicate_receipt_is_rejected() {
    let svc = stocked_service();
    let err = svc
        .receive_batch(new_batch("MILK-FRESH", "SKU_DAIRY_MILK1G", "ShelfA1_Dairy", 0, 12, 3.0))
        .unwrap_err();
    assert_eq!(err, CoreError::DuplicateBatch("MILK-FRESH".into()));
}

#[test]
fn warm_readings_pull_prediction_forward() {
    let svc = stocked_service();
    let before = svc.batch_details("MILK-FRESH", false).unwrap().predicted_spoilage_date;
    let after = svc.ingest_reading("MILK-FRESH", reading(15.0)).unwrap();
    // mean(3, 15) = 9 -> deviation 6 -> lost 1 * 6 * 0.25 = 1.5 -> round(10.5) = 10.
    assert!(after.predicted_spoilage_date < before);
    assert_eq!(after.predicted_spoilage_date, today() - Duration::days(1) + Duration::days(10));
}

// ---------------------------------------------------------------------------
// Pricing through the service
// ---------------------------------------------------------------------------

#[test]
fn shelf_pricing_follows_status() {
    let svc = stocked_service();
    let results = svc.price_shelf("ShelfA1_Dairy", false).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].instance_id, "MILK-FRESH");
    assert_eq!(results[0].discount_percentage, 0.0);
    assert_eq!(results[0].discounted_price, 3.99);
    // 2 days out -> 40%; 3.99 * 0.6 = 2.394 clears the 2.20 floor.
    assert_eq!(results[1].discount_percentage, 0.40);
    assert_eq!(results[1].discounted_price, 2.39);
}

#[test]
fn spoiled_batches_are_not_discounted() {
    let svc = stocked_service();
    let result = svc.price_batch("LETTUCE-OLD", Some(0.5)).unwrap();
    assert_eq!(result.status, FreshnessStatus::Spoiled);
    assert_eq!(result.discount_percentage, 0.0);
    assert_eq!(result.reason, "Standard Price");
}

#[test]
fn missing_ids_surface_not_found() {
    let svc = stocked_service();
    assert!(svc.price_batch("nope", None).unwrap_err().is_not_found());
    assert!(svc.worst_status("nope").unwrap_err().is_not_found());
    assert!(svc.shelf_items("nope", false).unwrap_err().is_not_found());
}

#[test]
fn fallback_price_is_used_for_unlisted_skus() {
    let svc = stocked_service();
    let mut new = new_batch("JAM-1", "SKU_PANTRY_JAM", "ShelfC3_Pantry", 0, 3, 20.0);
    new.original_price = Some(5.0);
    svc.receive_batch(new).unwrap();
    // No product profile: predicted = printed expiry, 3 days out -> 25%.
    let result = svc.price_batch("JAM-1", None).unwrap();
    assert_eq!(result.product_name, "Unknown Product");
    assert_eq!(result.discount_percentage, 0.25);
    assert_eq!(result.discounted_price, 3.75);
}

#[test]
fn prices_track_the_clock_between_readings() {
    let clock = Arc::new(ManualClock::on(today()));
    let svc = GreenShelfService::new(Arc::new(InventoryStore::new(demo_catalog())))
        .with_clock(Arc::clone(&clock) as Arc<dyn Clock>)
        .with_sensor_feed(Arc::new(ScriptedReadings::new()))
        .with_demand_source(Arc::new(FixedDemand(1.0)));
    // 5 days at 6C: predicted received + 8d, three days out today.
    svc.receive_batch(new_batch("MILK-WARM", "SKU_DAIRY_MILK1G", "S", 5, 12, 6.0))
        .unwrap();

    for _ in 0..6 {
        clock.advance(Duration::days(1));
        for result in svc.price_shelf("S", false).unwrap() {
            assert_eq!(result.status, classify(clock.today(), result.predicted_spoilage_date));
            assert_eq!(result.status_color, result.status.color());
            if result.status == FreshnessStatus::Spoiled {
                assert_eq!(result.discount_percentage, 0.0);
            }
        }
    }
    assert_eq!(svc.worst_status("S").unwrap(), StatusColor::DarkRed);
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[test]
fn layout_reports_worst_color_per_shelf() {
    let svc = stocked_service();
    svc.store().add_shelf("ShelfD4_Empty");
    let layout = svc.layout_summary(false);
    assert_eq!(layout["ShelfA1_Dairy"], StatusColor::Orange);
    assert_eq!(layout["ShelfB2_Produce"], StatusColor::DarkRed);
    assert_eq!(layout["ShelfD4_Empty"], StatusColor::Unknown);
}

#[test]
fn simulated_refresh_grows_history() {
    let svc = GreenShelfService::new(Arc::new(InventoryStore::new(demo_catalog())))
        .with_clock(clock())
        .with_sensor_feed(Arc::new(SimulatedSensorFeed::seeded(11)))
        .with_demand_source(Arc::new(StatusDemandModel::seeded(11)));
    svc.receive_batch(new_batch("B-1", "SKU_FRUIT_BANANAS", "ShelfB2_Produce", 2, 7, 13.0))
        .unwrap();
    let items = svc.shelf_items("ShelfB2_Produce", true).unwrap();
    assert_eq!(items[0].history.len(), 2);
    let details = svc.batch_details("B-1", true).unwrap();
    assert_eq!(details.history.len(), 3);
    assert!(details.predicted_spoilage_date <= details.printed_expiry_date);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_ingests_are_not_lost() {
    let svc = Arc::new(stocked_service());
    thread::scope(|scope| {
        for worker in 0..4 {
            let svc = Arc::clone(&svc);
            scope.spawn(move || {
                for i in 0..5 {
                    let temp = 3.0 + (worker * 5 + i) as f64 * 0.1;
                    svc.ingest_reading("MILK-FRESH", reading(temp)).unwrap();
                    svc.ingest_reading("LETTUCE-5D", reading(2.0)).unwrap();
                }
            });
        }
    });
    // 1 initial + 20 concurrent readings, under the 24-entry cap.
    assert_eq!(svc.batch_details("MILK-FRESH", false).unwrap().history.len(), 21);
    assert_eq!(svc.batch_details("LETTUCE-5D", false).unwrap().history.len(), 21);
}
