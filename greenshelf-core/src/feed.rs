//! Pluggable sensor and demand inputs.
//!
//! The demo store has no real sensors or demand model, so both are
//! simulated. Simulators use a seeded `StdRng` so a given seed always
//! replays the same sequence.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::batch::{Batch, SensorReading};
use crate::profile::ProductProfile;
use crate::status::FreshnessStatus;

/// Supplies the next sensor reading for a batch.
pub trait ReadingSource: Send + Sync {
    fn next_reading(
        &self,
        batch: &Batch,
        profile: Option<&ProductProfile>,
        now: DateTime<Utc>,
    ) -> Option<SensorReading>;
}

/// Supplies a relative demand multiplier for a batch (1.0 = neutral).
pub trait DemandSource: Send + Sync {
    fn demand_factor(&self, batch: &Batch) -> f64;
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Random-walk temperature/humidity feed.
///
/// Drift is ±0.5 °C per reading, biased to -0.2..+1.0 once a batch is more
/// than 2 °C above ideal so warm cases keep warming. Temperatures stay in
/// `[ideal - 2, ideal + 8]`, humidity in `[30, 90]`.
pub struct SimulatedSensorFeed {
    rng: Mutex<StdRng>,
}

impl SimulatedSensorFeed {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl ReadingSource for SimulatedSensorFeed {
    fn next_reading(
        &self,
        batch: &Batch,
        profile: Option<&ProductProfile>,
        now: DateTime<Utc>,
    ) -> Option<SensorReading> {
        // Without an ideal temperature there is nothing to walk around.
        let profile = profile?;
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| {
            log::warn!("Sensor feed lock was poisoned, recovering");
            poisoned.into_inner()
        });

        let current = batch.current_reading.temperature_c;
        let delta = if current > profile.ideal_temp_c + 2.0 {
            rng.gen_range(-0.2..=1.0)
        } else {
            rng.gen_range(-0.5..=0.5)
        };
        let temperature = (current + delta)
            .max(profile.ideal_temp_c - 2.0)
            .min(profile.ideal_temp_c + 8.0);

        let humidity = batch
            .current_reading
            .humidity_pct
            .map(|h| round1((h + rng.gen_range(-5.0..=5.0)).clamp(30.0, 90.0)));

        Some(SensorReading::new(now, round1(temperature), humidity))
    }
}

/// Replays queued temperatures per batch; returns `None` once drained.
#[derive(Default)]
pub struct ScriptedReadings {
    queued: Mutex<HashMap<String, VecDeque<f64>>>,
}

impl ScriptedReadings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue<I: IntoIterator<Item = f64>>(&self, batch_id: &str, temperatures: I) {
        let mut queued = self.queued.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        queued
            .entry(batch_id.to_string())
            .or_default()
            .extend(temperatures);
    }
}

impl ReadingSource for ScriptedReadings {
    fn next_reading(
        &self,
        batch: &Batch,
        _profile: Option<&ProductProfile>,
        now: DateTime<Utc>,
    ) -> Option<SensorReading> {
        let mut queued = self.queued.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let temperature = queued.get_mut(&batch.instance_id)?.pop_front()?;
        Some(SensorReading::new(now, temperature, batch.current_reading.humidity_pct))
    }
}

/// Illustrative demand signal keyed off status: fresher-looking stock
/// sells a little better, nothing else moves.
pub struct StatusDemandModel {
    rng: Mutex<StdRng>,
}

impl StatusDemandModel {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl DemandSource for StatusDemandModel {
    fn demand_factor(&self, batch: &Batch) -> f64 {
        let range = match batch.status {
            FreshnessStatus::NearingExpiry => 0.9..=1.1,
            FreshnessStatus::Approaching => 1.0..=1.2,
            _ => return 1.0,
        };
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| {
            log::warn!("Demand model lock was poisoned, recovering");
            poisoned.into_inner()
        });
        rng.gen_range(range)
    }
}

/// The same factor for every batch.
#[derive(Clone, Copy, Debug)]
pub struct FixedDemand(pub f64);

impl Default for FixedDemand {
    fn default() -> Self {
        FixedDemand(1.0)
    }
}

impl DemandSource for FixedDemand {
    fn demand_factor(&self, _batch: &Batch) -> f64 {
        self.0
    }
}
