//! Freshness status classification.
//!
//! Status is a pure function of `(today, predicted_spoilage_date)`. The
//! enum variants are declared in ascending severity so the derived `Ord`
//! is the severity ordering used by shelf summaries.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::thresholds::{APPROACHING_MAX_DAYS, CRITICAL_MAX_DAYS, NEARING_EXPIRY_MAX_DAYS};

/// Discrete freshness state of a batch, least to most severe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FreshnessStatus {
    #[default]
    Normal,
    Approaching,
    #[serde(rename = "Nearing Expiry")]
    NearingExpiry,
    #[serde(rename = "Critical / Donate")]
    CriticalDonate,
    Spoiled,
}

impl FreshnessStatus {
    /// All statuses in ascending severity.
    pub const ALL: [FreshnessStatus; 5] = [
        FreshnessStatus::Normal,
        FreshnessStatus::Approaching,
        FreshnessStatus::NearingExpiry,
        FreshnessStatus::CriticalDonate,
        FreshnessStatus::Spoiled,
    ];

    /// Classify from a signed day count (`predicted - today`).
    pub fn from_days_to_spoilage(days: i64) -> Self {
        if days < 0 {
            FreshnessStatus::Spoiled
        } else if days <= CRITICAL_MAX_DAYS {
            FreshnessStatus::CriticalDonate
        } else if days <= NEARING_EXPIRY_MAX_DAYS {
            FreshnessStatus::NearingExpiry
        } else if days <= APPROACHING_MAX_DAYS {
            FreshnessStatus::Approaching
        } else {
            FreshnessStatus::Normal
        }
    }

    pub fn color(self) -> StatusColor {
        match self {
            FreshnessStatus::Normal => StatusColor::Green,
            FreshnessStatus::Approaching => StatusColor::Yellow,
            FreshnessStatus::NearingExpiry => StatusColor::Orange,
            FreshnessStatus::CriticalDonate => StatusColor::Red,
            FreshnessStatus::Spoiled => StatusColor::DarkRed,
        }
    }

    /// Statuses past the point where demand-driven discount tuning applies.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FreshnessStatus::CriticalDonate | FreshnessStatus::Spoiled
        )
    }
}

impl fmt::Display for FreshnessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreshnessStatus::Normal => write!(f, "Normal"),
            FreshnessStatus::Approaching => write!(f, "Approaching"),
            FreshnessStatus::NearingExpiry => write!(f, "Nearing Expiry"),
            FreshnessStatus::CriticalDonate => write!(f, "Critical / Donate"),
            FreshnessStatus::Spoiled => write!(f, "Spoiled"),
        }
    }
}

/// UI color for a status. `Unknown` is the sentinel for empty shelves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Yellow,
    Orange,
    Red,
    #[serde(rename = "darkred")]
    DarkRed,
    #[serde(rename = "grey")]
    Unknown,
}

impl fmt::Display for StatusColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusColor::Green => "green",
            StatusColor::Yellow => "yellow",
            StatusColor::Orange => "orange",
            StatusColor::Red => "red",
            StatusColor::DarkRed => "darkred",
            StatusColor::Unknown => "grey",
        };
        f.write_str(name)
    }
}

/// Signed whole days from `today` until `predicted`. Negative once past.
pub fn days_to_spoilage(today: NaiveDate, predicted: NaiveDate) -> i64 {
    (predicted - today).num_days()
}

/// Classify a predicted spoilage date as seen on `today`.
pub fn classify(today: NaiveDate, predicted: NaiveDate) -> FreshnessStatus {
    FreshnessStatus::from_days_to_spoilage(days_to_spoilage(today, predicted))
}

/// Reduce a collection of statuses to the single worst color.
/// An empty collection maps to [`StatusColor::Unknown`].
pub fn worst_status<I>(statuses: I) -> StatusColor
where
    I: IntoIterator<Item = FreshnessStatus>,
{
    statuses
        .into_iter()
        .max()
        .map(FreshnessStatus::color)
        .unwrap_or(StatusColor::Unknown)
}
