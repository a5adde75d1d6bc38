//! CSV loaders for shelf batches and the product catalog.
//!
//! Batch CSV columns:
//!   shelf_id, instance_id, sku, received_date, printed_expiry_date,
//!   quantity, temperature_c, humidity_pct, original_price
//!
//! Catalog CSV columns:
//!   sku, name, category, ideal_temp_c, base_shelf_life_days,
//!   temp_sensitivity_factor, original_price, cost_price, min_margin_fraction
//!
//! Dates are `YYYY-MM-DD`. `humidity_pct` and the batch `original_price`
//! may be blank; a catalog row with any blank pricing column gets no
//! pricing profile.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::{NaiveDate, NaiveTime};
use greenshelf_core::{Catalog, GreenShelfService, NewBatch, PricingProfile, ProductProfile, SensorReading};
use serde::Deserialize;

/// One batch row as received at the dock.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRecord {
    pub shelf_id: String,
    pub instance_id: String,
    pub sku: String,
    pub received_date: NaiveDate,
    pub printed_expiry_date: NaiveDate,
    pub quantity: u32,
    pub temperature_c: f64,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub humidity_pct: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub original_price: Option<f64>,
}

impl BatchRecord {
    /// Receiving input for the service. The dock reading is stamped at
    /// midnight UTC of the received date.
    pub fn to_new_batch(&self) -> NewBatch {
        let timestamp = self.received_date.and_time(NaiveTime::MIN).and_utc();
        NewBatch {
            instance_id: self.instance_id.clone(),
            sku: self.sku.clone(),
            shelf_id: self.shelf_id.clone(),
            received_date: self.received_date,
            printed_expiry_date: self.printed_expiry_date,
            quantity: self.quantity,
            initial_reading: SensorReading::new(timestamp, self.temperature_c, self.humidity_pct),
            original_price: self.original_price,
        }
    }
}

/// One catalog row: shelf-life profile plus optional pricing.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub ideal_temp_c: f64,
    pub base_shelf_life_days: u32,
    pub temp_sensitivity_factor: f64,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub original_price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub cost_price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub min_margin_fraction: Option<f64>,
}

impl CatalogRecord {
    pub fn product_profile(&self) -> ProductProfile {
        ProductProfile {
            sku: self.sku.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            ideal_temp_c: self.ideal_temp_c,
            base_shelf_life_days: self.base_shelf_life_days,
            temp_sensitivity_factor: self.temp_sensitivity_factor,
        }
    }

    pub fn pricing_profile(&self) -> Option<PricingProfile> {
        Some(PricingProfile {
            sku: self.sku.clone(),
            original_price: self.original_price?,
            cost_price: self.cost_price?,
            min_margin_fraction: self.min_margin_fraction?,
        })
    }
}

fn deserialize_rows<R, T>(reader: R) -> Result<Vec<T>, String>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let row: T = result.map_err(|e| format!("CSV parse error at line {}: {}", line_num + 2, e))?;
        rows.push(row);
    }
    Ok(rows)
}

fn open(path: &str) -> Result<std::fs::File, String> {
    std::fs::File::open(path).map_err(|e| format!("Failed to open '{}': {}", path, e))
}

/// Load batch rows from a CSV reader.
pub fn load_batches<R: Read>(reader: R) -> Result<Vec<BatchRecord>, String> {
    deserialize_rows(reader)
}

pub fn load_batches_file(path: &str) -> Result<Vec<BatchRecord>, String> {
    load_batches(open(path)?)
}

/// Load a catalog from a CSV reader. Later rows replace earlier ones for
/// the same SKU.
pub fn load_catalog<R: Read>(reader: R) -> Result<Catalog, String> {
    let rows: Vec<CatalogRecord> = deserialize_rows(reader)?;
    let mut catalog = Catalog::new();
    for row in &rows {
        catalog.insert_product(row.product_profile());
        match row.pricing_profile() {
            Some(pricing) => catalog.insert_pricing(pricing),
            None => log::warn!("catalog sku={} has no pricing columns", row.sku),
        }
    }
    Ok(catalog)
}

pub fn load_catalog_file(path: &str) -> Result<Catalog, String> {
    load_catalog(open(path)?)
}

/// Group rows by shelf, shelves sorted, rows in file order.
pub fn group_by_shelf(records: &[BatchRecord]) -> BTreeMap<String, Vec<BatchRecord>> {
    let mut groups: BTreeMap<String, Vec<BatchRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.shelf_id.clone())
            .or_default()
            .push(record.clone());
    }
    groups
}

/// Receive every row into the service, in file order. Stops at the first
/// rejected row.
pub fn receive_all(service: &GreenShelfService, records: &[BatchRecord]) -> Result<usize, String> {
    for (idx, record) in records.iter().enumerate() {
        service
            .receive_batch(record.to_new_batch())
            .map_err(|e| format!("row {}: {}", idx + 2, e))?;
    }
    Ok(records.len())
}

/// Blank-tolerant float: "", "na", "n/a" and "null" read as `None`.
fn deserialize_optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    match s.trim().to_lowercase().as_str() {
        "" | "na" | "n/a" | "null" => Ok(None),
        other => other.parse::<f64>().map(Some).map_err(|_| {
            serde::de::Error::custom(format!("expected number or blank, got '{}'", other))
        }),
    }
}
