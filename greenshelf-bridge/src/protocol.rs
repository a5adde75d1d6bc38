//! Request parsing, validation, dispatch and audit.
//!
//! 1. Raw JSON -> `BridgeRequest` (reject if it does not parse)
//! 2. Validate parameters (reject if out of bounds)
//! 3. Dispatch to the service
//! 4. Record the outcome in the audit log

use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use greenshelf_core::{GreenShelfService, SensorReading};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BridgeError, BridgeResult};
use crate::ops::{ReadingInput, ShelfOperation};
use crate::results::OperationResult;

/// Audit-log operation text for a request that never parsed.
pub const UNPARSED_OPERATION: &str = "Unparsed request";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub operation: ShelfOperation,

    /// Echoed back in the response and audit log.
    pub request_id: String,

    /// Free-text note from the caller, kept for tracing.
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub result: OperationResult,
    pub request_id: String,
    pub read_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub operation: String,
    pub was_read_only: bool,
    pub success: bool,
    pub error: Option<String>,
}

pub struct Bridge {
    service: Arc<GreenShelfService>,

    /// Every processed request, oldest first.
    pub audit_log: Vec<AuditEntry>,

    /// Accepted sensor temperatures, °C.
    pub temperature_range: RangeInclusive<f64>,

    /// Accepted relative humidity, %.
    pub humidity_range: RangeInclusive<f64>,

    /// Upper bound on a caller-supplied demand factor. The lower bound is
    /// exclusive zero.
    pub max_demand_factor: f64,
}

impl Bridge {
    pub fn new(service: Arc<GreenShelfService>) -> Self {
        Bridge {
            service,
            audit_log: Vec::new(),
            temperature_range: -50.0..=80.0,
            humidity_range: 0.0..=100.0,
            max_demand_factor: 10.0,
        }
    }

    pub fn service(&self) -> &Arc<GreenShelfService> {
        &self.service
    }

    /// Malformed JSON is a `SerializationError`; well-formed JSON that is
    /// not a known request shape is an `UnknownOperation`.
    fn decode(raw_json: &str) -> BridgeResult<BridgeRequest> {
        let value: Value = serde_json::from_str(raw_json)?;
        serde_json::from_value(value)
            .map_err(|e| BridgeError::UnknownOperation(format!("Failed to parse request: {}", e)))
    }

    /// Parse and validate a raw JSON request.
    pub fn parse_request(&self, raw_json: &str) -> BridgeResult<BridgeRequest> {
        let request = Self::decode(raw_json)?;
        self.validate_operation(&request.operation)?;
        Ok(request)
    }

    /// Parse, then process. Requests that fail to parse are audited too.
    pub fn handle(&mut self, raw_json: &str) -> BridgeResult<BridgeResponse> {
        match Self::decode(raw_json) {
            Ok(request) => self.process(&request),
            Err(err) => {
                self.audit_unparsed(raw_json, &err);
                Err(err)
            }
        }
    }

    fn audit_unparsed(&mut self, raw_json: &str, err: &BridgeError) {
        let request_id = serde_json::from_str::<Value>(raw_json)
            .ok()
            .and_then(|v| v.get("request_id")?.as_str().map(String::from))
            .unwrap_or_default();
        log::warn!("request_id={} rejected: {}", request_id, err);
        self.audit_log.push(AuditEntry {
            timestamp: self.service.now(),
            request_id,
            operation: UNPARSED_OPERATION.into(),
            was_read_only: false,
            success: false,
            error: Some(err.to_string()),
        });
    }

    fn validate_temperature(&self, op: &str, temperature_c: f64) -> BridgeResult<()> {
        if !temperature_c.is_finite() || !self.temperature_range.contains(&temperature_c) {
            return Err(BridgeError::InvalidParameter {
                op: op.into(),
                reason: format!(
                    "temperature_c={} outside [{}, {}]",
                    temperature_c,
                    self.temperature_range.start(),
                    self.temperature_range.end()
                ),
            });
        }
        Ok(())
    }

    fn validate_humidity(&self, op: &str, humidity_pct: Option<f64>) -> BridgeResult<()> {
        match humidity_pct {
            Some(h) if !h.is_finite() || !self.humidity_range.contains(&h) => {
                Err(BridgeError::InvalidParameter {
                    op: op.into(),
                    reason: format!(
                        "humidity_pct={} outside [{}, {}]",
                        h,
                        self.humidity_range.start(),
                        self.humidity_range.end()
                    ),
                })
            }
            _ => Ok(()),
        }
    }

    fn validate_id(&self, op: &str, field: &str, id: &str) -> BridgeResult<()> {
        if id.trim().is_empty() {
            return Err(BridgeError::InvalidParameter {
                op: op.into(),
                reason: format!("{field} must not be empty"),
            });
        }
        Ok(())
    }

    fn validate_operation(&self, op: &ShelfOperation) -> BridgeResult<()> {
        let name = op.name();
        match op {
            ShelfOperation::ReceiveBatch { batch } => {
                self.validate_id(name, "instance_id", &batch.instance_id)?;
                self.validate_id(name, "sku", &batch.sku)?;
                self.validate_id(name, "shelf_id", &batch.shelf_id)?;
                self.validate_temperature(name, batch.initial_reading.temperature_c)?;
                self.validate_humidity(name, batch.initial_reading.humidity_pct)?;
                if batch.quantity == 0 {
                    return Err(BridgeError::InvalidParameter {
                        op: name.into(),
                        reason: "quantity must be > 0".into(),
                    });
                }
                if let Some(price) = batch.original_price {
                    if !price.is_finite() || price < 0.0 {
                        return Err(BridgeError::InvalidParameter {
                            op: name.into(),
                            reason: format!("original_price={} must be >= 0", price),
                        });
                    }
                }
            }
            ShelfOperation::IngestReading { batch_id, reading } => {
                self.validate_id(name, "batch_id", batch_id)?;
                self.validate_temperature(name, reading.temperature_c)?;
                self.validate_humidity(name, reading.humidity_pct)?;
            }
            ShelfOperation::PriceBatch {
                batch_id,
                demand_factor,
            } => {
                self.validate_id(name, "batch_id", batch_id)?;
                if let Some(f) = demand_factor {
                    if !f.is_finite() || *f <= 0.0 || *f > self.max_demand_factor {
                        return Err(BridgeError::InvalidParameter {
                            op: name.into(),
                            reason: format!(
                                "demand_factor={} out of range (0, {}]",
                                f, self.max_demand_factor
                            ),
                        });
                    }
                }
            }
            ShelfOperation::SimulateReading { batch_id }
            | ShelfOperation::BatchDetails { batch_id, .. } => {
                self.validate_id(name, "batch_id", batch_id)?;
            }
            ShelfOperation::PriceShelf { shelf_id, .. }
            | ShelfOperation::WorstStatus { shelf_id }
            | ShelfOperation::ShelfItems { shelf_id, .. } => {
                self.validate_id(name, "shelf_id", shelf_id)?;
            }
            ShelfOperation::LayoutSummary { .. } | ShelfOperation::Reset => {}
        }
        Ok(())
    }

    /// Validate, execute and audit a request.
    pub fn process(&mut self, request: &BridgeRequest) -> BridgeResult<BridgeResponse> {
        let op = &request.operation;
        log::info!("request_id={} {}", request.request_id, op.describe());

        let result = self
            .validate_operation(op)
            .and_then(|_| self.dispatch(op));

        if let Err(err) = &result {
            log::warn!("request_id={} failed: {}", request.request_id, err);
        }
        self.audit_log.push(AuditEntry {
            timestamp: self.service.now(),
            request_id: request.request_id.clone(),
            operation: op.describe(),
            was_read_only: op.is_read_only(),
            success: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        });

        Ok(BridgeResponse {
            result: result?,
            request_id: request.request_id.clone(),
            read_only: op.is_read_only(),
        })
    }

    fn reading(&self, input: &ReadingInput) -> SensorReading {
        SensorReading::new(
            input.timestamp.unwrap_or_else(|| self.service.now()),
            input.temperature_c,
            input.humidity_pct,
        )
    }

    fn dispatch(&self, op: &ShelfOperation) -> BridgeResult<OperationResult> {
        let svc = &self.service;
        let result = match op {
            ShelfOperation::ReceiveBatch { batch } => OperationResult::Received {
                summary: svc.receive_batch(batch.to_new_batch())?,
            },
            ShelfOperation::IngestReading { batch_id, reading } => OperationResult::StatusUpdate {
                summary: svc.ingest_reading(batch_id, self.reading(reading))?,
            },
            ShelfOperation::SimulateReading { batch_id } => OperationResult::StatusUpdate {
                summary: svc.simulate_reading(batch_id)?,
            },
            ShelfOperation::Reset => {
                let batches_cleared = svc.store().batch_count();
                svc.reset();
                OperationResult::ResetDone { batches_cleared }
            }
            ShelfOperation::PriceBatch {
                batch_id,
                demand_factor,
            } => OperationResult::Priced {
                result: svc.price_batch(batch_id, *demand_factor)?,
            },
            ShelfOperation::PriceShelf {
                shelf_id,
                simulate_updates,
            } => OperationResult::ShelfPriced {
                shelf_id: shelf_id.clone(),
                results: svc.price_shelf(shelf_id, *simulate_updates)?,
            },
            ShelfOperation::WorstStatus { shelf_id } => OperationResult::ShelfStatus {
                shelf_id: shelf_id.clone(),
                color: svc.worst_status(shelf_id)?,
            },
            ShelfOperation::ShelfItems {
                shelf_id,
                simulate_updates,
            } => OperationResult::ShelfItems {
                shelf_id: shelf_id.clone(),
                items: svc.shelf_items(shelf_id, *simulate_updates)?,
            },
            ShelfOperation::BatchDetails {
                batch_id,
                simulate_updates,
            } => OperationResult::BatchDetails {
                batch: svc.batch_details(batch_id, *simulate_updates)?,
            },
            ShelfOperation::LayoutSummary { simulate_updates } => OperationResult::Layout {
                shelves: svc.layout_summary(*simulate_updates),
            },
        };
        Ok(result)
    }
}
