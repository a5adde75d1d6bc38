use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use greenshelf_core::{days_to_spoilage, DiscountResult, GreenShelfService};

use crate::source::Source;
use crate::types::{DigestQuery, MarkdownCandidate};

/// Prices every batch on the requested shelves and emits one candidate
/// per batch, in shelf order then receiving order.
///
/// Pricing writes back onto the batches, so the store reflects the
/// digest's prices afterwards. Unknown shelves are logged and skipped.
pub struct ShelfPricingSource {
    service: Arc<GreenShelfService>,
}

impl ShelfPricingSource {
    pub fn new(service: Arc<GreenShelfService>) -> Self {
        Self { service }
    }

    fn shelf_candidates(&self, shelf_id: &str, query: &DigestQuery) -> Result<Vec<MarkdownCandidate>, String> {
        let priced = self
            .service
            .price_shelf(shelf_id, query.simulate_updates)
            .map_err(|e| e.to_string())?;
        let quantities: HashMap<String, u32> = self
            .service
            .shelf_items(shelf_id, false)
            .map_err(|e| e.to_string())?
            .into_iter()
            .map(|b| (b.instance_id, b.quantity))
            .collect();

        // Pricing classified against the service clock; count days the same way.
        let as_of = self.service.today();
        Ok(priced
            .into_iter()
            .map(|result| {
                let quantity = quantities.get(&result.instance_id).copied().unwrap_or(0);
                to_candidate(shelf_id, quantity, as_of, result)
            })
            .collect())
    }
}

fn to_candidate(shelf_id: &str, quantity: u32, as_of: chrono::NaiveDate, result: DiscountResult) -> MarkdownCandidate {
    MarkdownCandidate {
        days_remaining: days_to_spoilage(as_of, result.predicted_spoilage_date),
        instance_id: result.instance_id,
        shelf_id: shelf_id.to_string(),
        sku: result.sku,
        product_name: result.product_name,
        quantity,
        status: result.status,
        status_color: result.status_color,
        predicted_spoilage_date: result.predicted_spoilage_date,
        original_price: result.original_price,
        discount_percentage: result.discount_percentage,
        discounted_price: result.discounted_price,
        reason: result.reason,
        ..MarkdownCandidate::default()
    }
}

#[async_trait]
impl Source<DigestQuery, MarkdownCandidate> for ShelfPricingSource {
    fn enable(&self, query: &DigestQuery) -> bool {
        !query.shelf_ids.is_empty()
    }

    async fn get_candidates(&self, query: &DigestQuery) -> Result<Vec<MarkdownCandidate>, String> {
        let mut candidates = Vec::new();
        for shelf_id in &query.shelf_ids {
            match self.shelf_candidates(shelf_id, query) {
                Ok(found) => candidates.extend(found),
                Err(err) => log::warn!(
                    "request_id={} skipping shelf {}: {}",
                    query.request_id,
                    shelf_id,
                    err
                ),
            }
        }
        Ok(candidates)
    }
}
