use async_trait::async_trait;

use crate::hydrator::Hydrator;
use crate::types::{DigestQuery, MarkdownCandidate, ShelfAction};

/// Decides the floor action for each batch and how much shelf value it
/// puts at risk (quantity at original price).
pub struct ShelfActionHydrator;

#[async_trait]
impl Hydrator<DigestQuery, MarkdownCandidate> for ShelfActionHydrator {
    async fn hydrate(
        &self,
        _query: &DigestQuery,
        candidates: &[MarkdownCandidate],
    ) -> Result<Vec<MarkdownCandidate>, String> {
        let hydrated = candidates
            .iter()
            .map(|c| MarkdownCandidate {
                action: Some(ShelfAction::for_status(c.status, c.discount_percentage)),
                value_at_risk: Some(c.quantity as f64 * c.original_price),
                ..MarkdownCandidate::default()
            })
            .collect();
        Ok(hydrated)
    }

    fn update(&self, candidate: &mut MarkdownCandidate, hydrated: MarkdownCandidate) {
        candidate.action = hydrated.action;
        candidate.value_at_risk = hydrated.value_at_risk;
    }
}
