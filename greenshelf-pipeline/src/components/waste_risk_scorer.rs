use async_trait::async_trait;

use greenshelf_core::FreshnessStatus;

use crate::scorer::Scorer;
use crate::types::{DigestQuery, MarkdownCandidate};

/// Scores by shelf value at risk on a log scale, weighted by how soon the
/// batch has to move. Spoiled stock ranks below nearing-expiry stock.
pub struct WasteRiskScorer;

impl WasteRiskScorer {
    pub fn urgency_weight(status: FreshnessStatus) -> f64 {
        match status {
            FreshnessStatus::CriticalDonate => 2.0,
            FreshnessStatus::NearingExpiry => 1.5,
            FreshnessStatus::Spoiled => 1.2,
            FreshnessStatus::Approaching => 1.0,
            FreshnessStatus::Normal => 0.5,
        }
    }
}

#[async_trait]
impl Scorer<DigestQuery, MarkdownCandidate> for WasteRiskScorer {
    async fn score(
        &self,
        _query: &DigestQuery,
        candidates: &[MarkdownCandidate],
    ) -> Result<Vec<MarkdownCandidate>, String> {
        let scored = candidates
            .iter()
            .map(|c| {
                let value = c
                    .value_at_risk
                    .unwrap_or(c.quantity as f64 * c.original_price)
                    .max(0.0);
                MarkdownCandidate {
                    risk_score: Some((value + 1.0).ln() * Self::urgency_weight(c.status)),
                    ..MarkdownCandidate::default()
                }
            })
            .collect();
        Ok(scored)
    }

    fn update(&self, candidate: &mut MarkdownCandidate, scored: MarkdownCandidate) {
        candidate.risk_score = scored.risk_score;
    }
}
