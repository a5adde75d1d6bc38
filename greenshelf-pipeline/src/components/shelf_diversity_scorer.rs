use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::scorer::Scorer;
use crate::types::{DigestQuery, MarkdownCandidate};

/// Attenuates repeat appearances of the same shelf so one overloaded
/// shelf does not fill the whole digest.
///
/// Candidates are ranked by current score; the n-th candidate from a
/// shelf (0-based) is multiplied by `(1 - floor) * decay^n + floor`.
pub struct ShelfDiversityScorer {
    pub decay_factor: f64,
    pub floor: f64,
}

impl Default for ShelfDiversityScorer {
    fn default() -> Self {
        Self {
            decay_factor: 0.7,
            floor: 0.1,
        }
    }
}

impl ShelfDiversityScorer {
    fn multiplier(&self, position: usize) -> f64 {
        (1.0 - self.floor) * self.decay_factor.powi(position as i32) + self.floor
    }
}

#[async_trait]
impl Scorer<DigestQuery, MarkdownCandidate> for ShelfDiversityScorer {
    async fn score(
        &self,
        _query: &DigestQuery,
        candidates: &[MarkdownCandidate],
    ) -> Result<Vec<MarkdownCandidate>, String> {
        let mut ranked: Vec<(usize, &MarkdownCandidate)> = candidates.iter().enumerate().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            let a_score = a.risk_score.unwrap_or(f64::NEG_INFINITY);
            let b_score = b.risk_score.unwrap_or(f64::NEG_INFINITY);
            b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
        });

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut scored = vec![MarkdownCandidate::default(); candidates.len()];
        for (idx, candidate) in ranked {
            let position = seen.entry(candidate.shelf_id.as_str()).or_insert(0);
            let multiplier = self.multiplier(*position);
            *position += 1;
            scored[idx].risk_score = candidate.risk_score.map(|s| s * multiplier);
        }
        Ok(scored)
    }

    fn update(&self, candidate: &mut MarkdownCandidate, scored: MarkdownCandidate) {
        candidate.risk_score = scored.risk_score;
    }
}
