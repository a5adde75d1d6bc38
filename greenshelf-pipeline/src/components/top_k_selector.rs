use crate::selector::Selector;
use crate::types::{DigestQuery, MarkdownCandidate};

/// Keeps the `k` highest-risk candidates.
pub struct TopKSelector {
    pub k: usize,
}

impl Default for TopKSelector {
    fn default() -> Self {
        Self { k: 10 }
    }
}

impl Selector<DigestQuery, MarkdownCandidate> for TopKSelector {
    fn score(&self, candidate: &MarkdownCandidate) -> f64 {
        candidate.risk_score.unwrap_or(f64::NEG_INFINITY)
    }

    fn size(&self) -> Option<usize> {
        Some(self.k)
    }
}
