use async_trait::async_trait;
use std::sync::Arc;

use crate::side_effect::{SideEffect, SideEffectInput};
use crate::types::{DigestQuery, MarkdownCandidate, ShelfAction};

/// Logs a one-line summary of the finished digest.
pub struct DigestLogSideEffect;

#[async_trait]
impl SideEffect<DigestQuery, MarkdownCandidate> for DigestLogSideEffect {
    async fn run(
        &self,
        input: Arc<SideEffectInput<DigestQuery, MarkdownCandidate>>,
    ) -> Result<(), String> {
        let count = |action: ShelfAction| {
            input
                .selected_candidates
                .iter()
                .filter(|c| c.action == Some(action))
                .count()
        };
        let value: f64 = input
            .selected_candidates
            .iter()
            .filter_map(|c| c.value_at_risk)
            .sum();
        log::info!(
            "request_id={} digest ready: {} markdown, {} donate, {} discard, ${:.2} at risk",
            input.query.request_id,
            count(ShelfAction::Markdown),
            count(ShelfAction::Donate),
            count(ShelfAction::Discard),
            value
        );
        Ok(())
    }
}
