use async_trait::async_trait;

use crate::filter::{Filter, FilterResult};
use crate::types::{DigestQuery, MarkdownCandidate, ShelfAction};

/// Drops batches that need nothing done today (fresh, full price).
pub struct NoActionFilter;

#[async_trait]
impl Filter<DigestQuery, MarkdownCandidate> for NoActionFilter {
    async fn filter(
        &self,
        _query: &DigestQuery,
        candidates: Vec<MarkdownCandidate>,
    ) -> Result<FilterResult<MarkdownCandidate>, String> {
        Ok(FilterResult::partition(candidates, |c| {
            !matches!(c.action, None | Some(ShelfAction::None))
        }))
    }
}
