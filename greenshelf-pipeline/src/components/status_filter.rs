use async_trait::async_trait;

use crate::filter::{Filter, FilterResult};
use crate::types::{DigestQuery, MarkdownCandidate};

/// Keeps only the statuses named in the query's `status_filter`.
/// Inactive when the query has no filter.
pub struct StatusFilter;

#[async_trait]
impl Filter<DigestQuery, MarkdownCandidate> for StatusFilter {
    fn enable(&self, query: &DigestQuery) -> bool {
        query.status_filter.is_some()
    }

    async fn filter(
        &self,
        query: &DigestQuery,
        candidates: Vec<MarkdownCandidate>,
    ) -> Result<FilterResult<MarkdownCandidate>, String> {
        let allowed = query.status_filter.as_deref().unwrap_or(&[]);
        Ok(FilterResult::partition(candidates, |c| allowed.contains(&c.status)))
    }
}
