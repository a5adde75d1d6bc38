use async_trait::async_trait;

use crate::util;

/// Assigns or adjusts candidate scores.
///
/// Scorers run in sequence, so a later scorer sees the scores written by
/// earlier ones. Same partial-candidate contract as [`crate::hydrator::Hydrator`].
#[async_trait]
pub trait Scorer<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    async fn score(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, String>;

    fn update(&self, candidate: &mut C, scored: C);

    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
