use async_trait::async_trait;

use crate::util;

/// Enriches candidates with derived fields.
///
/// `hydrate` returns one partial candidate per input, in the same order;
/// the pipeline then calls `update` to merge each into the original. A
/// hydrator that returns the wrong number of candidates is skipped.
#[async_trait]
pub trait Hydrator<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    async fn hydrate(&self, query: &Q, candidates: &[C]) -> Result<Vec<C>, String>;

    fn update(&self, candidate: &mut C, hydrated: C);

    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
