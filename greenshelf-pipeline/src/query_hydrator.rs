use async_trait::async_trait;

use crate::util;

/// Fills in query context (scope, reference date) before any source runs.
#[async_trait]
pub trait QueryHydrator<Q>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Return a copy of the query with this hydrator's fields resolved.
    async fn hydrate(&self, query: &Q) -> Result<Q, String>;

    /// Copy the fields this hydrator owns from `hydrated` into `query`.
    fn update(&self, query: &mut Q, hydrated: Q);

    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
