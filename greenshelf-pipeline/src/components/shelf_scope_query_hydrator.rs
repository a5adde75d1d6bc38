use async_trait::async_trait;
use std::sync::Arc;

use greenshelf_core::GreenShelfService;

use crate::query_hydrator::QueryHydrator;
use crate::types::DigestQuery;

/// Resolves an open-ended digest query against the store: no shelves
/// means every shelf. `as_of` is always the service's today, since that
/// is the day pricing classifies against; a different caller date is
/// logged and replaced.
pub struct ShelfScopeQueryHydrator {
    service: Arc<GreenShelfService>,
}

impl ShelfScopeQueryHydrator {
    pub fn new(service: Arc<GreenShelfService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl QueryHydrator<DigestQuery> for ShelfScopeQueryHydrator {
    async fn hydrate(&self, query: &DigestQuery) -> Result<DigestQuery, String> {
        let shelf_ids = if query.shelf_ids.is_empty() {
            self.service.store().shelf_ids()
        } else {
            query.shelf_ids.clone()
        };
        let today = self.service.today();
        if let Some(requested) = query.as_of.filter(|day| *day != today) {
            log::warn!(
                "request_id={} as_of {} ignored, digest is priced as of {}",
                query.request_id,
                requested,
                today
            );
        }
        Ok(DigestQuery {
            shelf_ids,
            as_of: Some(today),
            ..query.clone()
        })
    }

    fn update(&self, query: &mut DigestQuery, hydrated: DigestQuery) {
        query.shelf_ids = hydrated.shelf_ids;
        query.as_of = hydrated.as_of;
    }
}
