//! The staged candidate pipeline.
//!
//! ```text
//! query hydrators -> sources -> hydrators -> filters -> scorers
//!   -> selector -> post-selection hydrators/filters -> truncate -> side effects
//! ```
//!
//! Every stage is best effort: a component that errors is logged and its
//! contribution dropped, and the rest of the run carries on.

use async_trait::async_trait;
use std::sync::Arc;

use crate::filter::Filter;
use crate::hydrator::Hydrator;
use crate::query_hydrator::QueryHydrator;
use crate::scorer::Scorer;
use crate::selector::Selector;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::source::Source;

/// Queries carry an id used to correlate log lines across stages.
pub trait HasRequestId {
    fn request_id(&self) -> &str;
}

/// Everything a run produced, for reporting.
#[derive(Clone, Debug)]
pub struct PipelineResult<Q, C> {
    /// The query after hydration.
    pub query: Arc<Q>,
    /// All candidates the sources returned, before hydration.
    pub retrieved_candidates: Vec<C>,
    /// Candidates removed by any filter.
    pub filtered_candidates: Vec<C>,
    /// Final ranked output.
    pub selected_candidates: Vec<C>,
}

#[async_trait]
pub trait CandidatePipeline<Q, C>: Send + Sync
where
    Q: HasRequestId + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<Q>>];
    fn sources(&self) -> &[Box<dyn Source<Q, C>>];
    fn hydrators(&self) -> &[Box<dyn Hydrator<Q, C>>];
    fn filters(&self) -> &[Box<dyn Filter<Q, C>>];
    fn scorers(&self) -> &[Box<dyn Scorer<Q, C>>];
    fn selector(&self) -> &dyn Selector<Q, C>;
    fn post_selection_hydrators(&self) -> &[Box<dyn Hydrator<Q, C>>];
    fn post_selection_filters(&self) -> &[Box<dyn Filter<Q, C>>];
    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<Q, C>>>>;
    fn result_size(&self) -> usize;

    async fn execute(&self, query: Q) -> PipelineResult<Q, C> {
        let query = self.hydrate_query(query).await;
        let request_id = query.request_id().to_string();

        let retrieved = self.fetch_candidates(&query).await;
        let mut candidates = run_hydrators(self.hydrators(), &query, retrieved.clone()).await;

        let (kept, mut filtered) = run_filters(self.filters(), &query, candidates).await;
        candidates = run_scorers(self.scorers(), &query, kept).await;

        let selector = self.selector();
        if selector.enable(&query) {
            candidates = selector.select(&query, candidates);
        }

        candidates = run_hydrators(self.post_selection_hydrators(), &query, candidates).await;
        let (mut selected, removed) =
            run_filters(self.post_selection_filters(), &query, candidates).await;
        filtered.extend(removed);
        selected.truncate(self.result_size());

        log::info!(
            "request_id={} retrieved={} filtered={} selected={}",
            request_id,
            retrieved.len(),
            filtered.len(),
            selected.len()
        );

        let query = Arc::new(query);
        self.run_side_effects(Arc::clone(&query), &selected).await;

        PipelineResult {
            query,
            retrieved_candidates: retrieved,
            filtered_candidates: filtered,
            selected_candidates: selected,
        }
    }

    async fn hydrate_query(&self, query: Q) -> Q {
        let mut query = query;
        for hydrator in self.query_hydrators() {
            if !hydrator.enable(&query) {
                continue;
            }
            match hydrator.hydrate(&query).await {
                Ok(hydrated) => hydrator.update(&mut query, hydrated),
                Err(err) => log::warn!(
                    "request_id={} query hydrator {} failed: {}",
                    query.request_id(),
                    hydrator.name(),
                    err
                ),
            }
        }
        query
    }

    async fn fetch_candidates(&self, query: &Q) -> Vec<C> {
        let mut candidates = Vec::new();
        for source in self.sources() {
            if !source.enable(query) {
                continue;
            }
            match source.get_candidates(query).await {
                Ok(found) => {
                    log::debug!(
                        "request_id={} source {} returned {} candidates",
                        query.request_id(),
                        source.name(),
                        found.len()
                    );
                    candidates.extend(found);
                }
                Err(err) => log::warn!(
                    "request_id={} source {} failed: {}",
                    query.request_id(),
                    source.name(),
                    err
                ),
            }
        }
        candidates
    }

    async fn run_side_effects(&self, query: Arc<Q>, selected: &[C]) {
        let side_effects = self.side_effects();
        let input = Arc::new(SideEffectInput {
            query: Arc::clone(&query),
            selected_candidates: selected.to_vec(),
        });
        for effect in side_effects.iter() {
            if !effect.enable(Arc::clone(&query)) {
                continue;
            }
            if let Err(err) = effect.run(Arc::clone(&input)).await {
                log::warn!(
                    "request_id={} side effect {} failed: {}",
                    query.request_id(),
                    effect.name(),
                    err
                );
            }
        }
    }
}

async fn run_hydrators<Q, C>(hydrators: &[Box<dyn Hydrator<Q, C>>], query: &Q, mut candidates: Vec<C>) -> Vec<C>
where
    Q: HasRequestId + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    for hydrator in hydrators {
        if !hydrator.enable(query) {
            continue;
        }
        match hydrator.hydrate(query, &candidates).await {
            Ok(hydrated) if hydrated.len() == candidates.len() => {
                for (candidate, partial) in candidates.iter_mut().zip(hydrated) {
                    hydrator.update(candidate, partial);
                }
            }
            Ok(hydrated) => log::warn!(
                "request_id={} hydrator {} returned {} candidates for {} inputs, skipped",
                query.request_id(),
                hydrator.name(),
                hydrated.len(),
                candidates.len()
            ),
            Err(err) => log::warn!(
                "request_id={} hydrator {} failed: {}",
                query.request_id(),
                hydrator.name(),
                err
            ),
        }
    }
    candidates
}

async fn run_filters<Q, C>(filters: &[Box<dyn Filter<Q, C>>], query: &Q, candidates: Vec<C>) -> (Vec<C>, Vec<C>)
where
    Q: HasRequestId + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    let mut kept = candidates;
    let mut removed = Vec::new();
    for filter in filters {
        if !filter.enable(query) {
            continue;
        }
        // The filter consumes its input; `kept` survives an error.
        match filter.filter(query, kept.clone()).await {
            Ok(result) => {
                kept = result.kept;
                removed.extend(result.removed);
            }
            Err(err) => log::warn!(
                "request_id={} filter {} failed: {}",
                query.request_id(),
                filter.name(),
                err
            ),
        }
    }
    (kept, removed)
}

async fn run_scorers<Q, C>(scorers: &[Box<dyn Scorer<Q, C>>], query: &Q, mut candidates: Vec<C>) -> Vec<C>
where
    Q: HasRequestId + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    for scorer in scorers {
        if !scorer.enable(query) {
            continue;
        }
        match scorer.score(query, &candidates).await {
            Ok(scored) if scored.len() == candidates.len() => {
                for (candidate, partial) in candidates.iter_mut().zip(scored) {
                    scorer.update(candidate, partial);
                }
            }
            Ok(scored) => log::warn!(
                "request_id={} scorer {} returned {} scores for {} inputs, skipped",
                query.request_id(),
                scorer.name(),
                scored.len(),
                candidates.len()
            ),
            Err(err) => log::warn!(
                "request_id={} scorer {} failed: {}",
                query.request_id(),
                scorer.name(),
                err
            ),
        }
    }
    candidates
}
