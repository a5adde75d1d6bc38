use async_trait::async_trait;
use std::sync::Arc;

use greenshelf_core::GreenShelfService;

use crate::candidate_pipeline::CandidatePipeline;
use crate::components::digest_log_side_effect::DigestLogSideEffect;
use crate::components::no_action_filter::NoActionFilter;
use crate::components::shelf_action_hydrator::ShelfActionHydrator;
use crate::components::shelf_diversity_scorer::ShelfDiversityScorer;
use crate::components::shelf_pricing_source::ShelfPricingSource;
use crate::components::shelf_scope_query_hydrator::ShelfScopeQueryHydrator;
use crate::components::status_filter::StatusFilter;
use crate::components::top_k_selector::TopKSelector;
use crate::components::waste_risk_scorer::WasteRiskScorer;
use crate::filter::Filter;
use crate::hydrator::Hydrator;
use crate::query_hydrator::QueryHydrator;
use crate::scorer::Scorer;
use crate::selector::Selector;
use crate::side_effect::SideEffect;
use crate::source::Source;
use crate::types::{DigestQuery, MarkdownCandidate};

/// Default number of actions in a digest.
pub const DEFAULT_DIGEST_SIZE: usize = 10;

/// Store-wide markdown digest: which batches to mark down, donate or pull
/// today, most valuable first.
///
/// 1. ShelfScopeQueryHydrator resolves shelves and the reference day
/// 2. ShelfPricingSource refreshes (optionally) and prices every batch
/// 3. ShelfActionHydrator assigns the floor action and value at risk
/// 4. NoActionFilter drops full-price fresh stock; StatusFilter applies
///    the query's status restriction
/// 5. WasteRiskScorer scores, ShelfDiversityScorer spreads across shelves
/// 6. TopKSelector keeps the top N
/// 7. DigestLogSideEffect logs the outcome
pub struct MarkdownDigestPipeline {
    query_hydrators: Vec<Box<dyn QueryHydrator<DigestQuery>>>,
    sources: Vec<Box<dyn Source<DigestQuery, MarkdownCandidate>>>,
    hydrators: Vec<Box<dyn Hydrator<DigestQuery, MarkdownCandidate>>>,
    filters: Vec<Box<dyn Filter<DigestQuery, MarkdownCandidate>>>,
    scorers: Vec<Box<dyn Scorer<DigestQuery, MarkdownCandidate>>>,
    selector: TopKSelector,
    post_selection_hydrators: Vec<Box<dyn Hydrator<DigestQuery, MarkdownCandidate>>>,
    post_selection_filters: Vec<Box<dyn Filter<DigestQuery, MarkdownCandidate>>>,
    side_effects: Arc<Vec<Box<dyn SideEffect<DigestQuery, MarkdownCandidate>>>>,
    result_size: usize,
}

impl MarkdownDigestPipeline {
    pub fn new(service: Arc<GreenShelfService>) -> Self {
        Self::with_size(service, DEFAULT_DIGEST_SIZE)
    }

    pub fn with_size(service: Arc<GreenShelfService>, result_size: usize) -> Self {
        let query_hydrators: Vec<Box<dyn QueryHydrator<DigestQuery>>> =
            vec![Box::new(ShelfScopeQueryHydrator::new(Arc::clone(&service)))];

        let sources: Vec<Box<dyn Source<DigestQuery, MarkdownCandidate>>> =
            vec![Box::new(ShelfPricingSource::new(service))];

        let hydrators: Vec<Box<dyn Hydrator<DigestQuery, MarkdownCandidate>>> =
            vec![Box::new(ShelfActionHydrator)];

        let filters: Vec<Box<dyn Filter<DigestQuery, MarkdownCandidate>>> =
            vec![Box::new(NoActionFilter), Box::new(StatusFilter)];

        let scorers: Vec<Box<dyn Scorer<DigestQuery, MarkdownCandidate>>> = vec![
            Box::new(WasteRiskScorer),
            Box::new(ShelfDiversityScorer::default()),
        ];

        let side_effects: Arc<Vec<Box<dyn SideEffect<DigestQuery, MarkdownCandidate>>>> =
            Arc::new(vec![Box::new(DigestLogSideEffect)]);

        Self {
            query_hydrators,
            sources,
            hydrators,
            filters,
            scorers,
            selector: TopKSelector { k: result_size },
            post_selection_hydrators: Vec::new(),
            post_selection_filters: Vec::new(),
            side_effects,
            result_size,
        }
    }
}

#[async_trait]
impl CandidatePipeline<DigestQuery, MarkdownCandidate> for MarkdownDigestPipeline {
    fn query_hydrators(&self) -> &[Box<dyn QueryHydrator<DigestQuery>>] {
        &self.query_hydrators
    }

    fn sources(&self) -> &[Box<dyn Source<DigestQuery, MarkdownCandidate>>] {
        &self.sources
    }

    fn hydrators(&self) -> &[Box<dyn Hydrator<DigestQuery, MarkdownCandidate>>] {
        &self.hydrators
    }

    fn filters(&self) -> &[Box<dyn Filter<DigestQuery, MarkdownCandidate>>] {
        &self.filters
    }

    fn scorers(&self) -> &[Box<dyn Scorer<DigestQuery, MarkdownCandidate>>] {
        &self.scorers
    }

    fn selector(&self) -> &dyn Selector<DigestQuery, MarkdownCandidate> {
        &self.selector
    }

    fn post_selection_hydrators(&self) -> &[Box<dyn Hydrator<DigestQuery, MarkdownCandidate>>] {
        &self.post_selection_hydrators
    }

    fn post_selection_filters(&self) -> &[Box<dyn Filter<DigestQuery, MarkdownCandidate>>] {
        &self.post_selection_filters
    }

    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<DigestQuery, MarkdownCandidate>>>> {
        Arc::clone(&self.side_effects)
    }

    fn result_size(&self) -> usize {
        self.result_size
    }
}
