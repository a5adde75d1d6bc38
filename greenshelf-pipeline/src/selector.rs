use std::cmp::Ordering;

use crate::util;

/// Orders scored candidates and keeps the best ones.
pub trait Selector<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Sort key; higher is better.
    fn score(&self, candidate: &C) -> f64;

    /// Maximum number of candidates to keep, `None` for all.
    fn size(&self) -> Option<usize> {
        None
    }

    fn select(&self, _query: &Q, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = self.sort(candidates);
        if let Some(limit) = self.size() {
            sorted.truncate(limit);
        }
        sorted
    }

    /// Stable descending sort. NaN scores sink below everything else.
    fn sort(&self, mut candidates: Vec<C>) -> Vec<C> {
        candidates.sort_by(|a, b| {
            let (sa, sb) = (self.score(a), self.score(b));
            match (sa.is_nan(), sb.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => sb.partial_cmp(&sa).unwrap_or(Ordering::Equal),
            }
        });
        candidates
    }

    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
