//! Candidate pipeline for the store-wide markdown digest.
//!
//! The stage traits are generic over query and candidate types; the
//! concrete components and the `MarkdownDigestPipeline` wiring work on
//! priced shelf batches.

pub mod candidate_pipeline;
pub mod components;
pub mod filter;
pub mod hydrator;
pub mod inventory_loader;
pub mod pipelines;
pub mod query_hydrator;
pub mod scorer;
pub mod selector;
pub mod side_effect;
pub mod source;
pub mod types;
pub mod util;

pub use candidate_pipeline::{CandidatePipeline, PipelineResult};
pub use pipelines::markdown_digest::MarkdownDigestPipeline;
pub use types::{DigestQuery, MarkdownCandidate, ShelfAction};
