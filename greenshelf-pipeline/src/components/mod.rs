pub mod digest_log_side_effect;
pub mod no_action_filter;
pub mod shelf_action_hydrator;
pub mod shelf_diversity_scorer;
pub mod shelf_pricing_source;
pub mod shelf_scope_query_hydrator;
pub mod status_filter;
pub mod top_k_selector;
pub mod waste_risk_scorer;
