// src/analysis/mod.rs

//! Performance analysis over the question log.
//!
//! Two independent signals coexist here:
//! * the windowed [`TopicAnalyzer`] feeding the [`RecommendationEngine`], and
//! * the recency-based [`AutoSuggestionTrigger`].
//!
//! Their thresholds are separate on purpose.

pub mod analyzer;
pub mod auto_suggest;
pub mod recommendation;

pub use analyzer::TopicAnalyzer;
pub use auto_suggest::AutoSuggestionTrigger;
pub use recommendation::RecommendationEngine;

/// accuracy = correct / total * 100, or `None` when nothing was attempted.
pub(crate) fn accuracy(correct: u32, total: u32) -> Option<f64> {
    (total > 0).then(|| f64::from(correct) / f64::from(total) * 100.0)
}
