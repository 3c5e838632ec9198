pub mod flexibility;
pub mod reconciliation;
pub mod summaries;

pub use flexibility::{FlexibilityScorer, ScoredTable};
pub use reconciliation::{distinct_segments, filter_segments, reconcile, SegmentFilter, DEFAULT_FLAT_RATE_PER_KWH};
pub use summaries::{cost_summary, hourly_usage, score_summary, CostSummary, HourlyUsage, ScoreSummary};
