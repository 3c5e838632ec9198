use std::time::Instant;

use energy_client::{
    analytics::{
        cost_summary, filter_segments, hourly_usage, reconcile, score_summary, CostSummary, FlexibilityScorer,
        HourlyUsage, ScoreSummary, ScoredTable, SegmentFilter,
    },
    AnalyticsError,
};
use serde::Serialize;

use crate::snapshot::Snapshot;

/// Everything one report build depends on. Nothing else is read.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub snapshot: &'a Snapshot,
    pub flat_rate_per_kwh: f64,
    pub filter: SegmentFilter,
}

/// The tables behind the three dashboard views, plus the scored working set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    /// All segments in the snapshot, regardless of the filter.
    pub segments: Vec<String>,
    pub filter: SegmentFilter,
    pub flat_rate_per_kwh: f64,
    pub scored: ScoredTable,
    pub hourly_usage: Vec<HourlyUsage>,
    pub cost_summary: Vec<CostSummary>,
    pub score_summary: Vec<ScoreSummary>,
}

/// Join, filter, score and summarise. Recomputes everything from the snapshot.
pub fn build_report(ctx: &ReportContext<'_>) -> Result<DashboardReport, AnalyticsError> {
    let started = Instant::now();
    let snapshot = ctx.snapshot;

    let enriched = reconcile(snapshot.readings(), snapshot.quotes(), ctx.flat_rate_per_kwh)?;
    let working_set = filter_segments(enriched, &ctx.filter);
    let scored = FlexibilityScorer::new(snapshot.events()).score(working_set);

    let enriched_rows = || scored.rows.iter().map(|r| &r.enriched);
    let hourly_usage = hourly_usage(enriched_rows());
    let cost_summary = cost_summary(enriched_rows());
    let score_summary = score_summary(&scored);

    let unpriced: usize = cost_summary.iter().map(|c| c.unpriced_readings).sum();
    if unpriced > 0 {
        tracing::warn!(unpriced, "readings precede every price quote; agile cost left missing");
    }

    metrics::counter!("report_builds_total").increment(1);
    metrics::counter!("report_unpriced_readings_total").increment(unpriced as u64);
    metrics::histogram!("report_build_seconds").record(started.elapsed().as_secs_f64());

    tracing::debug!(
        rows = scored.rows.len(),
        score_columns = scored.columns.len(),
        segments = cost_summary.len(),
        "report built"
    );

    Ok(DashboardReport {
        segments: snapshot.segments(),
        filter: ctx.filter.clone(),
        flat_rate_per_kwh: ctx.flat_rate_per_kwh,
        scored,
        hourly_usage,
        cost_summary,
        score_summary,
    })
}
