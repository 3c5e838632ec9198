use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use energy_client::analytics::SegmentFilter;

use crate::{
    report::{build_report, DashboardReport, ReportContext},
    snapshot::Snapshot,
};

/// Read-only state shared by every request. Each request recomputes the
/// whole report from the snapshot.
#[derive(Clone)]
pub struct ReportState {
    snapshot: Arc<Snapshot>,
    flat_rate_per_kwh: f64,
    default_filter: SegmentFilter,
}

impl ReportState {
    pub fn new(snapshot: Snapshot, flat_rate_per_kwh: f64, default_filter: SegmentFilter) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            flat_rate_per_kwh,
            default_filter,
        }
    }
}

/// `segments` is a comma-separated list. Absent means the configured default;
/// present but empty selects no segment at all.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ReportQuery {
    segments: Option<String>,
}

impl ReportQuery {
    fn filter(&self, default: &SegmentFilter) -> SegmentFilter {
        match &self.segments {
            None => default.clone(),
            Some(list) => SegmentFilter::only(list.split(',').map(str::trim).filter(|s| !s.is_empty())),
        }
    }
}

pub fn router(state: ReportState) -> Router {
    Router::new()
        .route("/report", get(report_handler))
        .route("/segments", get(segments_handler))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

pub async fn serve(bind_addr: &str, state: ReportState) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("invalid server bind address '{bind_addr}'"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind report listener on {addr}"))?;

    tracing::info!(%addr, "report server listening");
    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}

async fn report_handler(
    State(state): State<ReportState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<DashboardReport>, (StatusCode, String)> {
    metrics::counter!("http_report_requests_total").increment(1);

    let ctx = ReportContext {
        snapshot: &state.snapshot,
        flat_rate_per_kwh: state.flat_rate_per_kwh,
        filter: query.filter(&state.default_filter),
    };

    build_report(&ctx).map(Json).map_err(|e| {
        tracing::error!(error = %e, "report build failed");
        metrics::counter!("http_report_failed_total").increment(1);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

async fn segments_handler(State(state): State<ReportState>) -> Json<Vec<String>> {
    Json(state.snapshot.segments())
}
