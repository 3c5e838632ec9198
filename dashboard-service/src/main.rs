use anyhow::Result;
use dashboard_service::{
    config::AppConfig,
    metrics_server, observability,
    report_server::{self, ReportState},
    Snapshot,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    // Inputs are static snapshots: load once, serve every request from memory.
    let snapshot = Snapshot::load(&cfg.inputs).await?;

    let state = ReportState::new(snapshot, cfg.tariff.flat_rate_per_kwh, cfg.report.segment_filter());
    report_server::serve(&cfg.server.bind_addr, state).await
}
