use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dashboard_service::{
    build_report,
    config::AppConfig,
    observability,
    output::{self, OutputFormat, ReportView},
    ReportContext, Snapshot,
};
use energy_client::analytics::SegmentFilter;

/// Print the household energy report once and exit.
///
/// Usage:
///   energy_report [--config dashboard-config.toml] [--segment flat]... [--view cost] [--format json]
#[derive(Parser)]
#[command(name = "energy_report")]
#[command(author, version, about = "Agile vs flat cost and flexibility scores per household segment")]
struct Cli {
    /// Config file; defaults to $DASHBOARD_CONFIG or ./dashboard-config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Household segment to include (repeatable). Defaults to the configured selection.
    #[arg(long = "segment", value_name = "SEGMENT")]
    segments: Vec<String>,

    /// Select no segments at all, producing an empty report
    #[arg(long, conflicts_with = "segments")]
    no_segments: bool,

    /// Flat tariff override, currency units per kWh
    #[arg(long)]
    flat_rate: Option<f64>,

    #[arg(long, value_enum, default_value = "all")]
    view: ReportView,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl Cli {
    fn segment_filter(&self, cfg: &AppConfig) -> SegmentFilter {
        if self.no_segments {
            SegmentFilter::only(Vec::<String>::new())
        } else if self.segments.is_empty() {
            cfg.report.segment_filter()
        } else {
            SegmentFilter::only(self.segments.iter().cloned())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::load()?,
    };

    let snapshot = Snapshot::load(&cfg.inputs).await?;
    let ctx = ReportContext {
        snapshot: &snapshot,
        flat_rate_per_kwh: cli.flat_rate.unwrap_or(cfg.tariff.flat_rate_per_kwh),
        filter: cli.segment_filter(&cfg),
    };

    let report = build_report(&ctx)?;
    print!("{}", output::render(&report, cli.view, cli.format)?);

    Ok(())
}
