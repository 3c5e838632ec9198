pub mod config;
pub mod metrics_server;
pub mod observability;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod report_server;
pub mod sinks;
pub mod snapshot;
pub mod sources;
pub mod transform;

pub use pipeline::{Envelope, Pipeline};
pub use report::{build_report, DashboardReport, ReportContext};
pub use snapshot::Snapshot;
