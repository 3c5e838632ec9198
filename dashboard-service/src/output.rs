//! Text, JSON and CSV renderings of a `DashboardReport`.

use anyhow::Result;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use serde_json::json;
use time::macros::format_description;

use crate::report::DashboardReport;

const TIMESTAMP_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportView {
    /// Every view below, one after another
    All,
    /// Hourly average usage by household segment
    Hourly,
    /// Agile vs flat cost by household segment
    Cost,
    /// Flexibility event scores by household segment
    Flex,
    /// The scored reading table itself
    Readings,
}

impl ReportView {
    fn expand(self) -> Vec<ReportView> {
        match self {
            Self::All => vec![Self::Hourly, Self::Cost, Self::Flex],
            other => vec![other],
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::All => "Report",
            Self::Hourly => "Hourly Average Usage by Household Segment",
            Self::Cost => "Cost Comparison (Agile vs Flat Rate)",
            Self::Flex => "Flexibility Event Scores",
            Self::Readings => "Scored Readings",
        }
    }
}

pub fn render(report: &DashboardReport, view: ReportView, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report, view)),
        OutputFormat::Json => render_json(report, view),
        OutputFormat::Csv => render_csv(report, view),
    }
}

fn header(cells: impl IntoIterator<Item = String>) -> Vec<Cell> {
    cells
        .into_iter()
        .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
        .collect()
}

/// Tabular rows for one view: column names, then stringified cells.
/// Missing values are `None` so each format can spell them its own way.
fn view_rows(report: &DashboardReport, view: ReportView) -> (Vec<String>, Vec<Vec<Option<String>>>) {
    let s = |v: &str| Some(v.to_string());
    let f = |v: f64| Some(format!("{v:.4}"));

    match view {
        ReportView::Hourly => (
            vec!["hour".into(), "household_segment".into(), "avg_usage_kwh".into(), "readings".into()],
            report
                .hourly_usage
                .iter()
                .map(|h| vec![Some(h.hour.to_string()), s(h.household_segment.as_str()), f(h.avg_usage_kwh), Some(h.readings.to_string())])
                .collect(),
        ),
        ReportView::Cost => (
            vec!["household_segment".into(), "cost_agile".into(), "cost_flat".into(), "unpriced_readings".into()],
            report
                .cost_summary
                .iter()
                .map(|c| {
                    vec![
                        s(c.household_segment.as_str()),
                        f(c.cost_agile),
                        f(c.cost_flat),
                        Some(c.unpriced_readings.to_string()),
                    ]
                })
                .collect(),
        ),
        ReportView::Flex => {
            let mut columns = vec!["household_segment".to_string()];
            columns.extend(report.scored.columns.iter().cloned());
            let rows = report
                .score_summary
                .iter()
                .map(|sc| {
                    let mut row = vec![s(sc.household_segment.as_str())];
                    row.extend(sc.totals.iter().map(|t| f(*t)));
                    row
                })
                .collect();
            (columns, rows)
        }
        ReportView::Readings => {
            let mut columns: Vec<String> = ["timestamp", "household_segment", "usage_kwh", "price_per_kwh", "cost_agile", "cost_flat"]
                .into_iter()
                .map(String::from)
                .collect();
            columns.extend(report.scored.columns.iter().cloned());
            let rows = report
                .scored
                .rows
                .iter()
                .map(|r| {
                    let e = &r.enriched;
                    let mut row = vec![
                        e.reading.timestamp.format(TIMESTAMP_FORMAT).ok(),
                        s(e.reading.household_segment.as_str()),
                        f(e.reading.usage_kwh),
                        e.price_per_kwh.and_then(f),
                        e.cost_agile.and_then(f),
                        f(e.cost_flat),
                    ];
                    row.extend(r.scores.iter().map(|v| f(*v)));
                    row
                })
                .collect();
            (columns, rows)
        }
        ReportView::All => (Vec::new(), Vec::new()),
    }
}

pub fn render_text(report: &DashboardReport, view: ReportView) -> String {
    let mut output = String::new();

    for v in view.expand() {
        let (columns, rows) = view_rows(report, v);
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(header(columns));
        for row in rows {
            table.add_row(row.into_iter().map(|c| c.unwrap_or_else(|| "-".to_string())));
        }

        output.push_str(&format!("=== {} ===\n", v.title()));
        output.push_str(&table.to_string());
        output.push_str("\n\n");
    }

    let unpriced: usize = report.cost_summary.iter().map(|c| c.unpriced_readings).sum();
    output.push_str(&format!(
        "Readings: {} | Flat rate: {:.2} per kWh | Unpriced readings: {}\n",
        report.scored.rows.len(),
        report.flat_rate_per_kwh,
        unpriced
    ));

    output
}

pub fn render_json(report: &DashboardReport, view: ReportView) -> Result<String> {
    let value = match view {
        ReportView::All => serde_json::to_value(report)?,
        ReportView::Hourly => json!({ "hourly_usage": report.hourly_usage }),
        ReportView::Cost => json!({ "cost_summary": report.cost_summary }),
        ReportView::Flex => json!({
            "columns": report.scored.columns,
            "score_summary": report.score_summary,
        }),
        ReportView::Readings => serde_json::to_value(&report.scored)?,
    };
    let mut out = serde_json::to_string_pretty(&value)?;
    out.push('\n');
    Ok(out)
}

/// CSV output; several views are written as consecutive tables separated by
/// a blank line. Missing values are empty fields.
pub fn render_csv(report: &DashboardReport, view: ReportView) -> Result<String> {
    let mut sections = Vec::new();

    for v in view.expand() {
        let (columns, rows) = view_rows(report, v);
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&columns)?;
        for row in rows {
            wtr.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
        }
        let bytes = wtr.into_inner().map_err(|e| anyhow::anyhow!("failed to flush csv: {e}"))?;
        sections.push(String::from_utf8(bytes)?);
    }

    Ok(sections.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{build_report, ReportContext};
    use crate::snapshot::Snapshot;
    use energy_client::analytics::SegmentFilter;
    use energy_client::domain::{FlexibilityEvent, PriceQuote, UsageReading};
    use time::macros::datetime;

    fn report() -> DashboardReport {
        let snapshot = Snapshot::new(
            vec![
                UsageReading::new(datetime!(2024-01-01 12:00), "flat", 2.0),
                UsageReading::new(datetime!(2024-01-01 14:05), "flat", 1.5),
            ],
            vec![PriceQuote::from_minor_units(datetime!(2024-01-01 13:30), 24.0)],
            vec![FlexibilityEvent {
                event_type: "peak_shift".to_string(),
                start_hour: 13,
                end_hour: 16,
                max_flexibility_kwh: 1.0,
                price_per_kwh: 0.10,
            }],
        );
        build_report(&ReportContext {
            snapshot: &snapshot,
            flat_rate_per_kwh: 0.20,
            filter: SegmentFilter::All,
        })
        .unwrap()
    }

    #[test]
    fn csv_leaves_missing_agile_values_empty() {
        let out = render_csv(&report(), ReportView::Readings).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,household_segment,usage_kwh,price_per_kwh,cost_agile,cost_flat,score_peak_shift"
        );
        let first = lines.next().unwrap();
        assert!(first.contains(",flat,2.0000,,,0.4000,0.0000"), "{first}");
    }

    #[test]
    fn csv_all_views_are_separated_by_blank_lines() {
        let out = render_csv(&report(), ReportView::All).unwrap();
        assert_eq!(out.matches("\n\n").count(), 2);
        assert!(out.starts_with("hour,household_segment,avg_usage_kwh,readings"));
    }

    #[test]
    fn json_view_contains_only_requested_table() {
        let out = render_json(&report(), ReportView::Cost).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["cost_summary"][0]["household_segment"], "flat");
        assert_eq!(value["cost_summary"][0]["unpriced_readings"], 1);
        assert!(value.get("hourly_usage").is_none());

        // Text and CSV headers use the same field names as JSON.
        let csv = render_csv(&report(), ReportView::Cost).unwrap();
        assert!(csv.starts_with("household_segment,cost_agile,cost_flat,unpriced_readings"));
    }

    #[test]
    fn text_shows_missing_price_as_dash() {
        let out = render_text(&report(), ReportView::Readings);
        assert!(out.contains("Scored Readings"));
        assert!(out.contains("Unpriced readings: 1"));
        assert!(out.contains(" - "));
    }
}
