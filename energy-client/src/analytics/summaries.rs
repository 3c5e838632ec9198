use std::collections::BTreeMap;

use serde::Serialize;

use super::ScoredTable;
use crate::domain::EnrichedReading;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyUsage {
    pub hour: u8,
    pub household_segment: String,
    pub avg_usage_kwh: f64,
    pub readings: usize,
}

/// Per-segment totals under both tariffs.
///
/// `cost_agile` only sums readings that had a price; `unpriced_readings`
/// counts the ones that did not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSummary {
    pub household_segment: String,
    pub cost_agile: f64,
    pub cost_flat: f64,
    pub unpriced_readings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub household_segment: String,
    pub totals: Vec<f64>,
}

/// Mean usage per (hour of day, segment), ordered by hour then segment.
pub fn hourly_usage<'a, I>(rows: I) -> Vec<HourlyUsage>
where
    I: IntoIterator<Item = &'a EnrichedReading>,
{
    let mut groups: BTreeMap<(u8, &str), (f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = groups
            .entry((row.reading.hour(), row.reading.household_segment.as_str()))
            .or_insert((0.0, 0));
        entry.0 += row.reading.usage_kwh;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((hour, segment), (total, count))| HourlyUsage {
            hour,
            household_segment: segment.to_string(),
            avg_usage_kwh: total / count as f64,
            readings: count,
        })
        .collect()
}

pub fn cost_summary<'a, I>(rows: I) -> Vec<CostSummary>
where
    I: IntoIterator<Item = &'a EnrichedReading>,
{
    let mut groups: BTreeMap<&str, CostSummary> = BTreeMap::new();
    for row in rows {
        let segment = row.reading.household_segment.as_str();
        let summary = groups.entry(segment).or_insert_with(|| CostSummary {
            household_segment: segment.to_string(),
            cost_agile: 0.0,
            cost_flat: 0.0,
            unpriced_readings: 0,
        });
        match row.cost_agile {
            Some(cost) => summary.cost_agile += cost,
            None => summary.unpriced_readings += 1,
        }
        summary.cost_flat += row.cost_flat;
    }
    groups.into_values().collect()
}

/// Sum of every score column per segment, each column independently.
pub fn score_summary(table: &ScoredTable) -> Vec<ScoreSummary> {
    let width = table.columns.len();
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in &table.rows {
        let totals = groups
            .entry(row.enriched.reading.household_segment.as_str())
            .or_insert_with(|| vec![0.0; width]);
        for (total, score) in totals.iter_mut().zip(&row.scores) {
            *total += score;
        }
    }

    groups
        .into_iter()
        .map(|(segment, totals)| ScoreSummary {
            household_segment: segment.to_string(),
            totals,
        })
        .collect()
}
