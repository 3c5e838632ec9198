use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use time::PrimitiveDateTime;

use crate::{
    domain::{EnrichedReading, PriceQuote, UsageReading},
    AnalyticsError,
};

/// Flat tariff used as the comparison baseline, in currency units per kWh.
pub const DEFAULT_FLAT_RATE_PER_KWH: f64 = 0.20;

/// Which household segments take part in a report.
///
/// `Only` with an empty set selects nothing; it is not the same as `All`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "segments", rename_all = "snake_case")]
pub enum SegmentFilter {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl SegmentFilter {
    pub fn only<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(segments.into_iter().map(Into::into).collect())
    }

    pub fn admits(&self, segment: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => set.contains(segment),
        }
    }
}

fn ensure_ascending<T>(
    items: &[T],
    key: impl Fn(&T) -> PrimitiveDateTime,
    series: &'static str,
) -> Result<(), AnalyticsError> {
    match items.windows(2).position(|w| key(&w[0]) > key(&w[1])) {
        Some(i) => Err(AnalyticsError::UnorderedInput { series, index: i + 1 }),
        None => Ok(()),
    }
}

/// Backward as-of join of readings onto the agile tariff, plus both costs.
///
/// Both inputs must be ascending by time. Each reading takes the quote with
/// the greatest `valid_from <= timestamp`; among equal `valid_from` the last
/// one in sequence wins. Output has the same length and order as `readings`.
pub fn reconcile(
    readings: &[UsageReading],
    quotes: &[PriceQuote],
    flat_rate_per_kwh: f64,
) -> Result<Vec<EnrichedReading>, AnalyticsError> {
    ensure_ascending(readings, |r| r.timestamp, "usage readings")?;
    ensure_ascending(quotes, |q| q.valid_from, "price quotes")?;

    let mut in_effect: Option<&PriceQuote> = None;
    let mut upcoming = quotes.iter().peekable();

    let enriched = readings
        .iter()
        .map(|reading| {
            while let Some(next) = upcoming.next_if(|q| q.valid_from <= reading.timestamp) {
                in_effect = Some(next);
            }
            EnrichedReading::price(
                reading.clone(),
                in_effect.map(|q| q.price_per_kwh),
                flat_rate_per_kwh,
            )
        })
        .collect();

    Ok(enriched)
}

pub fn filter_segments(rows: Vec<EnrichedReading>, filter: &SegmentFilter) -> Vec<EnrichedReading> {
    match filter {
        SegmentFilter::All => rows,
        SegmentFilter::Only(_) => rows
            .into_iter()
            .filter(|r| filter.admits(&r.reading.household_segment))
            .collect(),
    }
}

/// Segments in order of first appearance.
pub fn distinct_segments(readings: &[UsageReading]) -> Vec<String> {
    let mut seen = HashSet::new();
    readings
        .iter()
        .filter(|r| seen.insert(r.household_segment.as_str()))
        .map(|r| r.household_segment.clone())
        .collect()
}
