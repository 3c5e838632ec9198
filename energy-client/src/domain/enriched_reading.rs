use serde::Serialize;

use super::UsageReading;

/// A usage reading priced under both the agile and the flat tariff.
///
/// `price_per_kwh` and `cost_agile` are `None` when the reading precedes every
/// known quote. They are never defaulted to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedReading {
    #[serde(flatten)]
    pub reading: UsageReading,
    pub price_per_kwh: Option<f64>,
    pub cost_agile: Option<f64>,
    pub cost_flat: f64,
}

impl EnrichedReading {
    pub fn price(reading: UsageReading, price_per_kwh: Option<f64>, flat_rate_per_kwh: f64) -> Self {
        let cost_agile = price_per_kwh.map(|p| reading.usage_kwh * p);
        let cost_flat = reading.usage_kwh * flat_rate_per_kwh;
        Self {
            reading,
            price_per_kwh,
            cost_agile,
            cost_flat,
        }
    }
}

/// An enriched reading with one reward per score column, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredReading {
    #[serde(flatten)]
    pub enriched: EnrichedReading,
    pub scores: Vec<f64>,
}
