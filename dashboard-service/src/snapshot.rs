use std::sync::Arc;

use energy_client::{
    analytics::distinct_segments,
    domain::{FlexibilityEvent, PriceQuote, UsageReading},
};

use crate::{
    config::InputsConfig,
    pipeline::{Pipeline, PipelineError, Source, Transform},
    sinks::CollectSink,
    sources::{AgilePriceFileSource, FlexibilityEventFileSource, UsageCsvFileSource},
    transform,
};

/// The three static inputs, loaded once and never mutated.
///
/// Readings and quotes are stably sorted by time on construction, so equal
/// timestamps keep their file order.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    readings: Vec<UsageReading>,
    quotes: Vec<PriceQuote>,
    events: Vec<FlexibilityEvent>,
}

impl Snapshot {
    pub fn new(mut readings: Vec<UsageReading>, mut quotes: Vec<PriceQuote>, events: Vec<FlexibilityEvent>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        quotes.sort_by_key(|q| q.valid_from);
        Self {
            readings,
            quotes,
            events,
        }
    }

    pub async fn load(inputs: &InputsConfig) -> Result<Self, PipelineError> {
        let delimiter = inputs
            .delimiter_byte()
            .map_err(|e| PipelineError::Source(e.to_string()))?;

        let usage = UsageCsvFileSource::new(&inputs.usage_csv, inputs.segment_column.clone()).with_delimiter(delimiter);
        let prices = AgilePriceFileSource::new(&inputs.prices_json);
        let events = FlexibilityEventFileSource::new(&inputs.events_json);

        let (readings, quotes, events) = tokio::try_join!(
            collect::<UsageReading, _>(usage, Arc::new(transform::UsageReadingValidation)),
            collect::<PriceQuote, _>(prices, Arc::new(transform::PriceQuoteValidation)),
            collect::<FlexibilityEvent, _>(events, Arc::new(transform::FlexibilityEventValidation)),
        )?;

        let snapshot = Self::new(readings, quotes, events);
        tracing::info!(
            readings = snapshot.readings.len(),
            quotes = snapshot.quotes.len(),
            events = snapshot.events.len(),
            segments = snapshot.segments().len(),
            "input snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn readings(&self) -> &[UsageReading] {
        &self.readings
    }

    pub fn quotes(&self) -> &[PriceQuote] {
        &self.quotes
    }

    pub fn events(&self) -> &[FlexibilityEvent] {
        &self.events
    }

    /// Every household segment present, in order of first appearance.
    pub fn segments(&self) -> Vec<String> {
        distinct_segments(&self.readings)
    }
}

async fn collect<T, S>(source: S, validation: Arc<dyn Transform<T, T> + Send + Sync>) -> Result<Vec<T>, PipelineError>
where
    T: Send + 'static,
    S: Source<T> + Send + Sync + 'static,
{
    let pipeline: Pipeline<S, T, CollectSink<T>> = Pipeline {
        source,
        transforms: vec![validation],
        sink: CollectSink::new(),
    };
    Ok(pipeline.run().await?.into_payloads())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn construction_sorts_stably_by_time() {
        let snapshot = Snapshot::new(
            vec![
                UsageReading::new(datetime!(2024-01-01 15:00), "flat", 1.0),
                UsageReading::new(datetime!(2024-01-01 14:00), "terrace", 2.0),
                UsageReading::new(datetime!(2024-01-01 14:00), "flat", 3.0),
            ],
            vec![
                PriceQuote::new(datetime!(2024-01-01 14:00), 0.3),
                PriceQuote::new(datetime!(2024-01-01 13:00), 0.2),
                PriceQuote::new(datetime!(2024-01-01 14:00), 0.4),
            ],
            Vec::new(),
        );

        let usage: Vec<f64> = snapshot.readings().iter().map(|r| r.usage_kwh).collect();
        assert_eq!(usage, vec![2.0, 3.0, 1.0]);
        let prices: Vec<f64> = snapshot.quotes().iter().map(|q| q.price_per_kwh).collect();
        assert_eq!(prices, vec![0.2, 0.3, 0.4]);
        assert_eq!(snapshot.segments(), vec!["terrace", "flat"]);
    }
}
