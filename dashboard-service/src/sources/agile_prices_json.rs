use std::path::PathBuf;

use async_stream::try_stream;
use energy_client::domain::{parse_timestamp, PriceQuote};

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

/// Agile tariff export: `{"results": [{"valid_from": ..., "value_inc_vat": ...}]}`.
///
/// `value_inc_vat` is in minor currency units and is converted to a price per
/// kWh. Pagination keys and the other tariff fields are ignored.
pub struct AgilePriceFileSource {
    path: PathBuf,
}

#[derive(serde::Deserialize)]
struct AgilePriceDocument {
    results: Vec<AgilePriceRecord>,
}

#[derive(serde::Deserialize)]
struct AgilePriceRecord {
    valid_from: String,
    value_inc_vat: f64,
}

impl TryFrom<AgilePriceRecord> for PriceQuote {
    type Error = PipelineError;

    fn try_from(r: AgilePriceRecord) -> Result<Self, Self::Error> {
        let valid_from = parse_timestamp(&r.valid_from).map_err(|e| PipelineError::Source(e.to_string()))?;
        Ok(PriceQuote::from_minor_units(valid_from, r.value_inc_vat))
    }
}

impl AgilePriceFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Source<PriceQuote> for AgilePriceFileSource {
    async fn stream(&self) -> EnvelopeStream<PriceQuote> {
        let path = self.path.clone();
        let s = try_stream! {
            let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
                PipelineError::Source(format!("failed to open price file {}: {e}", path.display()))
            })?;
            let doc: AgilePriceDocument = match serde_json::from_str(&raw) {
                Ok(d) => d,
                Err(e) => {
                    metrics::counter!("agile_price_parse_errors_total").increment(1);
                    Err(PipelineError::Source(format!("failed to parse price json: {e}")))?
                }
            };

            for record in doc.results {
                let quote = match PriceQuote::try_from(record) {
                    Ok(q) => q,
                    Err(e) => {
                        metrics::counter!("agile_price_parse_errors_total").increment(1);
                        Err(e)?
                    }
                };
                yield Envelope::new(quote);
            }
        };

        Box::pin(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::io::Write;
    use time::macros::datetime;

    #[tokio::test]
    async fn converts_minor_units_and_drops_offset() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{"count": 2, "next": null, "results": [
                {{"value_exc_vat": 28.57, "value_inc_vat": 30.0, "valid_from": "2024-01-01T15:00:00Z", "valid_to": "2024-01-01T15:30:00Z"}},
                {{"value_exc_vat": 22.86, "value_inc_vat": 24.0, "valid_from": "2024-01-01T13:30:00Z", "valid_to": "2024-01-01T14:00:00Z"}}
            ]}}"#
        )
        .unwrap();

        let quotes: Vec<Envelope<PriceQuote>> = AgilePriceFileSource::new(f.path())
            .stream()
            .await
            .try_collect()
            .await
            .unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].payload.valid_from, datetime!(2024-01-01 15:00));
        assert!((quotes[0].payload.price_per_kwh - 0.30).abs() < 1e-12);
        assert!((quotes[1].payload.price_per_kwh - 0.24).abs() < 1e-12);
    }

    #[tokio::test]
    async fn missing_results_key_is_a_source_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"prices": []}}"#).unwrap();

        let res: Result<Vec<Envelope<PriceQuote>>, _> =
            AgilePriceFileSource::new(f.path()).stream().await.try_collect().await;
        assert!(matches!(res, Err(PipelineError::Source(_))));
    }
}
