use std::path::PathBuf;

use async_stream::try_stream;
use energy_client::domain::{flexibility_event::parse_clock_hour, FlexibilityEvent};

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

/// Flexibility catalog: `{"flexibility_opportunities": [...]}`.
///
/// Only the hour of `start_time`/`end_time` is used.
pub struct FlexibilityEventFileSource {
    path: PathBuf,
}

#[derive(serde::Deserialize)]
struct FlexibilityCatalog {
    flexibility_opportunities: Vec<FlexibilityOpportunity>,
}

#[derive(serde::Deserialize)]
struct FlexibilityOpportunity {
    event_type: String,
    start_time: String,
    end_time: String,
    #[serde(rename = "max_flexibility_kWh")]
    max_flexibility_kwh: f64,
    #[serde(rename = "price_per_kWh")]
    price_per_kwh: f64,
}

impl TryFrom<FlexibilityOpportunity> for FlexibilityEvent {
    type Error = PipelineError;

    fn try_from(o: FlexibilityOpportunity) -> Result<Self, Self::Error> {
        let hour = |s: &str| parse_clock_hour(s).map_err(|e| PipelineError::Source(format!("event '{}': {e}", o.event_type)));
        let start_hour = hour(&o.start_time)?;
        let end_hour = hour(&o.end_time)?;
        Ok(FlexibilityEvent {
            event_type: o.event_type,
            start_hour,
            end_hour,
            max_flexibility_kwh: o.max_flexibility_kwh,
            price_per_kwh: o.price_per_kwh,
        })
    }
}

impl FlexibilityEventFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Source<FlexibilityEvent> for FlexibilityEventFileSource {
    async fn stream(&self) -> EnvelopeStream<FlexibilityEvent> {
        let path = self.path.clone();
        let s = try_stream! {
            let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
                PipelineError::Source(format!("failed to open events file {}: {e}", path.display()))
            })?;
            let catalog: FlexibilityCatalog = match serde_json::from_str(&raw) {
                Ok(c) => c,
                Err(e) => {
                    metrics::counter!("flexibility_event_parse_errors_total").increment(1);
                    Err(PipelineError::Source(format!("failed to parse events json: {e}")))?
                }
            };

            for opportunity in catalog.flexibility_opportunities {
                let event = match FlexibilityEvent::try_from(opportunity) {
                    Ok(ev) => ev,
                    Err(e) => {
                        metrics::counter!("flexibility_event_parse_errors_total").increment(1);
                        Err(e)?
                    }
                };
                yield Envelope::new(event);
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

    async fn load(json: &str) -> Result<Vec<FlexibilityEvent>, PipelineError> {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();
        let rows: Vec<Envelope<FlexibilityEvent>> =
            FlexibilityEventFileSource::new(f.path()).stream().await.try_collect().await?;
        Ok(rows.into_iter().map(|e| e.payload).collect())
    }

    #[tokio::test]
    async fn reads_hours_and_renamed_fields() {
        let events = load(
            r#"{"flexibility_opportunities": [
                {"event_type": "peak_shift", "start_time": "13:00", "end_time": "16:30",
                 "max_flexibility_kWh": 1.0, "price_per_kWh": 0.10, "region": "south"}
            ]}"#,
        )
        .await
        .unwrap();

        assert_eq!(
            events,
            vec![FlexibilityEvent {
                event_type: "peak_shift".to_string(),
                start_hour: 13,
                end_hour: 16,
                max_flexibility_kwh: 1.0,
                price_per_kwh: 0.10,
            }]
        );
    }

    #[tokio::test]
    async fn unparseable_clock_time_fails() {
        let err = load(
            r#"{"flexibility_opportunities": [
                {"event_type": "evening", "start_time": "six", "end_time": "20:00",
                 "max_flexibility_kWh": 1.0, "price_per_kWh": 0.10}
            ]}"#,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::Source(msg) if msg.contains("evening")));
    }
}
