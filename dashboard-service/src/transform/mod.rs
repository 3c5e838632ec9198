use crate::pipeline::{Envelope, PipelineError, Transform};
use energy_client::domain::{FlexibilityEvent, PriceQuote, UsageReading};
use time::{macros::datetime, PrimitiveDateTime};

const MIN_TS: PrimitiveDateTime = datetime!(2000-01-01 00:00:00);
const MAX_TS: PrimitiveDateTime = datetime!(2100-01-01 00:00:00);

fn ensure_in_window(ts: PrimitiveDateTime) -> Result<(), PipelineError> {
    if ts < MIN_TS || ts >= MAX_TS {
        return Err(PipelineError::Transform(format!(
            "timestamp {ts} parsed but lies outside the sanity bound [{MIN_TS}, {MAX_TS})"
        )));
    }
    Ok(())
}

/// Pure validation of a `UsageReading`.
///
/// Rules:
/// - usage_kwh must be finite and non-negative.
/// - timestamp must be within [2000-01-01, 2100-01-01).
pub fn validate_usage_reading(env: Envelope<UsageReading>) -> Result<Envelope<UsageReading>, PipelineError> {
    let r = &env.payload;

    if !r.usage_kwh.is_finite() || r.usage_kwh < 0.0 {
        return Err(PipelineError::Transform(format!(
            "usage_kwh must be non-negative, got {}",
            r.usage_kwh
        )));
    }

    ensure_in_window(r.timestamp)?;
    Ok(env)
}

/// Pure validation of a `PriceQuote`.
///
/// Negative prices are legitimate on agile tariffs; only non-finite values
/// are rejected.
pub fn validate_price_quote(env: Envelope<PriceQuote>) -> Result<Envelope<PriceQuote>, PipelineError> {
    let q = &env.payload;

    if !q.price_per_kwh.is_finite() {
        return Err(PipelineError::Transform("price_per_kwh must be finite".to_string()));
    }

    ensure_in_window(q.valid_from)?;
    Ok(env)
}

/// Pure validation of a `FlexibilityEvent`.
///
/// An inverted window (`start_hour > end_hour`) is accepted: it can never
/// match, which is logged but not treated as an error.
pub fn validate_flexibility_event(
    env: Envelope<FlexibilityEvent>,
) -> Result<Envelope<FlexibilityEvent>, PipelineError> {
    let e = &env.payload;

    if e.start_hour > 23 || e.end_hour > 23 {
        return Err(PipelineError::Transform(format!(
            "event '{}': hours must be within 0..=23",
            e.event_type
        )));
    }
    if !e.max_flexibility_kwh.is_finite() || e.max_flexibility_kwh < 0.0 {
        return Err(PipelineError::Transform(format!(
            "event '{}': max_flexibility_kWh must be non-negative",
            e.event_type
        )));
    }
    if !e.price_per_kwh.is_finite() {
        return Err(PipelineError::Transform(format!(
            "event '{}': price_per_kWh must be finite",
            e.event_type
        )));
    }

    if e.is_inverted() {
        tracing::warn!(
            event_type = %e.event_type,
            start_hour = e.start_hour,
            end_hour = e.end_hour,
            "flexibility window wraps midnight and will never match"
        );
    }

    Ok(env)
}

#[derive(Clone, Default)]
pub struct UsageReadingValidation;

#[async_trait::async_trait]
impl Transform<UsageReading, UsageReading> for UsageReadingValidation {
    async fn apply(&self, input: Envelope<UsageReading>) -> Result<Envelope<UsageReading>, PipelineError> {
        validate_usage_reading(input).inspect_err(|_| {
            metrics::counter!("validation_usage_reading_rejected_total").increment(1);
        })
    }
}

#[derive(Clone, Default)]
pub struct PriceQuoteValidation;

#[async_trait::async_trait]
impl Transform<PriceQuote, PriceQuote> for PriceQuoteValidation {
    async fn apply(&self, input: Envelope<PriceQuote>) -> Result<Envelope<PriceQuote>, PipelineError> {
        validate_price_quote(input).inspect_err(|_| {
            metrics::counter!("validation_price_quote_rejected_total").increment(1);
        })
    }
}

#[derive(Clone, Default)]
pub struct FlexibilityEventValidation;

#[async_trait::async_trait]
impl Transform<FlexibilityEvent, FlexibilityEvent> for FlexibilityEventValidation {
    async fn apply(
        &self,
        input: Envelope<FlexibilityEvent>,
    ) -> Result<Envelope<FlexibilityEvent>, PipelineError> {
        validate_flexibility_event(input).inspect_err(|_| {
            metrics::counter!("validation_flexibility_event_rejected_total").increment(1);
        })
    }
}
