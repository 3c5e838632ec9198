use serde::Serialize;
use time::PrimitiveDateTime;

/// One metered interval for one household, in naive local time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReading {
    #[serde(with = "super::local_timestamp")]
    pub timestamp: PrimitiveDateTime,
    pub household_segment: String,
    pub usage_kwh: f64,
}

impl UsageReading {
    pub fn new(timestamp: PrimitiveDateTime, household_segment: impl Into<String>, usage_kwh: f64) -> Self {
        Self {
            timestamp,
            household_segment: household_segment.into(),
            usage_kwh,
        }
    }

    /// Local hour of day, 0..=23.
    pub fn hour(&self) -> u8 {
        self.timestamp.hour()
    }
}
