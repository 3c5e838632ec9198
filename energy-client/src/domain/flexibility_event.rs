use serde::Serialize;

use crate::AnalyticsError;

/// A time-windowed incentive rewarding usage inside `[start_hour, end_hour]`.
///
/// Windows never wrap past midnight: an event with `start_hour > end_hour`
/// matches no hour at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlexibilityEvent {
    pub event_type: String,
    pub start_hour: u8,
    pub end_hour: u8,
    pub max_flexibility_kwh: f64,
    pub price_per_kwh: f64,
}

impl FlexibilityEvent {
    /// Name of the score column this event writes to.
    pub fn column_name(&self) -> String {
        format!("score_{}", self.event_type)
    }

    pub fn covers_hour(&self, hour: u8) -> bool {
        self.start_hour <= hour && hour <= self.end_hour
    }

    pub fn is_inverted(&self) -> bool {
        self.start_hour > self.end_hour
    }

    /// Reward for `usage_kwh` consumed during `hour`, crediting at most
    /// `max_flexibility_kwh` per reading.
    pub fn reward(&self, hour: u8, usage_kwh: f64) -> f64 {
        if self.covers_hour(hour) {
            usage_kwh.min(self.max_flexibility_kwh) * self.price_per_kwh
        } else {
            0.0
        }
    }
}

/// Extract the hour from an `HH:MM` clock string; minutes are discarded.
pub fn parse_clock_hour(s: &str) -> Result<u8, AnalyticsError> {
    let hour_part = s.trim().split(':').next().unwrap_or_default().trim();
    match hour_part.parse::<u8>() {
        Ok(h) if h <= 23 => Ok(h),
        _ => Err(AnalyticsError::InvalidHour(s.to_string())),
    }
}
