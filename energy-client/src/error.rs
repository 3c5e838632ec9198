#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("invalid timestamp '{input}': {reason}")]
    InvalidTimestamp { input: String, reason: String },
    #[error("invalid clock hour '{0}', expected HH or HH:MM with HH in 0..=23")]
    InvalidHour(String),
    #[error("{series} are not in ascending time order (first violation at index {index})")]
    UnorderedInput { series: &'static str, index: usize },
}
