pub mod analytics;
pub mod domain;
pub mod error;

pub use error::AnalyticsError;
