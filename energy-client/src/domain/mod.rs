pub mod enriched_reading;
pub mod flexibility_event;
pub mod price_quote;
pub mod timestamp;
pub mod usage_reading;

pub use enriched_reading::{EnrichedReading, ScoredReading};
pub use flexibility_event::FlexibilityEvent;
pub use price_quote::PriceQuote;
pub use timestamp::parse_timestamp;
pub use usage_reading::UsageReading;

time::serde::format_description!(
    local_timestamp,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]:[second]"
);
