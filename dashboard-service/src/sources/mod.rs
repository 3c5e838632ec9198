pub mod agile_prices_json;
pub mod flexibility_events_json;
pub mod usage_csv_file;

pub use agile_prices_json::AgilePriceFileSource;
pub use flexibility_events_json::FlexibilityEventFileSource;
pub use usage_csv_file::UsageCsvFileSource;
