use serde::Serialize;
use time::PrimitiveDateTime;

/// Tariffs are published in minor currency units (pence per kWh).
pub const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

/// A single step of the agile tariff: valid from `valid_from` until the next
/// later quote supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    #[serde(with = "super::local_timestamp")]
    pub valid_from: PrimitiveDateTime,
    pub price_per_kwh: f64,
}

impl PriceQuote {
    pub fn new(valid_from: PrimitiveDateTime, price_per_kwh: f64) -> Self {
        Self {
            valid_from,
            price_per_kwh,
        }
    }

    /// Build a quote from a raw tariff value expressed in minor units, tax included.
    pub fn from_minor_units(valid_from: PrimitiveDateTime, value_inc_vat: f64) -> Self {
        Self::new(valid_from, value_inc_vat / MINOR_UNITS_PER_MAJOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn minor_units_are_converted_to_major() {
        let q = PriceQuote::from_minor_units(datetime!(2024-01-01 13:30), 24.0);
        assert!((q.price_per_kwh - 0.24).abs() < 1e-12);
    }
}
