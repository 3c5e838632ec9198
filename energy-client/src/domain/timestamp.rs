use std::borrow::Cow;

use time::{format_description::well_known::Iso8601, Date, OffsetDateTime, PrimitiveDateTime};

use crate::AnalyticsError;

/// Parse an ISO-8601 timestamp into naive local time.
///
/// Zone-aware inputs keep their wall-clock date and time and drop the offset,
/// so readings and quotes are always compared on the same naive scale. A space
/// between date and time is accepted in place of `T`, and a bare date means
/// midnight.
pub fn parse_timestamp(input: &str) -> Result<PrimitiveDateTime, AnalyticsError> {
    let trimmed = input.trim();
    let normalized = normalize_separator(trimmed);

    if let Ok(zoned) = OffsetDateTime::parse(&normalized, &Iso8601::DEFAULT) {
        return Ok(PrimitiveDateTime::new(zoned.date(), zoned.time()));
    }

    match PrimitiveDateTime::parse(&normalized, &Iso8601::DEFAULT) {
        Ok(naive) => Ok(naive),
        Err(e) => Date::parse(&normalized, &Iso8601::DEFAULT)
            .map(Date::midnight)
            .map_err(|_| AnalyticsError::InvalidTimestamp {
                input: trimmed.to_string(),
                reason: e.to_string(),
            }),
    }
}

fn normalize_separator(s: &str) -> Cow<'_, str> {
    if s.len() > 10 && s.as_bytes()[10] == b' ' {
        let mut owned = s.to_string();
        owned.replace_range(10..11, "T");
        Cow::Owned(owned)
    } else {
        Cow::Borrowed(s)
    }
}
