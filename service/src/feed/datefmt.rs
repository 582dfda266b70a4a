//! Display-date rendering shared by both backends.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

/// Hour and day are not zero-padded: "2:54 PM - 8 Mar 2018".
const DISPLAY_FORMAT: &str = "%-I:%M %p - %-d %b %Y";

/// Render a timestamp in the public display format.
#[must_use]
pub fn display_date<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.format(DISPLAY_FORMAT).to_string()
}

/// Reformat an upstream ISO-8601 timestamp for display.
///
/// Accepts RFC 3339 values (including a trailing `Z`), zone-less date-times and
/// bare dates. Anything else is returned unchanged so one malformed timestamp
/// never fails a whole response.
#[must_use]
pub fn reformat_upstream(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return display_date(&dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format(DISPLAY_FORMAT).to_string();
    }
    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return naive.format(DISPLAY_FORMAT).to_string();
    }
    tracing::debug!(raw, "unparseable upstream timestamp passed through");
    raw.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn formats_without_zero_padding() {
        let dt = Utc.with_ymd_and_hms(2018, 3, 8, 14, 54, 0).unwrap();
        assert_eq!(display_date(&dt), "2:54 PM - 8 Mar 2018");
    }

    #[test]
    fn formats_morning_and_midnight() {
        let morning = Utc.with_ymd_and_hms(2024, 1, 5, 9, 5, 0).unwrap();
        assert_eq!(display_date(&morning), "9:05 AM - 5 Jan 2024");

        let midnight = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(display_date(&midnight), "12:00 AM - 31 Dec 2024");
    }

    #[test]
    fn reformats_upstream_zulu_timestamp() {
        assert_eq!(
            reformat_upstream("2023-03-15T14:30:00.000Z"),
            "2:30 PM - 15 Mar 2023"
        );
    }

    #[test]
    fn keeps_explicit_offset() {
        assert_eq!(
            reformat_upstream("2023-03-15T08:15:00+02:00"),
            "8:15 AM - 15 Mar 2023"
        );
    }

    #[test]
    fn accepts_zoneless_and_date_only_values() {
        assert_eq!(
            reformat_upstream("2023-03-15T14:30:00"),
            "2:30 PM - 15 Mar 2023"
        );
        assert_eq!(reformat_upstream("2023-03-15"), "12:00 AM - 15 Mar 2023");
    }

    #[test]
    fn unparseable_values_pass_through() {
        assert_eq!(reformat_upstream("yesterday"), "yesterday");
        assert_eq!(reformat_upstream(""), "");
    }
}
