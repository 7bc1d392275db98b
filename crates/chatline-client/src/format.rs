//! Timestamp rendering for chat lines.

use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Parse a server timestamp (RFC 3339, or naive ISO-8601 taken as UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `HH:MM` today, `Yesterday HH:MM`, otherwise `DD/MM HH:MM`.
///
/// Day boundaries are taken in `now`'s time zone.
pub fn format_time<Tz>(at: &DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let at = at.with_timezone(&now.timezone());
    let day = at.date_naive();
    let today = now.date_naive();

    if day == today {
        at.format("%H:%M").to_string()
    } else if today.pred_opt() == Some(day) {
        format!("Yesterday {}", at.format("%H:%M"))
    } else {
        at.format("%d/%m %H:%M").to_string()
    }
}

/// Render a raw server timestamp in local time; unparsable input is returned as is.
pub fn format_server_time(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(at) => format_time(&at, &Local::now()),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::FixedOffset;

    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn today_yesterday_and_older() {
        let now = utc("2024-03-10T18:00:00Z");
        assert_eq!(format_time(&utc("2024-03-10T09:05:00Z"), &now), "09:05");
        assert_eq!(format_time(&utc("2024-03-09T23:59:00Z"), &now), "Yesterday 23:59");
        assert_eq!(format_time(&utc("2024-02-28T07:30:00Z"), &now), "28/02 07:30");
    }

    #[test]
    fn day_boundary_follows_viewer_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = utc("2024-03-10T08:00:00Z").with_timezone(&tz);
        // 22:30 UTC on the 9th is 00:30 on the 10th at +02:00
        assert_eq!(format_time(&utc("2024-03-09T22:30:00Z"), &now), "00:30");
    }

    #[test]
    fn parses_naive_and_fractional_timestamps() {
        assert_eq!(utc("2024-01-01T10:00:00.123456"), utc("2024-01-01T10:00:00.123456+00:00"));
        assert!(parse_timestamp("yesterday").is_none());
        assert_eq!(format_server_time("garbage"), "garbage");
    }
}
