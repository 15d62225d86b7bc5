//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Naive date-time layouts accepted as local time, as sent by a
/// `datetime-local` input or typed by hand.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse an absolute instant.
///
/// Supports:
/// - ISO 8601 with offset: "2024-01-01T08:30:00+01:00"
/// - Naive local date-time: "2024-01-01T08:30"
/// - Local date: "2024-01-01" (midnight)
pub fn parse_instant(s: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });
    let Some(naive) = naive else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2024-01-01T08:30:00+01:00 or 2024-01-01T08:30)"
        );
    };

    // DST fall-back ambiguity picks the earlier time.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("{s} does not exist in the local time zone"))
}

/// Parse a datetime string as either an absolute instant or relative time.
///
/// Relative phrases ("2 hours ago", "30 minutes ago", "1 day ago",
/// "1 week ago") are resolved against `now`.
pub fn parse_datetime_at(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        return parse_instant(s);
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Parse a yes/no style flag.
pub fn parse_flag(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Ok(true),
        "false" | "no" | "n" | "0" | "off" => Ok(false),
        _ => anyhow::bail!("Invalid flag: {s}. Use true/false, yes/no, on/off or 1/0"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_instant("2024-01-01T08:30:00+01:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 7, 30, 0).unwrap());
    }

    #[test]
    fn parses_naive_as_local_time() {
        let parsed = parse_instant("2024-01-01T08:30").unwrap();
        let expected = Local
            .with_ymd_and_hms(2024, 1, 1, 8, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, expected);

        let midnight = parse_instant("2024-01-01").unwrap();
        assert_eq!(
            midnight,
            Local
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .unwrap()
                .with_timezone(&Utc)
        );
    }

    #[test]
    fn parses_relative_time_against_now() {
        assert_eq!(
            parse_datetime_at("30 minutes ago", now()).unwrap(),
            now() - Duration::minutes(30)
        );
        assert_eq!(
            parse_datetime_at("1 day ago", now()).unwrap(),
            now() - Duration::days(1)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_datetime_at("yesterday-ish", now()).is_err());
        assert!(parse_datetime_at("999999999 weeks ago", now()).is_err());
    }

    #[test]
    fn parses_flags() {
        assert!(parse_flag("YES").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
