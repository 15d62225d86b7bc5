//! Formatting of stored rows for display.
//!
//! Turns category rows into display rows: recency ("5 minutes ago"), age
//! since birth ("1 day, 3 hours"), a localized date-time, and per-field
//! cells where booleans become check/cross markers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::Serialize;

use crate::category::{Category, FieldKind};
use crate::locale::{Case, Locale, TimeUnit};
use crate::types::{Color, Entry, FieldValue};

/// Rows per table page.
pub const PAGE_SIZE: usize = 5;

/// Presentation marker for a boolean value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Ok,
    Fail,
}

impl Marker {
    pub const fn from_flag(flag: bool) -> Self {
        if flag { Self::Ok } else { Self::Fail }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::Fail => "✗",
        }
    }
}

/// A formatted field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Cell {
    Number(f64),
    Marker(Marker),
    Color(Color),
}

impl Cell {
    fn from_value(value: &FieldValue) -> Self {
        match value {
            FieldValue::Number(n) => Self::Number(*n),
            FieldValue::Bool(flag) => Self::Marker(Marker::from_flag(*flag)),
            FieldValue::Color(color) => Self::Color(color.clone()),
        }
    }
}

/// Column header of a display table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
}

/// One row ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    /// Medium localized local date-time.
    pub date: String,
    /// Time since the event, relative to now.
    pub delta: String,
    /// Age of the baby at the event.
    pub age: String,
    /// Formatted values; fields without a value are absent.
    pub cells: BTreeMap<&'static str, Cell>,
}

impl DisplayRow {
    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.get(name)
    }
}

/// Display rows of one category, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTable {
    pub category: Category,
    pub columns: Vec<Column>,
    pub rows: Vec<DisplayRow>,
}

impl DisplayTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of pages, at least one.
    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(PAGE_SIZE).max(1)
    }

    /// Rows of a zero-based page; empty past the last page.
    pub fn page(&self, index: usize) -> &[DisplayRow] {
        let start = index.saturating_mul(PAGE_SIZE).min(self.rows.len());
        let end = start.saturating_add(PAGE_SIZE).min(self.rows.len());
        &self.rows[start..end]
    }

    /// The `n` most recent rows.
    pub fn recent(&self, n: usize) -> &[DisplayRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// Formats the rows of one category for display.
///
/// Rows are ordered most recent first regardless of input order; rows with
/// equal timestamps keep their relative order. The input is not modified.
pub fn format_for_display(
    category: Category,
    rows: &[Entry],
    now: DateTime<Utc>,
    birth: DateTime<Utc>,
    locale: Locale,
) -> DisplayTable {
    let columns = category
        .fields()
        .iter()
        .map(|spec| Column {
            name: spec.name,
            kind: spec.kind,
            unit: spec.unit,
        })
        .collect();

    let mut ordered: Vec<&Entry> = rows.iter().collect();
    ordered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let rows = ordered
        .into_iter()
        .map(|entry| {
            let cells = category
                .fields()
                .iter()
                .filter_map(|spec| {
                    entry
                        .fields
                        .get(spec.name)
                        .map(|value| (spec.name, Cell::from_value(value)))
                })
                .collect();
            DisplayRow {
                id: entry.id,
                timestamp: entry.timestamp,
                date: format_date_time(entry.timestamp, &Local, locale),
                delta: format_recency(now - entry.timestamp, locale),
                age: format_duration(entry.timestamp - birth, locale),
                cells,
            }
        })
        .collect();

    DisplayTable {
        category,
        columns,
        rows,
    }
}

/// Spells out a duration with minute granularity.
///
/// Shows the largest non-zero unit and, when non-zero, the next smaller one:
/// 27h15m becomes "1 day, 3 hours". Negative durations get a leading `-`.
pub fn format_duration(duration: Duration, locale: Locale) -> String {
    let phrase = spell_minutes(duration.num_minutes().abs(), locale, Case::Nominative);
    if duration.num_minutes() < 0 {
        format!("-{phrase}")
    } else {
        phrase
    }
}

/// Formats the time elapsed since an event, `elapsed = now - timestamp`.
pub fn format_recency(elapsed: Duration, locale: Locale) -> String {
    let minutes = elapsed.num_minutes();
    if minutes == 0 {
        return locale.just_now().to_string();
    }
    let phrase = spell_minutes(minutes.abs(), locale, Case::Dative);
    if minutes > 0 {
        locale.past(&phrase)
    } else {
        locale.future(&phrase)
    }
}

/// Formats an instant as a medium date-time in the given time zone.
pub fn format_date_time<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz, locale: Locale) -> String
where
    Tz::Offset: fmt::Display,
{
    timestamp
        .with_timezone(tz)
        .format(locale.date_time_format())
        .to_string()
}

/// Compact age read-out such as `1d3h15m`.
pub fn compact_age(instant: DateTime<Utc>, birth: DateTime<Utc>) -> String {
    let total = (instant - birth).num_minutes();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    let days = total / TimeUnit::Day.minutes();
    let hours = total % TimeUnit::Day.minutes() / TimeUnit::Hour.minutes();
    let minutes = total % TimeUnit::Hour.minutes();
    format!("{sign}{days}d{hours}h{minutes}m")
}

fn spell_minutes(total: i64, locale: Locale, case: Case) -> String {
    let mut remaining = total;
    let mut parts: Vec<(TimeUnit, i64)> = Vec::with_capacity(TimeUnit::ALL.len());
    for unit in TimeUnit::ALL {
        parts.push((unit, remaining / unit.minutes()));
        remaining %= unit.minutes();
    }

    let Some(lead) = parts.iter().position(|&(_, count)| count > 0) else {
        return format!("0 {}", locale.unit(TimeUnit::Minute, 0, case));
    };

    parts[lead..]
        .iter()
        .take(2)
        .enumerate()
        .filter(|&(i, &(_, count))| i == 0 || count > 0)
        .map(|(_, &(unit, count))| format!("{count} {}", locale.unit(unit, count, case)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;
    use crate::types::Fields;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn entry(id: i64, timestamp: DateTime<Utc>, fields: Fields) -> Entry {
        Entry {
            id,
            category: Category::Diaper,
            timestamp,
            fields,
        }
    }

    fn diaper(pee: bool) -> Fields {
        Fields::new()
            .with("changed", true)
            .with("pee", pee)
            .with("poo", false)
    }

    #[test]
    fn age_uses_two_leading_units() {
        let birth = at(2024, 1, 1, 0, 0);
        let now = at(2024, 1, 2, 3, 15);
        assert_eq!(format_duration(now - birth, Locale::En), "1 day, 3 hours");
        assert_eq!(format_duration(now - birth, Locale::De), "1 Tag, 3 Stunden");
    }

    #[test]
    fn duration_skips_zero_second_unit() {
        assert_eq!(
            format_duration(Duration::minutes(24 * 60 + 15), Locale::En),
            "1 day"
        );
        assert_eq!(
            format_duration(Duration::minutes(9 * 24 * 60), Locale::En),
            "1 week, 2 days"
        );
        assert_eq!(format_duration(Duration::minutes(1), Locale::En), "1 minute");
        assert_eq!(format_duration(Duration::seconds(59), Locale::De), "0 Minuten");
        assert_eq!(
            format_duration(Duration::minutes(-90), Locale::En),
            "-1 hour, 30 minutes"
        );
    }

    #[test]
    fn recency_reads_relative_to_now() {
        assert_eq!(format_recency(Duration::minutes(5), Locale::En), "5 minutes ago");
        assert_eq!(format_recency(Duration::minutes(5), Locale::De), "vor 5 Minuten");
        assert_eq!(
            format_recency(Duration::hours(50), Locale::De),
            "vor 2 Tagen, 2 Stunden"
        );
        assert_eq!(format_recency(Duration::minutes(-3), Locale::En), "in 3 minutes");
        assert_eq!(format_recency(Duration::seconds(30), Locale::En), "just now");
    }

    #[test]
    fn compact_age_matches_time_picker() {
        let birth = at(2024, 1, 1, 0, 0);
        assert_eq!(compact_age(at(2024, 1, 2, 3, 15), birth), "1d3h15m");
        assert_eq!(compact_age(birth, birth), "0d0h0m");
        assert_eq!(compact_age(at(2023, 12, 31, 23, 0), birth), "-0d1h0m");
    }

    #[test]
    fn booleans_map_to_markers_and_missing_stays_absent() {
        let birth = at(2024, 1, 1, 0, 0);
        let now = at(2024, 1, 3, 0, 0);
        let rows = vec![
            entry(1, at(2024, 1, 2, 10, 0), diaper(true)),
            entry(2, at(2024, 1, 2, 12, 0), Fields::new().with("pee", false)),
        ];

        let table = format_for_display(Category::Diaper, &rows, now, birth, Locale::En);

        let newest = &table.rows[0];
        assert_eq!(newest.id, 2);
        assert_eq!(newest.cell("pee"), Some(&Cell::Marker(Marker::Fail)));
        assert_eq!(newest.cell("changed"), None);
        assert_eq!(newest.cell("poo"), None);

        let older = &table.rows[1];
        assert_eq!(older.cell("changed"), Some(&Cell::Marker(Marker::Ok)));
        assert_eq!(older.cell("pee"), Some(&Cell::Marker(Marker::Ok)));
        assert_eq!(older.cell("poo"), Some(&Cell::Marker(Marker::Fail)));
        assert_eq!(older.delta, "14 hours ago");
        assert_eq!(older.age, "1 day, 10 hours");
    }

    #[test]
    fn numbers_and_colors_pass_through() {
        let birth = at(2024, 1, 1, 0, 0);
        let color = Color::new("#F8E45C").unwrap();
        let rows = vec![entry(
            7,
            at(2024, 1, 1, 6, 0),
            diaper(true).with("pee_color", color.clone()),
        )];
        let table = format_for_display(Category::Diaper, &rows, birth, birth, Locale::En);
        assert_eq!(table.rows[0].cell("pee_color"), Some(&Cell::Color(color)));

        let drink = vec![Entry {
            id: 1,
            category: Category::Drink,
            timestamp: birth,
            fields: Fields::new().with("breastmilk_ml", 35.0),
        }];
        let table = format_for_display(Category::Drink, &drink, birth, birth, Locale::En);
        assert_eq!(table.rows[0].cell("breastmilk_ml"), Some(&Cell::Number(35.0)));
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let birth = at(2024, 1, 1, 0, 0);
        let table = format_for_display(Category::Pump, &[], birth, birth, Locale::De);
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.page_count(), 1);
        assert!(table.page(0).is_empty());
        assert!(table.recent(3).is_empty());
    }

    #[test]
    fn formatting_is_idempotent_and_leaves_rows_untouched() {
        let birth = at(2024, 1, 1, 0, 0);
        let now = at(2024, 1, 5, 0, 0);
        let rows: Vec<Entry> = (0..3)
            .map(|i| entry(i, at(2024, 1, 2, u32::try_from(i).unwrap(), 0), diaper(i % 2 == 0)))
            .collect();
        let before = rows.clone();

        let first = format_for_display(Category::Diaper, &rows, now, birth, Locale::De);
        let second = format_for_display(Category::Diaper, &rows, now, birth, Locale::De);

        assert_eq!(first, second);
        assert_eq!(rows, before);
    }

    #[test]
    fn pages_hold_five_rows() {
        let birth = at(2024, 1, 1, 0, 0);
        let rows: Vec<Entry> = (0..12)
            .map(|i| entry(i, birth + Duration::hours(i), diaper(true)))
            .collect();
        let table = format_for_display(Category::Diaper, &rows, birth, birth, Locale::En);

        assert_eq!(table.page_count(), 3);
        assert_eq!(table.page(0).len(), PAGE_SIZE);
        assert_eq!(table.page(2).len(), 2);
        assert!(table.page(3).is_empty());
        assert_eq!(table.page(0)[0].id, 11);
        assert_eq!(table.page(2)[1].id, 0);

        let recent: Vec<i64> = table.recent(3).iter().map(|row| row.id).collect();
        assert_eq!(recent, [11, 10, 9]);
    }

    #[test]
    fn date_time_is_medium_localized() {
        let timestamp = at(2024, 1, 2, 2, 15);
        let berlin = FixedOffset::east_opt(3600).unwrap();

        assert_eq!(
            format_date_time(timestamp, &berlin, Locale::De),
            "02.01.2024, 03:15:00"
        );
        assert_eq!(
            format_date_time(timestamp, &berlin, Locale::En),
            "Jan 2, 2024, 3:15:00 AM"
        );
        assert_eq!(
            format_date_time(at(2024, 1, 2, 15, 15), &Utc, Locale::En),
            "Jan 2, 2024, 3:15:00 PM"
        );
    }
}
