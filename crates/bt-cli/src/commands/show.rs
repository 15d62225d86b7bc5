//! Show command, the "on query" handler.
//!
//! Reads one category, formats it for display and prints a page of the
//! table, the most recent rows, or JSON.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use bt_core::display::{Cell, Column};
use bt_core::{Category, DisplayRow, DisplayTable, FieldValue, format_for_display};
use bt_db::Database;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use crate::Config;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Event category (drink, diaper, pump, doctor).
    pub category: Category,
    /// Page to show, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Show only the N most recent events.
    #[arg(long, conflicts_with = "page")]
    pub recent: Option<usize>,
    /// Output JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// JSON output of the show command.
#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    category: Category,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<usize>,
    page_count: usize,
    columns: &'a [Column],
    rows: &'a [DisplayRow],
}

/// Reads a category and formats it for display.
pub fn query_for_display(
    db: &Database,
    config: &Config,
    category: Category,
    now: DateTime<Utc>,
) -> Result<DisplayTable> {
    let birth = config.birth_instant()?;
    let rows = db
        .query(category)
        .with_context(|| format!("failed to read {category} events"))?;
    Ok(format_for_display(category, &rows, now, birth, config.locale))
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    args: &ShowArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let table = query_for_display(db, config, args.category, now)?;

    let (rows, page) = match args.recent {
        Some(n) => (table.recent(n), None),
        None => {
            let page = args.page.max(1);
            (table.page(page - 1), Some(page))
        }
    };

    if args.json {
        let output = ShowOutput {
            category: table.category,
            total: table.len(),
            page,
            page_count: table.page_count(),
            columns: &table.columns,
            rows,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        write!(writer, "{}", format_table(&table, rows, page))?;
    }
    Ok(())
}

/// Renders display rows as an aligned text table.
pub fn format_table(table: &DisplayTable, rows: &[DisplayRow], page: Option<usize>) -> String {
    let mut output = String::new();
    let category = table.category;

    writeln!(output, "{} ({} events)", category.as_str().to_uppercase(), table.len()).unwrap();
    writeln!(output).unwrap();

    if table.is_empty() {
        writeln!(output, "No {category} events logged yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'bt log {category}' to log one.").unwrap();
        return output;
    }

    let mut header: Vec<String> = ["ID", "WHEN", "AGE"].map(String::from).to_vec();
    header.extend(table.columns.iter().map(|column| column.name.to_string()));

    let lines: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut line = vec![row.id.to_string(), row.delta.clone(), row.age.clone()];
            line.extend(
                table
                    .columns
                    .iter()
                    .map(|column| row.cell(column.name).map_or_else(|| "-".to_string(), format_cell)),
            );
            line
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            lines
                .iter()
                .map(|line| line[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    write_row(&mut output, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|&w| "─".repeat(w)).collect();
    write_row(&mut output, &rule, &widths);
    for line in &lines {
        write_row(&mut output, line, &widths);
    }

    if let Some(page) = page {
        writeln!(output).unwrap();
        writeln!(output, "Page {page}/{}", table.page_count()).unwrap();
    }

    output
}

fn write_row(output: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(output, "{}", line.trim_end()).unwrap();
}

/// Formats a display cell for text output.
pub fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) => n.to_string(),
        Cell::Marker(marker) => marker.symbol().to_string(),
        Cell::Color(color) => color.to_string(),
    }
}

/// Formats a raw field value for text output.
pub fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Bool(flag) => flag.to_string(),
        FieldValue::Color(color) => color.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bt_core::{Color, Fields, Locale};
    use chrono::{Duration, TimeZone};
    use insta::assert_snapshot;

    fn birth() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn config() -> Config {
        Config {
            database_path: "unused.db".into(),
            name: "Ida".to_string(),
            birth: Some(birth()),
            locale: Locale::En,
        }
    }

    fn diaper(pee: Option<&str>, poo: bool) -> Fields {
        let mut fields = Fields::new()
            .with("changed", true)
            .with("pee", pee.is_some())
            .with("poo", poo);
        if let Some(color) = pee {
            fields.insert("pee_color", Color::new(color).unwrap());
        }
        fields
    }

    fn args(category: Category) -> ShowArgs {
        ShowArgs {
            category,
            page: 1,
            recent: None,
            json: false,
        }
    }

    #[test]
    fn show_renders_table_with_markers() {
        let mut db = Database::open_in_memory().unwrap();
        let first = birth() + Duration::hours(20);
        let second = birth() + Duration::minutes(27 * 60 + 10);
        db.append(Category::Diaper, &diaper(Some("#F8E45C"), false), first)
            .unwrap();
        db.append(Category::Diaper, &diaper(None, true), second).unwrap();
        let now = birth() + Duration::minutes(27 * 60 + 15);

        let mut output = Vec::new();
        run(&mut output, &db, &config(), &args(Category::Diaper), now).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        DIAPER (2 events)

        ID  WHEN                     AGE             changed  pee  pee_color  poo  poo_color
        ──  ───────────────────────  ──────────────  ───────  ───  ─────────  ───  ─────────
        2   5 minutes ago            1 day, 3 hours  ✓        ✗    -          ✓    -
        1   7 hours, 15 minutes ago  20 hours        ✓        ✓    #F8E45C    ✗    -

        Page 1/1
        ");
    }

    #[test]
    fn show_empty_category_is_not_an_error() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run(&mut output, &db, &config(), &args(Category::Pump), birth()).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        PUMP (0 events)

        No pump events logged yet.

        Hint: Run 'bt log pump' to log one.
        ");
    }

    #[test]
    fn show_pages_and_recent() {
        let mut db = Database::open_in_memory().unwrap();
        for i in 0..7 {
            db.append(
                Category::Pump,
                &Fields::new().with("left_ml", f64::from(i)),
                birth() + Duration::hours(i64::from(i)),
            )
            .unwrap();
        }
        let now = birth() + Duration::days(1);

        let table = query_for_display(&db, &config(), Category::Pump, now).unwrap();
        assert_eq!(table.len(), 7);
        assert_eq!(table.page_count(), 2);

        let mut output = Vec::new();
        let page_two = ShowArgs {
            page: 2,
            ..args(Category::Pump)
        };
        run(&mut output, &db, &config(), &page_two, now).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Page 2/2"));
        assert_eq!(output.lines().filter(|line| line.ends_with(" -")).count(), 2);

        let mut output = Vec::new();
        let recent = ShowArgs {
            recent: Some(1),
            json: true,
            ..args(Category::Pump)
        };
        run(&mut output, &db, &config(), &recent, now).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["total"], 7);
        assert_eq!(json["rows"].as_array().unwrap().len(), 1);
        assert_eq!(json["rows"][0]["id"], 7);
        assert_eq!(json["rows"][0]["cells"]["left_ml"]["value"], 6.0);
        assert_eq!(json["rows"][0]["age"], "6 hours");
        assert!(json.get("page").is_none());
    }

    #[test]
    fn show_requires_birth() {
        let db = Database::open_in_memory().unwrap();
        let config = Config {
            birth: None,
            ..config()
        };
        let mut output = Vec::new();
        assert!(run(&mut output, &db, &config, &args(Category::Drink), birth()).is_err());
    }
}
