//! Form command, the "on category-select" handler.
//!
//! Shows the values a fresh form for a category starts with, including the
//! last colors used for diaper entries.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use bt_core::form::prefill;
use bt_core::{Category, FieldKind, Fields};
use bt_db::Database;

use super::show::format_value;

/// Builds the pre-filled form for a category.
///
/// Color memory is a live lookup against the store on every call.
pub fn load(db: &Database, category: Category) -> Result<Fields> {
    let mut remembered = BTreeMap::new();
    for spec in category.fields() {
        if spec.kind != FieldKind::Color {
            continue;
        }
        if let Some(color) = db.last_color(category, spec.name)? {
            remembered.insert(spec.name, color);
        }
    }
    Ok(prefill(category, &remembered)?)
}

pub fn run<W: Write>(writer: &mut W, db: &Database, category: Category, json: bool) -> Result<()> {
    let form = load(db, category)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&form)?)?;
        return Ok(());
    }

    writeln!(writer, "{category} form")?;
    for spec in category.fields() {
        let value = form
            .get(spec.name)
            .map_or_else(|| "(empty)".to_string(), format_value);
        match spec.unit {
            Some(unit) => writeln!(writer, "  {:<24} {value} [{unit}]", spec.name)?,
            None => writeln!(writer, "  {:<24} {value}", spec.name)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use bt_core::Color;
    use chrono::{TimeZone, Utc};
    use insta::assert_snapshot;

    #[test]
    fn form_prefills_last_used_pee_color() {
        let mut db = Database::open_in_memory().unwrap();
        let fields = Fields::new()
            .with("changed", true)
            .with("pee", true)
            .with("pee_color", Color::new("#C0A020").unwrap())
            .with("poo", false);
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
        db.append(Category::Diaper, &fields, timestamp).unwrap();

        let form = load(&db, Category::Diaper).unwrap();
        assert_eq!(form.color("pee_color").map(Color::as_str), Some("#C0A020"));
        assert_eq!(form.color("poo_color").map(Color::as_str), Some("#865E3C"));
        assert_eq!(form.flag("pee"), Some(false));
    }

    #[test]
    fn form_renders_defaults_and_units() {
        let db = Database::open_in_memory().unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, Category::Drink, false).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        drink form
          breastmilk_ml            (empty) [ml]
          preHA_ml                 (empty) [ml]
          breast_left              false
          breast_right             false
        ");
    }

    #[test]
    fn form_json_lists_prefilled_values() {
        let db = Database::open_in_memory().unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, Category::Diaper, true).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["changed"], true);
        assert_eq!(json["pee_color"], "#F8E45C");
    }
}
