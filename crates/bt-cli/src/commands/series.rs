//! Series command for plotting a numeric field against age.

use std::io::Write;

use anyhow::Result;
use bt_core::{Category, measurement_series};
use bt_db::Database;

use crate::Config;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    category: Category,
    field: &str,
    json: bool,
) -> Result<()> {
    let birth = config.birth_instant()?;
    let rows = db.query(category)?;
    let series = measurement_series(category, &rows, field, birth)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&series)?)?;
        return Ok(());
    }

    let spec = category.field(field)?;
    let unit = spec.unit.map(|unit| format!(" [{unit}]")).unwrap_or_default();
    writeln!(writer, "{category}.{}{unit} by age [h]", spec.name)?;
    if series.is_empty() {
        writeln!(writer, "No values logged yet.")?;
    }
    for point in &series {
        writeln!(writer, "{:>5}  {}", point.age_hours, point.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use bt_core::{Fields, Locale};
    use chrono::{Duration, TimeZone, Utc};
    use insta::assert_snapshot;

    fn config() -> Config {
        Config {
            database_path: "unused.db".into(),
            name: "Ida".to_string(),
            birth: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            locale: Locale::En,
        }
    }

    #[test]
    fn series_lists_weights_by_age() {
        let birth = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut db = Database::open_in_memory().unwrap();
        db.append(
            Category::Doctor,
            &Fields::new().with("weight_g", 3250.0),
            birth + Duration::minutes(130),
        )
        .unwrap();
        db.append(
            Category::Doctor,
            &Fields::new().with("weight_g", 3100.5),
            birth + Duration::hours(72),
        )
        .unwrap();
        db.append(
            Category::Doctor,
            &Fields::new().with("bilirubin_umol_l", 180.0),
            birth + Duration::hours(80),
        )
        .unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, &config(), Category::Doctor, "weight_g", false).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        doctor.weight_g [g] by age [h]
            2  3250
           72  3100.5
        ");
    }

    #[test]
    fn series_rejects_boolean_field() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();

        let err = run(&mut output, &db, &config(), Category::Diaper, "pee", true).unwrap_err();
        assert_eq!(err.to_string(), "diaper.pee is not a numeric field");
    }
}
