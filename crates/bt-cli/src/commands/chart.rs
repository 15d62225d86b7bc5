//! Chart command for the bilirubin nomogram with the measured overlay.

use std::io::Write;

use anyhow::Result;
use bt_core::bilirubin::Chart;
use bt_core::{Category, bilirubin_reference_curve, measurement_series, overlay};
use bt_db::Database;

use crate::Config;

/// Field of the doctor table that holds bilirubin measurements.
const BILIRUBIN_FIELD: &str = "bilirubin_umol_l";

/// Builds the bilirubin chart from the stored doctor visits.
pub fn bilirubin_chart(db: &Database, config: &Config) -> Result<Chart> {
    let birth = config.birth_instant()?;
    let rows = db.query(Category::Doctor)?;
    let measured = measurement_series(Category::Doctor, &rows, BILIRUBIN_FIELD, birth)?;
    Ok(overlay(&bilirubin_reference_curve(), &measured))
}

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config, json: bool) -> Result<()> {
    let chart = bilirubin_chart(db, config)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&chart)?)?;
    } else {
        write!(writer, "{}", format_chart(&chart))?;
    }
    Ok(())
}

/// Renders the reference bands and measured points as text.
pub fn format_chart(chart: &Chart) -> String {
    let mut lines = vec!["BILIRUBIN [µmol/l] by age [h]".to_string(), String::new()];

    let mut header = format!("{:>5}", "AGE");
    for band in &chart.bands {
        header.push_str(&format!("  {:>6}", band.percentile.label()));
    }
    lines.push(header);

    let rows = chart.bands.first().map_or(0, |band| band.points.len());
    for i in 0..rows {
        let mut line = format!("{:>5}", chart.bands[0].points[i].x);
        for band in &chart.bands {
            line.push_str(&format!("  {:>6.1}", band.points[i].y));
        }
        lines.push(line);
    }

    lines.push(String::new());
    if chart.measured.points.is_empty() {
        lines.push("No bilirubin measurements logged yet.".to_string());
    } else {
        lines.push(format!("{}:", chart.measured.name));
        for point in &chart.measured.points {
            lines.push(format!(
                "{:>5}  {:>6.1}  {}",
                point.x,
                point.y,
                band_label(chart, point.x, point.y)
            ));
        }
    }

    lines.join("\n") + "\n"
}

/// Names the highest percentile band the value reaches at the nearest
/// tabulated age at or below `age`.
fn band_label(chart: &Chart, age: f64, value: f64) -> String {
    let reached = chart
        .bands
        .iter()
        .rev()
        .find(|band| {
            band.points
                .iter()
                .rev()
                .find(|point| point.x <= age)
                .is_some_and(|point| value >= point.y)
        })
        .map(|band| band.percentile);
    let first_age = chart
        .bands
        .first()
        .and_then(|band| band.points.first())
        .map_or(0.0, |point| point.x);
    match reached {
        Some(percentile) => format!(">= {}", percentile.label()),
        None if age < first_age => "before reference".to_string(),
        None => "< 40th".to_string(),
    }
}
