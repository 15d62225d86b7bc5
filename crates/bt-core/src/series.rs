//! Age-indexed measurement series for growth and bilirubin charts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::category::{Category, FieldKind};
use crate::types::{Entry, ValidationError};

/// One measured value at a whole-hour age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    /// Age at the measurement in whole hours, truncated.
    pub age_hours: i64,
    pub value: f64,
}

/// Collects the values of a numeric field against age, ascending by age.
///
/// Rows without a value for the field are skipped.
pub fn measurement_series(
    category: Category,
    rows: &[Entry],
    field: &str,
    birth: DateTime<Utc>,
) -> Result<Vec<Measurement>, ValidationError> {
    let spec = category.field(field)?;
    if spec.kind != FieldKind::Number {
        return Err(ValidationError::NotNumeric {
            category,
            field: spec.name,
        });
    }

    let mut points: Vec<(DateTime<Utc>, Measurement)> = rows
        .iter()
        .filter_map(|entry| {
            entry.fields.number(spec.name).map(|value| {
                let age_hours = (entry.timestamp - birth).num_hours();
                (entry.timestamp, Measurement { age_hours, value })
            })
        })
        .collect();
    points.sort_by_key(|(timestamp, _)| *timestamp);

    Ok(points.into_iter().map(|(_, point)| point).collect())
}
