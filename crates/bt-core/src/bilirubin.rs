//! Bilirubin reference curve and chart overlay.
//!
//! The reference is the hour-specific nomogram of Bhutani et al.
//! (Pediatrics 1999;103(1):6-14), tabulated in mg/dL and converted to µmol/L.

use serde::Serialize;

use crate::series::Measurement;

/// 1 mg/dL of bilirubin in µmol/L.
pub const MG_DL_TO_UMOL_L: f64 = 17.1;

/// Ages in hours of the tabulated points.
pub const REFERENCE_AGES_HOURS: [u32; 13] = [20, 24, 28, 40, 44, 48, 60, 72, 84, 96, 120, 132, 168];

/// 40th, 75th and 95th percentile in mg/dL, one row per age.
pub const REFERENCE_MG_DL: [[f64; 3]; 13] = [
    [4.75, 5.8, 7.25],
    [5.0, 6.4, 7.9],
    [5.6, 7.0, 8.9],
    [7.75, 9.9, 12.2],
    [8.1, 10.2, 12.5],
    [8.6, 10.9, 13.1],
    [9.6, 12.7, 15.1],
    [11.1, 13.25, 15.9],
    [11.75, 14.7, 16.75],
    [12.4, 15.1, 17.4],
    [13.25, 15.75, 17.6],
    [13.1, 15.5, 17.5],
    [13.1, 15.5, 17.5],
];

/// Percentile bands of the nomogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Percentile {
    #[serde(rename = "40th")]
    P40,
    #[serde(rename = "75th")]
    P75,
    #[serde(rename = "95th")]
    P95,
}

impl Percentile {
    pub const ALL: [Self; 3] = [Self::P40, Self::P75, Self::P95];

    pub const fn label(self) -> &'static str {
        match self {
            Self::P40 => "40th",
            Self::P75 => "75th",
            Self::P95 => "95th",
        }
    }

    /// Band color, matching the Plotly qualitative palette.
    pub const fn color(self) -> &'static str {
        match self {
            Self::P40 => "#00CC96",
            Self::P75 => "#636EFA",
            Self::P95 => "#EF553B",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::P40 => 0,
            Self::P75 => 1,
            Self::P95 => 2,
        }
    }
}

/// One row of the reference table in µmol/L.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferencePoint {
    pub age_hours: u32,
    pub p40: f64,
    pub p75: f64,
    pub p95: f64,
}

impl ReferencePoint {
    pub const fn value(&self, percentile: Percentile) -> f64 {
        match percentile {
            Percentile::P40 => self.p40,
            Percentile::P75 => self.p75,
            Percentile::P95 => self.p95,
        }
    }
}

/// The reference table converted to µmol/L.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceCurve {
    pub points: Vec<ReferencePoint>,
}

/// Returns the nomogram in µmol/L.
pub fn bilirubin_reference_curve() -> ReferenceCurve {
    let points = REFERENCE_AGES_HOURS
        .iter()
        .zip(REFERENCE_MG_DL.iter())
        .map(|(&age_hours, row)| ReferencePoint {
            age_hours,
            p40: row[Percentile::P40.index()] * MG_DL_TO_UMOL_L,
            p75: row[Percentile::P75.index()] * MG_DL_TO_UMOL_L,
            p95: row[Percentile::P95.index()] * MG_DL_TO_UMOL_L,
        })
        .collect();
    ReferenceCurve { points }
}

/// A chart point, age in hours against bilirubin in µmol/L.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A filled percentile band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub percentile: Percentile,
    pub color: &'static str,
    pub points: Vec<Point>,
}

/// The measured series drawn over the bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: &'static str,
    pub points: Vec<Point>,
}

/// Chart data for an external renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub bands: Vec<Band>,
    pub measured: Series,
}

/// Combines the reference bands with a measured series.
#[expect(
    clippy::cast_precision_loss,
    reason = "ages are at most a few thousand hours"
)]
pub fn overlay(curve: &ReferenceCurve, measured: &[Measurement]) -> Chart {
    let bands = Percentile::ALL
        .iter()
        .map(|&percentile| Band {
            percentile,
            color: percentile.color(),
            points: curve
                .points
                .iter()
                .map(|point| Point {
                    x: f64::from(point.age_hours),
                    y: point.value(percentile),
                })
                .collect(),
        })
        .collect();

    let points = measured
        .iter()
        .map(|m| Point {
            x: m.age_hours as f64,
            y: m.value,
        })
        .collect();

    Chart {
        x_label: "age [h]",
        y_label: "bilirubin [µmol/l]",
        bands,
        measured: Series {
            name: "baby",
            points,
        },
    }
}
