//! Core domain logic for the baby tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Categories: the event tables and their field schemas
//! - Display: recency, age and marker formatting of stored rows
//! - Bilirubin: the reference nomogram and the measured overlay
//! - Forms: pre-fill with remembered colors

pub mod bilirubin;
pub mod category;
pub mod display;
pub mod form;
pub mod locale;
pub mod series;
mod types;

pub use bilirubin::{Chart, ReferenceCurve, bilirubin_reference_curve, overlay};
pub use category::{Category, FieldKind, FieldSpec};
pub use display::{DisplayRow, DisplayTable, Marker, PAGE_SIZE, format_for_display};
pub use locale::Locale;
pub use series::{Measurement, measurement_series};
pub use types::{Color, Entry, FieldValue, Fields, ValidationError};
