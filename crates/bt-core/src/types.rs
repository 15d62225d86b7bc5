//! Core type definitions with validation.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::{Category, FieldKind};

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The category name is not one of the known categories.
    #[error("unknown category: {value}")]
    UnknownCategory { value: String },

    /// The field does not belong to the category's schema.
    #[error("{category} has no field named {field}")]
    UnknownField { category: Category, field: String },

    /// A required field was not supplied.
    #[error("{category}.{field} is required")]
    MissingField {
        category: Category,
        field: &'static str,
    },

    /// The supplied value has the wrong kind for the field.
    #[error("{category}.{field} expects a {expected}, got a {found}")]
    KindMismatch {
        category: Category,
        field: &'static str,
        expected: FieldKind,
        found: FieldKind,
    },

    /// A number was NaN or infinite.
    #[error("{category}.{field} must be a finite number")]
    NonFiniteNumber {
        category: Category,
        field: &'static str,
    },

    /// A color field was set while its toggle was off.
    #[error("{category}.{field} can only be set when {toggle} is true")]
    ToggleOff {
        category: Category,
        field: &'static str,
        toggle: &'static str,
    },

    /// The color string is not a `#RRGGBB` hex value.
    #[error("invalid color: {value} (expected #RRGGBB)")]
    InvalidColor { value: String },

    /// The locale is not supported.
    #[error("unsupported locale: {value}")]
    UnsupportedLocale { value: String },

    /// A series was requested for a field that does not hold numbers.
    #[error("{category}.{field} is not a numeric field")]
    NotNumeric {
        category: Category,
        field: &'static str,
    },
}

/// A `#RRGGBB` color as picked in the form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Creates a color after checking the `#RRGGBB` shape.
    ///
    /// The original casing is preserved.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let valid = value.len() == 7
            && value.starts_with('#')
            && value[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(ValidationError::InvalidColor { value });
        }
        Ok(Self(value))
    }

    /// Returns the color as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Color {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single field value of an event row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Bool(bool),
    Color(Color),
}

impl FieldValue {
    /// The kind of field this value can be stored in.
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Number(_) => FieldKind::Number,
            Self::Bool(_) => FieldKind::Bool,
            Self::Color(_) => FieldKind::Color,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Color> for FieldValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

/// The category-specific values of one row, keyed by field name.
///
/// Missing fields are simply absent; there is no explicit null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the value of a numeric field, if present.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.0.get(name) {
            Some(FieldValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value of a boolean field, if present.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(FieldValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value of a color field, if present.
    pub fn color(&self, name: &str) -> Option<&Color> {
        match self.0.get(name) {
            Some(FieldValue::Color(value)) => Some(value),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A stored event row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Storage row id, used only for manual corrections.
    pub id: i64,
    pub category: Category,
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    pub fields: Fields,
}
