//! Event categories and their field schemas.
//!
//! Every category is stored in its own table. The schema below is the single
//! source of truth for table names, column names, value kinds, form defaults,
//! and which toggle enables a color field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{Fields, ValidationError};

/// A class of logged event with its own field schema and storage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Drink,
    Diaper,
    Pump,
    Doctor,
}

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Number,
    Bool,
    Color,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Color => "color",
        };
        write!(f, "{s}")
    }
}

/// Value a fresh form starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Flag(bool),
    Color(&'static str),
}

/// Metadata for one column of a category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Column name.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Display unit for numbers.
    pub unit: Option<&'static str>,
    /// Boolean field that must be true for this field to carry a value.
    pub toggle: Option<&'static str>,
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    const fn number(name: &'static str, unit: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number,
            unit: Some(unit),
            toggle: None,
            default: None,
        }
    }

    const fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: FieldKind::Bool,
            unit: None,
            toggle: None,
            default: Some(FieldDefault::Flag(default)),
        }
    }

    const fn color(name: &'static str, toggle: &'static str, default: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Color,
            unit: None,
            toggle: Some(toggle),
            default: Some(FieldDefault::Color(default)),
        }
    }

    /// Booleans always have a value on submit; numbers and colors may be empty.
    pub const fn is_required(&self) -> bool {
        matches!(self.kind, FieldKind::Bool)
    }
}

/// Pee color preset when no earlier diaper recorded one.
pub const DEFAULT_PEE_COLOR: &str = "#F8E45C";

/// Poo color preset when no earlier diaper recorded one.
pub const DEFAULT_POO_COLOR: &str = "#865E3C";

const DRINK_FIELDS: &[FieldSpec] = &[
    FieldSpec::number("breastmilk_ml", "ml"),
    FieldSpec::number("preHA_ml", "ml"),
    FieldSpec::flag("breast_left", false),
    FieldSpec::flag("breast_right", false),
];

const DIAPER_FIELDS: &[FieldSpec] = &[
    FieldSpec::flag("changed", true),
    FieldSpec::flag("pee", false),
    FieldSpec::color("pee_color", "pee", DEFAULT_PEE_COLOR),
    FieldSpec::flag("poo", false),
    FieldSpec::color("poo_color", "poo", DEFAULT_POO_COLOR),
];

const PUMP_FIELDS: &[FieldSpec] = &[
    FieldSpec::number("left_ml", "ml"),
    FieldSpec::number("right_ml", "ml"),
];

const DOCTOR_FIELDS: &[FieldSpec] = &[
    FieldSpec::number("weight_g", "g"),
    FieldSpec::number("head_circumference_mm", "mm"),
    FieldSpec::number("bilirubin_umol_l", "µmol/l"),
];

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 4] = [Self::Drink, Self::Diaper, Self::Pump, Self::Doctor];

    /// Category name, also used as the table name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drink => "drink",
            Self::Diaper => "diaper",
            Self::Pump => "pump",
            Self::Doctor => "doctor",
        }
    }

    /// The category's columns in table order.
    pub const fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Drink => DRINK_FIELDS,
            Self::Diaper => DIAPER_FIELDS,
            Self::Pump => PUMP_FIELDS,
            Self::Doctor => DOCTOR_FIELDS,
        }
    }

    /// Looks up a field by name.
    pub fn field(self, name: &str) -> Result<&'static FieldSpec, ValidationError> {
        self.fields()
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| ValidationError::UnknownField {
                category: self,
                field: name.to_string(),
            })
    }

    /// Checks a submission against the schema.
    ///
    /// Every value must belong to a known field of the right kind, every
    /// boolean must be present, and a color needs its toggle set.
    pub fn validate(self, fields: &Fields) -> Result<(), ValidationError> {
        for (name, value) in fields.iter() {
            let spec = self.field(name)?;
            if value.kind() != spec.kind {
                return Err(ValidationError::KindMismatch {
                    category: self,
                    field: spec.name,
                    expected: spec.kind,
                    found: value.kind(),
                });
            }
            if fields.number(name).is_some_and(|n| !n.is_finite()) {
                return Err(ValidationError::NonFiniteNumber {
                    category: self,
                    field: spec.name,
                });
            }
            if let Some(toggle) = spec.toggle {
                if fields.flag(toggle) != Some(true) {
                    return Err(ValidationError::ToggleOff {
                        category: self,
                        field: spec.name,
                        toggle,
                    });
                }
            }
        }

        if let Some(missing) = self
            .fields()
            .iter()
            .find(|spec| spec.is_required() && !fields.contains(spec.name))
        {
            return Err(ValidationError::MissingField {
                category: self,
                field: missing.name,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drink" => Ok(Self::Drink),
            "diaper" => Ok(Self::Diaper),
            "pump" => Ok(Self::Pump),
            "doctor" => Ok(Self::Doctor),
            _ => Err(ValidationError::UnknownCategory {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
