//! Log command, the "on append" handler.
//!
//! One handler serves every category: values are parsed by the kind the
//! category schema gives each field, gaps are filled from the pre-filled
//! form, and the row is appended.

use std::io::Write;

use anyhow::{Context, Result, bail};
use bt_core::form::complete;
use bt_core::{Category, Color, FieldKind, Fields};
use bt_db::Database;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use clap::Args;

use super::form;
use super::show::format_value;
use super::util::{parse_datetime_at, parse_flag};

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Event category (drink, diaper, pump, doctor).
    pub category: Category,
    /// Field values; a bare FIELD sets a boolean to true.
    #[arg(value_name = "FIELD=VALUE")]
    pub values: Vec<String>,
    /// When the event happened (default: now).
    #[arg(long)]
    pub at: Option<String>,
}

/// Parses `FIELD=VALUE` arguments against the category schema.
///
/// An empty value leaves a number or color field empty.
pub fn parse_values(category: Category, values: &[String]) -> Result<Fields> {
    let mut fields = Fields::new();
    for raw in values {
        let (name, value) = match raw.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (raw.trim(), None),
        };
        let spec = category.field(name)?;

        match (spec.kind, value) {
            (FieldKind::Bool, None) => fields.insert(spec.name, true),
            (FieldKind::Bool, Some(value)) => {
                let flag = parse_flag(value).with_context(|| format!("invalid {name}"))?;
                fields.insert(spec.name, flag);
            }
            (_, None) => bail!("{category}.{name} needs a value, e.g. {name}=..."),
            (_, Some("")) => {}
            (FieldKind::Number, Some(value)) => {
                let number: f64 = value
                    .parse()
                    .with_context(|| format!("invalid number for {name}: {value}"))?;
                fields.insert(spec.name, number);
            }
            (FieldKind::Color, Some(value)) => fields.insert(spec.name, Color::new(value)?),
        }
    }
    Ok(fields)
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &LogArgs,
    now: DateTime<Utc>,
) -> Result<i64> {
    let category = args.category;
    // Storage keeps milliseconds; truncate so the stored row matches.
    let timestamp = match args.at.as_deref() {
        Some(at) => parse_datetime_at(at, now)?,
        None => now,
    }
    .trunc_subsecs(3);

    let submitted = parse_values(category, &args.values)?;
    let form = form::load(db, category)?;
    let fields = complete(category, submitted, &form);
    tracing::debug!(%category, ?fields, %timestamp, "appending event");

    let id = db
        .append(category, &fields, timestamp)
        .with_context(|| format!("failed to log {category}"))?;

    writeln!(
        writer,
        "Logged {category} #{id} at {}",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    )?;
    for spec in category.fields() {
        if let Some(value) = fields.get(spec.name) {
            writeln!(writer, "  {}: {}", spec.name, format_value(value))?;
        }
    }
    Ok(id)
}
