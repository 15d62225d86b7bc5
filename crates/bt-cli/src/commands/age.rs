//! Age command, the time-picker read-out.

use std::io::Write;

use anyhow::Result;
use bt_core::display::compact_age;
use chrono::{DateTime, Utc};

use super::util::parse_datetime_at;
use crate::Config;

/// Prints the baby's age at `at` (default: now) as `1d3h15m`.
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    at: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()> {
    let birth = config.birth_instant()?;
    let instant = match at {
        Some(at) => parse_datetime_at(at, now)?,
        None => now,
    };
    writeln!(writer, "{}", compact_age(instant, birth))?;
    Ok(())
}
