//! Status command for showing the time since the last event per category.

use std::io::Write;

use anyhow::Result;
use bt_core::Category;
use bt_core::display::{compact_age, format_duration, format_recency};
use bt_db::Database;
use chrono::{DateTime, Utc};

use crate::Config;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let birth = config.birth_instant()?;

    writeln!(writer, "{}", config.name)?;
    writeln!(
        writer,
        "Age: {} ({})",
        format_duration(now - birth, config.locale),
        compact_age(now, birth)
    )?;
    writeln!(writer)?;

    for category in Category::ALL {
        let last = match db.last_entry(category)? {
            Some(entry) => format_recency(now - entry.timestamp, config.locale),
            None => "never".to_string(),
        };
        writeln!(writer, "{:<8} {last}", category.as_str())?;
    }

    Ok(())
}
