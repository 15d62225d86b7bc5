//! Delete command for removing a mis-logged event.

use std::io::Write;

use anyhow::Result;
use bt_core::Category;
use bt_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &mut Database, category: Category, id: i64) -> Result<()> {
    db.delete(category, id)?;
    writeln!(writer, "Deleted {category} #{id}")?;
    Ok(())
}
