//! Storage layer for the baby tracker.
//!
//! Provides persistence for logged events using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. The tracker assumes a
//! single writer process.
//!
//! # Schema
//!
//! Each [`Category`] has its own table named after the category. Columns are
//! `timestamp` followed by the category's fields in schema order:
//! numbers are `REAL`, booleans `INTEGER` (0/1) and colors `TEXT`. Tables are
//! created on the first append, so a category nobody has logged yet has no
//! table and queries as empty.
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in ISO 8601 format (e.g., `2024-01-15T10:30:00.000Z`).
//! This format ensures:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC)
//!
//! Rows are append-only. Timestamps are not unique; ties are ordered by `rowid`.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use thiserror::Error;

use bt_core::{Category, Color, Entry, FieldKind, FieldSpec, FieldValue, Fields, ValidationError};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The submitted fields do not match the category schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {category} row {id}: {timestamp}")]
    TimestampParse {
        category: Category,
        id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored value does not fit its column's kind.
    #[error("invalid value in {category} row {id}: {message}")]
    InvalidRow {
        category: Category,
        id: i64,
        message: String,
    },
    /// No row with this id exists.
    #[error("{category} row {id} not found")]
    RowNotFound { category: Category, id: i64 },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A stored row before conversion into an [`Entry`].
struct RawRow {
    id: i64,
    timestamp: String,
    values: Vec<Value>,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Returns whether the category's table has been created.
    pub fn table_exists(&self, category: Category) -> Result<bool, DbError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            [category.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Creates the category's table and timestamp index.
    ///
    /// This is idempotent - safe to call on an existing table.
    fn ensure_table(&self, category: Category) -> Result<(), DbError> {
        let table = category.as_str();
        let columns: Vec<String> = category
            .fields()
            .iter()
            .map(|spec| format!("\"{}\" {}", spec.name, column_type(spec.kind)))
            .collect();
        self.conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS \"{table}\" (
                timestamp TEXT NOT NULL,
                {columns}
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_timestamp ON \"{table}\"(timestamp);
            ",
            columns = columns.join(",\n                "),
        ))?;
        Ok(())
    }

    /// Appends one event row and returns its row id.
    ///
    /// The fields are validated against the category schema first; fields
    /// that are not supplied are stored as NULL. The timestamp is stored with
    /// millisecond precision, so anything finer is dropped.
    pub fn append(
        &mut self,
        category: Category,
        fields: &Fields,
        timestamp: DateTime<Utc>,
    ) -> Result<i64, DbError> {
        category.validate(fields)?;
        self.ensure_table(category)?;

        let specs = category.fields();
        let columns = column_list(specs);
        let placeholders = vec!["?"; specs.len() + 1].join(", ");
        let sql = format!(
            "INSERT INTO \"{}\" (timestamp, {columns}) VALUES ({placeholders})",
            category.as_str()
        );

        let mut values = Vec::with_capacity(specs.len() + 1);
        values.push(Value::Text(format_timestamp(timestamp)));
        values.extend(specs.iter().map(|spec| to_sql_value(fields.get(spec.name))));

        self.conn.execute(&sql, params_from_iter(values))?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(%category, id, %timestamp, "event stored");
        Ok(id)
    }

    /// Lists all rows of a category, most recent first.
    ///
    /// A category without a table yields an empty list.
    pub fn query(&self, category: Category) -> Result<Vec<Entry>, DbError> {
        self.select(category, None)
    }

    /// Returns the most recent row of a category.
    pub fn last_entry(&self, category: Category) -> Result<Option<Entry>, DbError> {
        Ok(self.select(category, Some(1))?.into_iter().next())
    }

    /// Returns the most recently used value of a color field.
    ///
    /// Only rows whose toggle for the field is set are considered. Stored
    /// values that are not `#RRGGBB` are skipped with a warning.
    pub fn last_color(&self, category: Category, field: &str) -> Result<Option<Color>, DbError> {
        let spec = category.field(field)?;
        if spec.kind != FieldKind::Color {
            return Err(ValidationError::KindMismatch {
                category,
                field: spec.name,
                expected: FieldKind::Color,
                found: spec.kind,
            }
            .into());
        }
        if !self.table_exists(category)? {
            return Ok(None);
        }

        let toggle = spec
            .toggle
            .map(|toggle| format!("\"{toggle}\" = 1 AND "))
            .unwrap_or_default();
        let sql = format!(
            "
            SELECT rowid, \"{field}\"
            FROM \"{table}\"
            WHERE {toggle}\"{field}\" IS NOT NULL
            ORDER BY timestamp DESC, rowid DESC
            ",
            field = spec.name,
            table = category.as_str(),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            let stored = match row.get::<_, Value>(1)? {
                Value::Text(text) => Color::new(text),
                other => Err(ValidationError::InvalidColor {
                    value: format!("{other:?}"),
                }),
            };
            match stored {
                Ok(color) => return Ok(Some(color)),
                Err(err) => {
                    tracing::warn!(%category, id, field = spec.name, %err, "skipping stored color");
                }
            }
        }
        Ok(None)
    }

    /// Deletes one row as a manual correction.
    pub fn delete(&mut self, category: Category, id: i64) -> Result<(), DbError> {
        if !self.table_exists(category)? {
            return Err(DbError::RowNotFound { category, id });
        }
        let deleted = self.conn.execute(
            &format!("DELETE FROM \"{}\" WHERE rowid = ?", category.as_str()),
            params![id],
        )?;
        if deleted == 0 {
            return Err(DbError::RowNotFound { category, id });
        }
        tracing::info!(%category, id, "event deleted");
        Ok(())
    }

    fn select(&self, category: Category, limit: Option<usize>) -> Result<Vec<Entry>, DbError> {
        if !self.table_exists(category)? {
            tracing::debug!(%category, "table not created yet");
            return Ok(Vec::new());
        }

        let specs = category.fields();
        let limit = limit.map(|n| format!("LIMIT {n}")).unwrap_or_default();
        let sql = format!(
            "
            SELECT rowid, timestamp, {columns}
            FROM \"{table}\"
            ORDER BY timestamp DESC, rowid DESC
            {limit}
            ",
            columns = column_list(specs),
            table = category.as_str(),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let mut values = Vec::with_capacity(specs.len());
            for index in 0..specs.len() {
                values.push(row.get::<_, Value>(index + 2)?);
            }
            Ok(RawRow {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                values,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(build_entry(category, row?)?);
        }
        Ok(entries)
    }
}

fn build_entry(category: Category, raw: RawRow) -> Result<Entry, DbError> {
    let timestamp = parse_timestamp(&raw.timestamp, category, raw.id)?;
    let mut fields = Fields::new();
    for (spec, value) in category.fields().iter().zip(raw.values) {
        if let Some(value) = from_sql_value(spec, value).map_err(|message| DbError::InvalidRow {
            category,
            id: raw.id,
            message,
        })? {
            fields.insert(spec.name, value);
        }
    }
    Ok(Entry {
        id: raw.id,
        category,
        timestamp,
        fields,
    })
}

const fn column_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Number => "REAL",
        FieldKind::Bool => "INTEGER",
        FieldKind::Color => "TEXT",
    }
}

fn column_list(specs: &[FieldSpec]) -> String {
    specs
        .iter()
        .map(|spec| format!("\"{}\"", spec.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_sql_value(value: Option<&FieldValue>) -> Value {
    match value {
        None => Value::Null,
        Some(FieldValue::Number(n)) => Value::Real(*n),
        Some(FieldValue::Bool(flag)) => Value::Integer(i64::from(*flag)),
        Some(FieldValue::Color(color)) => Value::Text(color.as_str().to_string()),
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "integer-valued numbers from older rows are small measurements"
)]
fn from_sql_value(spec: &FieldSpec, value: Value) -> Result<Option<FieldValue>, String> {
    let value = match (spec.kind, value) {
        (_, Value::Null) => return Ok(None),
        (FieldKind::Number, Value::Real(n)) => FieldValue::Number(n),
        (FieldKind::Number, Value::Integer(n)) => FieldValue::Number(n as f64),
        (FieldKind::Bool, Value::Integer(n)) => FieldValue::Bool(n != 0),
        (FieldKind::Color, Value::Text(text)) => {
            FieldValue::Color(Color::new(text).map_err(|err| format!("{}: {err}", spec.name))?)
        }
        (kind, other) => {
            return Err(format!(
                "{} expects a {kind}, found {:?}",
                spec.name,
                other.data_type()
            ));
        }
    };
    Ok(Some(value))
}

fn parse_timestamp(timestamp: &str, category: Category, id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            category,
            id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
