//! Data model shared by every snapshot component (SPEC_FULL.md §3).

mod offset;
mod source_info;
mod value;

pub use offset::{ChangeEvent, EventKind, Offset, OffsetSnapshotFlag};
pub use source_info::{BinlogCoordinate, SnapshotMarker, SourceInfo};
pub use value::{ColumnType, Value};

use std::fmt;

/// `(catalog, schema?, table)`. Two `TableId`s compare equal up to their
/// non-null components, matching the source's habit of sometimes carrying
/// a schema and sometimes not (MySQL has no separate catalog concept, so
/// `catalog` is conventionally the server/connection name and `schema` is
/// the database).
#[derive(Debug, Clone, Eq)]
pub struct TableId {
    pub catalog: String,
    pub schema: Option<String>,
    pub table: String,
}

impl TableId {
    pub fn new(catalog: impl Into<String>, schema: Option<String>, table: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            schema,
            table: table.into(),
        }
    }

    pub fn of(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new("", Some(schema.into()), table)
    }

    /// Fully-qualified `db.table` name, the form filters match against.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table),
            None => self.table.clone(),
        }
    }
}

impl PartialEq for TableId {
    fn eq(&self, other: &Self) -> bool {
        let catalogs_compatible =
            self.catalog.is_empty() || other.catalog.is_empty() || self.catalog == other.catalog;
        let schemas_compatible = match (&self.schema, &other.schema) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        catalogs_compatible && schemas_compatible && self.table == other.table
    }
}

impl std::hash::Hash for TableId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Only the always-present component participates in the hash so
        // that partial-equality (above) stays consistent with hashing:
        // two TableIds that compare equal must hash equal.
        self.table.hash(state);
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// A synthetic DDL event emitted while the schema model is rebuilt
/// (Step 6 of the snapshot protocol).
#[derive(Debug, Clone)]
pub struct SchemaChange {
    pub database: String,
    pub ddl_statement: String,
    pub timestamp_millis: i64,
}

impl SchemaChange {
    pub fn new(database: impl Into<String>, ddl_statement: impl Into<String>, timestamp_millis: i64) -> Self {
        Self {
            database: database.into(),
            ddl_statement: ddl_statement.into(),
            timestamp_millis,
        }
    }
}

/// An ordered tuple of column values captured from one server row. `Null`
/// is distinct from an empty string or zero-length byte string.
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}
