//! Given a table schema and a raw row, builds a typed [`ChangeEvent`]
//! (SPEC_FULL.md §4.4). A typed key is built from primary-key columns, a
//! value from every filtered column; both carry the current
//! [`SourceInfo`] offset. `read` and `create` differ only in
//! [`EventKind`].

use serde_json::{json, Map, Value as JsonValue};

use crate::error::SnapshotError;
use crate::filters::FilterSet;
use crate::lifecycle::CancellationToken;
use crate::model::{ChangeEvent, EventKind, Offset, Row, SourceInfo, TableId, Value};
use crate::queue::BufferedLastRecordQueue;
use crate::schema::ColumnMeta;

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Integer(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::Decimal(d) => JsonValue::String(d.to_string()),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Bytes(bytes) => JsonValue::String(base64_lite(bytes)),
    }
}

/// Minimal base64 encoder so binary column values survive a JSON
/// round-trip without pulling in a dedicated base64 crate for one call
/// site.
fn base64_lite(bytes: &[u8]) -> String {
    const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::with_capacity((bytes.len() + 2) / 3 * 4);
    for chunk in bytes.chunks(3) {
        let b0 = chunk[0];
        let b1 = *chunk.get(1).unwrap_or(&0);
        let b2 = *chunk.get(2).unwrap_or(&0);
        let triple = ((b0 as u32) << 16) | ((b1 as u32) << 8) | b2 as u32;
        out.push(ALPHABET[(triple >> 18 & 0x3F) as usize] as char);
        out.push(ALPHABET[(triple >> 12 & 0x3F) as usize] as char);
        out.push(if chunk.len() > 1 { ALPHABET[(triple >> 6 & 0x3F) as usize] as char } else { '=' });
        out.push(if chunk.len() > 2 { ALPHABET[(triple & 0x3F) as usize] as char } else { '=' });
    }
    out
}

fn build_key(table: &TableId, columns: &[ColumnMeta], row: &Row) -> JsonValue {
    let mut key = Map::new();
    for (index, column) in columns.iter().enumerate() {
        if column.is_primary_key {
            if let Some(value) = row.get(index) {
                key.insert(column.name.clone(), value_to_json(value));
            }
        }
    }
    if key.is_empty() {
        // No declared primary key: fall back to the whole row so the
        // event is still uniquely identifiable, matching how a keyless
        // table is handled downstream of snapshot too.
        return build_value(table, columns, row, None);
    }
    JsonValue::Object(key)
}

fn build_value(table: &TableId, columns: &[ColumnMeta], row: &Row, filters: Option<&FilterSet>) -> JsonValue {
    let mut value = Map::new();
    for (index, column) in columns.iter().enumerate() {
        if let Some(filters) = filters {
            if !filters.column_filter(table, &column.name) {
                continue;
            }
        }
        if let Some(v) = row.get(index) {
            value.insert(column.name.clone(), value_to_json(v));
        }
    }
    JsonValue::Object(value)
}

pub struct RecordMaker<'q, 's> {
    table: TableId,
    topic: String,
    columns: Vec<ColumnMeta>,
    queue: &'q mut BufferedLastRecordQueue<'s>,
}

impl<'q, 's> RecordMaker<'q, 's> {
    pub fn new(table: TableId, columns: Vec<ColumnMeta>, queue: &'q mut BufferedLastRecordQueue<'s>) -> Self {
        let topic = table.qualified_name();
        Self {
            table,
            topic,
            columns,
            queue,
        }
    }

    pub fn read(
        &mut self,
        row: Row,
        ts_millis: i64,
        source: &SourceInfo,
        row_ordinal: u64,
        filters: &FilterSet,
        cancellation: &CancellationToken,
    ) -> Result<(), SnapshotError> {
        self.emit(EventKind::Read, row, ts_millis, source, row_ordinal, filters, cancellation)
    }

    pub fn create(
        &mut self,
        row: Row,
        ts_millis: i64,
        source: &SourceInfo,
        row_ordinal: u64,
        filters: &FilterSet,
        cancellation: &CancellationToken,
    ) -> Result<(), SnapshotError> {
        self.emit(EventKind::Create, row, ts_millis, source, row_ordinal, filters, cancellation)
    }

    #[allow(clippy::too_many_arguments)]
    fn emit(
        &mut self,
        kind: EventKind,
        row: Row,
        ts_millis: i64,
        source: &SourceInfo,
        row_ordinal: u64,
        filters: &FilterSet,
        cancellation: &CancellationToken,
    ) -> Result<(), SnapshotError> {
        let key = build_key(&self.table, &self.columns, &row);
        let value = build_value(&self.table, &self.columns, &row, Some(filters));
        let offset: Offset = source.to_offset(row_ordinal);

        let event = ChangeEvent {
            source_partition: source.run_id.to_string(),
            offset,
            topic: self.topic.clone(),
            key,
            key_schema: format!("{}.key", self.topic),
            value,
            value_schema: format!("{}.value", self.topic),
            kind,
            ts_millis,
        };
        self.queue.enqueue(event, cancellation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnType;
    use crate::schema::ColumnMeta;

    fn columns() -> Vec<ColumnMeta> {
        vec![
            ColumnMeta {
                name: "id".into(),
                column_type: ColumnType::Integer,
                is_primary_key: true,
            },
            ColumnMeta {
                name: "name".into(),
                column_type: ColumnType::VarChar,
                is_primary_key: false,
            },
        ]
    }

    #[test]
    fn key_contains_only_primary_key_columns() {
        let table = TableId::of("shop", "orders");
        let row = Row::new(vec![Value::Integer(1), Value::Text("a".into())]);
        let key = build_key(&table, &columns(), &row);
        assert_eq!(key, json!({"id": 1}));
    }

    #[test]
    fn value_respects_column_filter() {
        use crate::config::{IncludeExclude, SnapshotConfig, SnapshotMode};
        let config = SnapshotConfig::build(
            SnapshotMode::Initial,
            true,
            0,
            100,
            10,
            IncludeExclude::default(),
            IncludeExclude::default(),
            IncludeExclude {
                include: vec![],
                exclude: vec!["shop\\.orders\\.name".into()],
            },
            IncludeExclude::default(),
            true,
            Some(5400),
        )
        .unwrap();
        let filters = FilterSet::compile(&config).unwrap();
        let table = TableId::of("shop", "orders");
        let row = Row::new(vec![Value::Integer(1), Value::Text("a".into())]);
        let value = build_value(&table, &columns(), &row, Some(&filters));
        assert_eq!(value, json!({"id": 1}));
    }
}
