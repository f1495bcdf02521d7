//! In-memory catalog of known tables (SPEC_FULL.md §4.3), rebuilt from
//! synthetic DDL the orchestrator issues in Step 6. Column-type parsing
//! is grounded on the same `sql-parse` column-type mapping the source
//! used for its table-metadata cache; primary-key extraction reads the
//! `PRIMARY KEY (...)` clause directly out of the `SHOW CREATE TABLE`
//! text rather than relying on `sql-parse`'s constraint representation.

use std::collections::HashMap;

use regex::Regex;
use sql_parse::{parse_statements, CreateDefinition, ParseOptions, SQLDialect, Statement, Type};

use crate::error::SnapshotError;
use crate::model::{ColumnType, SchemaChange, TableId};

#[derive(Debug, Clone)]
pub struct ColumnMeta {
    pub name: String,
    pub column_type: ColumnType,
    pub is_primary_key: bool,
}

#[derive(Debug, Clone)]
pub struct TableSchema {
    pub id: TableId,
    pub columns: Vec<ColumnMeta>,
}

impl TableSchema {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns.iter().filter(|c| c.is_primary_key)
    }
}

#[derive(Default)]
pub struct SchemaModel {
    tables: HashMap<TableId, TableSchema>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_for(&self, id: &TableId) -> Option<&TableSchema> {
        self.tables.get(id)
    }

    pub fn known_table_ids(&self) -> impl Iterator<Item = &TableId> {
        self.tables.keys()
    }

    /// Applies one synthetic DDL statement to the catalog and, if
    /// `emit` is set and the statement is non-empty, invokes `emitter`
    /// exactly once with the resulting [`SchemaChange`] (SPEC_FULL.md
    /// §4.3). `timestamp_millis` is the orchestrator's uniform
    /// snapshot-start timestamp, not a per-call clock read.
    pub fn apply_ddl(
        &mut self,
        database: &str,
        ddl: &str,
        timestamp_millis: i64,
        emit: bool,
        emitter: &mut dyn FnMut(SchemaChange),
    ) -> Result<(), SnapshotError> {
        if ddl.trim().is_empty() {
            return Ok(());
        }
        self.mutate(database, ddl)?;
        if emit {
            emitter(SchemaChange::new(database, ddl, timestamp_millis));
        }
        Ok(())
    }

    fn mutate(&mut self, database: &str, ddl: &str) -> Result<(), SnapshotError> {
        let trimmed = ddl.trim();
        let upper = trimmed.to_uppercase();

        if upper.starts_with("SET ") || upper.starts_with("USE ") || upper.starts_with("CREATE DATABASE") {
            return Ok(());
        }
        if upper.starts_with("DROP DATABASE") {
            let name = last_backtick_identifier(trimmed).unwrap_or_else(|| database.to_string());
            self.tables.retain(|id, _| id.schema.as_deref() != Some(name.as_str()));
            return Ok(());
        }
        if upper.starts_with("DROP TABLE") {
            for table_name in backtick_identifiers(trimmed) {
                self.tables.remove(&TableId::of(database, table_name));
            }
            return Ok(());
        }
        if upper.starts_with("CREATE TABLE") {
            let schema = parse_create_table(trimmed, database)?;
            self.tables.insert(schema.id.clone(), schema);
            return Ok(());
        }

        Err(SnapshotError::Fatal(format!(
            "unrecognized synthetic DDL statement: {trimmed}"
        )))
    }
}

fn backtick_identifiers(sql: &str) -> Vec<String> {
    static PATTERN: &str = r"`([^`]+)`";
    let re = Regex::new(PATTERN).expect("static pattern");
    re.captures_iter(sql)
        .map(|c| {
            let full = c[1].to_string();
            full.rsplit('.').next().unwrap_or(&full).to_string()
        })
        .collect()
}

fn last_backtick_identifier(sql: &str) -> Option<String> {
    backtick_identifiers(sql).into_iter().next()
}

fn primary_key_column_names(ddl: &str) -> Vec<String> {
    static PATTERN: &str = r"(?i)PRIMARY KEY\s*\(([^)]*)\)";
    let re = Regex::new(PATTERN).expect("static pattern");
    let Some(captures) = re.captures(ddl) else {
        return Vec::new();
    };
    captures[1]
        .split(',')
        .map(|part| part.trim().trim_matches('`').to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn parse_create_table(ddl: &str, database: &str) -> Result<TableSchema, SnapshotError> {
    let options = ParseOptions::new().dialect(SQLDialect::MariaDB);
    let mut issues = Vec::new();
    let mut statements = parse_statements(ddl, &mut issues, &options);
    let create = match statements.pop() {
        Some(Statement::CreateTable(create)) => create,
        _ => {
            return Err(SnapshotError::Fatal(format!(
                "expected a CREATE TABLE statement, got: {ddl}"
            )))
        }
    };

    let table_name = create.identifier.value.to_string();
    let primary_keys = primary_key_column_names(ddl);

    let mut columns = Vec::new();
    for definition in create.create_definitions {
        if let CreateDefinition::ColumnDefinition { identifier, data_type } = definition {
            let type_name = mysql_type_name(&data_type.type_);
            let name = identifier.value.to_string();
            let is_primary_key = primary_keys.iter().any(|pk| pk.eq_ignore_ascii_case(&name));
            columns.push(ColumnMeta {
                column_type: ColumnType::from_mysql_type_name(&type_name),
                name,
                is_primary_key,
            });
        }
    }

    Ok(TableSchema {
        id: TableId::of(database, table_name),
        columns,
    })
}

/// Renders a `sql-parse` column type back into the MySQL type-name
/// string `ColumnType::from_mysql_type_name` expects, mirroring the
/// source's own `Type` match.
fn mysql_type_name(data_type: &Type) -> String {
    match data_type {
        Type::Boolean => "bool".to_string(),
        Type::TinyInt(Some(e)) => format!("tinyint({})", e.0),
        Type::TinyInt(None) => "tinyint".to_string(),
        Type::SmallInt(Some(e)) => format!("smallint({})", e.0),
        Type::SmallInt(None) => "smallint".to_string(),
        Type::Integer(Some(e)) => format!("integer({})", e.0),
        Type::Integer(None) => "integer".to_string(),
        Type::Int(Some(e)) => format!("int({})", e.0),
        Type::Int(None) => "int".to_string(),
        Type::BigInt(Some(e)) => format!("bigint({})", e.0),
        Type::BigInt(None) => "bigint".to_string(),
        Type::Char(Some(e)) => format!("char({})", e.0),
        Type::Char(None) => "char".to_string(),
        Type::VarChar(Some(e)) => format!("varchar({})", e.0),
        Type::VarChar(None) => "varchar".to_string(),
        Type::TinyText(_) => "tinytext".to_string(),
        Type::MediumText(_) => "mediumtext".to_string(),
        Type::Text(_) => "text".to_string(),
        Type::LongText(_) => "longtext".to_string(),
        Type::Enum(variants) => variants.first().map(|v| v.value.to_string()).unwrap_or_default(),
        Type::Set(variants) => variants.first().map(|v| v.value.to_string()).unwrap_or_default(),
        Type::Float8 => "float8".to_string(),
        Type::Float(Some(e)) => format!("float({}.{})", e.0, e.1),
        Type::Float(None) => "float".to_string(),
        Type::Double(Some(e)) => format!("double({}.{})", e.0, e.1),
        Type::Double(None) => "double".to_string(),
        Type::Numeric(a, b, _) => format!("numeric({a}.{b})"),
        Type::DateTime(_) => "datetime".to_string(),
        Type::Timestamp(_) => "timestamp".to_string(),
        Type::Time(_) => "time".to_string(),
        Type::TinyBlob(_) => "tinyblob".to_string(),
        Type::MediumBlob(_) => "mediumblob".to_string(),
        Type::Date => "date".to_string(),
        Type::Blob(_) => "blob".to_string(),
        Type::LongBlob(_) => "longblob".to_string(),
        Type::VarBinary(_) => "varbinary".to_string(),
        Type::Binary(_) => "binary".to_string(),
    }
}
