//! Typed column values and the JDBC-style type codes used to describe them
//! (SPEC_FULL.md §3, §4.4 — mirrors `java.sql.Types`, consumed by the
//! schema model when it parses `SHOW CREATE TABLE` output).

use bigdecimal::BigDecimal;

use crate::protocol::types::Types;

/// Generic SQL type code for a column, used by the record maker to decide
/// how to encode a value into the key/value payload. The numeric codes in
/// [`Types`] are kept around for parity with the source system's JDBC
/// heritage even though nothing downstream currently reads them back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Numeric,
    Decimal,
    Char,
    VarChar,
    LongVarChar,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Boolean,
    Other,
}

impl ColumnType {
    pub fn jdbc_code(self) -> i32 {
        match self {
            ColumnType::Bit => Types::BIT,
            ColumnType::TinyInt => Types::TINYINT,
            ColumnType::SmallInt => Types::SMALLINT,
            ColumnType::Integer => Types::INTEGER,
            ColumnType::BigInt => Types::BIGINT,
            ColumnType::Float => Types::FLOAT,
            ColumnType::Double => Types::DOUBLE,
            ColumnType::Numeric => Types::NUMERIC,
            ColumnType::Decimal => Types::DECIMAL,
            ColumnType::Char => Types::CHAR,
            ColumnType::VarChar => Types::VARCHAR,
            ColumnType::LongVarChar => Types::LONGVARCHAR,
            ColumnType::Date => Types::DATE,
            ColumnType::Time => Types::TIME,
            ColumnType::Timestamp => Types::TIMESTAMP,
            ColumnType::Binary => Types::BINARY,
            ColumnType::VarBinary => Types::VARBINARY,
            ColumnType::LongVarBinary => Types::LONGVARBINARY,
            ColumnType::Boolean => Types::BOOLEAN,
            ColumnType::Other => Types::OTHER,
        }
    }

    /// Best-effort mapping from a MySQL column type name (as surfaced by
    /// `SHOW CREATE TABLE` parsing) to a generic SQL type. Unknown names
    /// fall back to `Other` rather than failing the snapshot.
    pub fn from_mysql_type_name(name: &str) -> ColumnType {
        let lowered = name.to_lowercase();
        if lowered.starts_with("tinyint(1)") || lowered.starts_with("bool") {
            ColumnType::Boolean
        } else if lowered.starts_with("tinyint") {
            ColumnType::TinyInt
        } else if lowered.starts_with("smallint") {
            ColumnType::SmallInt
        } else if lowered.starts_with("int") || lowered.starts_with("integer") || lowered.starts_with("mediumint") {
            ColumnType::Integer
        } else if lowered.starts_with("bigint") {
            ColumnType::BigInt
        } else if lowered.starts_with("float") {
            ColumnType::Float
        } else if lowered.starts_with("double") || lowered.starts_with("float8") {
            ColumnType::Double
        } else if lowered.starts_with("decimal") {
            ColumnType::Decimal
        } else if lowered.starts_with("numeric") {
            ColumnType::Numeric
        } else if lowered.starts_with("char") {
            ColumnType::Char
        } else if lowered.starts_with("varchar") {
            ColumnType::VarChar
        } else if lowered.contains("text") {
            ColumnType::LongVarChar
        } else if lowered.starts_with("date") && !lowered.starts_with("datetime") {
            ColumnType::Date
        } else if lowered.starts_with("time") && !lowered.starts_with("timestamp") {
            ColumnType::Time
        } else if lowered.starts_with("datetime") || lowered.starts_with("timestamp") {
            ColumnType::Timestamp
        } else if lowered.starts_with("varbinary") {
            ColumnType::VarBinary
        } else if lowered.contains("blob") {
            ColumnType::LongVarBinary
        } else if lowered.starts_with("binary") {
            ColumnType::Binary
        } else {
            ColumnType::Other
        }
    }
}

/// A single column value. `Null` is distinct from `Text("")`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(BigDecimal),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Parses a raw textual column value returned by the text protocol
    /// into a typed `Value` given the column's declared type. `None`
    /// indicates SQL NULL (distinguished at the wire level from `""`).
    pub fn from_wire(raw: Option<&str>, column_type: ColumnType) -> Value {
        let Some(raw) = raw else {
            return Value::Null;
        };
        match column_type {
            ColumnType::TinyInt
            | ColumnType::SmallInt
            | ColumnType::Integer
            | ColumnType::BigInt => raw
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            ColumnType::Boolean => match raw {
                "1" => Value::Bool(true),
                "0" => Value::Bool(false),
                other => other
                    .parse::<bool>()
                    .map(Value::Bool)
                    .unwrap_or_else(|_| Value::Text(raw.to_string())),
            },
            ColumnType::Float | ColumnType::Double => raw
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            ColumnType::Numeric | ColumnType::Decimal => raw
                .parse::<BigDecimal>()
                .map(Value::Decimal)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            ColumnType::Binary | ColumnType::VarBinary | ColumnType::LongVarBinary => {
                Value::Bytes(raw.as_bytes().to_vec())
            }
            _ => Value::Text(raw.to_string()),
        }
    }
}
