//! Pure reads over the connection (SPEC_FULL.md §4.2): catalog listing,
//! charset variables, the binlog coordinate, and user grants. Every
//! operation here fails with [`SnapshotError::Transient`]; the
//! orchestrator alone decides whether that's recoverable.

use crate::channel::connection::SqlConnection;
use crate::error::SnapshotError;
use crate::model::{BinlogCoordinate, TableId};

fn transient(table: &str, err: impl std::fmt::Display) -> SnapshotError {
    SnapshotError::Transient {
        table: table.to_string(),
        message: err.to_string(),
    }
}

pub struct ServerProbe<'a> {
    connection: &'a mut dyn SqlConnection,
}

impl<'a> ServerProbe<'a> {
    pub fn new(connection: &'a mut dyn SqlConnection) -> Self {
        Self { connection }
    }

    pub fn read_catalog_names(&mut self) -> Result<Vec<String>, SnapshotError> {
        let result = self
            .connection
            .query("SHOW DATABASES")
            .map_err(|e| transient("<catalog>", e))?;
        Ok(result
            .rows
            .into_iter()
            .filter_map(|row| row.columns.into_iter().next().flatten())
            .collect())
    }

    /// `SHOW TABLES IN <database>`. A database that errors on listing
    /// (MySQL occasionally surfaces local files as pseudo-databases) is
    /// surfaced as `Transient` for the caller to skip-and-warn on
    /// (§4.6 Step 5), never treated as fatal here.
    pub fn read_all_table_names(&mut self, database: &str) -> Result<Vec<TableId>, SnapshotError> {
        let sql = format!("SHOW TABLES IN `{database}`");
        let result = self.connection.query(&sql).map_err(|e| transient(database, e))?;
        Ok(result
            .rows
            .into_iter()
            .filter_map(|row| row.columns.into_iter().next().flatten())
            .map(|table| TableId::of(database, table))
            .collect())
    }

    pub fn read_charset_system_variables(&mut self) -> Result<Vec<(String, String)>, SnapshotError> {
        let result = self
            .connection
            .query("SHOW VARIABLES LIKE 'character\\_set\\_%'")
            .map_err(|e| transient("<charset>", e))?;
        Ok(result
            .rows
            .into_iter()
            .filter_map(|row| {
                let mut columns = row.columns.into_iter();
                let name = columns.next().flatten()?;
                let value = columns.next().flatten()?;
                Some((name, value))
            })
            .collect())
    }

    /// `SHOW MASTER STATUS`. Fails with `Precondition` (not `Transient`)
    /// when the server returns no row — binlog disabled means the
    /// snapshot can never hand off to streaming (§4.6 Step 3).
    pub fn read_binlog_coordinate(&mut self) -> Result<BinlogCoordinate, SnapshotError> {
        let result = self
            .connection
            .query("SHOW MASTER STATUS")
            .map_err(|e| SnapshotError::Fatal(e.to_string()))?;
        let Some(row) = result.rows.into_iter().next() else {
            return Err(SnapshotError::Precondition(
                "SHOW MASTER STATUS returned no row — binary logging is disabled".to_string(),
            ));
        };
        let mut columns = row.columns.into_iter();
        let file = columns.next().flatten().ok_or_else(|| {
            SnapshotError::Precondition("SHOW MASTER STATUS row missing File column".to_string())
        })?;
        let position: u64 = columns
            .next()
            .flatten()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| SnapshotError::Precondition("SHOW MASTER STATUS row missing Position column".to_string()))?;
        let _binlog_do_db = columns.next();
        let _binlog_ignore_db = columns.next();
        let gtid_set = columns.next().flatten().unwrap_or_default();
        Ok(BinlogCoordinate::new(file, position, gtid_set))
    }

    pub fn read_user_grants(&mut self) -> Result<Vec<String>, SnapshotError> {
        let result = self
            .connection
            .query("SHOW GRANTS FOR CURRENT_USER()")
            .map_err(|e| transient("<grants>", e))?;
        Ok(result
            .rows
            .into_iter()
            .filter_map(|row| row.columns.into_iter().next().flatten())
            .collect())
    }
}
