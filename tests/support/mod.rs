//! Scripted in-memory stand-in for `MysqlConnection`, used to drive
//! `run_snapshot_on` end-to-end without a real server. Each call is
//! matched against the SQL it would actually receive and answered from
//! whatever the test configured; every call is also appended to `calls`
//! so a test can assert on ordering (e.g. `UNLOCK TABLES` issued once).

use std::collections::HashMap;

use mysql_snapshot_core::channel::connection::{ResultSet, SqlConnection};
use mysql_snapshot_core::error::ConnectionError;
use mysql_snapshot_core::protocol::packets::RowDataPacket;

fn row(columns: Vec<Option<String>>) -> RowDataPacket {
    RowDataPacket { columns }
}

fn text(s: impl Into<String>) -> Option<String> {
    Some(s.into())
}

fn result_set(rows: Vec<RowDataPacket>) -> ResultSet {
    ResultSet {
        columns: Vec::new(),
        rows,
    }
}

pub struct ScriptedConnection {
    pub calls: Vec<String>,
    grants: Vec<String>,
    master_status: Option<(String, u64, String)>,
    databases: Vec<String>,
    tables: HashMap<String, Result<Vec<String>, String>>,
    charset_vars: Vec<(String, String)>,
    create_table_ddl: HashMap<(String, String), String>,
    rows: HashMap<(String, String), Vec<Vec<Option<String>>>>,
    row_counts: HashMap<String, u64>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            grants: vec!["GRANT ALL PRIVILEGES ON *.* TO 'snapshot'@'%'".to_string()],
            master_status: Some(("mysql-bin.000003".to_string(), 194, String::new())),
            databases: Vec::new(),
            tables: HashMap::new(),
            charset_vars: vec![("character_set_server".to_string(), "utf8mb4".to_string())],
            create_table_ddl: HashMap::new(),
            rows: HashMap::new(),
            row_counts: HashMap::new(),
        }
    }

    pub fn with_grants(mut self, grants: Vec<&str>) -> Self {
        self.grants = grants.into_iter().map(str::to_string).collect();
        self
    }

    /// `None` simulates `SHOW MASTER STATUS` returning no row (binlog
    /// disabled — scenario S4).
    pub fn with_master_status(mut self, status: Option<(&str, u64)>) -> Self {
        self.master_status = status.map(|(file, pos)| (file.to_string(), pos, String::new()));
        self
    }

    /// Registers a database whose `SHOW TABLES IN` either succeeds with
    /// the given table names or fails with the given message (scenario
    /// S3 — a phantom database that errors on listing).
    pub fn with_database(mut self, database: &str, tables: Result<Vec<&str>, &str>) -> Self {
        self.databases.push(database.to_string());
        self.tables.insert(
            database.to_string(),
            tables.map(|ts| ts.into_iter().map(str::to_string).collect()).map_err(str::to_string),
        );
        self
    }

    /// Registers a table's `SHOW CREATE TABLE` DDL and the rows its
    /// `SELECT *` should return.
    pub fn with_table(mut self, database: &str, table: &str, create_ddl: &str, rows: Vec<Vec<Option<&str>>>) -> Self {
        self.create_table_ddl
            .insert((database.to_string(), table.to_string()), create_ddl.to_string());
        self.rows.insert(
            (database.to_string(), table.to_string()),
            rows.into_iter()
                .map(|r| r.into_iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        );
        self
    }

    pub fn with_row_count(mut self, table: &str, count: u64) -> Self {
        self.row_counts.insert(table.to_string(), count);
        self
    }

    fn table_ddl_row(&self, database: &str, table: &str) -> RowDataPacket {
        let ddl = self
            .create_table_ddl
            .get(&(database.to_string(), table.to_string()))
            .cloned()
            .unwrap_or_default();
        row(vec![text(table), text(ddl)])
    }
}

impl Default for ScriptedConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlConnection for ScriptedConnection {
    fn query(&mut self, sql: &str) -> Result<ResultSet, ConnectionError> {
        self.calls.push(sql.to_string());

        if sql == "SHOW GRANTS FOR CURRENT_USER()" {
            return Ok(result_set(
                self.grants.iter().map(|g| row(vec![text(g)])).collect(),
            ));
        }
        if sql == "SHOW MASTER STATUS" {
            return Ok(match &self.master_status {
                Some((file, pos, gtid)) => result_set(vec![row(vec![
                    text(file),
                    text(pos.to_string()),
                    None,
                    None,
                    text(gtid),
                ])]),
                None => result_set(Vec::new()),
            });
        }
        if sql == "SHOW DATABASES" {
            return Ok(result_set(
                self.databases.iter().map(|d| row(vec![text(d)])).collect(),
            ));
        }
        if let Some(database) = sql.strip_prefix("SHOW TABLES IN `").and_then(|s| s.strip_suffix('`')) {
            return match self.tables.get(database) {
                Some(Ok(tables)) => Ok(result_set(tables.iter().map(|t| row(vec![text(t)])).collect())),
                Some(Err(message)) => Err(ConnectionError::new(message.clone())),
                None => Ok(result_set(Vec::new())),
            };
        }
        if sql.starts_with("SHOW VARIABLES LIKE") {
            return Ok(result_set(
                self.charset_vars
                    .iter()
                    .map(|(k, v)| row(vec![text(k), text(v)]))
                    .collect(),
            ));
        }
        if sql.starts_with("SHOW CREATE TABLE") {
            let (database, table) = parse_backtick_pair(sql);
            return Ok(result_set(vec![self.table_ddl_row(&database, &table)]));
        }
        if sql.starts_with("SHOW TABLE STATUS LIKE") {
            let table = sql
                .trim_start_matches("SHOW TABLE STATUS LIKE '")
                .trim_end_matches('\'');
            let count = self.row_counts.get(table).copied().unwrap_or(0).to_string();
            let columns = vec![text(table), None, None, None, text(count)];
            return Ok(result_set(vec![RowDataPacket { columns }]));
        }
        if sql.starts_with("SELECT * FROM") {
            let (database, table) = parse_backtick_pair(sql);
            let rows = self
                .rows
                .get(&(database, table))
                .cloned()
                .unwrap_or_default();
            return Ok(result_set(
                rows.into_iter()
                    .map(|columns| RowDataPacket { columns })
                    .collect(),
            ));
        }

        Err(ConnectionError::new(format!("unscripted query: {sql}")))
    }

    fn execute(&mut self, sql: &str) -> Result<u64, ConnectionError> {
        self.calls.push(sql.to_string());
        Ok(0)
    }

    fn select_db(&mut self, database: &str) -> Result<(), ConnectionError> {
        self.calls.push(format!("USE `{database}`"));
        Ok(())
    }
}

/// Pulls `db`, `table` out of `` `db`.`table` `` appearing anywhere in a
/// statement (`SHOW CREATE TABLE` / `SELECT * FROM`). Backtick-quoted
/// segments always land at odd indices of a split on `` ` ``.
fn parse_backtick_pair(sql: &str) -> (String, String) {
    let mut identifiers = sql
        .split('`')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s.to_string());
    let database = identifiers.next().unwrap_or_default();
    let table = identifiers.next().unwrap_or_default();
    (database, table)
}
