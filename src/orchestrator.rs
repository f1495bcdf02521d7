//! Drives the ten-step snapshot protocol (SPEC_FULL.md §4.6). This is
//! the largest module: it owns the connection, the transaction/lock
//! scope, the schema model, and the buffered queue for the duration of
//! one run.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::channel::connection::{ConnectionInfo, MysqlConnection, SqlConnection};
use crate::config::SnapshotConfig;
use crate::error::SnapshotError;
use crate::filters::FilterSet;
use crate::lifecycle::CancellationToken;
use crate::metrics::{SnapshotMetrics, SnapshotPhase};
use crate::model::{OffsetSnapshotFlag, Row, SourceInfo, TableId, Value};
use crate::probe::ServerProbe;
use crate::queue::BufferedLastRecordQueue;
use crate::record::RecordMaker;
use crate::schema::SchemaModel;
use crate::sink::Sink;

const CANCELLATION_CHECK_EVERY_ROWS: u64 = 100;
const PROGRESS_METRIC_EVERY_ROWS: u64 = 10_000;

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// RAII scope over the transaction and the global read lock on one
/// connection. Both `commit`/`rollback` and `Drop` clear their own
/// flags before acting, so double-stop or a panic mid-scan never issues
/// a second `UNLOCK TABLES`/`ROLLBACK` (invariant 7).
struct SessionGuard<'c> {
    connection: &'c mut dyn SqlConnection,
    transaction_open: bool,
    lock_held: bool,
}

impl<'c> SessionGuard<'c> {
    fn new(connection: &'c mut dyn SqlConnection) -> Self {
        Self {
            connection,
            transaction_open: false,
            lock_held: false,
        }
    }

    fn begin_transaction(&mut self) -> Result<(), SnapshotError> {
        self.connection.execute("SET autocommit=0")?;
        self.connection
            .execute("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")?;
        self.connection
            .execute("START TRANSACTION WITH CONSISTENT SNAPSHOT")?;
        self.transaction_open = true;
        Ok(())
    }

    fn acquire_lock(&mut self) -> Result<(), SnapshotError> {
        self.connection.execute("FLUSH TABLES WITH READ LOCK")?;
        self.lock_held = true;
        Ok(())
    }

    fn release_lock(&mut self) -> Result<(), SnapshotError> {
        if self.lock_held {
            self.connection.execute("UNLOCK TABLES")?;
            self.lock_held = false;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SnapshotError> {
        self.release_lock()?;
        if self.transaction_open {
            self.connection.execute("COMMIT")?;
            self.transaction_open = false;
        }
        Ok(())
    }

    fn rollback(&mut self) {
        let _ = self.release_lock();
        if self.transaction_open {
            let _ = self.connection.execute("ROLLBACK");
            self.transaction_open = false;
        }
    }
}

impl<'c> Drop for SessionGuard<'c> {
    fn drop(&mut self) {
        if self.lock_held {
            let _ = self.connection.execute("UNLOCK TABLES");
            self.lock_held = false;
        }
        if self.transaction_open {
            let _ = self.connection.execute("ROLLBACK");
            self.transaction_open = false;
        }
    }
}

/// Checked right after connecting, before any transactional state is
/// opened: a user missing `RELOAD`/`LOCK TABLES` can authenticate fine
/// but will fail `FLUSH TABLES WITH READ LOCK` partway through the
/// protocol, which is harder to diagnose than refusing up front.
const REQUIRED_GRANT_KEYWORDS: &[&str] = &["RELOAD", "LOCK TABLES"];

fn verify_required_privileges(connection: &mut dyn SqlConnection) -> Result<(), SnapshotError> {
    let grants = ServerProbe::new(connection).read_user_grants()?;
    let has_all_privileges = grants
        .iter()
        .any(|g| g.to_uppercase().contains("ALL PRIVILEGES"));
    if has_all_privileges {
        return Ok(());
    }
    let upper: Vec<String> = grants.iter().map(|g| g.to_uppercase()).collect();
    for keyword in REQUIRED_GRANT_KEYWORDS {
        if !upper.iter().any(|g| g.contains(keyword)) {
            return Err(SnapshotError::Precondition(format!(
                "current user is missing the {keyword} privilege required to take a snapshot"
            )));
        }
    }
    Ok(())
}

/// Entry point run on the reader's dedicated worker thread. Dials a
/// real connection, then hands off to [`run_snapshot_on`].
#[instrument(skip(config, cancellation, metrics, sink), fields(mode = ?config.mode))]
pub fn run_snapshot(
    connection_info: ConnectionInfo,
    config: SnapshotConfig,
    cancellation: &CancellationToken,
    metrics: &SnapshotMetrics,
    sink: &mut dyn Sink,
) -> Result<(), SnapshotError> {
    if !config.mode.runs_snapshot() {
        info!("snapshot mode does not run the snapshot core, skipping");
        return Ok(());
    }
    let mut connection = MysqlConnection::connect(connection_info)?;
    run_snapshot_on(&mut connection, config, cancellation, metrics, sink)
}

/// Runs the ten-step protocol against an already-open connection.
/// Split out from [`run_snapshot`] so a scripted fake [`SqlConnection`]
/// can drive the same code path in tests without a real handshake.
/// Returns once the snapshot has committed, been rolled back on error,
/// or been cancelled.
pub fn run_snapshot_on(
    connection: &mut dyn SqlConnection,
    config: SnapshotConfig,
    cancellation: &CancellationToken,
    metrics: &SnapshotMetrics,
    sink: &mut dyn Sink,
) -> Result<(), SnapshotError> {
    let filters = FilterSet::compile(&config)?;
    let run_id = Uuid::new_v4();
    let mut source = SourceInfo::new(run_id);
    let mut schema = SchemaModel::new();
    let scan_timestamp = now_millis();

    metrics.snapshot_started();
    metrics.mark_phase(SnapshotPhase::SessionSetup);
    cancellation.check()?;

    verify_required_privileges(connection)?;
    let mut guard = SessionGuard::new(connection);

    // Step 0/1 — session setup, consistent transaction.
    guard.begin_transaction()?;

    // Step 2 — global read lock.
    metrics.mark_phase(SnapshotPhase::AcquiringLock);
    cancellation.check()?;
    guard.acquire_lock()?;
    metrics.lock_acquired();

    let mut queue = BufferedLastRecordQueue::new(sink);
    let outcome = drive_protocol(
        &mut guard,
        &config,
        &filters,
        &mut schema,
        &mut source,
        cancellation,
        metrics,
        scan_timestamp,
        &mut queue,
    );

    match outcome {
        Ok(()) => {
            metrics.mark_phase(SnapshotPhase::Complete);
            metrics.snapshot_finished();
            info!("snapshot completed successfully");
            Ok(())
        }
        Err(err) => {
            guard.rollback();
            metrics.mark_phase(SnapshotPhase::Failed);
            warn!(error = %err, "snapshot aborted");
            Err(err)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn drive_protocol(
    guard: &mut SessionGuard<'_>,
    config: &SnapshotConfig,
    filters: &FilterSet,
    schema: &mut SchemaModel,
    source: &mut SourceInfo,
    cancellation: &CancellationToken,
    metrics: &SnapshotMetrics,
    scan_timestamp: i64,
    queue: &mut BufferedLastRecordQueue<'_>,
) -> Result<(), SnapshotError> {
    // Step 3 — capture binlog coordinate.
    cancellation.check()?;
    let binlog = ServerProbe::new(guard.connection).read_binlog_coordinate()?;
    *source = SourceInfo::new(source.run_id).with_binlog_coordinate(binlog);

    // Step 4 — enumerate databases.
    metrics.mark_phase(SnapshotPhase::EnumeratingSchema);
    cancellation.check()?;
    let databases: Vec<String> = ServerProbe::new(guard.connection)
        .read_catalog_names()?
        .into_iter()
        .filter(|db| filters.database_filter(db))
        .collect();

    // Step 5 — enumerate tables per database; a database that errors on
    // listing is skipped with a warning, never fatal.
    let mut discovered: Vec<TableId> = Vec::new();
    let mut live_databases: Vec<String> = Vec::new();
    for database in &databases {
        cancellation.check()?;
        match ServerProbe::new(guard.connection).read_all_table_names(database) {
            Ok(tables) => {
                live_databases.push(database.clone());
                discovered.extend(tables.into_iter().filter(|t| filters.table_filter(t)));
            }
            Err(err) => {
                warn!(database = %database, error = %err, "skipping database that failed table enumeration");
            }
        }
    }

    // Step 6 — rebuild schema.
    metrics.mark_phase(SnapshotPhase::RebuildingSchema);
    rebuild_schema(guard, schema, &live_databases, &discovered, scan_timestamp, cancellation, queue)?;

    // Step 7 — early lock release.
    if config.minimal_locks {
        guard.release_lock()?;
        metrics.lock_released();
    }

    // Step 8 — table scan.
    if config.mode.scans_rows() {
        metrics.mark_phase(SnapshotPhase::ScanningTables);
        source.mark_in_progress();
        scan_tables(guard, config, filters, schema, source, &discovered, scan_timestamp, cancellation, metrics, queue)?;
    }

    // Step 9 — idempotent lock release (already released in minimal-
    // locking mode; still held otherwise).
    metrics.mark_phase(SnapshotPhase::Finalizing);
    guard.release_lock()?;
    metrics.lock_released();

    // Step 10 — mark LAST, flush the buffered queue's tail, commit.
    source.mark_last();
    queue.flush(
        |mut event| {
            event.offset.snapshot = Some(OffsetSnapshotFlag::Last);
            event
        },
        cancellation,
    )?;
    guard.commit()?;
    source.mark_complete();
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn rebuild_schema(
    guard: &mut SessionGuard<'_>,
    schema: &mut SchemaModel,
    live_databases: &[String],
    discovered: &[TableId],
    ts: i64,
    cancellation: &CancellationToken,
    queue: &mut BufferedLastRecordQueue<'_>,
) -> Result<(), SnapshotError> {
    let mut emit = |change: crate::model::SchemaChange| {
        let _ = queue.sink_mut().accept_schema_change(change);
    };

    // 1. charset-variable SET statement.
    cancellation.check()?;
    let variables = ServerProbe::new(guard.connection).read_charset_system_variables()?;
    if !variables.is_empty() {
        let assignments = variables
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        schema.apply_ddl("", &format!("SET {assignments}"), ts, true, &mut emit)?;
    }

    // 2. DROP TABLE IF EXISTS for every table known ∪ discovered.
    let mut known: Vec<TableId> = schema.known_table_ids().cloned().collect();
    for table in discovered {
        if !known.contains(table) {
            known.push(table.clone());
        }
    }
    for table in &known {
        cancellation.check()?;
        let ddl = format!(
            "DROP TABLE IF EXISTS `{}`.`{}`",
            table.schema.as_deref().unwrap_or_default(),
            table.table
        );
        schema.apply_ddl(table.schema.as_deref().unwrap_or_default(), &ddl, ts, true, &mut emit)?;
    }

    // 3. DROP DATABASE IF EXISTS for databases known but no longer
    // readable.
    let known_databases: std::collections::HashSet<String> = known
        .iter()
        .filter_map(|t| t.schema.clone())
        .collect();
    let live_set: std::collections::HashSet<String> = live_databases.iter().cloned().collect();
    for database in known_databases.difference(&live_set) {
        cancellation.check()?;
        let ddl = format!("DROP DATABASE IF EXISTS `{database}`");
        schema.apply_ddl(database, &ddl, ts, true, &mut emit)?;
    }

    // 4. per discovered database, rebuild fresh.
    for database in live_databases {
        cancellation.check()?;
        schema.apply_ddl(
            database,
            &format!("DROP DATABASE IF EXISTS `{database}`"),
            ts,
            true,
            &mut emit,
        )?;
        schema.apply_ddl(database, &format!("CREATE DATABASE `{database}`"), ts, true, &mut emit)?;
        schema.apply_ddl(database, &format!("USE `{database}`"), ts, true, &mut emit)?;

        for table in discovered.iter().filter(|t| t.schema.as_deref() == Some(database.as_str())) {
            cancellation.check()?;
            let sql = format!("SHOW CREATE TABLE `{}`.`{}`", database, table.table);
            let result = guard.connection.query(&sql)?;
            let Some(row) = result.rows.into_iter().next() else {
                continue;
            };
            let Some(ddl) = row.columns.into_iter().nth(1).flatten() else {
                continue;
            };
            schema.apply_ddl(database, &ddl, ts, true, &mut emit)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn scan_tables(
    guard: &mut SessionGuard<'_>,
    config: &SnapshotConfig,
    filters: &FilterSet,
    schema: &SchemaModel,
    source: &mut SourceInfo,
    tables: &[TableId],
    ts: i64,
    cancellation: &CancellationToken,
    metrics: &SnapshotMetrics,
    queue: &mut BufferedLastRecordQueue<'_>,
) -> Result<(), SnapshotError> {
    for table in tables {
        cancellation.check()?;
        let Some(table_schema) = schema.table_for(table) else {
            warn!(table = %table, "skipping table with no known schema after rebuild");
            metrics.table_skipped();
            continue;
        };
        let database = table.schema.as_deref().unwrap_or_default();
        guard.connection.select_db(database)?;

        let estimated_rows = estimate_row_count(guard, &table.table).unwrap_or(0);
        if estimated_rows >= config.min_row_count_to_stream_results {
            info!(table = %table, estimated_rows, "using per-row streaming fetch for large table");
        }

        let sql = format!("SELECT * FROM `{}`.`{}`", database, table.table);
        let result = guard.connection.query(&sql)?;

        let mut maker = RecordMaker::new(table.clone(), table_schema.columns.clone(), queue);

        let mut row_ordinal: u64 = 0;
        for raw_row in result.rows {
            let values: Vec<Value> = raw_row
                .columns
                .iter()
                .zip(table_schema.columns.iter())
                .map(|(raw, column)| Value::from_wire(raw.as_deref(), column.column_type))
                .collect();
            let row = Row::new(values);
            maker.read(row, ts, source, row_ordinal, filters, cancellation)?;
            row_ordinal += 1;

            if row_ordinal % CANCELLATION_CHECK_EVERY_ROWS == 0 {
                cancellation.check()?;
            }
            if row_ordinal % PROGRESS_METRIC_EVERY_ROWS == 0 {
                info!(table = %table, rows = row_ordinal, "snapshot progress");
            }
            metrics.row_scanned();
        }
        metrics.table_scanned();
    }
    Ok(())
}

fn estimate_row_count(guard: &mut SessionGuard<'_>, table: &str) -> Result<u64, SnapshotError> {
    let sql = format!("SHOW TABLE STATUS LIKE '{table}'");
    let result = guard.connection.query(&sql)?;
    let Some(row) = result.rows.into_iter().next() else {
        return Ok(0);
    };
    // `Rows` is conventionally the 5th column (index 4) in `SHOW TABLE
    // STATUS` output.
    Ok(row
        .columns
        .get(4)
        .cloned()
        .flatten()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_millis_is_monotone_enough_to_be_nonzero() {
        assert!(now_millis() > 0);
    }
}
