//! End-to-end exercises of the ten-step protocol against a scripted
//! in-memory connection (no real server), covering the scenarios the
//! orchestrator is expected to get right.

mod support;

use mysql_snapshot_core::config::{IncludeExclude, SnapshotConfig, SnapshotMode};
use mysql_snapshot_core::error::SnapshotError;
use mysql_snapshot_core::lifecycle::CancellationToken;
use mysql_snapshot_core::metrics::SnapshotMetrics;
use mysql_snapshot_core::model::{ChangeEvent, OffsetSnapshotFlag, SchemaChange};
use mysql_snapshot_core::orchestrator::run_snapshot_on;
use mysql_snapshot_core::sink::{InMemorySink, Sink};

use support::ScriptedConnection;

fn config(mode: SnapshotMode, minimal_locks: bool, min_row_count_to_stream_results: u64) -> SnapshotConfig {
    SnapshotConfig::build(
        mode,
        minimal_locks,
        min_row_count_to_stream_results,
        8192,
        2048,
        IncludeExclude::default(),
        IncludeExclude::default(),
        IncludeExclude::default(),
        IncludeExclude::default(),
        true,
        Some(5400),
    )
    .unwrap()
}

const ORDERS_DDL: &str = "CREATE TABLE `orders` (\n  `id` int(11) NOT NULL,\n  `name` varchar(255) DEFAULT NULL,\n  PRIMARY KEY (`id`)\n)";

/// S1 — happy path, minimal locks: one database, one table, three rows.
#[test]
fn s1_happy_path_marks_the_last_event_with_the_snapshot_offset() {
    let mut connection = ScriptedConnection::new()
        .with_database("shop", Ok(vec!["orders"]))
        .with_table(
            "shop",
            "orders",
            ORDERS_DDL,
            vec![
                vec![Some("1"), Some("a")],
                vec![Some("2"), Some("b")],
                vec![Some("3"), Some("c")],
            ],
        );
    let mut sink = InMemorySink::new();
    let cancellation = CancellationToken::new();
    let metrics = SnapshotMetrics::new("s1");

    let outcome = run_snapshot_on(
        &mut connection,
        config(SnapshotMode::Initial, true, 1_000_000),
        &cancellation,
        &metrics,
        &mut sink,
    );

    assert!(outcome.is_ok());
    assert_eq!(sink.events.len(), 3);

    let first_ts = sink.events[0].ts_millis;
    assert!(sink.events.iter().all(|e| e.ts_millis == first_ts));
    assert!(sink.events.iter().all(|e| e.offset.file == "mysql-bin.000003" && e.offset.pos == 194));

    assert_eq!(sink.events[0].offset.snapshot, None);
    assert_eq!(sink.events[1].offset.snapshot, None);
    assert_eq!(sink.events.last().unwrap().offset.snapshot, Some(OffsetSnapshotFlag::Last));

    assert!(sink.schema_changes.iter().any(|c| c.ddl_statement.starts_with("SET ")));
    assert!(sink.schema_changes.iter().any(|c| c.ddl_statement.contains("DROP TABLE")));
    assert!(sink.schema_changes.iter().any(|c| c.ddl_statement.contains("DROP DATABASE")));
    assert!(sink.schema_changes.iter().any(|c| c.ddl_statement.contains("CREATE DATABASE")));
    assert!(sink.schema_changes.iter().any(|c| c.ddl_statement.starts_with("USE ")));
    assert!(sink.schema_changes.iter().any(|c| c.ddl_statement.starts_with("CREATE TABLE")));
}

/// S2 — schema-only mode issues every Step-6 DDL but never scans rows.
#[test]
fn s2_schema_only_mode_skips_the_row_scan() {
    let mut connection = ScriptedConnection::new()
        .with_database("shop", Ok(vec!["orders"]))
        .with_table("shop", "orders", ORDERS_DDL, vec![vec![Some("1"), Some("a")]]);
    let mut sink = InMemorySink::new();
    let cancellation = CancellationToken::new();
    let metrics = SnapshotMetrics::new("s2");

    let outcome = run_snapshot_on(
        &mut connection,
        config(SnapshotMode::SchemaOnly, true, 1_000_000),
        &cancellation,
        &metrics,
        &mut sink,
    );

    assert!(outcome.is_ok());
    assert!(sink.events.is_empty());
    assert!(!sink.schema_changes.is_empty());
    assert!(!connection.calls.iter().any(|c| c.starts_with("SELECT * FROM")));
    assert!(connection.calls.iter().any(|c| c == "COMMIT"));
}

/// S3 — a phantom database that errors on table listing is skipped with
/// a warning, not treated as fatal.
#[test]
fn s3_phantom_database_is_skipped_and_the_run_still_succeeds() {
    let mut connection = ScriptedConnection::new()
        .with_database("shop", Ok(vec!["orders"]))
        .with_database("lost+found", Err("Can't read dir of './lost+found/' (errno: 13)"))
        .with_table("shop", "orders", ORDERS_DDL, vec![vec![Some("1"), Some("a")]]);
    let mut sink = InMemorySink::new();
    let cancellation = CancellationToken::new();
    let metrics = SnapshotMetrics::new("s3");

    let outcome = run_snapshot_on(
        &mut connection,
        config(SnapshotMode::Initial, true, 1_000_000),
        &cancellation,
        &metrics,
        &mut sink,
    );

    assert!(outcome.is_ok());
    assert_eq!(sink.events.len(), 1);
    assert!(sink.schema_changes.iter().any(|c| c.database == "shop"));
    assert!(!sink.schema_changes.iter().any(|c| c.database == "lost+found"));
}

/// S4 — binary logging disabled (`SHOW MASTER STATUS` returns no row)
/// fails as a precondition, with cleanup still running exactly once.
#[test]
fn s4_binlog_disabled_fails_as_a_precondition_and_still_cleans_up() {
    let mut connection = ScriptedConnection::new().with_master_status(None);
    let mut sink = InMemorySink::new();
    let cancellation = CancellationToken::new();
    let metrics = SnapshotMetrics::new("s4");

    let outcome = run_snapshot_on(
        &mut connection,
        config(SnapshotMode::Initial, true, 1_000_000),
        &cancellation,
        &metrics,
        &mut sink,
    );

    assert!(matches!(outcome, Err(SnapshotError::Precondition(_))));
    assert!(sink.events.is_empty());
    assert_eq!(connection.calls.iter().filter(|c| c.as_str() == "UNLOCK TABLES").count(), 1);
    assert_eq!(connection.calls.iter().filter(|c| c.as_str() == "ROLLBACK").count(), 1);
}

/// Cancels the shared token once a configured number of events has
/// reached the inner sink, simulating an external `stop()` call landing
/// mid-scan.
struct CancelAfterSink<'a> {
    inner: InMemorySink,
    cancellation: &'a CancellationToken,
    cancel_after: usize,
}

impl<'a> Sink for CancelAfterSink<'a> {
    fn accept_event(&mut self, event: ChangeEvent) -> Result<(), SnapshotError> {
        self.inner.accept_event(event)?;
        if self.inner.events.len() >= self.cancel_after {
            self.cancellation.cancel();
        }
        Ok(())
    }

    fn accept_schema_change(&mut self, change: SchemaChange) -> Result<(), SnapshotError> {
        self.inner.accept_schema_change(change)
    }
}

/// S5 — stopping mid-scan aborts the remaining tables, rolls back, and
/// never emits a `LAST`-marked event.
#[test]
fn s5_stop_mid_scan_rolls_back_without_a_last_marked_event() {
    let rows: Vec<Vec<Option<&str>>> = vec![
        vec![Some("1")],
        vec![Some("2")],
        vec![Some("3")],
        vec![Some("4")],
        vec![Some("5")],
    ];
    let mut connection = ScriptedConnection::new()
        .with_database("shop", Ok(vec!["big", "after"]))
        .with_table("shop", "big", "CREATE TABLE `big` (\n  `id` int(11) NOT NULL,\n  PRIMARY KEY (`id`)\n)", rows)
        .with_table("shop", "after", "CREATE TABLE `after` (\n  `id` int(11) NOT NULL,\n  PRIMARY KEY (`id`)\n)", vec![vec![Some("1")]]);
    let cancellation = CancellationToken::new();
    let mut sink = CancelAfterSink {
        inner: InMemorySink::new(),
        cancellation: &cancellation,
        cancel_after: 1,
    };
    let metrics = SnapshotMetrics::new("s5");

    let outcome = run_snapshot_on(
        &mut connection,
        config(SnapshotMode::Initial, true, 1_000_000),
        &cancellation,
        &metrics,
        &mut sink,
    );

    assert!(matches!(outcome, Err(SnapshotError::Cancelled)));
    assert!(sink.inner.events.len() < 5, "only a prefix of `big` should have been emitted");
    assert!(sink.inner.events.iter().all(|e| e.offset.snapshot != Some(OffsetSnapshotFlag::Last)));
    assert!(!connection.calls.iter().any(|c| c.contains("`after`")));
    assert_eq!(connection.calls.iter().filter(|c| c.as_str() == "UNLOCK TABLES").count(), 1);
    assert_eq!(connection.calls.iter().filter(|c| c.as_str() == "ROLLBACK").count(), 1);
}

/// S6 — a table reported well over the streaming threshold still
/// produces exactly one event per row, in server-returned order. The
/// fetch itself is not a real streaming cursor (DESIGN.md "Known
/// simplifications"); this pins the observable row-for-row contract.
#[test]
fn s6_large_table_emits_one_event_per_row_in_order() {
    let ids: Vec<String> = (1..=25).map(|i| i.to_string()).collect();
    let rows: Vec<Vec<Option<&str>>> = ids.iter().map(|id| vec![Some(id.as_str())]).collect();
    let mut connection = ScriptedConnection::new()
        .with_database("shop", Ok(vec!["big"]))
        .with_table("shop", "big", "CREATE TABLE `big` (\n  `id` int(11) NOT NULL,\n  PRIMARY KEY (`id`)\n)", rows)
        .with_row_count("big", 250);
    let mut sink = InMemorySink::new();
    let cancellation = CancellationToken::new();
    let metrics = SnapshotMetrics::new("s6");

    let outcome = run_snapshot_on(
        &mut connection,
        config(SnapshotMode::Initial, true, 20),
        &cancellation,
        &metrics,
        &mut sink,
    );

    assert!(outcome.is_ok());
    assert_eq!(sink.events.len(), 25);
    for (index, event) in sink.events.iter().enumerate() {
        assert_eq!(event.key, serde_json::json!({"id": (index + 1) as i64}));
    }
    assert!(connection.calls.iter().any(|c| c == "SHOW TABLE STATUS LIKE 'big'"));
}
