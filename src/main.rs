//! Minimal standalone driver: reads connection settings from the
//! environment, runs one snapshot to completion, and logs every event at
//! debug level. The reader/orchestrator pair is the library surface meant
//! for embedding; this binary exists so the crate can be exercised without
//! wiring up a host application.

use std::env;
use std::time::Duration;

use tracing::{error, info};

use mysql_snapshot_core::channel::connection::ConnectionInfo;
use mysql_snapshot_core::config::{IncludeExclude, SnapshotConfig, SnapshotMode};
use mysql_snapshot_core::lifecycle::{ReaderOutput, ReaderState, SnapshotReader};

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let connection_info = ConnectionInfo::new(
        env_or("SNAPSHOT_MYSQL_HOST", "127.0.0.1"),
        env_or("SNAPSHOT_MYSQL_PORT", "3306").parse().unwrap_or(3306),
        env_or("SNAPSHOT_MYSQL_USER", "root"),
        env_or("SNAPSHOT_MYSQL_PASSWORD", ""),
    );

    let config = SnapshotConfig::build(
        SnapshotMode::Initial,
        true,
        0,
        8192,
        2048,
        IncludeExclude::default(),
        IncludeExclude::default(),
        IncludeExclude::default(),
        IncludeExclude::default(),
        true,
        None,
    )
    .expect("default snapshot configuration is always well-formed");

    let mut reader = SnapshotReader::new(env_or("SNAPSHOT_RUN_LABEL", "manual-run"));
    if let Err(err) = reader.start(connection_info, config) {
        error!(%err, "failed to start snapshot reader");
        std::process::exit(1);
    }

    loop {
        match reader.poll(Duration::from_secs(1)) {
            Some(ReaderOutput::Change(event)) => {
                info!(topic = %event.topic, row = event.offset.row, "snapshot row");
            }
            Some(ReaderOutput::Schema(change)) => {
                info!(database = %change.database, "schema change captured");
            }
            None => {
                if matches!(reader.state(), ReaderState::Stopped | ReaderState::Failed) {
                    break;
                }
            }
        }
    }

    let summary = reader.metrics().snapshot();
    info!(
        rows_scanned = summary.rows_scanned,
        tables_scanned = summary.tables_scanned,
        tables_skipped = summary.tables_skipped,
        "snapshot finished"
    );

    if reader.state() == ReaderState::Failed {
        std::process::exit(1);
    }
}
