//! Per-run snapshot metrics (SPEC_FULL.md §4.10). Wraps `metrics` crate
//! handles registered once per reader; a read-only snapshot struct lets
//! tests assert on final counts without an external exporter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};

/// Current high-level phase of a snapshot run, exposed as a gauge so an
/// external dashboard can show "what is it doing right now" without
/// polling logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPhase {
    Idle,
    SessionSetup,
    AcquiringLock,
    EnumeratingSchema,
    RebuildingSchema,
    ScanningTables,
    Finalizing,
    Complete,
    Failed,
}

impl SnapshotPhase {
    fn as_gauge_value(self) -> f64 {
        self as u8 as f64
    }
}

pub struct SnapshotMetrics {
    run_label: String,
    rows_scanned: AtomicU64,
    tables_scanned: AtomicU64,
    tables_skipped: AtomicU64,
    lock_acquired_at: std::sync::Mutex<Option<Instant>>,
    lock_hold: std::sync::Mutex<Option<Duration>>,
    snapshot_started_at: std::sync::Mutex<Option<Instant>>,
    snapshot_duration: std::sync::Mutex<Option<Duration>>,
}

impl SnapshotMetrics {
    pub fn new(run_label: impl Into<String>) -> Self {
        Self {
            run_label: run_label.into(),
            rows_scanned: AtomicU64::new(0),
            tables_scanned: AtomicU64::new(0),
            tables_skipped: AtomicU64::new(0),
            lock_acquired_at: std::sync::Mutex::new(None),
            lock_hold: std::sync::Mutex::new(None),
            snapshot_started_at: std::sync::Mutex::new(None),
            snapshot_duration: std::sync::Mutex::new(None),
        }
    }

    pub fn mark_phase(&self, phase: SnapshotPhase) {
        gauge!("snapshot_phase", "run" => self.run_label.clone()).set(phase.as_gauge_value());
        if phase == SnapshotPhase::AcquiringLock {
            *self.snapshot_started_at.lock().unwrap().get_or_insert(Instant::now()) = Instant::now();
        }
    }

    pub fn snapshot_started(&self) {
        *self.snapshot_started_at.lock().unwrap() = Some(Instant::now());
    }

    pub fn lock_acquired(&self) {
        *self.lock_acquired_at.lock().unwrap() = Some(Instant::now());
    }

    pub fn lock_released(&self) {
        if let Some(acquired_at) = self.lock_acquired_at.lock().unwrap().take() {
            let held_for = acquired_at.elapsed();
            histogram!("snapshot_lock_hold_ms", "run" => self.run_label.clone())
                .record(held_for.as_millis() as f64);
            *self.lock_hold.lock().unwrap() = Some(held_for);
        }
    }

    pub fn snapshot_finished(&self) {
        if let Some(started_at) = *self.snapshot_started_at.lock().unwrap() {
            let duration = started_at.elapsed();
            histogram!("snapshot_duration_ms", "run" => self.run_label.clone())
                .record(duration.as_millis() as f64);
            *self.snapshot_duration.lock().unwrap() = Some(duration);
        }
    }

    pub fn row_scanned(&self) {
        self.rows_scanned.fetch_add(1, Ordering::Relaxed);
        counter!("snapshot_rows_scanned_total", "run" => self.run_label.clone()).increment(1);
    }

    pub fn table_scanned(&self) {
        self.tables_scanned.fetch_add(1, Ordering::Relaxed);
        counter!("snapshot_tables_scanned_total", "run" => self.run_label.clone()).increment(1);
    }

    pub fn table_skipped(&self) {
        self.tables_skipped.fetch_add(1, Ordering::Relaxed);
        counter!("snapshot_tables_skipped_total", "run" => self.run_label.clone()).increment(1);
    }

    pub fn snapshot(&self) -> SnapshotMetricsSnapshot {
        SnapshotMetricsSnapshot {
            rows_scanned: self.rows_scanned.load(Ordering::Relaxed),
            tables_scanned: self.tables_scanned.load(Ordering::Relaxed),
            tables_skipped: self.tables_skipped.load(Ordering::Relaxed),
            lock_hold: *self.lock_hold.lock().unwrap(),
            snapshot_duration: *self.snapshot_duration.lock().unwrap(),
        }
    }
}

/// Point-in-time read-only view, handed to tests so assertions don't
/// need to reach through atomics and mutexes directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotMetricsSnapshot {
    pub rows_scanned: u64,
    pub tables_scanned: u64,
    pub tables_skipped: u64,
    pub lock_hold: Option<Duration>,
    pub snapshot_duration: Option<Duration>,
}
