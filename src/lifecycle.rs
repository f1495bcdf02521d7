//! Reader lifecycle and cooperative cancellation (SPEC_FULL.md §4.7).
//! `SnapshotReader` owns a worker thread running the orchestrator;
//! `CancellationToken` is the flag that thread polls at every
//! documented checkpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::channel::connection::ConnectionInfo;
use crate::config::SnapshotConfig;
use crate::error::SnapshotError;
use crate::metrics::SnapshotMetrics;
use crate::model::{ChangeEvent, SchemaChange};
use crate::orchestrator::run_snapshot;
use crate::sink::Sink;

/// Shared stop flag. Cloning shares the same underlying flag; cheap to
/// pass by value into a worker thread.
#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(Cancelled)` if the flag is set, otherwise `Ok(())`.
    /// Called at every checkpoint the orchestrator documents (start of
    /// each protocol step, every 100 rows, between tables).
    pub fn check(&self) -> Result<(), SnapshotError> {
        if self.is_cancelled() {
            Err(SnapshotError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Created,
    Running,
    Stopping,
    Stopped,
    Failed,
}

impl ReaderState {
    fn is_terminal(self) -> bool {
        matches!(self, ReaderState::Stopped | ReaderState::Failed)
    }
}

/// Channel-backed [`Sink`] implementation the reader hands to the
/// orchestrator worker; `poll` reads from the other end.
struct ChannelSink {
    events: SyncSender<ChangeEvent>,
    schema: SyncSender<SchemaChange>,
}

impl Sink for ChannelSink {
    fn accept_event(&mut self, event: ChangeEvent) -> Result<(), SnapshotError> {
        self.events
            .send(event)
            .map_err(|_| SnapshotError::Cancelled)
    }

    fn accept_schema_change(&mut self, change: SchemaChange) -> Result<(), SnapshotError> {
        self.schema
            .send(change)
            .map_err(|_| SnapshotError::Cancelled)
    }
}

/// Output polled out of a running reader: either a row-change event or a
/// schema-change event, interleaved in emission order.
pub enum ReaderOutput {
    Change(ChangeEvent),
    Schema(SchemaChange),
}

pub struct SnapshotReader {
    state: Arc<Mutex<ReaderState>>,
    cancellation: CancellationToken,
    worker: Option<JoinHandle<()>>,
    events: Option<Receiver<ChangeEvent>>,
    schema: Option<Receiver<SchemaChange>>,
    metrics: Arc<SnapshotMetrics>,
}

impl SnapshotReader {
    pub fn new(run_label: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ReaderState::Created)),
            cancellation: CancellationToken::new(),
            worker: None,
            events: None,
            schema: None,
            metrics: Arc::new(SnapshotMetrics::new(run_label)),
        }
    }

    pub fn state(&self) -> ReaderState {
        *self.state.lock().unwrap()
    }

    pub fn metrics(&self) -> &SnapshotMetrics {
        &self.metrics
    }

    /// Spawns the orchestrator worker. May be called at most once; a
    /// second call on an already-started reader is a programming error
    /// surfaced as `SnapshotError::Fatal` rather than a silent no-op.
    pub fn start(&mut self, connection_info: ConnectionInfo, config: SnapshotConfig) -> Result<(), SnapshotError> {
        {
            let mut state = self.state.lock().unwrap();
            if *state != ReaderState::Created {
                return Err(SnapshotError::Fatal(
                    "reader already started".to_string(),
                ));
            }
            *state = ReaderState::Running;
        }

        let (event_tx, event_rx) = std::sync::mpsc::sync_channel(config.max_queue_size);
        let (schema_tx, schema_rx) = std::sync::mpsc::sync_channel(64);
        self.events = Some(event_rx);
        self.schema = Some(schema_rx);

        let cancellation = self.cancellation.clone();
        let state = Arc::clone(&self.state);
        let metrics = Arc::clone(&self.metrics);

        let handle = std::thread::spawn(move || {
            let mut sink = ChannelSink {
                events: event_tx,
                schema: schema_tx,
            };
            let outcome = run_snapshot(connection_info, config, &cancellation, &metrics, &mut sink);
            let mut guard = state.lock().unwrap();
            *guard = match outcome {
                Ok(()) => ReaderState::Stopped,
                Err(SnapshotError::Cancelled) => ReaderState::Stopped,
                Err(_) => ReaderState::Failed,
            };
        });
        self.worker = Some(handle);
        Ok(())
    }

    /// Blocks for up to `timeout` waiting for the next event. Returns
    /// `None` once the worker has finished and drained its channels.
    pub fn poll(&mut self, timeout: Duration) -> Option<ReaderOutput> {
        if let Some(schema) = self.schema.as_ref() {
            if let Ok(change) = schema.try_recv() {
                return Some(ReaderOutput::Schema(change));
            }
        }
        let events = self.events.as_ref()?;
        match events.recv_timeout(timeout) {
            Ok(event) => Some(ReaderOutput::Change(event)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Idempotent: cancelling an already-stopped reader is a no-op, and
    /// calling `stop` twice never panics or double-joins.
    pub fn stop(&mut self) {
        self.cancellation.cancel();
        {
            let mut state = self.state.lock().unwrap();
            if !state.is_terminal() {
                *state = ReaderState::Stopping;
            }
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}
