//! Buffered one-element look-ahead queue (SPEC_FULL.md §4.5). Holding the
//! most recently enqueued event back by one slot is what lets the
//! orchestrator rewrite the very last snapshot event's offset to carry
//! `snapshot: last` without knowing in advance which row is the last one.

use crate::error::SnapshotError;
use crate::lifecycle::CancellationToken;
use crate::model::ChangeEvent;
use crate::sink::Sink;

pub struct BufferedLastRecordQueue<'s> {
    sink: &'s mut dyn Sink,
    prev: Option<ChangeEvent>,
}

impl<'s> BufferedLastRecordQueue<'s> {
    pub fn new(sink: &'s mut dyn Sink) -> Self {
        Self { sink, prev: None }
    }

    /// Pushes any held event to the sink, then holds `event` in its
    /// place. The very first call only fills the hold; nothing reaches
    /// the sink until the second `enqueue` or a `flush`.
    pub fn enqueue(&mut self, event: ChangeEvent, cancellation: &CancellationToken) -> Result<(), SnapshotError> {
        cancellation.check()?;
        if let Some(prev) = self.prev.take() {
            self.sink.accept_event(prev)?;
        }
        self.prev = Some(event);
        Ok(())
    }

    /// Applies `transform` to the held event (if any) and pushes it to
    /// the sink, leaving the queue empty. Called once, at the end of the
    /// final table's scan, with a transform that sets `snapshot: last`.
    pub fn flush(
        &mut self,
        transform: impl FnOnce(ChangeEvent) -> ChangeEvent,
        cancellation: &CancellationToken,
    ) -> Result<(), SnapshotError> {
        cancellation.check()?;
        if let Some(prev) = self.prev.take() {
            self.sink.accept_event(transform(prev))?;
        }
        Ok(())
    }

    pub fn sink_mut(&mut self) -> &mut dyn Sink {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventKind, Offset, SchemaChange};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn event(row: u64) -> ChangeEvent {
        ChangeEvent {
            source_partition: "run-1".into(),
            offset: Offset {
                file: "mysql-bin.000001".into(),
                pos: 4,
                gtids: None,
                snapshot: None,
                row,
            },
            topic: "shop.orders".into(),
            key: json!({"id": row}),
            key_schema: "shop.orders.key".into(),
            value: json!({"id": row}),
            value_schema: "shop.orders.value".into(),
            kind: EventKind::Read,
            ts_millis: 0,
        }
    }

    struct RecordingSink(Arc<Mutex<Vec<ChangeEvent>>>);

    impl Sink for RecordingSink {
        fn accept_event(&mut self, event: ChangeEvent) -> Result<(), SnapshotError> {
            self.0.lock().unwrap().push(event);
            Ok(())
        }
        fn accept_schema_change(&mut self, _change: SchemaChange) -> Result<(), SnapshotError> {
            Ok(())
        }
    }

    #[test]
    fn first_enqueue_is_held_back() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let mut recording = RecordingSink(received.clone());
        let mut queue = BufferedLastRecordQueue::new(&mut recording);
        let cancellation = CancellationToken::new();
        queue.enqueue(event(0), &cancellation).unwrap();
        assert!(received.lock().unwrap().is_empty());
    }

    #[test]
    fn second_enqueue_releases_the_first() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let mut recording = RecordingSink(received.clone());
        let mut queue = BufferedLastRecordQueue::new(&mut recording);
        let cancellation = CancellationToken::new();
        queue.enqueue(event(0), &cancellation).unwrap();
        queue.enqueue(event(1), &cancellation).unwrap();
        let seen = received.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].offset.row, 0);
    }

    #[test]
    fn flush_releases_the_held_event_transformed() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let mut recording = RecordingSink(received.clone());
        let mut queue = BufferedLastRecordQueue::new(&mut recording);
        let cancellation = CancellationToken::new();
        queue.enqueue(event(0), &cancellation).unwrap();
        queue.enqueue(event(1), &cancellation).unwrap();
        queue
            .flush(
                |mut e| {
                    e.offset.snapshot = Some(crate::model::OffsetSnapshotFlag::Last);
                    e
                },
                &cancellation,
            )
            .unwrap();
        let seen = received.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].offset.snapshot, Some(crate::model::OffsetSnapshotFlag::Last));
    }
}
