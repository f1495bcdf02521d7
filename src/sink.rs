//! Downstream consumer of snapshot output (SPEC_FULL.md §6): an ordered
//! stream of row-change events and schema-change events. A sink applies
//! backpressure simply by blocking inside `accept_event`/
//! `accept_schema_change` — there is no separate flow-control signal.

use crate::error::SnapshotError;
use crate::model::{ChangeEvent, SchemaChange};

pub trait Sink: Send {
    fn accept_event(&mut self, event: ChangeEvent) -> Result<(), SnapshotError>;
    fn accept_schema_change(&mut self, change: SchemaChange) -> Result<(), SnapshotError>;
}

/// Collects everything it's handed, in order. Used by tests that want to
/// assert on the exact sequence of emitted events without standing up a
/// channel or broker.
#[derive(Default)]
pub struct InMemorySink {
    pub events: Vec<ChangeEvent>,
    pub schema_changes: Vec<SchemaChange>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for InMemorySink {
    fn accept_event(&mut self, event: ChangeEvent) -> Result<(), SnapshotError> {
        self.events.push(event);
        Ok(())
    }

    fn accept_schema_change(&mut self, change: SchemaChange) -> Result<(), SnapshotError> {
        self.schema_changes.push(change);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventKind, Offset};
    use serde_json::json;

    fn sample_event() -> ChangeEvent {
        ChangeEvent {
            source_partition: "run-1".into(),
            offset: Offset {
                file: "mysql-bin.000001".into(),
                pos: 4,
                gtids: None,
                snapshot: None,
                row: 0,
            },
            topic: "shop.orders".into(),
            key: json!({"id": 1}),
            key_schema: "shop.orders.key".into(),
            value: json!({"id": 1, "name": "a"}),
            value_schema: "shop.orders.value".into(),
            kind: EventKind::Read,
            ts_millis: 0,
        }
    }

    #[test]
    fn in_memory_sink_collects_events_in_order() {
        let mut sink = InMemorySink::new();
        sink.accept_event(sample_event()).unwrap();
        sink.accept_event(sample_event()).unwrap();
        assert_eq!(sink.events.len(), 2);
    }
}
