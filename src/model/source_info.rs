//! Source-partition bookkeeping: the binlog coordinate a snapshot is
//! pinned to, and the marker that tells a downstream consumer whether a
//! given change event was produced by the snapshot or by live replication
//! (SPEC_FULL.md §3, §4.6 Step 3 and Step 10).

use uuid::Uuid;

use super::offset::{Offset, OffsetSnapshotFlag};

/// The binlog coordinate captured while the global read lock (or, in
/// minimal-locking mode, the consistent snapshot transaction) is held.
/// `gtid_set` is empty when the server does not have GTIDs enabled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BinlogCoordinate {
    pub file: String,
    pub position: u64,
    pub gtid_set: String,
}

impl BinlogCoordinate {
    pub fn new(file: impl Into<String>, position: u64, gtid_set: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            position,
            gtid_set: gtid_set.into(),
        }
    }

    pub fn has_gtids(&self) -> bool {
        !self.gtid_set.is_empty()
    }
}

/// Where a run currently is in the snapshot lifecycle, mirrored into every
/// change event's offset so a consumer can tell a snapshot-sourced record
/// from a binlog-sourced one without inspecting anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotMarker {
    /// Not currently snapshotting; offsets carry no snapshot flag at all.
    None,
    /// Snapshot in progress, more rows to come.
    InProgress,
    /// This is the final row of the final table in the snapshot.
    Last,
    /// Snapshot has fully completed and handed off to streaming.
    Complete,
}

/// Per-run source metadata threaded through every emitted event. `run_id`
/// disambiguates events across restarts of the same configured source.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub run_id: Uuid,
    pub binlog: BinlogCoordinate,
    pub snapshot: SnapshotMarker,
}

impl SourceInfo {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            binlog: BinlogCoordinate::default(),
            snapshot: SnapshotMarker::None,
        }
    }

    pub fn with_binlog_coordinate(mut self, binlog: BinlogCoordinate) -> Self {
        self.binlog = binlog;
        self.snapshot = SnapshotMarker::InProgress;
        self
    }

    pub fn mark_in_progress(&mut self) {
        self.snapshot = SnapshotMarker::InProgress;
    }

    /// Called by the buffered last-record queue when it rewrites the
    /// final queued event on flush (SPEC_FULL.md §4.6 Step 10).
    pub fn mark_last(&mut self) {
        self.snapshot = SnapshotMarker::Last;
    }

    pub fn mark_complete(&mut self) {
        self.snapshot = SnapshotMarker::Complete;
    }

    /// Projects this source state plus a row position into the
    /// serializable progress offset a consumer persists (§6).
    pub fn to_offset(&self, row: u64) -> Offset {
        let snapshot_flag = match self.snapshot {
            SnapshotMarker::None | SnapshotMarker::Complete => None,
            SnapshotMarker::InProgress => Some(OffsetSnapshotFlag::True),
            SnapshotMarker::Last => Some(OffsetSnapshotFlag::Last),
        };
        Offset {
            file: self.binlog.file.clone(),
            pos: self.binlog.position,
            gtids: if self.binlog.has_gtids() {
                Some(self.binlog.gtid_set.clone())
            } else {
                None
            },
            snapshot: snapshot_flag,
            row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_source_info_carries_no_snapshot_flag() {
        let source = SourceInfo::new(Uuid::nil());
        let offset = source.to_offset(0);
        assert_eq!(offset.snapshot, None);
    }

    #[test]
    fn pinning_a_coordinate_marks_in_progress() {
        let source = SourceInfo::new(Uuid::nil())
            .with_binlog_coordinate(BinlogCoordinate::new("mysql-bin.000003", 194, ""));
        let offset = source.to_offset(5);
        assert_eq!(offset.snapshot, Some(OffsetSnapshotFlag::True));
        assert_eq!(offset.file, "mysql-bin.000003");
        assert_eq!(offset.pos, 194);
        assert_eq!(offset.gtids, None);
    }

    #[test]
    fn marking_last_changes_the_serialized_flag() {
        let mut source = SourceInfo::new(Uuid::nil())
            .with_binlog_coordinate(BinlogCoordinate::new("mysql-bin.000003", 194, ""));
        source.mark_last();
        assert_eq!(source.to_offset(99).snapshot, Some(OffsetSnapshotFlag::Last));
    }
}
