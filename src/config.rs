//! Validated snapshot configuration (SPEC_FULL.md §4.9, §6). Validation
//! happens once, before a reader is constructed, so a misconfigured run
//! never opens a connection at all.

use rand::Rng;

use crate::error::SnapshotError;

/// Which snapshot behavior a reader run should carry out. Only the first
/// four variants ever drive the snapshot core; `never` is accepted for
/// parity with the upstream configuration surface but a reader built
/// with it should simply not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotMode {
    WhenNeeded,
    Initial,
    InitialOnly,
    SchemaOnly,
    Never,
}

impl SnapshotMode {
    /// Whether this mode drives Step 8 (the per-table row scan) at all.
    pub fn scans_rows(self) -> bool {
        !matches!(self, SnapshotMode::SchemaOnly | SnapshotMode::Never)
    }

    pub fn runs_snapshot(self) -> bool {
        !matches!(self, SnapshotMode::Never)
    }
}

/// An include/exclude pair over a single dimension (databases, tables,
/// columns, GTID sources). At most one side may be set; both empty means
/// "no restriction" for that dimension.
#[derive(Debug, Clone, Default)]
pub struct IncludeExclude {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl IncludeExclude {
    fn validate(&self, dimension: &str) -> Result<(), SnapshotError> {
        if !self.include.is_empty() && !self.exclude.is_empty() {
            return Err(SnapshotError::Config(format!(
                "{dimension}: include and exclude lists are mutually exclusive"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub mode: SnapshotMode,
    pub minimal_locks: bool,
    pub min_row_count_to_stream_results: u64,
    pub max_queue_size: usize,
    pub max_batch_size: usize,
    pub database_filter: IncludeExclude,
    pub table_filter: IncludeExclude,
    pub column_filter: IncludeExclude,
    pub gtid_source_filter: IncludeExclude,
    pub ignore_builtin_databases: bool,
    pub database_server_id: u32,
}

impl SnapshotConfig {
    /// Builds and validates a configuration. `database_server_id`, when
    /// `None`, is drawn from `[5400, 6400)` using the process-global CSPRNG
    /// (§4.9) — one draw per config build, not per connection.
    pub fn build(
        mode: SnapshotMode,
        minimal_locks: bool,
        min_row_count_to_stream_results: u64,
        max_queue_size: usize,
        max_batch_size: usize,
        database_filter: IncludeExclude,
        table_filter: IncludeExclude,
        column_filter: IncludeExclude,
        gtid_source_filter: IncludeExclude,
        ignore_builtin_databases: bool,
        database_server_id: Option<u32>,
    ) -> Result<Self, SnapshotError> {
        database_filter.validate("database")?;
        table_filter.validate("table")?;
        column_filter.validate("column")?;
        gtid_source_filter.validate("gtid source")?;

        if max_queue_size <= max_batch_size {
            return Err(SnapshotError::Config(
                "max.queue.size must exceed max.batch.size".into(),
            ));
        }

        let database_server_id =
            database_server_id.unwrap_or_else(|| rand::thread_rng().gen_range(5400..6400));

        Ok(Self {
            mode,
            minimal_locks,
            min_row_count_to_stream_results,
            max_queue_size,
            max_batch_size,
            database_filter,
            table_filter,
            column_filter,
            gtid_source_filter,
            ignore_builtin_databases,
            database_server_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(
        database_filter: IncludeExclude,
        max_queue_size: usize,
        max_batch_size: usize,
    ) -> Result<SnapshotConfig, SnapshotError> {
        SnapshotConfig::build(
            SnapshotMode::Initial,
            true,
            0,
            max_queue_size,
            max_batch_size,
            database_filter,
            IncludeExclude::default(),
            IncludeExclude::default(),
            IncludeExclude::default(),
            true,
            Some(5400),
        )
    }

    #[test]
    fn rejects_mutually_exclusive_include_and_exclude() {
        let filter = IncludeExclude {
            include: vec!["shop".into()],
            exclude: vec!["legacy".into()],
        };
        let result = base_config(filter, 100, 10);
        assert!(matches!(result, Err(SnapshotError::Config(_))));
    }

    #[test]
    fn rejects_queue_size_not_exceeding_batch_size() {
        let result = base_config(IncludeExclude::default(), 10, 10);
        assert!(matches!(result, Err(SnapshotError::Config(_))));
    }

    #[test]
    fn accepts_well_formed_configuration() {
        let result = base_config(IncludeExclude::default(), 100, 10);
        assert!(result.is_ok());
    }

    #[test]
    fn default_server_id_falls_in_range() {
        let config = SnapshotConfig::build(
            SnapshotMode::Initial,
            true,
            0,
            100,
            10,
            IncludeExclude::default(),
            IncludeExclude::default(),
            IncludeExclude::default(),
            IncludeExclude::default(),
            true,
            None,
        )
        .unwrap();
        assert!((5400..6400).contains(&config.database_server_id));
    }
}
