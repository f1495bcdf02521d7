//! Compiled include/exclude predicates over databases, tables, and
//! columns (SPEC_FULL.md §4.1). Built once from [`crate::config::SnapshotConfig`]
//! and consulted throughout the orchestrator's enumeration steps.

use regex::Regex;

use crate::config::{IncludeExclude, SnapshotConfig};
use crate::error::SnapshotError;
use crate::model::TableId;

const BUILTIN_DATABASES: &[&str] = &["mysql", "information_schema", "performance_schema", "sys"];

/// A compiled include/exclude pair. Matching is POSIX-extended,
/// case-sensitive, and anchored against the whole candidate string —
/// mirroring the source's habit of anchoring user-supplied filter
/// patterns rather than allowing a partial match.
struct CompiledList {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl CompiledList {
    fn compile(spec: &IncludeExclude, dimension: &str) -> Result<Self, SnapshotError> {
        let compile_all = |patterns: &[String]| -> Result<Vec<Regex>, SnapshotError> {
            patterns
                .iter()
                .map(|pattern| {
                    let anchored = format!("^(?:{pattern})$");
                    Regex::new(&anchored).map_err(|err| {
                        SnapshotError::Config(format!(
                            "invalid {dimension} filter pattern '{pattern}': {err}"
                        ))
                    })
                })
                .collect()
        };
        Ok(Self {
            include: compile_all(&spec.include)?,
            exclude: compile_all(&spec.exclude)?,
        })
    }

    fn matches(&self, candidate: &str) -> bool {
        if !self.exclude.is_empty() {
            return !self.exclude.iter().any(|re| re.is_match(candidate));
        }
        if !self.include.is_empty() {
            return self.include.iter().any(|re| re.is_match(candidate));
        }
        true
    }
}

pub struct FilterSet {
    database: CompiledList,
    table: CompiledList,
    column: CompiledList,
    ignore_builtin_databases: bool,
}

impl FilterSet {
    pub fn compile(config: &SnapshotConfig) -> Result<Self, SnapshotError> {
        Ok(Self {
            database: CompiledList::compile(&config.database_filter, "database")?,
            table: CompiledList::compile(&config.table_filter, "table")?,
            column: CompiledList::compile(&config.column_filter, "column")?,
            ignore_builtin_databases: config.ignore_builtin_databases,
        })
    }

    pub fn database_filter(&self, database: &str) -> bool {
        if self.ignore_builtin_databases && BUILTIN_DATABASES.contains(&database) {
            return false;
        }
        self.database.matches(database)
    }

    pub fn table_filter(&self, table: &TableId) -> bool {
        if !self.database_filter(table.schema.as_deref().unwrap_or_default()) {
            return false;
        }
        self.table.matches(&table.qualified_name())
    }

    pub fn column_filter(&self, table: &TableId, column: &str) -> bool {
        let qualified = format!("{}.{}", table.qualified_name(), column);
        self.column.matches(&qualified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(database_filter: IncludeExclude) -> SnapshotConfig {
        SnapshotConfig::build(
            crate::config::SnapshotMode::Initial,
            true,
            0,
            100,
            10,
            database_filter,
            IncludeExclude::default(),
            IncludeExclude::default(),
            IncludeExclude::default(),
            true,
            Some(5400),
        )
        .unwrap()
    }

    #[test]
    fn builtin_databases_excluded_by_default() {
        let filters = FilterSet::compile(&config_with(IncludeExclude::default())).unwrap();
        assert!(!filters.database_filter("mysql"));
        assert!(!filters.database_filter("information_schema"));
        assert!(filters.database_filter("shop"));
    }

    #[test]
    fn include_list_is_anchored() {
        let filters = FilterSet::compile(&config_with(IncludeExclude {
            include: vec!["sho.".into()],
            exclude: vec![],
        }))
        .unwrap();
        assert!(filters.database_filter("shop"));
        assert!(!filters.database_filter("shopfront"));
    }

    #[test]
    fn table_filter_respects_database_filter() {
        let filters = FilterSet::compile(&config_with(IncludeExclude {
            include: vec![],
            exclude: vec!["legacy".into()],
        }))
        .unwrap();
        let table = TableId::of("legacy", "orders");
        assert!(!filters.table_filter(&table));
    }
}
