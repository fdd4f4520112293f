use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time copy of a table's metadata, detached from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    pub name: String,
    pub column_families: Vec<String>,
    pub disabled: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub max_versions: usize,
    pub row_count: usize,
}

/// Entry returned by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub column_families: Vec<String>,
}
