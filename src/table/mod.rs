/// Table model: metadata, rows and per-property version histories.
///
/// ```text
/// Table "users" (max_versions = 3)
///  ├─→ Row 0190a5e2-...
///  │    ├─→ family "personal"
///  │    │    ├─→ "name": { t1: "alice", t2: "alicia" }
///  │    │    └─→ "city": { t1: "paris" }
///  │    └─→ family "work"
///  │         └─→ "title": { t3: "engineer" }
///  └─→ Row 0190a5e3-...
///       └─→ ...
/// ```
///
/// Every property keeps at most `max_versions` versions; writing past the
/// cap evicts the oldest one.
pub mod lifecycle;
mod row;
mod snapshot;
#[allow(clippy::module_inception)]
mod table;
mod version_history;

pub use lifecycle::{TableState, Transition};
pub use row::{FamilyValues, Row, RowId};
pub use snapshot::{TableSnapshot, TableSummary};
pub use table::{DEFAULT_MAX_VERSIONS, Table, validate_family_name, validate_table_name};
pub use version_history::VersionHistory;
