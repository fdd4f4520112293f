pub mod catalog;
pub mod options;
pub mod shell;
pub mod statistics;
pub mod storage;
pub mod table;
pub mod util;

pub use catalog::{Catalog, DropAllReport};
pub use options::{CreateMode, StoreOptions};
pub use shell::{Command, CommandOutput, PutAction, Shell};
pub use statistics::Statistics;
pub use table::{
    DEFAULT_MAX_VERSIONS, FamilyValues, Row, RowId, Table, TableSnapshot, TableState,
    TableSummary, VersionHistory,
};
pub use util::{Clock, Code, ManualClock, Result, Status, SystemClock};
