use std::{fmt, str::FromStr};

use crate::{
    catalog::DropAllReport,
    table::{FamilyValues, Row, RowId, TableSnapshot, TableSummary, VersionHistory},
    util::{Result, Status},
};

/// A put is either a new row or new versions on an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutAction {
    Insert,
    Update(RowId),
}

impl PutAction {
    /// Build an action from its name and an optional row id.
    ///
    /// `update` requires a row id; `insert` ignores it.
    pub fn parse(action: &str, row: Option<&str>) -> Result<Self> {
        match action.trim().to_ascii_lowercase().as_str() {
            "insert" => Ok(PutAction::Insert),
            "update" => {
                let row = row.ok_or_else(|| {
                    Status::invalid_argument("update requires a row id")
                })?;
                Ok(PutAction::Update(row.parse()?))
            }
            other => Err(Status::invalid_argument(format!(
                "Unknown put action '{other}', expected insert or update"
            ))),
        }
    }
}

impl FromStr for PutAction {
    type Err = Status;

    fn from_str(s: &str) -> Result<Self> {
        PutAction::parse(s, None)
    }
}

/// Operations accepted by [`Shell`](super::Shell).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        name: String,
        column_families: Vec<String>,
        max_versions: Option<usize>,
        overwrite: bool,
    },
    List,
    Disable {
        name: String,
    },
    Enable {
        name: String,
    },
    IsEnabled {
        name: String,
    },
    Alter {
        name: String,
        new_name: String,
        add_families: Vec<String>,
    },
    Drop {
        name: String,
    },
    DropAll {
        pattern: String,
    },
    Describe {
        name: String,
    },
    Put {
        table: String,
        action: PutAction,
        values: FamilyValues,
    },
    Get {
        table: String,
        row: RowId,
    },
    Cell {
        table: String,
        row: RowId,
        family: String,
        property: String,
    },
    Scan {
        table: String,
    },
    Count {
        table: String,
    },
    Export {
        table: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::List => "list",
            Command::Disable { .. } => "disable",
            Command::Enable { .. } => "enable",
            Command::IsEnabled { .. } => "is_enabled",
            Command::Alter { .. } => "alter",
            Command::Drop { .. } => "drop",
            Command::DropAll { .. } => "drop_all",
            Command::Describe { .. } => "describe",
            Command::Put { .. } => "put",
            Command::Get { .. } => "get",
            Command::Cell { .. } => "cell",
            Command::Scan { .. } => "scan",
            Command::Count { .. } => "count",
            Command::Export { .. } => "export",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a command, for the presentation layer to render.
#[derive(Debug, Clone)]
pub enum CommandOutput {
    Created(TableSnapshot),
    Tables(Vec<TableSummary>),
    Enabled(bool),
    Altered(TableSnapshot),
    DropAll(DropAllReport),
    Description(TableSnapshot),
    Inserted(RowId),
    Row(Row),
    Cell(VersionHistory),
    Rows(Vec<(RowId, Row)>),
    Count(usize),
    Export(String),
    /// Commands with nothing to report beyond success.
    Done,
}
