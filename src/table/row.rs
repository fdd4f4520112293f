use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    table::VersionHistory,
    util::{Result, Status},
};

/// Values supplied to a put: family name -> property name -> value.
pub type FamilyValues = BTreeMap<String, BTreeMap<String, String>>;

/// Unique identifier of a row within its table.
///
/// Ids are UUIDv7, so they sort roughly in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(Uuid);

impl RowId {
    pub(crate) fn generate() -> Self {
        RowId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RowId {
    type Err = Status;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(RowId)
            .map_err(|e| Status::invalid_argument(format!("Invalid row id '{s}': {e}")))
    }
}

/// One row: family -> property -> version history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    families: BTreeMap<String, BTreeMap<String, VersionHistory>>,
}

impl Row {
    pub fn families(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, VersionHistory>)> {
        self.families.iter().map(|(name, props)| (name.as_str(), props))
    }

    pub fn family(&self, family: &str) -> Option<&BTreeMap<String, VersionHistory>> {
        self.families.get(family)
    }

    pub fn cell(&self, family: &str, property: &str) -> Option<&VersionHistory> {
        self.families.get(family)?.get(property)
    }

    /// Most recent value of a property.
    pub fn latest(&self, family: &str, property: &str) -> Option<&str> {
        self.cell(family, property)?.latest().map(|(_, value)| value)
    }

    /// Number of properties holding at least one version.
    pub fn num_cells(&self) -> usize {
        self.families.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.num_cells() == 0
    }

    /// Write every supplied property, leaving the rest of the row as is.
    ///
    /// Returns the number of versions evicted by the cap.
    pub(crate) fn apply(
        &mut self,
        values: &FamilyValues,
        now: DateTime<Utc>,
        max_versions: usize,
    ) -> usize {
        let mut evicted = 0;
        for (family, props) in values {
            let cells = self.families.entry(family.clone()).or_default();
            for (property, value) in props {
                let history = cells.entry(property.clone()).or_default();
                evicted += history.record(now, value.as_str(), max_versions).1;
            }
        }
        evicted
    }

    pub(crate) fn family_names(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }
}
