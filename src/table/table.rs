use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    table::{
        FamilyValues, Row, RowId, TableSnapshot, TableSummary,
        lifecycle::{TableState, Transition},
    },
    util::{Result, Status, clock::next_after},
};

/// Default number of versions retained per property.
pub const DEFAULT_MAX_VERSIONS: usize = 3;

/// A table record: metadata plus every row it owns.
///
/// This is also the on-disk format; one `Table` is serialized per file.
/// Mutating methods are crate-private so that every change goes through the
/// catalog, which applies it to a copy and persists before publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    column_families: Vec<String>,
    disabled: bool,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    max_versions: usize,
    #[serde(default)]
    rows: BTreeMap<RowId, Row>,
}

impl Table {
    pub(crate) fn new<S: AsRef<str>>(
        name: &str,
        column_families: &[S],
        max_versions: usize,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        validate_table_name(name)?;
        if max_versions == 0 {
            return Err(Status::invalid_argument(
                "max_versions must be a positive integer",
            ));
        }

        let mut families = Vec::with_capacity(column_families.len());
        for family in column_families {
            let family = family.as_ref().trim();
            validate_family_name(family)?;
            if !families.iter().any(|f| f == family) {
                families.push(family.to_string());
            }
        }

        let now = next_after(now, None);
        Ok(Table {
            name: name.to_string(),
            column_families: families,
            disabled: false,
            created: now,
            modified: now,
            max_versions,
            rows: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_families(&self) -> &[String] {
        &self.column_families
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.column_families.iter().any(|f| f == family)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn state(&self) -> TableState {
        TableState::from_disabled(self.disabled)
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    pub fn max_versions(&self) -> usize {
        self.max_versions
    }

    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.rows.get(id)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&RowId, &Row)> {
        self.rows.iter()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            name: self.name.clone(),
            column_families: self.column_families.clone(),
            disabled: self.disabled,
            created: self.created,
            modified: self.modified,
            max_versions: self.max_versions,
            row_count: self.rows.len(),
        }
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            name: self.name.clone(),
            column_families: self.column_families.clone(),
        }
    }

    /// Check a record read back from storage.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_versions == 0 {
            return Err(Status::corruption(format!(
                "Table '{}' has max_versions = 0",
                self.name
            )));
        }
        for (i, family) in self.column_families.iter().enumerate() {
            if self.column_families[..i].contains(family) {
                return Err(Status::corruption(format!(
                    "Table '{}' declares column family '{}' twice",
                    self.name, family
                )));
            }
        }
        for (id, row) in &self.rows {
            if let Some(family) = row.family_names().find(|f| !self.has_family(f)) {
                return Err(Status::corruption(format!(
                    "Row {id} in table '{}' references undeclared family '{family}'",
                    self.name
                )));
            }
            for (family, cells) in row.families() {
                for (property, history) in cells {
                    if history.len() > self.max_versions {
                        return Err(Status::corruption(format!(
                            "Row {id} in table '{}' holds {} versions of {family}:{property}, \
                             max_versions is {}",
                            self.name,
                            history.len(),
                            self.max_versions
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn transition(&mut self, transition: Transition, now: DateTime<Utc>) {
        self.disabled = self.state().apply(transition).is_disabled();
        self.touch(now);
    }

    /// Rename and/or append families. Requires the table to be disabled.
    ///
    /// Checking the new name against other tables is the catalog's job.
    pub(crate) fn alter<S: AsRef<str>>(
        &mut self,
        new_name: &str,
        added_families: &[S],
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.state().require_disabled(&self.name, "alter")?;
        validate_table_name(new_name)?;

        let mut families = self.column_families.clone();
        for family in added_families {
            let family = family.as_ref().trim();
            validate_family_name(family)?;
            if !families.iter().any(|f| f == family) {
                families.push(family.to_string());
            }
        }

        self.name = new_name.to_string();
        self.column_families = families;
        self.touch(now);
        Ok(())
    }

    pub(crate) fn insert_row(
        &mut self,
        values: &FamilyValues,
        now: DateTime<Utc>,
    ) -> Result<RowId> {
        self.check_families(values)?;

        let mut id = RowId::generate();
        while self.rows.contains_key(&id) {
            id = RowId::generate();
        }

        let mut row = Row::default();
        row.apply(values, now, self.max_versions);
        self.rows.insert(id, row);
        self.touch(now);
        Ok(id)
    }

    /// Returns the number of evicted versions.
    pub(crate) fn update_row(
        &mut self,
        id: &RowId,
        values: &FamilyValues,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        self.check_families(values)?;

        let max_versions = self.max_versions;
        let row = self.rows.get_mut(id).ok_or_else(|| {
            Status::not_found(format!("Row {id} not found in table '{}'", self.name))
        })?;
        let evicted = row.apply(values, now, max_versions);
        self.touch(now);
        Ok(evicted)
    }

    fn check_families(&self, values: &FamilyValues) -> Result<()> {
        match values.keys().find(|family| !self.has_family(family)) {
            Some(family) => Err(Status::unknown_family(format!(
                "Column family '{family}' is not declared in table '{}'",
                self.name
            ))),
            None => Ok(()),
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.modified = next_after(now, Some(self.modified));
    }
}

/// Table names double as file names, so path-like names are rejected.
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Status::invalid_argument("Table name must not be empty"));
    }
    if name != name.trim() {
        return Err(Status::invalid_argument(format!(
            "Table name '{name}' has leading or trailing whitespace"
        )));
    }
    if name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        return Err(Status::invalid_argument(format!(
            "Table name '{name}' is not a valid file name"
        )));
    }
    Ok(())
}

pub fn validate_family_name(family: &str) -> Result<()> {
    if family.is_empty() {
        return Err(Status::invalid_argument(
            "Column family name must not be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 10, 0, 0).unwrap()
    }

    fn values(family: &str, property: &str, value: &str) -> FamilyValues {
        let mut fv = FamilyValues::new();
        fv.entry(family.to_string())
            .or_default()
            .insert(property.to_string(), value.to_string());
        fv
    }

    #[test]
    fn test_new_table_defaults() {
        let table = Table::new("users", &["personal", "work"], 3, now()).unwrap();
        assert_eq!(table.name(), "users");
        assert_eq!(table.column_families(), &["personal", "work"]);
        assert!(!table.is_disabled());
        assert_eq!(table.created(), table.modified());
        assert_eq!(table.max_versions(), 3);
        assert_eq!(table.num_rows(), 0);
    }

    #[test]
    fn test_new_table_dedupes_families_in_order() {
        let table = Table::new("t", &["b", "a", "b", " a "], 1, now()).unwrap();
        assert_eq!(table.column_families(), &["b", "a"]);
    }

    #[test]
    fn test_new_table_rejects_bad_arguments() {
        assert!(
            Table::new("t", &["cf"], 0, now())
                .unwrap_err()
                .is_invalid_argument()
        );
        assert!(
            Table::new("", &["cf"], 3, now())
                .unwrap_err()
                .is_invalid_argument()
        );
        assert!(
            Table::new("../etc", &["cf"], 3, now())
                .unwrap_err()
                .is_invalid_argument()
        );
        assert!(
            Table::new("t", &[""], 3, now())
                .unwrap_err()
                .is_invalid_argument()
        );
    }

    #[test]
    fn test_insert_rejects_unknown_family() {
        let mut table = Table::new("users", &["personal"], 3, now()).unwrap();
        let before = table.clone();

        let mut fv = values("personal", "name", "alice");
        fv.extend(values("badfam", "x", "y"));

        let err = table.insert_row(&fv, now()).unwrap_err();
        assert!(err.is_unknown_family());
        assert_eq!(table, before);
    }

    #[test]
    fn test_update_missing_row() {
        let mut table = Table::new("users", &["personal"], 3, now()).unwrap();
        let err = table
            .update_row(
                &RowId::generate(),
                &values("personal", "name", "bob"),
                now(),
            )
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_insert_and_update_row() {
        let mut table = Table::new("users", &["personal"], 2, now()).unwrap();
        let id = table
            .insert_row(&values("personal", "name", "alice"), now())
            .unwrap();

        for (i, name) in ["bob", "carol"].iter().enumerate() {
            table
                .update_row(
                    &id,
                    &values("personal", "name", name),
                    now() + Duration::seconds(i as i64 + 1),
                )
                .unwrap();
        }

        let history = table.row(&id).unwrap().cell("personal", "name").unwrap();
        let kept: Vec<&str> = history.iter().map(|(_, v)| v).collect();
        assert_eq!(kept, vec!["bob", "carol"]);
        assert_eq!(table.modified(), now() + Duration::seconds(2));
    }

    #[test]
    fn test_modified_always_advances() {
        let mut table = Table::new("users", &["personal"], 3, now()).unwrap();
        let created = table.modified();

        table.transition(Transition::Disable, now());
        let first = table.modified();
        table.transition(Transition::Disable, now());
        let second = table.modified();

        assert!(table.is_disabled());
        assert!(created < first && first < second);
    }

    #[test]
    fn test_alter_requires_disabled() {
        let mut table = Table::new("users", &["personal"], 3, now()).unwrap();
        let before = table.clone();

        let err = table.alter("people", &["work"], now()).unwrap_err();
        assert!(err.is_table_enabled());
        assert_eq!(table, before);

        table.transition(Transition::Disable, now());
        table.alter("people", &["work", "personal"], now()).unwrap();
        assert_eq!(table.name(), "people");
        assert_eq!(table.column_families(), &["personal", "work"]);
    }

    #[test]
    fn test_validate_rejects_undeclared_row_family() {
        let mut table = Table::new("users", &["personal"], 3, now()).unwrap();
        table
            .insert_row(&values("personal", "name", "alice"), now())
            .unwrap();
        assert!(table.validate().is_ok());

        let mut json = serde_json::to_value(&table).unwrap();
        json["column_families"] = serde_json::json!(["work"]);
        let tampered: Table = serde_json::from_value(json).unwrap();
        assert!(tampered.validate().unwrap_err().is_corruption());
    }

    #[test]
    fn test_validate_rejects_history_over_cap() {
        let mut table = Table::new("users", &["personal"], 5, now()).unwrap();
        let id = table
            .insert_row(&values("personal", "name", "v0"), now())
            .unwrap();
        for i in 1..5 {
            table
                .update_row(
                    &id,
                    &values("personal", "name", &format!("v{i}")),
                    now() + Duration::seconds(i),
                )
                .unwrap();
        }
        assert!(table.validate().is_ok());

        let mut json = serde_json::to_value(&table).unwrap();
        json["max_versions"] = serde_json::json!(2);
        let tampered: Table = serde_json::from_value(json).unwrap();
        assert!(tampered.validate().unwrap_err().is_corruption());
    }
}
