use std::{collections::BTreeMap, path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::{
    options::{CreateMode, StoreOptions},
    statistics::Statistics,
    storage::FileStore,
    table::{
        FamilyValues, Row, RowId, Table, TableSnapshot, TableSummary, Transition, VersionHistory,
        validate_table_name,
    },
    util::{Clock, Result, Status, SystemClock},
};

type TableHandle = Arc<Mutex<Table>>;

/// Outcome of a pattern drop.
#[derive(Debug, Clone, Default)]
pub struct DropAllReport {
    /// Tables that were dropped, in name order.
    pub dropped: Vec<String>,
    /// Matching tables that were left in place, with the reason.
    pub skipped: Vec<(String, Status)>,
}

impl DropAllReport {
    pub fn num_dropped(&self) -> usize {
        self.dropped.len()
    }

    pub fn num_matched(&self) -> usize {
        self.dropped.len() + self.skipped.len()
    }
}

/// The table catalog: every table of one data directory.
///
/// All records are loaded at open into a name-ordered index. Each table sits
/// behind its own mutex, held for the whole read-modify-write of an
/// operation:
///
/// ```text
/// lock table → clone → mutate clone → persist clone → swap into index
/// ```
///
/// A failure at any step drops the clone, so memory and disk keep the
/// previous state.
///
/// # Lock order
///
/// `tables` (index) before any table mutex. Operations that add, remove or
/// rename entries (create, alter, drop) take the index for writing; the rest
/// take it for reading.
pub struct Catalog {
    store: FileStore,
    tables: RwLock<BTreeMap<String, TableHandle>>,
    options: StoreOptions,
    clock: Arc<dyn Clock>,
    statistics: Arc<Statistics>,
}

impl Catalog {
    pub fn open<P: AsRef<Path>>(dir: P, options: StoreOptions) -> Result<Self> {
        Self::open_with_clock(dir, options, Arc::new(SystemClock))
    }

    pub fn open_with_clock<P: AsRef<Path>>(
        dir: P,
        options: StoreOptions,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if options.default_max_versions == 0 {
            return Err(Status::invalid_argument(
                "default_max_versions must be a positive integer",
            ));
        }

        let store = FileStore::open(dir, &options)?;
        let tables: BTreeMap<String, TableHandle> = store
            .load_all()?
            .into_iter()
            .map(|t| (t.name().to_string(), Arc::new(Mutex::new(t))))
            .collect();

        info!(
            path = %store.dir().display(),
            tables = tables.len(),
            "opened catalog"
        );

        Ok(Catalog {
            store,
            tables: RwLock::new(tables),
            options,
            clock,
            statistics: Arc::new(Statistics::new()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        self.store.dir()
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn statistics(&self) -> &Arc<Statistics> {
        &self.statistics
    }

    /// Create a table. `max_versions` falls back to
    /// `StoreOptions::default_max_versions`.
    pub fn create<S: AsRef<str>>(
        &self,
        name: &str,
        column_families: &[S],
        max_versions: Option<usize>,
        mode: CreateMode,
    ) -> Result<TableSnapshot> {
        let max_versions = max_versions.unwrap_or(self.options.default_max_versions);
        let table = Table::new(name, column_families, max_versions, self.clock.now())?;

        let mut tables = self.tables.write();
        let exists = tables.contains_key(name) || self.store.exists(name);
        if exists && mode == CreateMode::FailIfExists {
            return Err(Status::already_exists(format!(
                "Table '{name}' already exists"
            )));
        }

        self.persist(&table)?;
        let snapshot = table.snapshot();
        tables.insert(name.to_string(), Arc::new(Mutex::new(table)));

        self.statistics.record_table_created();
        info!(
            table = name,
            families = ?snapshot.column_families,
            max_versions,
            overwritten = exists,
            "created table"
        );
        Ok(snapshot)
    }

    /// All tables, ordered by name.
    pub fn list(&self) -> Vec<TableSummary> {
        let tables = self.tables.read();
        tables.values().map(|t| t.lock().summary()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// Detached copy of the full table record.
    pub fn find(&self, name: &str) -> Result<Table> {
        self.read(name, |t| Ok(t.clone()))
    }

    pub fn describe(&self, name: &str) -> Result<TableSnapshot> {
        self.read(name, |t| Ok(t.snapshot()))
    }

    /// The table record as pretty-printed JSON, rows included.
    pub fn export(&self, name: &str) -> Result<String> {
        self.read(name, |t| Ok(serde_json::to_string_pretty(t)?))
    }

    pub fn is_enabled(&self, name: &str) -> Result<bool> {
        self.read(name, |t| Ok(t.state().is_enabled()))
    }

    pub fn enable(&self, name: &str) -> Result<()> {
        self.transition(name, Transition::Enable)
    }

    pub fn disable(&self, name: &str) -> Result<()> {
        self.transition(name, Transition::Disable)
    }

    /// Rename the table and append column families. The table must be
    /// disabled and `new_name` must not belong to another table.
    pub fn alter<S: AsRef<str>>(
        &self,
        name: &str,
        new_name: &str,
        added_families: &[S],
    ) -> Result<TableSnapshot> {
        validate_table_name(new_name)?;

        let mut tables = self.tables.write();
        let handle = Self::lookup(&tables, name)?.clone();
        let mut guard = handle.lock();
        guard.state().require_disabled(name, "alter")?;

        let renamed = new_name != name;
        if renamed && (tables.contains_key(new_name) || self.store.exists(new_name)) {
            return Err(Status::already_exists(format!(
                "Cannot rename '{name}': table '{new_name}' already exists"
            )));
        }

        let mut draft = guard.clone();
        draft.alter(new_name, added_families, self.clock.now())?;
        self.persist(&draft)?;

        if renamed && let Err(e) = self.store.remove(name) {
            if let Err(undo) = self.store.remove(new_name) {
                warn!(table = new_name, error = %undo, "failed to undo rename");
            }
            self.statistics.record_error();
            return Err(e);
        }

        let snapshot = draft.snapshot();
        *guard = draft;
        drop(guard);

        if renamed {
            tables.remove(name);
            tables.insert(new_name.to_string(), handle);
        }

        self.statistics.record_table_altered();
        info!(
            table = name,
            new_name,
            families = ?snapshot.column_families,
            "altered table"
        );
        Ok(snapshot)
    }

    /// Drop a disabled table and all of its rows.
    pub fn drop(&self, name: &str) -> Result<()> {
        let mut tables = self.tables.write();
        self.drop_locked(&mut tables, name)
    }

    /// Drop every table whose name matches the shell-style glob `pattern`.
    ///
    /// Tables that cannot be dropped are reported in
    /// [`DropAllReport::skipped`]; they do not stop the batch.
    pub fn drop_all(&self, pattern: &str) -> Result<DropAllReport> {
        let pattern = glob::Pattern::new(pattern)?;

        let mut tables = self.tables.write();
        let matches: Vec<String> = tables
            .keys()
            .filter(|name| pattern.matches(name))
            .cloned()
            .collect();

        let mut report = DropAllReport::default();
        for name in matches {
            match self.drop_locked(&mut tables, &name) {
                Ok(()) => report.dropped.push(name),
                Err(e) => {
                    warn!(table = %name, reason = %e, "skipped table in drop_all");
                    self.statistics.record_drop_all_skip();
                    report.skipped.push((name, e));
                }
            }
        }

        info!(
            pattern = pattern.as_str(),
            dropped = report.dropped.len(),
            skipped = report.skipped.len(),
            "drop_all finished"
        );
        Ok(report)
    }

    /// Insert a new row. Every family in `values` must be declared.
    pub fn insert(&self, name: &str, values: &FamilyValues) -> Result<RowId> {
        let id = self.mutate(name, |t, now| t.insert_row(values, now))?;
        self.statistics.record_insert(count_cells(values));
        debug!(table = name, row = %id, "inserted row");
        Ok(id)
    }

    /// Write new versions of the supplied properties of an existing row.
    pub fn update(&self, name: &str, row: &RowId, values: &FamilyValues) -> Result<()> {
        let evicted = self.mutate(name, |t, now| t.update_row(row, values, now))?;
        self.statistics
            .record_update(count_cells(values), evicted as u64);
        debug!(table = name, row = %row, evicted, "updated row");
        Ok(())
    }

    pub fn get_row(&self, name: &str, row: &RowId) -> Result<Row> {
        self.read(name, |t| {
            t.row(row)
                .cloned()
                .ok_or_else(|| Status::not_found(format!("Row {row} not found in table '{name}'")))
        })
    }

    /// Full version history of one property.
    pub fn cell(
        &self,
        name: &str,
        row: &RowId,
        family: &str,
        property: &str,
    ) -> Result<VersionHistory> {
        self.read(name, |t| {
            if !t.has_family(family) {
                return Err(Status::unknown_family(format!(
                    "Column family '{family}' is not declared in table '{name}'"
                )));
            }
            let r = t.row(row).ok_or_else(|| {
                Status::not_found(format!("Row {row} not found in table '{name}'"))
            })?;
            r.cell(family, property).cloned().ok_or_else(|| {
                Status::not_found(format!("Row {row} has no value for {family}:{property}"))
            })
        })
    }

    /// Every row of the table in row id order.
    pub fn scan(&self, name: &str) -> Result<Vec<(RowId, Row)>> {
        self.read(name, |t| {
            Ok(t.rows().map(|(id, row)| (*id, row.clone())).collect())
        })
    }

    pub fn count_rows(&self, name: &str) -> Result<usize> {
        self.read(name, |t| Ok(t.num_rows()))
    }

    fn transition(&self, name: &str, transition: Transition) -> Result<()> {
        self.mutate(name, |t, now| {
            t.transition(transition, now);
            Ok(())
        })?;
        self.statistics.record_state_change();
        info!(table = name, ?transition, "changed table state");
        Ok(())
    }

    fn drop_locked(&self, tables: &mut BTreeMap<String, TableHandle>, name: &str) -> Result<()> {
        // The index write lock excludes every table-level reader and writer.
        let handle = Self::lookup(tables, name)?;
        let guard = handle.lock();
        guard.state().require_disabled(name, "drop")?;

        match self.store.remove(name) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                warn!(table = name, "record already missing on disk");
            }
            Err(e) => {
                self.statistics.record_error();
                return Err(e);
            }
        }
        drop(guard);

        tables.remove(name);
        self.statistics.record_table_dropped();
        info!(table = name, "dropped table");
        Ok(())
    }

    fn lookup<'a>(
        tables: &'a BTreeMap<String, TableHandle>,
        name: &str,
    ) -> Result<&'a TableHandle> {
        tables
            .get(name)
            .ok_or_else(|| Status::not_found(format!("Table '{name}' not found")))
    }

    fn read<T>(&self, name: &str, f: impl FnOnce(&Table) -> Result<T>) -> Result<T> {
        let tables = self.tables.read();
        let guard = Self::lookup(&tables, name)?.lock();
        f(&guard)
    }

    fn mutate<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Table, DateTime<Utc>) -> Result<T>,
    ) -> Result<T> {
        let tables = self.tables.read();
        let mut guard = Self::lookup(&tables, name)?.lock();

        let mut draft = guard.clone();
        let out = f(&mut draft, self.clock.now())?;
        self.persist(&draft)?;
        *guard = draft;
        Ok(out)
    }

    fn persist(&self, table: &Table) -> Result<()> {
        match self.store.save(table) {
            Ok(bytes) => {
                self.statistics.record_persist(bytes);
                Ok(())
            }
            Err(e) => {
                self.statistics.record_error();
                warn!(table = table.name(), error = %e, "failed to persist table");
                Err(e)
            }
        }
    }
}

fn count_cells(values: &FamilyValues) -> u64 {
    values.values().map(|props| props.len() as u64).sum()
}
