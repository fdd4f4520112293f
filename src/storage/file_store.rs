use std::{
    fs::{self, File},
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    options::StoreOptions,
    storage::DirLock,
    table::Table,
    util::{Result, Status},
};

pub const TABLE_FILE_EXTENSION: &str = "json";

/// One JSON record per table under a single data directory.
///
/// ```text
/// <dir>/
///  ├─→ LOCK              advisory lock, held while the store is open
///  ├─→ orders.json
///  └─→ users.json
/// ```
///
/// A record is written to a hidden temp file in the same directory, synced,
/// then renamed over `<name>.json`. Readers therefore see either the old
/// record or the new one, and a crash mid-write leaves other tables alone.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    sync_writes: bool,
    _lock: Option<DirLock>,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(dir: P, options: &StoreOptions) -> Result<Self> {
        let dir = dir.as_ref();

        if !dir.exists() {
            if !options.create_if_missing {
                return Err(Status::not_found(format!(
                    "Data directory {} does not exist",
                    dir.display()
                )));
            }
            fs::create_dir_all(dir).map_err(|e| {
                Status::io_error(format!("Failed to create {}: {e}", dir.display()))
            })?;
            debug!(path = %dir.display(), "created data directory");
        } else if !dir.is_dir() {
            return Err(Status::invalid_argument(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let lock = if options.lock_data_dir {
            Some(DirLock::acquire(dir)?)
        } else {
            None
        };

        let store = FileStore {
            dir: dir.to_path_buf(),
            sync_writes: options.sync_writes,
            _lock: lock,
        };

        if options.error_if_exists && !store.table_files()?.is_empty() {
            return Err(Status::already_exists(format!(
                "Data directory {} already contains tables",
                dir.display()
            )));
        }

        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{TABLE_FILE_EXTENSION}"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.table_path(name).is_file()
    }

    /// Read every table record in the directory.
    ///
    /// A record whose stored name does not match its file name is reported
    /// as corruption rather than silently indexed under the wrong name.
    pub fn load_all(&self) -> Result<Vec<Table>> {
        let mut tables = Vec::new();
        for path in self.table_files()? {
            let table = Self::read_record(&path)?;
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            if table.name() != stem {
                return Err(Status::corruption(format!(
                    "{} holds table '{}'",
                    path.display(),
                    table.name()
                )));
            }
            tables.push(table);
        }
        Ok(tables)
    }

    pub fn load(&self, name: &str) -> Result<Table> {
        let path = self.table_path(name);
        if !path.is_file() {
            return Err(Status::not_found(format!("Table '{name}' not found")));
        }
        Self::read_record(&path)
    }

    /// Atomically replace the record of `table`. Returns the bytes written.
    pub fn save(&self, table: &Table) -> Result<u64> {
        let bytes = serde_json::to_vec_pretty(table)?;
        let path = self.table_path(table.name());

        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        if self.sync_writes {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&path).map_err(|e| Status::from(e.error))?;

        if self.sync_writes {
            self.sync_dir();
        }

        debug!(table = table.name(), bytes = bytes.len(), "committed table record");
        Ok(bytes.len() as u64)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.table_path(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                if self.sync_writes {
                    self.sync_dir();
                }
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Status::not_found(format!("Table '{name}' not found")))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read_record(path: &Path) -> Result<Table> {
        let content = fs::read(path)?;
        let table: Table = serde_json::from_slice(&content).map_err(|e| {
            Status::corruption(format!("Failed to parse {}: {e}", path.display()))
        })?;
        table.validate()?;
        Ok(table)
    }

    fn table_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_record = path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(TABLE_FILE_EXTENSION)
                && !path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
            if is_record {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn sync_dir(&self) {
        if let Err(e) = File::open(&self.dir).and_then(|dir| dir.sync_all()) {
            warn!(path = %self.dir.display(), error = %e, "failed to sync data directory");
        }
    }
}
