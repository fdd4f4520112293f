use crate::table::DEFAULT_MAX_VERSIONS;

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Create the data directory if it does not exist.
    pub create_if_missing: bool,
    /// Fail to open if the data directory already holds tables.
    pub error_if_exists: bool,
    /// Versions kept per property when `create` is not given a cap.
    pub default_max_versions: usize,
    /// fsync each record (and the directory) before a commit returns.
    pub sync_writes: bool,
    /// Hold an exclusive advisory lock on the data directory while open.
    pub lock_data_dir: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            create_if_missing: true,
            error_if_exists: false,
            default_max_versions: DEFAULT_MAX_VERSIONS,
            sync_writes: true,
            lock_data_dir: true,
        }
    }
}

/// What `create` does when a table of the same name already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
    #[default]
    FailIfExists,
    /// Replace the existing table, rows included. Callers pass this only
    /// after the user confirmed the overwrite.
    Overwrite,
}
