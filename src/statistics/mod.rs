use std::sync::atomic::{AtomicU64, Ordering};

/// Store-wide statistics
///
/// Thread-safe operation counters. Uses atomic counters for lock-free
/// updates.
#[derive(Debug, Default)]
pub struct Statistics {
    // Catalog operations
    pub tables_created: AtomicU64,
    pub tables_dropped: AtomicU64,
    pub tables_altered: AtomicU64,
    pub state_changes: AtomicU64,
    pub drop_all_skipped: AtomicU64,

    // Row operations
    pub rows_inserted: AtomicU64,
    pub rows_updated: AtomicU64,
    pub cells_written: AtomicU64,
    pub versions_evicted: AtomicU64,

    // Persistence
    pub records_persisted: AtomicU64,
    pub bytes_persisted: AtomicU64,

    // Error counts
    pub num_errors: AtomicU64,
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    #[inline]
    pub fn record_table_created(&self) {
        self.tables_created.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_table_dropped(&self) {
        self.tables_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_table_altered(&self) {
        self.tables_altered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_state_change(&self) {
        self.state_changes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_drop_all_skip(&self) {
        self.drop_all_skipped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_insert(&self, cells: u64) {
        self.rows_inserted.fetch_add(1, Ordering::Relaxed);
        self.cells_written.fetch_add(cells, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_update(&self, cells: u64, evicted: u64) {
        self.rows_updated.fetch_add(1, Ordering::Relaxed);
        self.cells_written.fetch_add(cells, Ordering::Relaxed);
        self.versions_evicted.fetch_add(evicted, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_persist(&self, bytes: u64) {
        self.records_persisted.fetch_add(1, Ordering::Relaxed);
        self.bytes_persisted.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_error(&self) {
        self.num_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        for counter in [
            &self.tables_created,
            &self.tables_dropped,
            &self.tables_altered,
            &self.state_changes,
            &self.drop_all_skipped,
            &self.rows_inserted,
            &self.rows_updated,
            &self.cells_written,
            &self.versions_evicted,
            &self.records_persisted,
            &self.bytes_persisted,
            &self.num_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Human readable dump of all counters
    pub fn report(&self) -> String {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        let mut s = String::new();

        s.push_str("Catalog:\n");
        s.push_str(&format!(
            "  Tables created: {}\n",
            load(&self.tables_created)
        ));
        s.push_str(&format!(
            "  Tables dropped: {}\n",
            load(&self.tables_dropped)
        ));
        s.push_str(&format!(
            "  Tables altered: {}\n",
            load(&self.tables_altered)
        ));
        s.push_str(&format!("  State changes: {}\n", load(&self.state_changes)));
        s.push_str(&format!(
            "  Drop-all skips: {}\n",
            load(&self.drop_all_skipped)
        ));

        s.push_str("\nRows:\n");
        s.push_str(&format!("  Inserted: {}\n", load(&self.rows_inserted)));
        s.push_str(&format!("  Updated: {}\n", load(&self.rows_updated)));
        s.push_str(&format!("  Cells written: {}\n", load(&self.cells_written)));
        s.push_str(&format!(
            "  Versions evicted: {}\n",
            load(&self.versions_evicted)
        ));

        s.push_str("\nPersistence:\n");
        s.push_str(&format!(
            "  Records written: {}\n",
            load(&self.records_persisted)
        ));
        s.push_str(&format!(
            "  Bytes written: {}\n",
            load(&self.bytes_persisted)
        ));

        s.push_str(&format!("\nErrors: {}\n", load(&self.num_errors)));
        s
    }
}
