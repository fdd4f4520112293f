//! Durable table records.
mod dir_lock;
mod file_store;

pub use dir_lock::{DirLock, LOCK_FILE_NAME};
pub use file_store::{FileStore, TABLE_FILE_EXTENSION};
