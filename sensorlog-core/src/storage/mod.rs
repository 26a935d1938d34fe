//! On-disk append-only sensor log
//!
//! A store file is one header line followed by fixed-length record lines.
//! Because every record has the same byte length, record boundaries are
//! pure offset arithmetic and timestamp lookups can bisect the file
//! directly, one record read per step, without an in-memory index.

mod store;

pub use store::Store;

use crate::schema::Schema;
use crate::Timestamp;
use serde::Serialize;
use std::path::PathBuf;

/// Store sync policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Call `sync_data` after every append
    Immediate,
    /// Leave write-back to the OS
    #[default]
    None,
}

impl std::str::FromStr for SyncPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "immediate" | "always" => Ok(SyncPolicy::Immediate),
            "none" | "never" => Ok(SyncPolicy::None),
            other => Err(format!("unknown sync policy: {}", other)),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backing file
    pub path: PathBuf,
    /// Schema for a fresh file; `None` means every registered column.
    /// Ignored when the file already exists.
    pub schema: Option<Schema>,
    /// Sync policy for inserts
    pub sync: SyncPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(crate::config::DEFAULT_DATA_FILE),
            schema: None,
            sync: SyncPolicy::default(),
        }
    }
}

/// Which side of a timestamp [`Store::locate`] resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Offset of the first record with timestamp `>=` the target
    Lower,
    /// Offset just past the last record with timestamp `<=` the target
    Upper,
}

/// Store statistics
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub path: PathBuf,
    pub columns: Vec<&'static str>,
    pub records: u64,
    pub file_size: u64,
    pub header_len: u64,
    pub record_len: u64,
    pub first: Option<Timestamp>,
    pub last: Option<Timestamp>,
}
