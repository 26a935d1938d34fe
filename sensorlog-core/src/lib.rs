//! SensorLog Core - Embedded Time-Series Logger for Environmental Sensors
//!
//! Stores sensor readings (temperature, pressure, humidity, air quality)
//! on flash-constrained devices without a database engine:
//! - Append-only, human-readable record file
//! - Fixed-width text encoding, one record per line
//! - Timestamp range queries by binary search on byte offsets
//!
//! # Architecture
//!
//! - **Schema**: Ordered, fixed-width typed columns drawn from a closed registry
//! - **Codec**: Lossless text encoding of a [`DataPoint`] under a [`Schema`]
//! - **DataSeries**: In-memory, schema-homogeneous buffer of points
//! - **Store**: The on-disk log and its O(log n) range lookup

pub mod codec;
pub mod schema;
pub mod storage;

mod error;
mod record;
mod series;
mod types;

pub use error::{Result, SensorLogError};
pub use record::DataPoint;
pub use schema::{Column, ColumnSet, ColumnType, Schema, Value};
pub use series::DataSeries;
pub use storage::{Edge, Store, StoreConfig, StoreStats, SyncPolicy};
pub use types::*;

/// SensorLog version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod config {
    /// Seconds between 1970-01-01 and 2000-01-01 (UTC)
    pub const EMBEDDED_EPOCH_OFFSET: i64 = 946_684_800;

    /// Column separator in header and record lines
    pub const DELIMITER: char = ',';

    /// Fractional digits stored for float columns
    pub const FLOAT_DECIMALS: usize = 1;

    /// Longest header line accepted when opening an existing file
    pub const MAX_HEADER_LEN: u64 = 1024;

    /// Data file used when none is configured
    pub const DEFAULT_DATA_FILE: &str = "data/sensors.csv";
}
