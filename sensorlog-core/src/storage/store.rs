//! Store - the append-only record file and its range queries

use super::{Edge, StoreConfig, StoreStats, SyncPolicy};
use crate::codec;
use crate::config::MAX_HEADER_LEN;
use crate::schema::Schema;
use crate::{DataPoint, DataSeries, Result, SensorLogError, Timestamp};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Append-only sensor log backed by a single file.
///
/// Records must be inserted in non-decreasing timestamp order for range
/// queries to be correct; the store does not check this.
pub struct Store {
    path: PathBuf,
    schema: Schema,
    header_len: u64,
    record_len: u64,
    sync: SyncPolicy,
    write_lock: Mutex<()>,
}

/// An open read handle plus the data end computed from one size snapshot
struct Snapshot {
    file: File,
    size: u64,
    end: u64,
}

impl Store {
    /// Open or create a store holding every registered column
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(StoreConfig {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        })
    }

    /// Open or create a store; `schema` only applies to a fresh file
    pub fn open_with_schema(path: impl AsRef<Path>, schema: Schema) -> Result<Self> {
        Self::open_with_config(StoreConfig {
            path: path.as_ref().to_path_buf(),
            schema: Some(schema),
            ..Default::default()
        })
    }

    /// Open a store that must already exist; never creates files
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Self::open(path),
            Ok(_) => Err(SensorLogError::NotFound(format!(
                "{:?} is not a sensor log file",
                path
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SensorLogError::NotFound(format!(
                "no sensor log at {:?}",
                path
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Open or create a store from a full configuration
    pub fn open_with_config(config: StoreConfig) -> Result<Self> {
        let existing_len = match fs::metadata(&config.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };

        let (schema, header_len) = if existing_len > 0 {
            let (stored, header_len) = Self::read_header(&config.path)?;
            if let Some(requested) = &config.schema {
                if *requested != stored {
                    warn!(
                        "Store {:?} was written with columns [{}], ignoring requested [{}]",
                        config.path, stored, requested
                    );
                }
            }
            info!(
                "Opened sensor log {:?} ({} bytes, columns [{}])",
                config.path, existing_len, stored
            );
            (stored, header_len)
        } else {
            let schema = config.schema.clone().unwrap_or_default();
            Self::create(&config.path, &schema)?;
            info!(
                "Created sensor log {:?} with columns [{}]",
                config.path, schema
            );
            let header_len = schema.header_len() as u64;
            (schema, header_len)
        };

        let record_len = schema.record_len() as u64;

        Ok(Self {
            path: config.path,
            schema,
            header_len,
            record_len,
            sync: config.sync,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema every record line in the file follows
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Byte length of the header line
    pub fn header_len(&self) -> u64 {
        self.header_len
    }

    /// Byte length of every record line
    pub fn record_len(&self) -> u64 {
        self.record_len
    }

    /// Append one data point.
    ///
    /// The point must populate exactly the store's data columns and carry a
    /// non-negative timestamp. It is validated and encoded before the file
    /// is touched, so a rejected point leaves the file unchanged. On success
    /// the file grows by exactly `record_len` bytes.
    pub fn insert(&self, point: &DataPoint) -> Result<()> {
        let line = self.encode(point)?;
        self.append(line.as_bytes())
    }

    /// Append every point of a series in a single write
    pub fn insert_series(&self, series: &DataSeries) -> Result<()> {
        if series.schema() != &self.schema {
            return Err(SensorLogError::SchemaMismatch(format!(
                "series has columns [{}], store has [{}]",
                series.schema(),
                self.schema
            )));
        }
        if series.is_empty() {
            return Ok(());
        }

        let mut buf = String::with_capacity(series.len() * self.record_len as usize);
        for point in series {
            buf.push_str(&self.encode(point)?);
        }
        self.append(buf.as_bytes())?;

        debug!("Flushed {} records to {:?}", series.len(), self.path);
        Ok(())
    }

    /// Read every record with `from <= timestamp <= to`.
    ///
    /// `None` leaves that side unbounded. A bound between two stored
    /// timestamps behaves like the nearer stored timestamp inside the range.
    /// An empty store or an empty interval yields an empty series.
    pub fn read(&self, from: Option<Timestamp>, to: Option<Timestamp>) -> Result<DataSeries> {
        let mut snap = self.snapshot()?;

        let start = match from {
            None => Ok(self.header_len),
            Some(ts) => self.locate_in(&mut snap, ts, Edge::Lower),
        };
        let end = match to {
            None => Ok(snap.end),
            Some(ts) => self.locate_in(&mut snap, ts, Edge::Upper),
        };

        let (start, end) = match (start, end) {
            (Ok(start), Ok(end)) => (start, end.min(snap.end)),
            (Err(SensorLogError::NotFound(_)), _) | (_, Err(SensorLogError::NotFound(_))) => {
                return Ok(DataSeries::new(self.schema.clone()))
            }
            (Err(e), _) | (_, Err(e)) => return Err(e),
        };

        if end <= start {
            return Ok(DataSeries::new(self.schema.clone()));
        }

        let count = ((end - start) / self.record_len) as usize;
        let mut series = DataSeries::with_capacity(self.schema.clone(), count);

        snap.file.seek(SeekFrom::Start(start))?;
        let mut reader = BufReader::new(&snap.file);
        let mut buf = vec![0u8; self.record_len as usize];
        for _ in 0..count {
            reader.read_exact(&mut buf)?;
            series.append(codec::decode_bytes(&buf, &self.schema)?)?;
        }

        debug!(
            "Read {} records from {:?} (bytes {}..{})",
            count, self.path, start, end
        );
        Ok(series)
    }

    /// Resolve a timestamp to a record-aligned byte offset.
    ///
    /// Fails with [`SensorLogError::NotFound`] when the store has no records.
    pub fn locate(&self, timestamp: Timestamp, edge: Edge) -> Result<u64> {
        let mut snap = self.snapshot()?;
        self.locate_in(&mut snap, timestamp, edge)
    }

    /// Number of complete records in the file
    pub fn len(&self) -> Result<u64> {
        let snap = self.snapshot()?;
        Ok((snap.end - self.header_len) / self.record_len)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Oldest stored record
    pub fn first(&self) -> Result<Option<DataPoint>> {
        let mut snap = self.snapshot()?;
        self.first_in(&mut snap)
    }

    /// Newest stored record
    pub fn last(&self) -> Result<Option<DataPoint>> {
        let mut snap = self.snapshot()?;
        self.last_in(&mut snap)
    }

    /// Get store statistics, all taken from one size snapshot
    pub fn stats(&self) -> Result<StoreStats> {
        let mut snap = self.snapshot()?;
        let first = self.first_in(&mut snap)?.map(|p| p.timestamp);
        let last = self.last_in(&mut snap)?.map(|p| p.timestamp);

        Ok(StoreStats {
            path: self.path.clone(),
            columns: self.schema.columns().iter().map(|c| c.name()).collect(),
            records: (snap.end - self.header_len) / self.record_len,
            file_size: snap.size,
            header_len: self.header_len,
            record_len: self.record_len,
            first,
            last,
        })
    }

    fn first_in(&self, snap: &mut Snapshot) -> Result<Option<DataPoint>> {
        if snap.end <= self.header_len {
            return Ok(None);
        }
        self.record_at(&mut snap.file, self.header_len).map(Some)
    }

    fn last_in(&self, snap: &mut Snapshot) -> Result<Option<DataPoint>> {
        if snap.end <= self.header_len {
            return Ok(None);
        }
        let offset = snap.end - self.record_len;
        self.record_at(&mut snap.file, offset).map(Some)
    }

    fn encode(&self, point: &DataPoint) -> Result<String> {
        if point.timestamp.as_unix() < 0 {
            return Err(SensorLogError::InvalidTimestamp(format!(
                "stored timestamps must be non-negative, got {}",
                point.timestamp
            )));
        }

        let expected = self.schema.data_columns();
        let actual = point.columns();
        if actual != expected {
            return Err(SensorLogError::SchemaMismatch(format!(
                "record at {} has columns {}, store expects {}",
                point.timestamp, actual, expected
            )));
        }

        codec::encode(point, &self.schema)
    }

    fn locate_in(&self, snap: &mut Snapshot, target: Timestamp, edge: Edge) -> Result<u64> {
        let start = self.header_len;
        let end = snap.end;
        if end <= start {
            return Err(SensorLogError::NotFound(format!(
                "no records in {:?}",
                self.path
            )));
        }

        let mut buf = vec![0u8; self.record_len as usize];
        let first = self.timestamp_at(&mut snap.file, start, &mut buf)?;
        let last = self.timestamp_at(&mut snap.file, end - self.record_len, &mut buf)?;

        match edge {
            Edge::Lower if target <= first => return Ok(start),
            Edge::Lower if target > last => return Ok(end),
            Edge::Upper if target >= last => return Ok(end),
            Edge::Upper if target < first => return Ok(start),
            _ => {}
        }

        // Invariant: records in [start, low) sort before the edge, records
        // in [high, end) after it. Both bounds stay record-aligned.
        let mut low = start;
        let mut high = end;
        while low < high {
            let mid = self.align_to_record(low + (high - low) / 2);
            let ts = self.timestamp_at(&mut snap.file, mid, &mut buf)?;

            let before_edge = match edge {
                Edge::Lower => ts < target,
                Edge::Upper => ts <= target,
            };
            if before_edge {
                low = mid + self.record_len;
            } else {
                high = mid;
            }
        }

        debug!("Located {} ({:?}) at offset {}", target, edge, low);
        Ok(low)
    }

    fn align_to_record(&self, offset: u64) -> u64 {
        let records = (offset - self.header_len) / self.record_len;
        self.header_len + records * self.record_len
    }

    fn snapshot(&self) -> Result<Snapshot> {
        let file = File::open(&self.path)?;
        let size = file.metadata()?.len();

        let end = if size <= self.header_len {
            self.header_len
        } else {
            self.align_to_record(size)
        };
        if size > end {
            warn!(
                "Ignoring {} trailing bytes past the last full record in {:?}",
                size - end,
                self.path
            );
        }

        Ok(Snapshot { file, size, end })
    }

    fn timestamp_at(&self, file: &mut File, offset: u64, buf: &mut [u8]) -> Result<Timestamp> {
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        codec::decode_timestamp(buf)
    }

    fn record_at(&self, file: &mut File, offset: u64) -> Result<DataPoint> {
        let mut buf = vec![0u8; self.record_len as usize];
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut buf)?;
        codec::decode_bytes(&buf, &self.schema)
    }

    fn append(&self, bytes: &[u8]) -> Result<()> {
        let _guard = self.write_lock.lock();

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(bytes)?;
        if self.sync == SyncPolicy::Immediate {
            file.sync_data()?;
        }

        Ok(())
    }

    fn create(path: &Path, schema: &Schema) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(codec::header(schema).as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    fn read_header(path: &Path) -> Result<(Schema, u64)> {
        let file = File::open(path)?;
        let mut line = String::new();
        BufReader::new(file.take(MAX_HEADER_LEN)).read_line(&mut line)?;

        if !line.ends_with('\n') {
            return Err(SensorLogError::Decode(format!(
                "header line of {:?} is missing or longer than {} bytes",
                path, MAX_HEADER_LEN
            )));
        }

        let schema = Schema::parse_header(&line).map_err(|e| {
            SensorLogError::Decode(format!("bad header in {:?}: {}", path, e))
        })?;

        Ok((schema, line.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use tempfile::TempDir;

    const START: i64 = 1000;
    const STEP: i64 = 10;
    const COUNT: i64 = 200;

    fn reading(ts: i64) -> DataPoint {
        let i = ts % 100;
        DataPoint::new(Timestamp::from_unix(ts))
            .with_temperature(i as f64)
            .with_pressure(i as f64)
            .with_relative_humidity(i as f64)
            .with_aqi(1)
            .with_tvoc(i)
            .with_eco2(i)
    }

    /// 200 records at 1000, 1010, ..., 2990
    fn populated_store(dir: &TempDir) -> Store {
        let store = Store::open(dir.path().join("sensors.csv")).unwrap();
        for i in 0..COUNT {
            store.insert(&reading(START + i * STEP)).unwrap();
        }
        store
    }

    fn ts(secs: i64) -> Option<Timestamp> {
        Some(Timestamp::from_unix(secs))
    }

    fn bounds(series: &DataSeries) -> (i64, i64) {
        (
            series.first().unwrap().timestamp.as_unix(),
            series.last().unwrap().timestamp.as_unix(),
        )
    }

    #[test]
    fn test_fresh_store_writes_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("sensors.csv");
        let store = Store::open(&path).unwrap();

        assert_eq!(store.header_len(), 63);
        assert_eq!(store.record_len(), 44);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "timestamp,temperature,pressure,relative_humidity,aqi,tvoc,eCO2\n"
        );
        assert_eq!(store.len().unwrap(), 0);
        assert!(store.read(None, None).unwrap().is_empty());
        assert!(store.first().unwrap().is_none());
    }

    #[test]
    fn test_insert_grows_by_record_len() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("sensors.csv")).unwrap();

        store.insert(&reading(1000)).unwrap();
        store.insert(&reading(1010)).unwrap();

        let size = fs::metadata(store.path()).unwrap().len();
        assert_eq!(size, store.header_len() + 2 * store.record_len());
        assert_eq!(store.last().unwrap().unwrap(), reading(1010));
    }

    #[test]
    fn test_rejected_insert_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("sensors.csv")).unwrap();

        let missing = DataPoint::new(Timestamp::from_unix(1)).with_temperature(20.0);
        assert!(matches!(
            store.insert(&missing),
            Err(SensorLogError::SchemaMismatch(_))
        ));

        let overflow = reading(1000).with_aqi(42);
        assert!(matches!(
            store.insert(&overflow),
            Err(SensorLogError::EncodingOverflow { .. })
        ));

        assert_eq!(
            fs::metadata(store.path()).unwrap().len(),
            store.header_len()
        );
    }

    #[test]
    fn test_read_all() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);

        let data = store.read(None, None).unwrap();
        assert_eq!(data.len(), 200);
        assert_eq!(bounds(&data), (1000, 2990));
        assert_eq!(data[37], reading(1370));
    }

    #[test]
    fn test_read_with_exact_bounds() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);

        let data = store.read(ts(1000), ts(2990)).unwrap();
        assert_eq!(data.len(), 200);
        assert_eq!(bounds(&data), (1000, 2990));
    }

    #[test]
    fn test_read_bounds_are_clamped() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);
        let all = store.read(None, None).unwrap();

        for k in [0, 1, 5, 1000, 100_000] {
            assert_eq!(store.read(ts(1000 - k), ts(2990 + k)).unwrap(), all);
        }
        assert_eq!(store.read(ts(-500), ts(5000)).unwrap().len(), 200);
    }

    #[test]
    fn test_read_with_min_bound() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);

        let data = store.read(ts(1100), None).unwrap();
        assert_eq!(data.len(), 190);
        assert_eq!(bounds(&data), (1100, 2990));

        for m in [0, 1, 99, 150, 199] {
            let data = store.read(ts(START + m * STEP), None).unwrap();
            assert_eq!(data.len() as i64, COUNT - m);
            assert_eq!(data[0].timestamp.as_unix(), START + m * STEP);
        }
    }

    #[test]
    fn test_read_with_max_bound() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);

        let data = store.read(None, ts(1890)).unwrap();
        assert_eq!(data.len(), 90);
        assert_eq!(bounds(&data), (1000, 1890));
    }

    #[test]
    fn test_read_with_bounds() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);

        let data = store.read(ts(1100), ts(1890)).unwrap();
        assert_eq!(data.len(), 80);
        assert_eq!(bounds(&data), (1100, 1890));

        let single = store.read(ts(2000), ts(2000)).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0], reading(2000));
    }

    #[test]
    fn test_bound_between_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);

        let data = store.read(None, ts(1895)).unwrap();
        assert_eq!(data.len(), 90);
        assert_eq!(bounds(&data), (1000, 1890));
        assert_eq!(data, store.read(None, ts(1890)).unwrap());

        let data = store.read(ts(1105), None).unwrap();
        assert_eq!(data, store.read(ts(1110), None).unwrap());
    }

    #[test]
    fn test_read_empty_intervals() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);

        assert!(store.read(ts(3000), None).unwrap().is_empty());
        assert!(store.read(None, ts(999)).unwrap().is_empty());
        assert!(store.read(ts(1500), ts(1400)).unwrap().is_empty());
        assert!(store.read(ts(1501), ts(1509)).unwrap().is_empty());

        let last_only = store.read(ts(2990), None).unwrap();
        assert_eq!(last_only.len(), 1);
    }

    #[test]
    fn test_locate_offsets() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);
        let header = store.header_len();
        let record = store.record_len();
        let end = header + 200 * record;

        assert_eq!(store.locate(Timestamp::from_unix(0), Edge::Lower).unwrap(), header);
        assert_eq!(store.locate(Timestamp::from_unix(1000), Edge::Lower).unwrap(), header);
        assert_eq!(
            store.locate(Timestamp::from_unix(1100), Edge::Lower).unwrap(),
            header + 10 * record
        );
        assert_eq!(
            store.locate(Timestamp::from_unix(1100), Edge::Upper).unwrap(),
            header + 11 * record
        );
        assert_eq!(
            store.locate(Timestamp::from_unix(1105), Edge::Lower).unwrap(),
            header + 11 * record
        );
        assert_eq!(store.locate(Timestamp::from_unix(2990), Edge::Upper).unwrap(), end);
        assert_eq!(store.locate(Timestamp::from_unix(9999), Edge::Lower).unwrap(), end);
        assert_eq!(store.locate(Timestamp::from_unix(10), Edge::Upper).unwrap(), header);
    }

    #[test]
    fn test_locate_on_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("sensors.csv")).unwrap();

        assert!(matches!(
            store.locate(Timestamp::from_unix(1000), Edge::Lower),
            Err(SensorLogError::NotFound(_))
        ));
        assert!(store.read(ts(0), ts(5000)).unwrap().is_empty());
    }

    #[test]
    fn test_reopen_adopts_stored_schema() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("co2.csv");
        let schema = Schema::with_data_columns([Column::Eco2]).unwrap();

        {
            let store = Store::open_with_schema(&path, schema.clone()).unwrap();
            for i in 0..10 {
                let point = DataPoint::new(Timestamp::from_unix(100 + i)).with_eco2(400 + i);
                store.insert(&point).unwrap();
            }
        }

        // Reopening without a schema adopts the stored header
        let store = Store::open(&path).unwrap();
        assert_eq!(store.schema(), &schema);
        assert_eq!(store.header_len(), "timestamp,eCO2\n".len() as u64);
        assert_eq!(store.record_len(), 16);

        let data = store.read(ts(105), None).unwrap();
        assert_eq!(data.len(), 5);
        assert_eq!(data[0].eco2, Some(405));
    }

    #[test]
    fn test_torn_trailing_record_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);

        {
            let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
            file.write_all(b"      3000, 1").unwrap();
        }

        assert_eq!(store.len().unwrap(), 200);
        let data = store.read(ts(2900), ts(99_999)).unwrap();
        assert_eq!(bounds(&data), (2900, 2990));
    }

    #[test]
    fn test_corrupt_record_surfaces_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sensors.csv");
        let store = Store::open(&path).unwrap();
        store.insert(&reading(1000)).unwrap();

        let garbage = "x".repeat(store.record_len() as usize - 1) + "\n";
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(garbage.as_bytes()).unwrap();
        }

        let err = store.read(None, None).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_insert_series_bulk_flush() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("sensors.csv")).unwrap();

        let mut batch = DataSeries::new(Schema::full());
        for i in 0..20 {
            batch.append(reading(START + i * STEP)).unwrap();
        }
        store.insert_series(&batch).unwrap();

        assert_eq!(store.read(None, None).unwrap(), batch);

        let other = DataSeries::new(Schema::with_data_columns([Column::Aqi]).unwrap());
        assert!(matches!(
            store.insert_series(&other),
            Err(SensorLogError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_stats() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);

        let stats = store.stats().unwrap();
        assert_eq!(stats.records, 200);
        assert_eq!(stats.file_size, 63 + 200 * 44);
        assert_eq!(stats.first, Some(Timestamp::from_unix(1000)));
        assert_eq!(stats.last, Some(Timestamp::from_unix(2990)));
        assert_eq!(stats.columns.len(), 7);
    }

    #[test]
    fn test_insert_rejects_extra_columns() {
        let temp_dir = TempDir::new().unwrap();
        let schema = Schema::with_data_columns([Column::Eco2]).unwrap();
        let store = Store::open_with_schema(temp_dir.path().join("co2.csv"), schema).unwrap();

        let extra = DataPoint::new(Timestamp::from_unix(100))
            .with_eco2(400)
            .with_temperature(21.0);
        assert!(matches!(
            store.insert(&extra),
            Err(SensorLogError::SchemaMismatch(_))
        ));
        assert_eq!(store.len().unwrap(), 0);

        // Same verdict as appending to a series of the store's schema
        let mut series = DataSeries::new(store.schema().clone());
        assert!(series.append(extra).is_err());
    }

    #[test]
    fn test_insert_rejects_negative_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("sensors.csv")).unwrap();

        let mut early = reading(1000);
        early.timestamp = Timestamp::from_unix(-5);
        assert!(matches!(
            store.insert(&early),
            Err(SensorLogError::InvalidTimestamp(_))
        ));
        assert_eq!(
            fs::metadata(store.path()).unwrap().len(),
            store.header_len()
        );

        // Negative values stay valid as query bounds
        store.insert(&reading(1000)).unwrap();
        assert_eq!(store.read(ts(-5), None).unwrap().len(), 1);
    }

    #[test]
    fn test_fine_precision_floats_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("sensors.csv")).unwrap();

        let point = DataPoint::new(Timestamp::from_unix(1000))
            .with_temperature(21.25)
            .with_pressure(1013.25)
            .with_relative_humidity(45.67)
            .with_aqi(2)
            .with_tvoc(120)
            .with_eco2(640);
        store.insert(&point).unwrap();
        assert_eq!(store.last().unwrap().unwrap(), point);

        // Bypassing the builders with an unrounded value is refused
        let mut raw = point.clone();
        raw.timestamp = Timestamp::from_unix(1010);
        raw.temperature = Some(21.25);
        assert!(matches!(
            store.insert(&raw),
            Err(SensorLogError::ExcessPrecision { column: Column::Temperature, .. })
        ));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_open_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sub").join("sensors.csv");

        assert!(matches!(
            Store::open_existing(&path),
            Err(SensorLogError::NotFound(_))
        ));
        assert!(!path.exists());
        assert!(Store::open_existing(temp_dir.path()).is_err());

        Store::open(&path).unwrap().insert(&reading(1000)).unwrap();
        let store = Store::open_existing(&path).unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_stats_agree_with_torn_tail() {
        let temp_dir = TempDir::new().unwrap();
        let store = populated_store(&temp_dir);

        {
            let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
            file.write_all(b"      3000,").unwrap();
        }

        let stats = store.stats().unwrap();
        assert_eq!(stats.records, 200);
        assert_eq!(stats.file_size, 63 + 200 * 44 + 11);
        assert_eq!(stats.last, Some(Timestamp::from_unix(2990)));
    }
}
