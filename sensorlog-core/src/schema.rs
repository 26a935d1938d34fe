//! Column registry and record schema
//!
//! Every column the logger knows about is a variant of [`Column`]. A
//! [`Schema`] picks an ordered subset of them (always led by the timestamp)
//! and fixes the byte layout of every record line in a store file.

use crate::config::{DELIMITER, FLOAT_DECIMALS};
use crate::{Result, SensorLogError};
use serde::{Serialize, Serializer};
use std::fmt;

/// Declared numeric type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Float,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
        }
    }
}

/// A typed column value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
}

impl Value {
    /// The type this value carries
    pub fn kind(&self) -> ColumnType {
        match self {
            Value::Integer(_) => ColumnType::Integer,
            Value::Float(_) => ColumnType::Float,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Integer(v) => *v as f64,
            Value::Float(v) => *v,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

/// The fixed registry of supported columns.
///
/// Temperature, pressure and relative humidity come from the BME280; AQI,
/// TVOC and eCO2 come from the ENS160.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Timestamp,
    Temperature,
    Pressure,
    RelativeHumidity,
    Aqi,
    Tvoc,
    Eco2,
}

impl Column {
    /// All registered columns in canonical order
    pub const ALL: [Column; 7] = [
        Column::Timestamp,
        Column::Temperature,
        Column::Pressure,
        Column::RelativeHumidity,
        Column::Aqi,
        Column::Tvoc,
        Column::Eco2,
    ];

    /// Name used in the header line and in external interfaces
    pub const fn name(&self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Temperature => "temperature",
            Column::Pressure => "pressure",
            Column::RelativeHumidity => "relative_humidity",
            Column::Aqi => "aqi",
            Column::Tvoc => "tvoc",
            Column::Eco2 => "eCO2",
        }
    }

    /// Encoded width in characters, sign and decimal point included
    pub const fn width(&self) -> usize {
        match self {
            // 10 digits holds every second up to year 2286
            Column::Timestamp => 10,
            Column::Temperature => 6,
            Column::Pressure => 7,
            Column::RelativeHumidity => 5,
            Column::Aqi => 1,
            Column::Tvoc => 4,
            Column::Eco2 => 4,
        }
    }

    pub const fn kind(&self) -> ColumnType {
        match self {
            Column::Temperature | Column::Pressure | Column::RelativeHumidity => ColumnType::Float,
            Column::Timestamp | Column::Aqi | Column::Tvoc | Column::Eco2 => ColumnType::Integer,
        }
    }

    /// Digits after the decimal point for float columns
    pub const fn decimals(&self) -> usize {
        match self.kind() {
            ColumnType::Float => FLOAT_DECIMALS,
            ColumnType::Integer => 0,
        }
    }

    /// Round a value to the precision this column stores
    pub fn quantize(&self, value: f64) -> f64 {
        quantize(value, self.decimals())
    }

    /// Display-only unit label
    pub const fn unit(&self) -> &'static str {
        match self {
            Column::Timestamp => "s",
            Column::Temperature => "°C",
            Column::Pressure => "hPa",
            Column::RelativeHumidity => "%",
            Column::Aqi => "",
            Column::Tvoc => "ppb",
            Column::Eco2 => "ppm",
        }
    }

    /// Look up a registered column by name
    pub fn from_name(name: &str) -> Result<Column> {
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.name() == name)
            .ok_or_else(|| SensorLogError::UnknownColumn(name.to_string()))
    }

    const fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Set of populated non-timestamp columns
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColumnSet(u8);

impl ColumnSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Add a column; the timestamp is implicit and never stored in the set
    pub fn insert(&mut self, column: Column) {
        if column != Column::Timestamp {
            self.0 |= column.bit();
        }
    }

    pub fn contains(&self, column: Column) -> bool {
        self.0 & column.bit() != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Columns in canonical registry order
    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        Column::ALL.iter().copied().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        let mut set = ColumnSet::empty();
        for column in iter {
            set.insert(column);
        }
        set
    }
}

impl fmt::Debug for ColumnSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|c| c.name())).finish()
    }
}

impl fmt::Display for ColumnSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|c| c.name()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Ordered list of columns describing one record line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Create a schema, validating that the timestamp leads and no column repeats
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        match columns.first() {
            Some(Column::Timestamp) => {}
            Some(other) => {
                return Err(SensorLogError::InvalidSchema(format!(
                    "first column must be timestamp, got {}",
                    other
                )))
            }
            None => return Err(SensorLogError::InvalidSchema("no columns".into())),
        }

        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(SensorLogError::InvalidSchema(format!(
                    "duplicate column {}",
                    column
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Every registered column, in registry order
    pub fn full() -> Self {
        Self {
            columns: Column::ALL.to_vec(),
        }
    }

    /// Timestamp followed by the given data columns
    pub fn with_data_columns<I: IntoIterator<Item = Column>>(columns: I) -> Result<Self> {
        let mut all = vec![Column::Timestamp];
        all.extend(columns);
        Self::new(all)
    }

    /// Build a schema from column names, in the given order
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = names
            .into_iter()
            .map(|n| Column::from_name(n.as_ref().trim()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(columns)
    }

    /// Parse a header line as written by [`Schema::header`]
    pub fn parse_header(line: &str) -> Result<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        Self::from_names(line.split(DELIMITER))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Non-timestamp columns every record in this schema must populate
    pub fn data_columns(&self) -> ColumnSet {
        self.columns.iter().copied().collect()
    }

    /// Byte length of one encoded record, delimiters and newline included
    pub fn record_len(&self) -> usize {
        let widths: usize = self.columns.iter().map(|c| c.width()).sum();
        widths + (self.columns.len() - 1) + 1
    }

    /// Header line: column names joined by the delimiter, newline-terminated
    pub fn header(&self) -> String {
        let mut header = String::with_capacity(64);
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                header.push(DELIMITER);
            }
            header.push_str(column.name());
        }
        header.push('\n');
        header
    }

    /// Byte length of [`Schema::header`]
    pub fn header_len(&self) -> usize {
        self.header().len()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name()).collect();
        write!(f, "{}", names.join(","))
    }
}

/// Round `value` half away from zero to `decimals` fractional digits.
///
/// The result is the double nearest the rounded decimal, so formatting it
/// with `decimals` digits and parsing the text back yields the same value.
pub fn quantize(value: f64, decimals: usize) -> f64 {
    if decimals == 0 {
        return value.round();
    }
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
