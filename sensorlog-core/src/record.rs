//! A single sensor reading

use crate::config::FLOAT_DECIMALS;
use crate::schema::{quantize, Column, ColumnSet, Value};
use crate::{Result, SensorLogError, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One measurement: a timestamp plus any subset of the registered columns.
///
/// Fields are typed per column, so a value of the wrong kind cannot be
/// stored through the builder methods. Dynamic callers go through
/// [`DataPoint::set`] or [`DataPoint::from_values`], which check names and
/// types against the registry.
///
/// Float values are rounded to the stored precision on the way in (builders,
/// `set`, deserialization), so a point read back from disk equals the point
/// that was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataPoint {
    /// Seconds since the Unix epoch
    pub timestamp: Timestamp,
    /// Degrees Celsius
    #[serde(
        default,
        deserialize_with = "quantized",
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature: Option<f64>,
    /// hPa
    #[serde(
        default,
        deserialize_with = "quantized",
        skip_serializing_if = "Option::is_none"
    )]
    pub pressure: Option<f64>,
    /// Percent
    #[serde(
        default,
        deserialize_with = "quantized",
        skip_serializing_if = "Option::is_none"
    )]
    pub relative_humidity: Option<f64>,
    /// Air quality index (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aqi: Option<i64>,
    /// Total volatile organic compounds, ppb
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvoc: Option<i64>,
    /// Equivalent CO2, ppm
    #[serde(default, rename = "eCO2", skip_serializing_if = "Option::is_none")]
    pub eco2: Option<i64>,
}

impl DataPoint {
    /// Create a data point carrying only a timestamp
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            temperature: None,
            pressure: None,
            relative_humidity: None,
            aqi: None,
            tvoc: None,
            eco2: None,
        }
    }

    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature = Some(Column::Temperature.quantize(celsius));
        self
    }

    pub fn with_pressure(mut self, hpa: f64) -> Self {
        self.pressure = Some(Column::Pressure.quantize(hpa));
        self
    }

    pub fn with_relative_humidity(mut self, percent: f64) -> Self {
        self.relative_humidity = Some(Column::RelativeHumidity.quantize(percent));
        self
    }

    pub fn with_aqi(mut self, aqi: i64) -> Self {
        self.aqi = Some(aqi);
        self
    }

    pub fn with_tvoc(mut self, ppb: i64) -> Self {
        self.tvoc = Some(ppb);
        self
    }

    pub fn with_eco2(mut self, ppm: i64) -> Self {
        self.eco2 = Some(ppm);
        self
    }

    /// Build a data point from `(column name, value)` pairs
    pub fn from_values<I, S>(timestamp: Timestamp, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut point = DataPoint::new(timestamp);
        for (name, value) in values {
            let column = Column::from_name(name.as_ref())?;
            point.set(column, value)?;
        }
        Ok(point)
    }

    /// Set a column, checking the value against the column's declared type.
    ///
    /// Integers are widened for float columns; floats are never narrowed.
    pub fn set(&mut self, column: Column, value: Value) -> Result<()> {
        match (column, value) {
            (Column::Temperature, v) => self.temperature = Some(column.quantize(v.as_f64())),
            (Column::Pressure, v) => self.pressure = Some(column.quantize(v.as_f64())),
            (Column::RelativeHumidity, v) => {
                self.relative_humidity = Some(column.quantize(v.as_f64()))
            }
            (Column::Timestamp, Value::Integer(v)) => self.timestamp = Timestamp::from_unix(v),
            (Column::Aqi, Value::Integer(v)) => self.aqi = Some(v),
            (Column::Tvoc, Value::Integer(v)) => self.tvoc = Some(v),
            (Column::Eco2, Value::Integer(v)) => self.eco2 = Some(v),
            (column, value) => {
                return Err(SensorLogError::TypeMismatch {
                    column,
                    expected: column.kind(),
                    actual: value.kind(),
                })
            }
        }
        Ok(())
    }

    /// Get the value of a column, if populated
    pub fn get(&self, column: Column) -> Option<Value> {
        match column {
            Column::Timestamp => Some(Value::Integer(self.timestamp.as_unix())),
            Column::Temperature => self.temperature.map(Value::Float),
            Column::Pressure => self.pressure.map(Value::Float),
            Column::RelativeHumidity => self.relative_humidity.map(Value::Float),
            Column::Aqi => self.aqi.map(Value::Integer),
            Column::Tvoc => self.tvoc.map(Value::Integer),
            Column::Eco2 => self.eco2.map(Value::Integer),
        }
    }

    /// The populated non-timestamp columns
    pub fn columns(&self) -> ColumnSet {
        Column::ALL
            .iter()
            .copied()
            .filter(|&c| c != Column::Timestamp && self.get(c).is_some())
            .collect()
    }
}

fn quantized<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map(|v| quantize(v, FLOAT_DECIMALS)))
}

impl fmt::Display for DataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.timestamp.to_rfc3339())?;
        for column in self.columns().iter() {
            if let Some(value) = self.get(column) {
                write!(f, " {}={}{}", column.name(), value, column.unit())?;
            }
        }
        Ok(())
    }
}
