//! In-memory series of data points sharing one schema

use crate::codec;
use crate::schema::Schema;
use crate::{DataPoint, Result, SensorLogError};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::ops::Index;

/// Ordered, homogeneous buffer of data points.
///
/// Points are kept in append order; nothing is re-sorted on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSeries {
    schema: Schema,
    points: Vec<DataPoint>,
}

impl DataSeries {
    /// Create an empty series for a schema
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            points: Vec::new(),
        }
    }

    /// Create an empty series with room for `capacity` points
    pub fn with_capacity(schema: Schema, capacity: usize) -> Self {
        Self {
            schema,
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Append a point whose populated columns match the schema exactly
    pub fn append(&mut self, point: DataPoint) -> Result<()> {
        let expected = self.schema.data_columns();
        let actual = point.columns();
        if actual != expected {
            return Err(SensorLogError::SchemaMismatch(format!(
                "record at {} has columns {}, series expects {}",
                point.timestamp, actual, expected
            )));
        }

        self.points.push(point);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&DataPoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DataPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataPoint> {
        self.points.iter()
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<DataPoint> {
        self.points
    }

    /// Header line for this series' schema
    pub fn header(&self) -> String {
        self.schema.header()
    }

    /// Full text export: header followed by every encoded point
    pub fn to_text(&self) -> Result<String> {
        let mut text =
            String::with_capacity(self.schema.header_len() + self.len() * self.schema.record_len());
        text.push_str(&self.header());
        for point in &self.points {
            text.push_str(&codec::encode(point, &self.schema)?);
        }
        Ok(text)
    }
}

impl Index<usize> for DataSeries {
    type Output = DataPoint;

    fn index(&self, index: usize) -> &DataPoint {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a DataSeries {
    type Item = &'a DataPoint;
    type IntoIter = std::slice::Iter<'a, DataPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl Serialize for DataSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DataSeries", 2)?;
        state.serialize_field("columns", self.schema.columns())?;
        state.serialize_field("points", &self.points)?;
        state.end()
    }
}
