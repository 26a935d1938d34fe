//! Fixed-width text codec for record lines
//!
//! Line format (one record, `Schema::record_len` bytes):
//! - each schema column right-justified to its width
//! - columns separated by `,`
//! - terminated by `\n`
//!
//! Float columns are rendered with a fixed number of decimals. `DataPoint`
//! rounds floats to that precision on entry, and `encode` refuses any value
//! that was written to a field directly at a finer precision, so every
//! encoded line decodes back to the point it came from.

use crate::config::DELIMITER;
use crate::schema::{Column, ColumnType, Schema, Value};
use crate::{DataPoint, Result, SensorLogError, Timestamp};

/// Header line for a schema
pub fn header(schema: &Schema) -> String {
    schema.header()
}

/// Encode a data point as one fixed-width line.
///
/// Columns the point carries but the schema does not are left out.
pub fn encode(point: &DataPoint, schema: &Schema) -> Result<String> {
    let mut line = String::with_capacity(schema.record_len());

    for (i, &column) in schema.columns().iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }

        let value = point.get(column).ok_or_else(|| {
            SensorLogError::SchemaMismatch(format!(
                "record at {} has no value for column {}",
                point.timestamp, column
            ))
        })?;

        if let Value::Float(v) = value {
            if !v.is_finite() || column.quantize(v) != v {
                return Err(SensorLogError::ExcessPrecision {
                    column,
                    value: v,
                    decimals: column.decimals(),
                });
            }
        }

        let rendered = render(column, value);
        if rendered.len() > column.width() {
            return Err(SensorLogError::EncodingOverflow {
                column,
                rendered,
                width: column.width(),
            });
        }

        for _ in rendered.len()..column.width() {
            line.push(' ');
        }
        line.push_str(&rendered);
    }

    line.push('\n');
    debug_assert_eq!(line.len(), schema.record_len());
    Ok(line)
}

/// Decode one line (trailing newline optional) against a schema
pub fn decode(line: &str, schema: &Schema) -> Result<DataPoint> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let fields: Vec<&str> = line.split(DELIMITER).collect();

    if fields.len() != schema.len() {
        return Err(SensorLogError::Decode(format!(
            "expected {} fields, got {} in {:?}",
            schema.len(),
            fields.len(),
            line
        )));
    }

    let mut point = DataPoint::new(Timestamp::from_unix(0));
    for (&column, field) in schema.columns().iter().zip(fields) {
        let value = parse_field(column, field)?;
        point.set(column, value)?;
    }

    Ok(point)
}

/// Decode a raw record buffer read from disk
pub fn decode_bytes(buf: &[u8], schema: &Schema) -> Result<DataPoint> {
    decode(as_str(buf)?, schema)
}

/// Parse only the leading timestamp field of a record line
pub fn decode_timestamp(buf: &[u8]) -> Result<Timestamp> {
    let line = as_str(buf)?;
    let field = line.split(DELIMITER).next().unwrap_or(line);
    field
        .trim()
        .parse::<i64>()
        .map(Timestamp::from_unix)
        .map_err(|_| SensorLogError::Decode(format!("bad timestamp field {:?}", field)))
}

fn as_str(buf: &[u8]) -> Result<&str> {
    std::str::from_utf8(buf).map_err(|e| SensorLogError::Decode(format!("invalid UTF-8: {}", e)))
}

fn render(column: Column, value: Value) -> String {
    match value {
        Value::Integer(v) => v.to_string(),
        Value::Float(v) => format!("{:.*}", column.decimals(), v),
    }
}

fn parse_field(column: Column, field: &str) -> Result<Value> {
    let text = field.trim();
    let parsed = match column.kind() {
        ColumnType::Integer => text.parse::<i64>().map(Value::Integer).ok(),
        ColumnType::Float => text.parse::<f64>().map(Value::Float).ok(),
    };

    parsed.ok_or_else(|| {
        SensorLogError::Decode(format!(
            "column {} expects {}, got {:?}",
            column,
            column.kind(),
            field
        ))
    })
}
