//! Structured-text decoder
//!
//! The source must be a JSON array of objects carrying the same four keys as
//! the delimited format. Fields are pulled out of each object by hand rather
//! than derived, so error reporting matches the delimited decoder exactly:
//! record index and field name, through the shared [`RawRecord`] validator.

use serde_json::Value;

use crate::errors::{FormatError, ParseError, ValidationError};
use crate::reading::Reading;

use super::{parse_timestamp, RawRecord};

/// Parse a whole structured-text source
pub(super) fn parse(input: &str) -> Result<Vec<Reading>, ParseError> {
    let root: Value = serde_json::from_str(input).map_err(|e| FormatError::Structure {
        detail: e.to_string(),
    })?;

    let items = match root {
        Value::Array(items) => items,
        other => {
            return Err(FormatError::Structure {
                detail: format!("expected an array, found {}", type_name(&other)),
            }
            .into())
        }
    };

    let mut readings = Vec::with_capacity(items.len());

    for (idx, item) in items.iter().enumerate() {
        let record = idx + 1;
        let obj = item.as_object().ok_or_else(|| FormatError::Structure {
            detail: format!("element {} is {}, not an object", record, type_name(item)),
        })?;

        let timestamp = match obj.get("timestamp") {
            None | Some(Value::Null) => {
                return Err(ValidationError::MissingField {
                    record,
                    field: "timestamp",
                }
                .into())
            }
            Some(Value::Number(n)) => n.as_u64().ok_or_else(|| ValidationError::Timestamp {
                record,
                raw: n.to_string(),
            })?,
            Some(Value::String(s)) => parse_timestamp(record, s)?,
            Some(other) => {
                return Err(ValidationError::Timestamp {
                    record,
                    raw: other.to_string(),
                }
                .into())
            }
        };

        let raw = RawRecord {
            record,
            timestamp,
            temperature: numeric_field(record, "temperature", obj)?,
            humidity: numeric_field(record, "humidity", obj)?,
            luminosity: numeric_field(record, "luminosity", obj)?,
        };

        readings.push(raw.validate()?);
    }

    Ok(readings)
}

fn numeric_field(
    record: usize,
    field: &'static str,
    obj: &serde_json::Map<String, Value>,
) -> Result<f32, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField { record, field }),
        Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or(f64::NAN) as f32),
        Some(other) => Err(ValidationError::NotNumeric {
            record,
            field,
            raw: other.to_string(),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
