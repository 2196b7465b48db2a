//! Reading parser: file sources into validated reading sequences
//!
//! Two source formats are supported and both normalize to the same internal
//! [`Reading`] sequence:
//!
//! - **Delimited text**: header line naming the four columns
//!   `timestamp,temperature,humidity,luminosity` (any order, case-insensitive,
//!   extra columns ignored), one reading per row.
//! - **Structured text**: an array of objects with the same four keys.
//!
//! Equivalent content in either format parses to an identical sequence
//! because both decoders funnel raw per-record fields through the single
//! shared record validator.
//!
//! ## Parse policy
//!
//! Parsing is total: the first malformed record rejects the whole source
//! with a [`ValidationError`] naming the 1-based record index and field.
//! There is no skip-and-count mode — a monitoring baseline built on silently
//! thinned data is worse than a loud failure.
//!
//! ## Ordering
//!
//! Output order is input order. Sources are *not* sorted by timestamp; an
//! unordered source replays unordered, and downstream windowing proceeds in
//! read order. Known limitation, not silently fixed.

mod csv;
mod json;

use std::path::Path;

use crate::errors::{ParseError, ValidationError};
use crate::reading::Reading;
use crate::time::Timestamp;

/// Physical bound on temperature: nothing below absolute zero
const MIN_TEMPERATURE_C: f32 = -273.15;

/// Input format of a reading source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text with a header row
    Csv,
    /// An array of reading objects
    Json,
}

impl SourceFormat {
    /// Guess the format from a file extension (`.csv` / `.json`)
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            ext if ext.eq_ignore_ascii_case("csv") => Some(SourceFormat::Csv),
            ext if ext.eq_ignore_ascii_case("json") => Some(SourceFormat::Json),
            _ => None,
        }
    }
}

/// One record's fields before validation
///
/// Both decoders produce this and immediately run [`RawRecord::validate`],
/// which is what makes the two formats produce identical sequences for
/// equivalent content.
pub(crate) struct RawRecord {
    /// 1-based data record index (header rows do not count)
    pub record: usize,
    pub timestamp: Timestamp,
    pub temperature: f32,
    pub humidity: f32,
    pub luminosity: f32,
}

impl RawRecord {
    /// Enforce the data model's physical bounds
    pub fn validate(self) -> Result<Reading, ValidationError> {
        check_finite(self.record, "temperature", self.temperature)?;
        check_finite(self.record, "humidity", self.humidity)?;
        check_finite(self.record, "luminosity", self.luminosity)?;

        check_range(
            self.record,
            "temperature",
            self.temperature,
            MIN_TEMPERATURE_C,
            f32::MAX,
        )?;
        check_range(self.record, "humidity", self.humidity, 0.0, 100.0)?;
        check_range(self.record, "luminosity", self.luminosity, 0.0, f32::MAX)?;

        Ok(Reading {
            timestamp: self.timestamp,
            temperature: self.temperature,
            humidity: self.humidity,
            luminosity: self.luminosity,
        })
    }
}

fn check_finite(record: usize, field: &'static str, value: f32) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { record, field });
    }
    Ok(())
}

fn check_range(
    record: usize,
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            record,
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Parse a timestamp field: integer milliseconds or an ISO-8601 instant
///
/// Accepted forms, tried in order:
/// - unsigned integer (milliseconds since epoch)
/// - RFC 3339 (`2024-05-01T12:00:00+00:00`)
/// - naive ISO date-time (`2024-05-01T12:00:00` or `2024-05-01 12:00:00`),
///   interpreted as UTC
pub(crate) fn parse_timestamp(record: usize, raw: &str) -> Result<Timestamp, ValidationError> {
    let raw = raw.trim();

    if let Ok(ms) = raw.parse::<u64>() {
        return Ok(ms);
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp_millis().max(0) as Timestamp);
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc().timestamp_millis().max(0) as Timestamp);
        }
    }

    Err(ValidationError::Timestamp {
        record,
        raw: raw.to_string(),
    })
}

/// Parse an in-memory source in the given format
pub fn parse_str(input: &str, format: SourceFormat) -> Result<Vec<Reading>, ParseError> {
    match format {
        SourceFormat::Csv => csv::parse(input),
        SourceFormat::Json => json::parse(input),
    }
}

/// Read and parse a file in the given format
pub fn parse_file(path: &Path, format: SourceFormat) -> Result<Vec<Reading>, ParseError> {
    let input = std::fs::read_to_string(path).map_err(crate::errors::FormatError::Io)?;
    let readings = parse_str(&input, format)?;
    log::info!(
        "parsed {} readings from {} ({:?})",
        readings.len(),
        path.display(),
        format
    );
    Ok(readings)
}
