//! Append-only persistence for readings and alerts
//!
//! Two collections live as JSON Lines files in the store directory:
//!
//! - `sensor_data.jsonl` — every reading, all fields plus a monotonic
//!   insertion `id`
//! - `alerts.jsonl` — every warning/critical alert, all fields plus the
//!   same kind of `id`; the alert's `timestamp` is the source reading's
//!   timestamp and correlates the two collections
//!
//! ## Durability
//!
//! An append is committed before the call returns: the full record line is
//! written, flushed and fsynced. There is no write buffering that could
//! silently lose an accepted append — a lost alert is a correctness
//! violation for the monitoring use case, so append failures surface as
//! [`StorageError`] and the caller (the pipeline) halts.
//!
//! ## Torn appends and concurrent readers
//!
//! Queries open an independent read handle, so a reader during an active
//! stream only ever observes complete, synced lines. If the process died
//! between write and sync, the file may end in a partial line; queries
//! ignore a torn *trailing* line and recover, while a malformed line
//! anywhere else is surfaced as [`StorageError::Corrupt`]. Reopening a
//! store resumes insertion ids after the highest committed id.
//!
//! No update or delete operation exists, by design.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::StorageError;
use crate::reading::{Alert, Reading, Severity};
use crate::time::Timestamp;

const READINGS_FILE: &str = "sensor_data.jsonl";
const ALERTS_FILE: &str = "alerts.jsonl";

/// Inclusive timestamp range for queries
///
/// Either side may be open. `None` bounds match everything on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    /// Earliest timestamp included, if bounded
    pub start: Option<Timestamp>,
    /// Latest timestamp included, if bounded
    pub end: Option<Timestamp>,
}

impl TimeRange {
    /// Range covering `start..=end`
    pub fn between(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether `t` falls inside the range
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start.is_none_or(|s| t >= s) && self.end.is_none_or(|e| t <= e)
    }
}

/// A persisted reading with its insertion id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    /// Monotonic insertion identifier (1-based)
    pub id: u64,
    /// The reading as it was ingested
    #[serde(flatten)]
    pub reading: Reading,
}

/// A persisted alert with its insertion id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredAlert {
    /// Monotonic insertion identifier (1-based)
    pub id: u64,
    /// The alert; its `timestamp` references the source reading
    #[serde(flatten)]
    pub alert: Alert,
}

/// Append-only store for readings and alerts
///
/// Single writer; any number of concurrent readers via [`Self::query_readings`]
/// and [`Self::query_alerts`], which never observe a torn append.
#[derive(Debug)]
pub struct SensorStore {
    dir: PathBuf,
    readings: File,
    alerts: File,
    next_reading_id: u64,
    next_alert_id: u64,
}

impl SensorStore {
    /// Open (or create) a store in `dir`
    ///
    /// Existing collections are scanned to resume insertion ids after the
    /// highest committed record.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Open {
            path: dir.display().to_string(),
            source,
        })?;

        let open_append = |name: &str| -> Result<File, StorageError> {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(name))
                .map_err(|source| StorageError::Open {
                    path: dir.join(name).display().to_string(),
                    source,
                })
        };

        let readings = open_append(READINGS_FILE)?;
        let alerts = open_append(ALERTS_FILE)?;

        let next_reading_id = last_committed_id::<StoredReading>(&dir.join(READINGS_FILE))? + 1;
        let next_alert_id = last_committed_id::<StoredAlert>(&dir.join(ALERTS_FILE))? + 1;

        log::info!(
            "store open at {}: {} readings, {} alerts committed",
            dir.display(),
            next_reading_id - 1,
            next_alert_id - 1,
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            readings,
            alerts,
            next_reading_id,
            next_alert_id,
        })
    }

    /// Directory this store lives in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of committed readings
    pub fn reading_count(&self) -> u64 {
        self.next_reading_id - 1
    }

    /// Number of committed alerts
    pub fn alert_count(&self) -> u64 {
        self.next_alert_id - 1
    }

    /// Durably append one reading; returns its insertion id
    pub fn append_reading(&mut self, reading: &Reading) -> Result<u64, StorageError> {
        let stored = StoredReading {
            id: self.next_reading_id,
            reading: *reading,
        };
        append_record(&mut self.readings, "sensor_data", &stored)?;
        self.next_reading_id += 1;
        Ok(stored.id)
    }

    /// Durably append one alert; returns its insertion id
    pub fn append_alert(&mut self, alert: &Alert) -> Result<u64, StorageError> {
        let stored = StoredAlert {
            id: self.next_alert_id,
            alert: *alert,
        };
        append_record(&mut self.alerts, "alerts", &stored)?;
        self.next_alert_id += 1;
        Ok(stored.id)
    }

    /// All committed readings in insertion order, optionally time-filtered
    pub fn query_readings(
        &self,
        range: Option<TimeRange>,
    ) -> Result<Vec<StoredReading>, StorageError> {
        let all: Vec<StoredReading> = read_collection(&self.dir.join(READINGS_FILE), "sensor_data")?;
        Ok(all
            .into_iter()
            .filter(|r| range.is_none_or(|range| range.contains(r.reading.timestamp)))
            .collect())
    }

    /// All committed alerts in insertion order
    ///
    /// `min_severity` filters to alerts *at or above* the given severity
    /// (the severity ordering makes "warning and worse" a single bound).
    pub fn query_alerts(
        &self,
        range: Option<TimeRange>,
        min_severity: Option<Severity>,
    ) -> Result<Vec<StoredAlert>, StorageError> {
        let all: Vec<StoredAlert> = read_collection(&self.dir.join(ALERTS_FILE), "alerts")?;
        Ok(all
            .into_iter()
            .filter(|a| range.is_none_or(|range| range.contains(a.alert.timestamp)))
            .filter(|a| min_severity.is_none_or(|min| a.alert.severity >= min))
            .collect())
    }
}

/// Write one record line, flush, and sync before returning
fn append_record<T: Serialize>(
    file: &mut File,
    collection: &'static str,
    record: &T,
) -> Result<(), StorageError> {
    let failed = |source| StorageError::Append { collection, source };

    let mut line = serde_json::to_string(record).map_err(|e| failed(e.into()))?;
    line.push('\n');

    file.write_all(line.as_bytes()).map_err(failed)?;
    file.flush().map_err(failed)?;
    file.sync_data().map_err(failed)?;
    Ok(())
}

/// Decode a whole collection, tolerating only a torn trailing line
fn read_collection<T: DeserializeOwned>(
    path: &Path,
    collection: &'static str,
) -> Result<Vec<T>, StorageError> {
    let file = File::open(path).map_err(|source| StorageError::Query { collection, source })?;
    let reader = BufReader::new(file);

    let lines: Vec<String> = reader
        .lines()
        .collect::<Result<_, _>>()
        .map_err(|source| StorageError::Query { collection, source })?;

    let mut records = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(record) => records.push(record),
            Err(e) if idx + 1 == lines.len() => {
                // Crash between write and sync can leave one partial line
                // at the tail; it was never acknowledged, so drop it.
                log::warn!(
                    "{collection}: ignoring torn trailing line {} ({e})",
                    idx + 1
                );
            }
            Err(e) => {
                return Err(StorageError::Corrupt {
                    collection,
                    line: idx + 1,
                    detail: e.to_string(),
                });
            }
        }
    }

    Ok(records)
}

/// Highest committed id in a collection, 0 when empty or absent
fn last_committed_id<T: DeserializeOwned + HasId>(path: &Path) -> Result<u64, StorageError> {
    if !path.exists() {
        return Ok(0);
    }
    let collection = if path.ends_with(READINGS_FILE) {
        "sensor_data"
    } else {
        "alerts"
    };
    let records: Vec<T> = read_collection(path, collection)?;
    Ok(records.last().map(HasId::id).unwrap_or(0))
}

trait HasId {
    fn id(&self) -> u64;
}

impl HasId for StoredReading {
    fn id(&self) -> u64 {
        self.id
    }
}

impl HasId for StoredAlert {
    fn id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Metric;

    fn reading(t: Timestamp) -> Reading {
        Reading {
            timestamp: t,
            temperature: 20.0,
            humidity: 50.0,
            luminosity: 300.0,
        }
    }

    fn alert(t: Timestamp, severity: Severity) -> Alert {
        Alert {
            timestamp: t,
            metric: Metric::Temperature,
            value: 40.0,
            severity,
            threshold_breached: 35.0,
        }
    }

    #[test]
    fn appends_are_ordered_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SensorStore::open(dir.path()).unwrap();

        for t in [1000, 2000, 3000] {
            store.append_reading(&reading(t)).unwrap();
        }

        let rows = store.query_readings(None).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(store.reading_count(), 3);
        // Insertion order with monotonic 1-based ids
        assert_eq!(
            rows.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(rows[1].reading.timestamp, 2000);
    }

    #[test]
    fn reopen_resumes_ids_after_committed_records() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = SensorStore::open(dir.path()).unwrap();
            store.append_reading(&reading(1000)).unwrap();
            store.append_alert(&alert(1000, Severity::Warning)).unwrap();
        }

        let mut store = SensorStore::open(dir.path()).unwrap();
        assert_eq!(store.reading_count(), 1);
        assert_eq!(store.alert_count(), 1);

        let id = store.append_reading(&reading(2000)).unwrap();
        assert_eq!(id, 2);

        let rows = store.query_readings(None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, 2);
    }

    #[test]
    fn time_range_filter_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SensorStore::open(dir.path()).unwrap();
        for t in [1000, 2000, 3000, 4000] {
            store.append_reading(&reading(t)).unwrap();
        }

        let rows = store
            .query_readings(Some(TimeRange::between(2000, 3000)))
            .unwrap();
        assert_eq!(
            rows.iter().map(|r| r.reading.timestamp).collect::<Vec<_>>(),
            vec![2000, 3000]
        );
    }

    #[test]
    fn severity_filter_is_at_or_above() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SensorStore::open(dir.path()).unwrap();
        store.append_alert(&alert(1000, Severity::Warning)).unwrap();
        store.append_alert(&alert(2000, Severity::Critical)).unwrap();
        store.append_alert(&alert(3000, Severity::Warning)).unwrap();

        let critical = store
            .query_alerts(None, Some(Severity::Critical))
            .unwrap();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].alert.timestamp, 2000);

        let warning_and_worse = store.query_alerts(None, Some(Severity::Warning)).unwrap();
        assert_eq!(warning_and_worse.len(), 3);
    }

    #[test]
    fn torn_trailing_line_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = SensorStore::open(dir.path()).unwrap();
            store.append_reading(&reading(1000)).unwrap();
        }

        // Simulate a crash mid-append: partial line, never synced
        let path = dir.path().join("sensor_data.jsonl");
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"id\":2,\"timest").unwrap();
        drop(file);

        let store = SensorStore::open(dir.path()).unwrap();
        let rows = store.query_readings(None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(store.reading_count(), 1);
    }

    #[test]
    fn mid_file_corruption_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = SensorStore::open(dir.path()).unwrap();
            store.append_reading(&reading(1000)).unwrap();
        }

        // Corrupt line followed by a valid append: not a torn tail
        let path = dir.path().join("sensor_data.jsonl");
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"garbage\n").unwrap();
        file.write_all(
            b"{\"id\":3,\"timestamp\":3000,\"temperature\":20.0,\"humidity\":50.0,\"luminosity\":300.0}\n",
        )
        .unwrap();
        drop(file);

        let err = SensorStore::open(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Corrupt { collection: "sensor_data", line: 2, .. }
        ));
    }

    #[test]
    fn stored_records_flatten_their_fields() {
        let stored = StoredReading {
            id: 7,
            reading: reading(1000),
        };
        let json = serde_json::to_string(&stored).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        // Flat schema: id alongside the reading fields, no nesting
        assert_eq!(value["id"], 7);
        assert_eq!(value["timestamp"], 1000);
        assert_eq!(value["temperature"], 20.0);
    }
}
