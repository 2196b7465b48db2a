//! Data model: readings, metrics, severities and alerts
//!
//! A [`Reading`] is one timestamped sample of all three monitored metrics.
//! Readings are immutable once parsed — the parser rejects malformed records
//! outright, so every `Reading` in the system already satisfies the physical
//! bounds (humidity within [0, 100], luminosity non-negative, temperature
//! above absolute zero, all values finite).
//!
//! [`Severity`] derives `Ord` with `Normal < Warning < Critical`, so "worse
//! wins" comparisons and at-or-above query filters are plain ordering checks
//! rather than per-metric conditionals.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// One timestamped sample of temperature, humidity and luminosity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Sample time in milliseconds since epoch
    pub timestamp: Timestamp,
    /// Temperature in °C
    pub temperature: f32,
    /// Relative humidity in % (0–100)
    pub humidity: f32,
    /// Luminosity in lux (≥ 0)
    pub luminosity: f32,
}

impl Reading {
    /// Value of the given metric within this reading
    pub fn value(&self, metric: Metric) -> f32 {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Luminosity => self.luminosity,
        }
    }
}

/// The three monitored metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Metric {
    /// Air temperature
    Temperature = 0,
    /// Relative humidity
    Humidity = 1,
    /// Ambient light level
    Luminosity = 2,
}

impl Metric {
    /// All metrics, in field order
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Humidity, Metric::Luminosity];

    /// Human-readable name, matching the source column/key
    pub const fn name(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Luminosity => "luminosity",
        }
    }

    /// Unit of measurement
    pub const fn unit(&self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
            Metric::Luminosity => "lux",
        }
    }
}

/// Classification of a metric value against its thresholds
///
/// The derived ordering is the severity ordering: `Normal < Warning <
/// Critical`. `Normal` is a transient classification outcome only — it is
/// never persisted as an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    /// Within all configured bounds
    Normal = 0,
    /// Breached a warning bound
    Warning = 1,
    /// Breached a critical bound
    Critical = 2,
}

impl Severity {
    /// Human-readable label, matching the persisted form
    pub const fn label(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// A threshold breach generated from one reading's metric
///
/// `timestamp` is the source reading's timestamp and is the correlation key
/// between an alert and the reading that produced it. Immutable once
/// created; ownership passes to the persistence store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Timestamp of the source reading
    pub timestamp: Timestamp,
    /// Metric that breached
    pub metric: Metric,
    /// The breaching value
    pub value: f32,
    /// `Warning` or `Critical` (never `Normal`)
    pub severity: Severity,
    /// The specific bound that was crossed
    pub threshold_breached: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Normal < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
        assert_eq!(
            Severity::Warning.max(Severity::Critical),
            Severity::Critical
        );
    }

    #[test]
    fn metric_accessors() {
        let reading = Reading {
            timestamp: 1000,
            temperature: 21.5,
            humidity: 40.0,
            luminosity: 300.0,
        };

        assert_eq!(reading.value(Metric::Temperature), 21.5);
        assert_eq!(reading.value(Metric::Humidity), 40.0);
        assert_eq!(reading.value(Metric::Luminosity), 300.0);
        assert_eq!(Metric::Luminosity.name(), "luminosity");
        assert_eq!(Metric::Temperature.unit(), "°C");
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");

        let back: Severity = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(back, Severity::Warning);
    }
}
