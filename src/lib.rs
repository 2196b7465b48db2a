//! Core ingestion and alerting engine for Sensorium
//!
//! Replays file-sourced sensor readings (temperature, humidity, luminosity)
//! as a simulated real-time stream, maintains rolling statistics, classifies
//! each reading against configurable thresholds, and persists both the raw
//! readings and any generated alerts in append-only collections.
//!
//! The pipeline is strictly sequential per tick:
//!
//! ```text
//! File ─→ Parser ─→ ReplayStream ─→ Simulator ─┬─→ StatisticsWindow
//!                                              ├─→ Alert Evaluator
//!                                              └─→ SensorStore (readings + alerts)
//! ```
//!
//! ```no_run
//! use sensorium::{
//!     config::PipelineConfig,
//!     parser::{parse_file, SourceFormat},
//!     pipeline::MonitorPipeline,
//!     store::SensorStore,
//!     time::SystemClock,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let readings = parse_file("sensors.csv".as_ref(), SourceFormat::Csv)?;
//!
//! let store = SensorStore::open("data".as_ref())?;
//! let mut pipeline = MonitorPipeline::new(&config, SystemClock, store)?;
//! let summary = pipeline.run(readings)?;
//! println!("{} ticks, {} alerts", summary.ticks, summary.alerts_emitted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod alert;
pub mod config;
pub mod errors;
pub mod parser;
pub mod pipeline;
pub mod reading;
pub mod store;
pub mod stream;
pub mod time;
pub mod window;

// Public API
pub use alert::evaluate;
pub use config::{PipelineConfig, ThresholdBand, ThresholdConfig};
pub use errors::{ConfigError, FormatError, ParseError, PipelineError, StorageError, ValidationError};
pub use pipeline::{MonitorPipeline, RunSummary};
pub use reading::{Alert, Metric, Reading, Severity};
pub use store::{SensorStore, TimeRange};
pub use stream::{CancelHandle, ReplayStream, StreamSimulator};
pub use window::{StatisticsSnapshot, StatisticsWindow};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
