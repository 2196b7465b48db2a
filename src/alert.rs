//! Threshold classification and alert emission
//!
//! Each incoming reading is classified per metric, independently, against
//! that metric's [`ThresholdBand`]. Critical bounds are checked before
//! warning bounds, so a value past both is reported once, as critical.
//! High and low breaches are symmetric.
//!
//! ## Pinned policies
//!
//! - **Boundary rule**: inclusive. A value exactly equal to a high bound
//!   (`value >= *_high`) or a low bound (`value <= *_low`) counts as a
//!   breach of that severity.
//! - **Re-alert policy**: no hysteresis or deduplication. Every reading is
//!   classified on its own; a sustained breach emits an alert on every tick
//!   it persists. Deliberate — the persisted alert history is the record of
//!   how long a condition held, and collapsing it is the reviewer's job,
//!   not the evaluator's.
//!
//! Classification is total and deterministic for in-domain values: the same
//! reading and config always yield the same severities, and a non-breaching
//! reading simply yields no alert. Nothing here errors.

use crate::config::{ThresholdBand, ThresholdConfig};
use crate::reading::{Alert, Metric, Reading, Severity};

/// Classify one value against a band
///
/// Returns the severity together with the specific bound that was crossed
/// (`None` for [`Severity::Normal`]).
pub fn classify(value: f32, band: &ThresholdBand) -> (Severity, Option<f32>) {
    // Critical first: worse wins when a value is past both bands.
    if value >= band.critical_high {
        return (Severity::Critical, Some(band.critical_high));
    }
    if value <= band.critical_low {
        return (Severity::Critical, Some(band.critical_low));
    }
    if value >= band.warning_high {
        return (Severity::Warning, Some(band.warning_high));
    }
    if value <= band.warning_low {
        return (Severity::Warning, Some(band.warning_low));
    }
    (Severity::Normal, None)
}

/// Evaluate one reading against the full threshold config
///
/// Produces zero or one alert per metric, in [`Metric::ALL`] order. Normal
/// classifications produce nothing — only warning and critical outcomes are
/// events.
pub fn evaluate(reading: &Reading, config: &ThresholdConfig) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for metric in Metric::ALL {
        let value = reading.value(metric);
        let (severity, threshold) = classify(value, config.band(metric));

        if severity > Severity::Normal {
            // threshold is always Some for warning/critical
            let threshold_breached = threshold.unwrap_or(value);
            log::debug!(
                "{} {} {} breached {} (severity {})",
                reading.timestamp,
                metric.name(),
                value,
                threshold_breached,
                severity.label(),
            );
            alerts.push(Alert {
                timestamp: reading.timestamp,
                metric,
                value,
                severity,
                threshold_breached,
            });
        }
    }

    alerts
}
