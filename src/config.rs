//! Pipeline configuration: threshold bands, tick delay, window size
//!
//! Configuration is supplied by an external collaborator (a settings file,
//! a UI form) — this core only validates its shape and consumes it. It is
//! passed as an immutable value into each pipeline run, never held as
//! process-wide state, so tests can vary configs freely.
//!
//! A [`ThresholdBand`] carries both a low and a high bound per severity.
//! One-sided thresholds use `±∞` for the unused side: a `warning_low` of
//! `-∞` can never be breached. `NaN` bounds are rejected.
//!
//! Validation rule for bound nesting: warning bounds must be no more
//! extreme than their critical counterparts (`critical_low <= warning_low`
//! and `warning_high <= critical_high`), so a value past a critical bound
//! has necessarily passed the warning bound too.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::reading::Metric;

/// Warning and critical bounds for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    /// Values at or below this are a warning breach
    #[serde(default = "neg_infinity")]
    pub warning_low: f32,
    /// Values at or above this are a warning breach
    #[serde(default = "infinity")]
    pub warning_high: f32,
    /// Values at or below this are a critical breach
    #[serde(default = "neg_infinity")]
    pub critical_low: f32,
    /// Values at or above this are a critical breach
    #[serde(default = "infinity")]
    pub critical_high: f32,
}

// JSON cannot express ±∞, so omitted sides of a band default to unbounded.
fn infinity() -> f32 {
    f32::INFINITY
}

fn neg_infinity() -> f32 {
    f32::NEG_INFINITY
}

impl ThresholdBand {
    /// Band that only alerts above `warning_high` / `critical_high`
    pub const fn high_only(warning_high: f32, critical_high: f32) -> Self {
        Self {
            warning_low: f32::NEG_INFINITY,
            warning_high,
            critical_low: f32::NEG_INFINITY,
            critical_high,
        }
    }

    /// Band that only alerts below `warning_low` / `critical_low`
    pub const fn low_only(warning_low: f32, critical_low: f32) -> Self {
        Self {
            warning_low,
            warning_high: f32::INFINITY,
            critical_low,
            critical_high: f32::INFINITY,
        }
    }

    fn validate(&self, metric: Metric) -> Result<(), ConfigError> {
        let bounds = [
            ("warning_low", self.warning_low),
            ("warning_high", self.warning_high),
            ("critical_low", self.critical_low),
            ("critical_high", self.critical_high),
        ];
        for (name, value) in bounds {
            if value.is_nan() {
                return Err(ConfigError::NanThreshold {
                    metric: metric.name(),
                    bound: name,
                });
            }
        }

        if self.warning_low > self.warning_high {
            return Err(ConfigError::InvertedBounds {
                metric: metric.name(),
                low_bound: "warning_low",
                high_bound: "warning_high",
                low: self.warning_low,
                high: self.warning_high,
            });
        }
        if self.critical_low > self.critical_high {
            return Err(ConfigError::InvertedBounds {
                metric: metric.name(),
                low_bound: "critical_low",
                high_bound: "critical_high",
                low: self.critical_low,
                high: self.critical_high,
            });
        }

        // Warning bounds sit inside the critical bounds
        if self.critical_low > self.warning_low {
            return Err(ConfigError::WarningBeyondCritical {
                metric: metric.name(),
                warning: self.warning_low,
                critical: self.critical_low,
            });
        }
        if self.warning_high > self.critical_high {
            return Err(ConfigError::WarningBeyondCritical {
                metric: metric.name(),
                warning: self.warning_high,
                critical: self.critical_high,
            });
        }

        Ok(())
    }
}

/// Per-metric threshold bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Temperature band (°C)
    pub temperature: ThresholdBand,
    /// Humidity band (%)
    pub humidity: ThresholdBand,
    /// Luminosity band (lux)
    pub luminosity: ThresholdBand,
}

impl ThresholdConfig {
    /// Band for the given metric
    pub fn band(&self, metric: Metric) -> &ThresholdBand {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
            Metric::Luminosity => &self.luminosity,
        }
    }

    /// Check every band's shape
    pub fn validate(&self) -> Result<(), ConfigError> {
        for metric in Metric::ALL {
            self.band(metric).validate(metric)?;
        }
        Ok(())
    }
}

impl Default for ThresholdConfig {
    /// Stock thresholds: hot rooms and dry air warn, extremes are critical
    fn default() -> Self {
        Self {
            temperature: ThresholdBand::high_only(30.0, 35.0),
            humidity: ThresholdBand::low_only(30.0, 20.0),
            luminosity: ThresholdBand::high_only(800.0, 1000.0),
        }
    }
}

/// Full configuration consumed by one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Per-metric alert thresholds
    pub thresholds: ThresholdConfig,
    /// Delay between simulated ticks, in milliseconds
    pub tick_delay_ms: u64,
    /// Capacity of the per-metric statistics window, in readings
    pub window_size: usize,
}

impl PipelineConfig {
    /// Validate shape: finite ordered bounds, window of at least 1
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            tick_delay_ms: 1000,
            window_size: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn nan_threshold_rejected() {
        let mut config = PipelineConfig::default();
        config.thresholds.temperature.warning_high = f32::NAN;

        assert_eq!(
            config.validate(),
            Err(ConfigError::NanThreshold {
                metric: "temperature",
                bound: "warning_high",
            })
        );
    }

    #[test]
    fn inverted_bounds_rejected() {
        let mut config = PipelineConfig::default();
        config.thresholds.humidity = ThresholdBand {
            warning_low: 50.0,
            warning_high: 40.0,
            critical_low: 20.0,
            critical_high: f32::INFINITY,
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedBounds { metric: "humidity", .. })
        ));
    }

    #[test]
    fn warning_beyond_critical_rejected() {
        let mut config = PipelineConfig::default();
        // Warning high above critical high
        config.thresholds.temperature = ThresholdBand::high_only(40.0, 35.0);

        assert_eq!(
            config.validate(),
            Err(ConfigError::WarningBeyondCritical {
                metric: "temperature",
                warning: 40.0,
                critical: 35.0,
            })
        );
    }

    #[test]
    fn zero_window_rejected() {
        let mut config = PipelineConfig::default();
        config.window_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroWindow));
    }

    #[test]
    fn config_round_trips_through_json() {
        // All-finite bands: serde_json cannot represent ±∞
        let band = ThresholdBand {
            warning_low: 10.0,
            warning_high: 30.0,
            critical_low: 5.0,
            critical_high: 35.0,
        };
        let config = PipelineConfig {
            thresholds: ThresholdConfig {
                temperature: band,
                humidity: band,
                luminosity: band,
            },
            tick_delay_ms: 500,
            window_size: 16,
        };

        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert!(back.validate().is_ok());
    }

    #[test]
    fn omitted_band_sides_default_to_unbounded() {
        let band: ThresholdBand =
            serde_json::from_str(r#"{"warning_high": 30.0, "critical_high": 35.0}"#).unwrap();

        assert_eq!(band, ThresholdBand::high_only(30.0, 35.0));
        assert!(band.validate(Metric::Temperature).is_ok());
    }
}
