//! The ingestion → statistics → alerting → persistence pipeline
//!
//! [`MonitorPipeline`] wires the components into the strictly sequential
//! per-tick flow the monitoring use case demands:
//!
//! ```text
//! tick k:  evaluate ─→ append reading ─→ append alerts ─→ observe window
//! ```
//!
//! Evaluation is pure and runs first. Persistence runs before the
//! statistics window is updated, so a storage failure aborts the run with
//! the in-flight reading absent from both the store *and* the window —
//! the tick simply never happened. The simulator halts rather than skipping
//! ahead, because a silently dropped tick could lose an alert.
//!
//! Statistics and alerts for tick *k* are fully computed and persisted
//! before tick *k+1* is emitted; readings and their derived alerts share a
//! total order.

use crate::alert;
use crate::config::{PipelineConfig, ThresholdConfig};
use crate::errors::{PipelineError, StorageError};
use crate::parser::{parse_file, SourceFormat};
use crate::reading::{Metric, Reading};
use crate::store::SensorStore;
use crate::stream::{CancelHandle, ReplayStream, StreamSimulator};
use crate::time::Clock;
use crate::window::{StatisticsSnapshot, StatisticsWindow};

/// Outcome of one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks fully processed (evaluated, persisted, observed)
    pub ticks: usize,
    /// Alerts generated and persisted across the run
    pub alerts_emitted: usize,
    /// Whether the run stopped on cancellation rather than exhaustion
    pub cancelled: bool,
}

/// Full monitoring pipeline over a replayed reading sequence
pub struct MonitorPipeline<C: Clock> {
    simulator: StreamSimulator<C>,
    window: StatisticsWindow,
    thresholds: ThresholdConfig,
    store: SensorStore,
}

impl<C: Clock> MonitorPipeline<C> {
    /// Assemble a pipeline from validated configuration
    ///
    /// Fails with [`crate::ConfigError`] before anything runs if the
    /// thresholds or window size are malformed.
    pub fn new(
        config: &PipelineConfig,
        clock: C,
        store: SensorStore,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            simulator: StreamSimulator::new(clock, config.tick_delay_ms),
            window: StatisticsWindow::new(config.window_size)?,
            thresholds: config.thresholds,
            store,
        })
    }

    /// Handle for stopping a run from another thread
    pub fn cancel_handle(&self) -> CancelHandle {
        self.simulator.cancel_handle()
    }

    /// Current aggregate for one metric, if anything has been observed
    pub fn snapshot(&self, metric: Metric) -> Option<StatisticsSnapshot> {
        self.window.snapshot(metric)
    }

    /// Query access for external consumers (display, export)
    pub fn store(&self) -> &SensorStore {
        &self.store
    }

    /// Parse a source file and replay it through the pipeline
    pub fn run_file(
        &mut self,
        path: &std::path::Path,
        format: SourceFormat,
    ) -> Result<RunSummary, PipelineError> {
        let readings = parse_file(path, format)?;
        self.run(readings)
    }

    /// Replay a parsed sequence through the pipeline
    ///
    /// Starting a run resets the statistics window — restarting a stream
    /// never bleeds statistics across sessions. The persisted history is
    /// append-only and is deliberately *not* reset.
    pub fn run(&mut self, readings: Vec<Reading>) -> Result<RunSummary, PipelineError> {
        self.window.reset();
        let mut source = ReplayStream::new(readings);

        log::info!(
            "starting replay of {} readings (window {}, delay {}ms)",
            source.remaining(),
            self.window.capacity(),
            self.simulator.tick_delay_ms(),
        );

        let mut alerts_emitted = 0usize;
        let window = &mut self.window;
        let store = &mut self.store;
        let thresholds = &self.thresholds;

        let (ticks, cancelled) =
            self.simulator
                .run(&mut source, |reading| -> Result<(), StorageError> {
                    let alerts = alert::evaluate(&reading, thresholds);

                    store.append_reading(&reading)?;
                    for a in &alerts {
                        store.append_alert(a)?;
                    }

                    // Window update last: a failed append leaves the tick
                    // fully absent, not half-applied.
                    window.observe(&reading);
                    alerts_emitted += alerts.len();
                    Ok(())
                })?;

        log::info!(
            "replay finished: {ticks} ticks, {alerts_emitted} alerts{}",
            if cancelled { " (cancelled)" } else { "" },
        );

        Ok(RunSummary {
            ticks,
            alerts_emitted,
            cancelled,
        })
    }
}
