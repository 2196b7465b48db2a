//! Reading streams and the replay simulator
//!
//! [`Stream`] is a non-blocking polling trait in the `nb` style: a source
//! either yields the next item, signals `WouldBlock` (nothing yet, ask
//! again), or fails permanently. [`ReplayStream`] is the file-backed case —
//! a parsed sequence replayed in order, resettable to the beginning.
//!
//! [`StreamSimulator`] is the exclusive driver of time in the pipeline: it
//! emits exactly one reading per tick to a synchronous consumer closure,
//! then sleeps the configured delay through the injected [`Clock`]. Because
//! the closure is invoked inline, at most one reading is ever in flight,
//! even with a zero delay.
//!
//! Cancellation is a plain atomic flag ([`CancelHandle`]), checked at the
//! top of every tick — a stop request halts emission within one tick and
//! never leaves a partially processed reading behind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::reading::Reading;
use crate::time::Clock;

/// Permanent stream failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    /// The source has no more items
    EndOfStream,
}

/// Core polling trait for reading sources
pub trait Stream {
    /// Item type produced by the stream
    type Item;

    /// Permanent error type
    type Error;

    /// Poll for the next item
    ///
    /// - `Ok(item)`: next item available
    /// - `Err(nb::Error::WouldBlock)`: nothing yet, poll again later
    /// - `Err(nb::Error::Other(e))`: permanent failure or exhaustion
    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error>;

    /// Bounds on the number of remaining items
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}

/// Replays a parsed reading sequence in input order
///
/// Backs the simulator when the source is a file. Restartable via
/// [`Self::reset`] — reloading a file does not require a new process.
pub struct ReplayStream {
    readings: Vec<Reading>,
    position: usize,
}

impl ReplayStream {
    /// Wrap a parsed sequence
    pub fn new(readings: Vec<Reading>) -> Self {
        Self {
            readings,
            position: 0,
        }
    }

    /// Rewind to the first reading
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Readings not yet emitted
    pub fn remaining(&self) -> usize {
        self.readings.len() - self.position
    }
}

impl Stream for ReplayStream {
    type Item = Reading;
    type Error = StreamError;

    fn poll_next(&mut self) -> nb::Result<Reading, StreamError> {
        if self.position >= self.readings.len() {
            return Err(nb::Error::Other(StreamError::EndOfStream));
        }
        let reading = self.readings[self.position];
        self.position += 1;
        Ok(reading)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

/// Cooperative stop flag for a running simulation
///
/// Cloneable and thread-safe; hand it to a UI thread or signal handler.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Fresh, un-cancelled handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the simulation to stop at the next tick boundary
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Clear the flag so the handle can drive another run
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

/// Paced driver emitting one reading per tick
///
/// The simulator owns all scheduling: no other component suspends or
/// sleeps. Consumers are synchronous, so tick *k* is fully processed before
/// tick *k+1* is emitted.
pub struct StreamSimulator<C: Clock> {
    clock: C,
    tick_delay_ms: u64,
    cancel: CancelHandle,
}

impl<C: Clock> StreamSimulator<C> {
    /// Simulator pacing ticks by `tick_delay_ms` on the given clock
    pub fn new(clock: C, tick_delay_ms: u64) -> Self {
        Self {
            clock,
            tick_delay_ms,
            cancel: CancelHandle::new(),
        }
    }

    /// Handle for stopping a run in progress
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Clock backing this simulator
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Configured per-tick delay in milliseconds
    pub fn tick_delay_ms(&self) -> u64 {
        self.tick_delay_ms
    }

    /// Drive the source to exhaustion or cancellation
    ///
    /// `on_tick` is called once per reading; an error from it aborts the
    /// run immediately with the tick left incomplete. Returns the number of
    /// fully processed ticks and whether the run was cancelled.
    ///
    /// The cancellation flag is cleared on entry so one handle can drive
    /// repeated runs (stop, rewind, start again).
    pub fn run<S, F, E>(&mut self, source: &mut S, mut on_tick: F) -> Result<(usize, bool), E>
    where
        S: Stream<Item = Reading>,
        F: FnMut(Reading) -> Result<(), E>,
    {
        self.cancel.reset();
        let mut ticks = 0usize;

        loop {
            if self.cancel.is_cancelled() {
                log::info!("replay cancelled after {ticks} ticks");
                return Ok((ticks, true));
            }

            match source.poll_next() {
                Ok(reading) => {
                    on_tick(reading)?;
                    ticks += 1;
                    self.clock.sleep_ms(self.tick_delay_ms);
                }
                Err(nb::Error::WouldBlock) => {
                    // Nothing ready yet: wait one tick and poll again
                    self.clock.sleep_ms(self.tick_delay_ms);
                }
                Err(nb::Error::Other(_)) => {
                    log::debug!("source exhausted after {ticks} ticks");
                    return Ok((ticks, false));
                }
            }
        }
    }
}
