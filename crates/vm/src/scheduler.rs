//! Fixed-rate ticking on top of a variable frame clock.

use std::time::Duration;

use scd_common::Program;
use tracing::trace;

use crate::error::ScriptError;
use crate::machine::Interpreter;
use crate::world::World;

/// Default tick length: 1/30 s.
pub const TICK_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 30);

/// Accumulates frame time and runs at most one interpreter tick per update.
///
/// Elapsed time past the interval is discarded when a tick fires. A slow
/// host therefore runs scripts slower than wall time instead of bursting
/// through several ticks in one frame.
#[derive(Debug, Clone)]
pub struct Scheduler {
    accumulator: Duration,
    interval: Duration,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_interval(TICK_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            accumulator: Duration::ZERO,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated toward the next tick.
    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Add `elapsed` and tick the interpreter if a full interval has built up.
    ///
    /// Returns whether a tick ran.
    ///
    /// # Errors
    ///
    /// Propagates the first fatal error raised during the tick.
    pub fn update<W: World + ?Sized>(
        &mut self,
        elapsed: Duration,
        interpreter: &mut Interpreter,
        program: &Program,
        world: &mut W,
    ) -> Result<bool, ScriptError> {
        self.accumulator += elapsed;
        if self.accumulator < self.interval {
            return Ok(false);
        }
        self.accumulator = Duration::ZERO;
        trace!(live = interpreter.live_threads(), "script tick");
        interpreter.tick(program, world)?;
        Ok(true)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
