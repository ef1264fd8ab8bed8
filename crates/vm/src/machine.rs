//! The interpreter: thread pool, global state and per-tick execution.

use scd_common::Program;
use tracing::{debug, instrument};

use crate::error::ScriptError;
use crate::execute::{Dispatcher, ANY_SLOT};
use crate::state::ScriptState;
use crate::thread::ScriptThread;
use crate::world::World;

/// Number of script threads in the pool.
pub const MAX_THREADS: usize = 20;

/// Why a thread stopped dispatching for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Parked inside a sleep; resumes at the same instruction.
    Suspended,
    /// A condition failed with no open block left to unwind. The thread
    /// waits at the failing test and re-evaluates it next tick.
    Unwound,
    /// The thread ended, or was not alive to begin with.
    Terminated,
}

/// Owns the thread pool and the global script state.
///
/// The program is borrowed per call so one interpreter can outlive the
/// room it is currently running.
#[derive(Debug, Clone)]
pub struct Interpreter {
    threads: Vec<ScriptThread>,
    state: ScriptState,
}

impl Interpreter {
    /// Create an interpreter with every thread dead and an empty state.
    pub fn new() -> Self {
        Self {
            threads: vec![ScriptThread::new(); MAX_THREADS],
            state: ScriptState::new(),
        }
    }

    pub fn threads(&self) -> &[ScriptThread] {
        &self.threads
    }

    pub fn thread(&self, slot: usize) -> Option<&ScriptThread> {
        self.threads.get(slot)
    }

    pub fn state(&self) -> &ScriptState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ScriptState {
        &mut self.state
    }

    /// Number of threads currently alive.
    pub fn live_threads(&self) -> usize {
        self.threads.iter().filter(|t| t.is_alive()).count()
    }

    /// Start `event` on the first dead thread.
    ///
    /// Returns the slot used, or `None` if every thread is busy.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::UnknownEvent`] if the program has no such event.
    pub fn start_event(
        &mut self,
        program: &Program,
        event: u8,
    ) -> Result<Option<usize>, ScriptError> {
        let entry = program
            .entry_point(event)
            .ok_or(ScriptError::UnknownEvent { event })?;
        let slot = activate_slot(&mut self.threads, None, ANY_SLOT, entry, event);
        if let Some(slot) = slot {
            debug!(slot, event, "event started by host");
        }
        Ok(slot)
    }

    /// Kill every thread. Global state survives, as on a room transition.
    pub fn reset_threads(&mut self) {
        for thread in &mut self.threads {
            thread.kill();
        }
    }

    /// Kill every thread and forget every flag and variable.
    pub fn reset(&mut self) {
        self.reset_threads();
        self.state.clear();
    }

    /// Dispatch one thread until it yields, unwinds or terminates.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::InvalidThread`] for a slot outside the pool, or
    /// whatever fatal error the thread's program raised.
    pub fn run_thread<W: World + ?Sized>(
        &mut self,
        slot: usize,
        program: &Program,
        world: &mut W,
    ) -> Result<StepOutcome, ScriptError> {
        let mut thread = std::mem::take(
            self.threads
                .get_mut(slot)
                .ok_or(ScriptError::InvalidThread { slot })?,
        );
        if !thread.is_alive() {
            self.threads[slot] = thread;
            return Ok(StepOutcome::Terminated);
        }

        let mut dispatcher = Dispatcher {
            program,
            state: &mut self.state,
            pool: &mut self.threads,
            running: slot,
            world,
        };
        let outcome = dispatcher.run(&mut thread);

        // A failed thread is left as it was at the failing instruction so the
        // host can inspect it.
        self.threads[slot] = thread;
        outcome
    }

    /// Run every live thread once, in slot order.
    ///
    /// Threads started during the tick by a lower slot run in the same tick
    /// if their slot is higher.
    ///
    /// # Errors
    ///
    /// Stops at the first fatal error; later threads do not run this tick.
    #[instrument(level = "trace", skip_all)]
    pub fn tick<W: World + ?Sized>(
        &mut self,
        program: &Program,
        world: &mut W,
    ) -> Result<(), ScriptError> {
        for slot in 0..self.threads.len() {
            if self.threads[slot].is_alive() {
                self.run_thread(slot, program, world)?;
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Activate `event` on a thread of `pool`.
///
/// `requested` names a slot, or is [`ANY_SLOT`] for the first dead one. The
/// `running` slot is vacant while its thread dispatches and is never chosen.
pub(crate) fn activate_slot(
    pool: &mut [ScriptThread],
    running: Option<usize>,
    requested: u8,
    entry: usize,
    event: u8,
) -> Option<usize> {
    let slot = if requested == ANY_SLOT {
        pool.iter()
            .enumerate()
            .position(|(i, t)| Some(i) != running && !t.is_alive())?
    } else {
        let slot = requested as usize;
        if slot >= pool.len() || Some(slot) == running {
            return None;
        }
        slot
    };
    pool[slot].activate(entry, event);
    Some(slot)
}
