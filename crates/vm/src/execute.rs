//! Dispatch loop and control-flow opcodes.
//!
//! The loop decodes the instruction at the thread's program counter,
//! advances the counter past it, and hands it to a handler. Handlers that
//! jump overwrite the counter; handlers that must re-run next tick put it
//! back. What the loop does next is decided by the returned [`Signal`].

use scd_common::{DecodeError, Instruction, Opcode, Program};
use tracing::{debug, trace, warn};

use crate::error::ScriptError;
use crate::machine::{activate_slot, StepOutcome};
use crate::state::ScriptState;
use crate::thread::{LoopSlot, ScriptThread, WorkTarget};
use crate::world::World;

/// Slot value in `EVT_EXEC` meaning "first dead thread".
pub const ANY_SLOT: u8 = 0xff;

/// What a handler asks the dispatch loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    /// Proceed with the instruction at the (possibly overridden) counter.
    Continue,
    /// The last condition test failed: leave the innermost block.
    ConditionFalse,
    /// Park the thread until the next tick.
    Yield,
    /// The thread ended.
    Terminated,
}

/// Everything a handler may touch besides the running thread.
pub(crate) struct Dispatcher<'a, W: World + ?Sized> {
    pub(crate) program: &'a Program,
    pub(crate) state: &'a mut ScriptState,
    /// The thread pool. The running thread's own slot is vacant while it
    /// dispatches.
    pub(crate) pool: &'a mut [ScriptThread],
    pub(crate) running: usize,
    pub(crate) world: &'a mut W,
}

impl<'a, W: World + ?Sized> Dispatcher<'a, W> {
    /// Dispatch `thread` until it yields, unwinds past its open blocks or
    /// terminates.
    pub(crate) fn run(&mut self, thread: &mut ScriptThread) -> Result<StepOutcome, ScriptError> {
        let program = self.program;
        thread.suspended = false;

        loop {
            if !thread.alive {
                return Ok(StepOutcome::Terminated);
            }

            let at = thread.pc;
            let byte = *program
                .code()
                .get(at)
                .ok_or(ScriptError::Decode {
                    at,
                    source: DecodeError::OutOfBounds(at),
                })?;

            // Unknown bytes in straight-line code are stepped over one at a
            // time; the bytes that follow still decode on their own.
            if Opcode::try_from(byte).is_err() {
                warn!(slot = self.running, pc = at, opcode = byte, "unknown opcode, skipping");
                thread.pc = at + 1;
                continue;
            }

            let instr = program
                .instruction_at(at)
                .map_err(|source| ScriptError::Decode { at, source })?;
            trace!(slot = self.running, pc = at, op = instr.opcode.mnemonic(), "dispatch");

            thread.pc = at + instr.width();

            let signal = match self.dispatch(thread, &instr, at) {
                Ok(signal) => signal,
                Err(err) => {
                    // Stay on the failing instruction so another tick
                    // reports the same error instead of skipping past it.
                    thread.pc = at;
                    return Err(err);
                }
            };

            match signal {
                Signal::Continue => {}
                Signal::Yield => {
                    thread.suspended = true;
                    return Ok(StepOutcome::Suspended);
                }
                Signal::Terminated => {
                    debug!(slot = self.running, pc = at, "thread terminated");
                    thread.kill();
                    return Ok(StepOutcome::Terminated);
                }
                Signal::ConditionFalse => {
                    let level = thread.current_level_mut();
                    if level.if_else_counter < 0 {
                        // Nothing left to unwind: wait here and test again
                        // next tick.
                        thread.pc = at;
                        thread.suspended = true;
                        return Ok(StepOutcome::Unwound);
                    }
                    let target = match level.close_block(at) {
                        Ok(target) => target,
                        Err(err) => {
                            thread.pc = at;
                            return Err(err);
                        }
                    };
                    level.drop_exited_loops();
                    thread.pc = target;
                }
            }
        }
    }

    fn dispatch(
        &mut self,
        thread: &mut ScriptThread,
        instr: &Instruction<'_>,
        at: usize,
    ) -> Result<Signal, ScriptError> {
        match instr.opcode {
            // Events and subroutines
            Opcode::EvtEnd => self.exec_evt_end(thread, at),
            Opcode::Return => {
                thread.return_from_subroutine(at)?;
                debug!(slot = self.running, pc = thread.pc, "return");
                Ok(Signal::Continue)
            }
            Opcode::EvtExec => self.exec_evt_exec(instr),
            Opcode::EvtKill => Ok(self.exec_evt_kill(instr)),
            Opcode::Gosub => self.exec_gosub(thread, instr, at),

            // Conditionals
            Opcode::IfStart => exec_if_start(thread, instr, at),
            Opcode::ElseStart => exec_else_start(thread, instr, at),
            Opcode::EndIf => {
                thread.current_level_mut().close_block(at)?;
                Ok(Signal::Continue)
            }

            // Suspension
            Opcode::Sleep => exec_sleep(thread, instr, at),
            Opcode::Sleeping => exec_sleeping(thread, at),

            // Loops and switches
            Opcode::For => exec_for(thread, instr, at),
            Opcode::ForEnd => exec_for_end(thread, at),
            Opcode::Switch => self.exec_switch(thread, instr, at),
            // Reached only by falling out of the previous case body.
            Opcode::Case | Opcode::Default => Ok(Signal::Continue),
            Opcode::EndSwitch => {
                let level = thread.current_level_mut();
                level.current_loop(at)?;
                level.pop_loop();
                Ok(Signal::Continue)
            }
            Opcode::Break => exec_break(thread, at),
            // GOTO stays inert. Taking it could spin forever inside one tick,
            // since nothing bounds a backwards jump.
            Opcode::Goto => Ok(Signal::Continue),

            // Flags and variables
            Opcode::CheckBit => Ok(self.exec_check_bit(instr)),
            Opcode::SetBit => Ok(self.exec_set_bit(instr)),
            Opcode::Compare => Ok(self.exec_compare(instr)),
            Opcode::Save => Ok(self.exec_save(instr)),
            Opcode::Copy => Ok(self.exec_copy(instr)),
            Opcode::Calc => self.exec_calc(instr, at),
            Opcode::Calc2 => self.exec_calc2(instr, at),
            Opcode::WorkSet => {
                thread.work = WorkTarget {
                    kind: instr.u8_at(1).into(),
                    index: instr.u8_at(2),
                };
                Ok(Signal::Continue)
            }

            // World
            Opcode::CutChg
            | Opcode::AotSet
            | Opcode::AotSet4p
            | Opcode::AotReset
            | Opcode::DoorAotSet
            | Opcode::DoorAotSet4p
            | Opcode::ItemAotSet
            | Opcode::ItemAotSet4p
            | Opcode::SceEsprOn
            | Opcode::SceEmSet
            | Opcode::PosSet
            | Opcode::ColChgSet => Ok(self.exec_world(thread, instr)),

            // Everything else has no interpreter-side effect.
            _ => Ok(Signal::Continue),
        }
    }

    // ---- Events and subroutines ----

    fn exec_evt_end(
        &mut self,
        thread: &mut ScriptThread,
        at: usize,
    ) -> Result<Signal, ScriptError> {
        if thread.sub_level == 0 {
            return Ok(Signal::Terminated);
        }
        thread.return_from_subroutine(at)?;
        debug!(slot = self.running, pc = thread.pc, "return");
        Ok(Signal::Continue)
    }

    fn exec_gosub(
        &mut self,
        thread: &mut ScriptThread,
        instr: &Instruction<'_>,
        at: usize,
    ) -> Result<Signal, ScriptError> {
        let event = instr.u8_at(1);
        let entry = self
            .program
            .entry_point(event)
            .ok_or(ScriptError::UnknownEvent { event })?;
        let return_address = thread.pc;
        thread.enter_subroutine(return_address, entry, event, at)?;
        debug!(slot = self.running, event, depth = thread.sub_level, "gosub");
        Ok(Signal::Continue)
    }

    fn exec_evt_exec(&mut self, instr: &Instruction<'_>) -> Result<Signal, ScriptError> {
        let slot = instr.u8_at(1);
        let event = instr.u8_at(3);
        let entry = self
            .program
            .entry_point(event)
            .ok_or(ScriptError::UnknownEvent { event })?;

        if slot != ANY_SLOT && slot as usize == self.running {
            warn!(slot, event, "EVT_EXEC targets the running thread, ignored");
            return Ok(Signal::Continue);
        }
        match activate_slot(self.pool, Some(self.running), slot, entry, event) {
            Some(started) => debug!(by = self.running, slot = started, event, "event started"),
            None => warn!(slot, event, "no thread slot available for EVT_EXEC"),
        }
        Ok(Signal::Continue)
    }

    fn exec_evt_kill(&mut self, instr: &Instruction<'_>) -> Signal {
        let slot = instr.u8_at(1) as usize;
        if slot == self.running {
            return Signal::Terminated;
        }
        match self.pool.get_mut(slot) {
            Some(target) => {
                target.kill();
                debug!(by = self.running, slot, "thread killed");
            }
            None => warn!(slot, "EVT_KILL on invalid slot"),
        }
        Signal::Continue
    }

    // ---- Switch ----

    /// Open the switch's loop slot and jump to the matching case body.
    ///
    /// Scanning walks `CASE` headers by their block lengths. Anything other
    /// than `CASE`, `DEFAULT` or `ESWITCH` in that walk means the block
    /// structure is broken.
    fn exec_switch(
        &mut self,
        thread: &mut ScriptThread,
        instr: &Instruction<'_>,
        at: usize,
    ) -> Result<Signal, ScriptError> {
        let value = self.state.variable(instr.u8_at(1));
        let body = thread.pc;
        let end = body + instr.u16_at(2) as usize;

        let level = thread.current_level_mut();
        let saved_if_counter = level.if_else_counter;
        level.push_loop(
            LoopSlot {
                counter: 0,
                break_target: end,
                saved_if_counter,
                loop_start: body,
            },
            at,
        )?;

        let program = self.program;
        let code = program.code();
        let mut scan = body;
        loop {
            let byte = *code.get(scan).ok_or(ScriptError::Decode {
                at: scan,
                source: DecodeError::OutOfBounds(scan),
            })?;
            let case = match Instruction::decode_at(code, scan) {
                Ok(case) => case,
                Err(DecodeError::UnknownOpcode(_)) => {
                    return Err(ScriptError::MalformedSwitch { at: scan, opcode: byte });
                }
                Err(source) => return Err(ScriptError::Decode { at: scan, source }),
            };

            match case.opcode {
                Opcode::Case => {
                    if case.i16_at(4) == value {
                        thread.pc = scan + case.width();
                        return Ok(Signal::Continue);
                    }
                    scan += case.width() + case.u16_at(2) as usize;
                }
                Opcode::Default => {
                    thread.pc = scan + case.width();
                    return Ok(Signal::Continue);
                }
                Opcode::EndSwitch => {
                    thread.current_level_mut().pop_loop();
                    thread.pc = scan + case.width();
                    return Ok(Signal::Continue);
                }
                _ => return Err(ScriptError::MalformedSwitch { at: scan, opcode: byte }),
            }
        }
    }
}

// ---- Conditionals ----

fn exec_if_start(
    thread: &mut ScriptThread,
    instr: &Instruction<'_>,
    at: usize,
) -> Result<Signal, ScriptError> {
    let skip_target = thread.pc + instr.u16_at(2) as usize;
    thread.current_level_mut().open_block(skip_target, at)?;
    Ok(Signal::Continue)
}

/// Reached only after the if-body ran: close the block and skip the
/// else-body.
fn exec_else_start(
    thread: &mut ScriptThread,
    instr: &Instruction<'_>,
    at: usize,
) -> Result<Signal, ScriptError> {
    thread.current_level_mut().close_block(at)?;
    thread.pc += instr.u16_at(2) as usize;
    Ok(Signal::Continue)
}

// ---- Suspension ----

fn exec_sleep(
    thread: &mut ScriptThread,
    instr: &Instruction<'_>,
    at: usize,
) -> Result<Signal, ScriptError> {
    let resume = thread.pc;
    let level = thread.current_level_mut();
    let saved_if_counter = level.if_else_counter;
    level.push_loop(
        LoopSlot {
            counter: instr.u16_at(2),
            break_target: resume,
            saved_if_counter,
            loop_start: resume,
        },
        at,
    )?;
    Ok(Signal::Continue)
}

/// Stay on this instruction, one tick at a time, until the countdown is spent.
fn exec_sleeping(thread: &mut ScriptThread, at: usize) -> Result<Signal, ScriptError> {
    let level = thread.current_level_mut();
    let slot = level.current_loop(at)?;
    if slot.counter == 0 {
        level.pop_loop();
        return Ok(Signal::Continue);
    }
    slot.counter -= 1;
    thread.pc = at;
    Ok(Signal::Yield)
}

// ---- Loops ----

fn exec_for(
    thread: &mut ScriptThread,
    instr: &Instruction<'_>,
    at: usize,
) -> Result<Signal, ScriptError> {
    let body = thread.pc;
    let end = body + instr.u16_at(2) as usize;
    let count = instr.u16_at(4);

    if count == 0 {
        thread.pc = end;
        return Ok(Signal::Continue);
    }

    let level = thread.current_level_mut();
    let saved_if_counter = level.if_else_counter;
    level.push_loop(
        LoopSlot {
            counter: count,
            break_target: end,
            saved_if_counter,
            loop_start: body,
        },
        at,
    )?;
    Ok(Signal::Continue)
}

fn exec_for_end(thread: &mut ScriptThread, at: usize) -> Result<Signal, ScriptError> {
    let level = thread.current_level_mut();
    let slot = level.current_loop(at)?;
    slot.counter = slot.counter.saturating_sub(1);
    if slot.counter > 0 {
        let start = slot.loop_start;
        thread.pc = start;
    } else {
        level.pop_loop();
    }
    Ok(Signal::Continue)
}

/// Leave the innermost loop or switch, closing any blocks opened inside it.
fn exec_break(thread: &mut ScriptThread, at: usize) -> Result<Signal, ScriptError> {
    let level = thread.current_level_mut();
    let slot = *level.current_loop(at)?;
    level.if_else_counter = slot.saved_if_counter;
    level.resync_jump_top();
    level.pop_loop();
    thread.pc = slot.break_target;
    Ok(Signal::Continue)
}
