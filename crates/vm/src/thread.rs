//! Script thread state: call levels, jump stacks and loop slots.
//!
//! A thread is a set of counters, not an OS thread. Each call level keeps its
//! own conditional nesting (`if_else_counter` plus a jump stack of skip
//! targets) and its own loop slots, so a subroutine can never corrupt the
//! block structure of its caller.

use crate::error::ScriptError;

/// Maximum subroutine depth, counting the event's own level.
pub const MAX_CALL_LEVELS: usize = 4;
/// Open conditional blocks per call level.
pub const JUMP_STACK_DEPTH: usize = 8;
/// Open loops, switches and sleeps per call level.
pub const LOOP_SLOTS: usize = 4;

/// Bookkeeping for one `FOR`, `SWITCH` or `SLEEP`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSlot {
    /// Remaining iterations, or remaining ticks for a sleep.
    pub counter: u16,
    /// Where `BREAK` lands.
    pub break_target: usize,
    /// `if_else_counter` when the loop opened; restored by `BREAK`.
    pub saved_if_counter: i32,
    /// First instruction of the loop body.
    pub loop_start: usize,
}

/// One frame of interpreter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallLevel {
    /// Index of the innermost open conditional block, -1 when none.
    pub if_else_counter: i32,
    /// Index of the innermost open loop slot, -1 when none.
    pub loop_depth: i32,
    /// Where `EVT_END`/`RETURN` resumes the caller.
    pub return_address: usize,
    pub jump_stack: [usize; JUMP_STACK_DEPTH],
    pub jump_top: usize,
    pub loops: [LoopSlot; LOOP_SLOTS],
}

impl Default for CallLevel {
    fn default() -> Self {
        Self {
            if_else_counter: -1,
            loop_depth: -1,
            return_address: 0,
            jump_stack: [0; JUMP_STACK_DEPTH],
            jump_top: 0,
            loops: [LoopSlot::default(); LOOP_SLOTS],
        }
    }
}

impl CallLevel {
    /// Back to "no open block, no open loop".
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of open conditional blocks.
    pub fn open_blocks(&self) -> usize {
        (self.if_else_counter + 1).max(0) as usize
    }

    /// Open a conditional block whose false branch resumes at `skip_target`.
    pub(crate) fn open_block(&mut self, skip_target: usize, at: usize) -> Result<(), ScriptError> {
        if self.jump_top >= JUMP_STACK_DEPTH {
            return Err(ScriptError::JumpStackOverflow { at });
        }
        self.jump_stack[self.jump_top] = skip_target;
        self.jump_top += 1;
        self.if_else_counter += 1;
        Ok(())
    }

    /// Close the innermost conditional block, returning its skip target.
    pub(crate) fn close_block(&mut self, at: usize) -> Result<usize, ScriptError> {
        if self.jump_top == 0 || self.if_else_counter < 0 {
            return Err(ScriptError::JumpStackUnderflow { at });
        }
        self.jump_top -= 1;
        self.if_else_counter -= 1;
        Ok(self.jump_stack[self.jump_top])
    }

    /// Re-derive the jump stack index from `if_else_counter`.
    pub(crate) fn resync_jump_top(&mut self) {
        self.jump_top = self.open_blocks();
    }

    pub(crate) fn push_loop(&mut self, slot: LoopSlot, at: usize) -> Result<(), ScriptError> {
        let next = (self.loop_depth + 1) as usize;
        if next >= LOOP_SLOTS {
            return Err(ScriptError::LoopOverflow { at });
        }
        self.loops[next] = slot;
        self.loop_depth += 1;
        Ok(())
    }

    pub(crate) fn current_loop(&mut self, at: usize) -> Result<&mut LoopSlot, ScriptError> {
        if self.loop_depth < 0 {
            return Err(ScriptError::NoEnclosingLoop { at });
        }
        Ok(&mut self.loops[self.loop_depth as usize])
    }

    pub(crate) fn pop_loop(&mut self) {
        if self.loop_depth >= 0 {
            self.loop_depth -= 1;
        }
    }

    /// Drop loops that were opened inside blocks which have since closed.
    pub(crate) fn drop_exited_loops(&mut self) {
        while self.loop_depth >= 0
            && self.loops[self.loop_depth as usize].saved_if_counter > self.if_else_counter
        {
            self.loop_depth -= 1;
        }
    }
}

/// Kind of object a `WORK_SET` selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkKind {
    #[default]
    None,
    Player,
    Partner,
    Enemy,
    Object,
    Door,
    Other(u8),
}

impl From<u8> for WorkKind {
    fn from(value: u8) -> Self {
        match value {
            0 => WorkKind::None,
            1 => WorkKind::Player,
            2 => WorkKind::Partner,
            3 => WorkKind::Enemy,
            4 => WorkKind::Object,
            5 => WorkKind::Door,
            other => WorkKind::Other(other),
        }
    }
}

/// The object subsequent opcodes act upon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkTarget {
    pub kind: WorkKind,
    pub index: u8,
}

/// Lifecycle of a thread slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStatus {
    Dead,
    /// Alive and not parked; will dispatch on the next tick.
    Running,
    /// Alive, parked mid-program until the next tick.
    Suspended,
}

/// One independently resumable execution context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptThread {
    pub(crate) alive: bool,
    pub(crate) suspended: bool,
    pub(crate) pc: usize,
    pub(crate) sub_level: usize,
    pub(crate) work: WorkTarget,
    pub(crate) levels: [CallLevel; MAX_CALL_LEVELS],
    pub(crate) call_trace: Vec<u8>,
}

impl ScriptThread {
    /// A dead thread.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ThreadStatus {
        match (self.alive, self.suspended) {
            (false, _) => ThreadStatus::Dead,
            (true, false) => ThreadStatus::Running,
            (true, true) => ThreadStatus::Suspended,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Current call depth, 0 for the event's own level.
    pub fn sub_level(&self) -> usize {
        self.sub_level
    }

    pub fn work_target(&self) -> WorkTarget {
        self.work
    }

    pub fn level(&self, index: usize) -> Option<&CallLevel> {
        self.levels.get(index)
    }

    pub fn current_level(&self) -> &CallLevel {
        &self.levels[self.sub_level]
    }

    pub(crate) fn current_level_mut(&mut self) -> &mut CallLevel {
        &mut self.levels[self.sub_level]
    }

    /// Events on the call chain, outermost first.
    pub fn call_trace(&self) -> &[u8] {
        &self.call_trace
    }

    /// Start executing `event` from `entry` with a clean frame stack.
    pub(crate) fn activate(&mut self, entry: usize, event: u8) {
        *self = Self {
            alive: true,
            pc: entry,
            call_trace: vec![event],
            ..Self::default()
        };
    }

    pub(crate) fn kill(&mut self) {
        *self = Self::default();
    }

    /// Push a call level and jump to `entry`.
    pub(crate) fn enter_subroutine(
        &mut self,
        return_address: usize,
        entry: usize,
        event: u8,
        at: usize,
    ) -> Result<(), ScriptError> {
        if self.sub_level + 1 >= MAX_CALL_LEVELS {
            return Err(ScriptError::CallStackOverflow { at });
        }
        self.sub_level += 1;
        let level = &mut self.levels[self.sub_level];
        level.reset();
        level.return_address = return_address;
        self.pc = entry;
        self.call_trace.push(event);
        Ok(())
    }

    /// Pop a call level and resume the caller.
    ///
    /// Whatever the callee left open is discarded with its level. The
    /// caller's jump stack index is re-derived from its own
    /// `if_else_counter`, so the callee's nesting depth never leaks into it.
    pub(crate) fn return_from_subroutine(&mut self, at: usize) -> Result<(), ScriptError> {
        if self.sub_level == 0 {
            return Err(ScriptError::CallStackUnderflow { at });
        }
        let exited = &mut self.levels[self.sub_level];
        let return_address = exited.return_address;
        exited.reset();
        self.sub_level -= 1;
        self.current_level_mut().resync_jump_top();
        self.pc = return_address;
        self.call_trace.pop();
        Ok(())
    }
}
