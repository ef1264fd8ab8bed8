//! Fatal interpreter errors.
//!
//! Every variant means the running program is malformed or unsupported and
//! cannot be continued safely. Tolerated anomalies (unknown opcodes in linear
//! dispatch, unknown operator codes, a full thread pool) are logged instead
//! and never reach this type. Variants tied to one instruction carry its
//! program counter (`at`).

use scd_common::DecodeError;
use thiserror::Error;

/// Errors that abort script execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The instruction stream could not be decoded.
    #[error("decode error at {at}: {source}")]
    Decode {
        at: usize,
        #[source]
        source: DecodeError,
    },

    /// `SWITCH` met something other than `CASE`, `DEFAULT` or `ESWITCH`
    /// while scanning for a match.
    #[error("unexpected opcode {opcode:#04x} in switch scan at {at}")]
    MalformedSwitch { at: usize, opcode: u8 },

    /// `EVT_EXEC`, `GOSUB` or the host named an event the program does not
    /// have.
    #[error("unknown event {event}")]
    UnknownEvent { event: u8 },

    /// `GOSUB` nested deeper than the call level limit.
    #[error("call stack overflow at {at}")]
    CallStackOverflow { at: usize },

    /// Subroutine return executed at call level 0.
    #[error("return with empty call stack at {at}")]
    CallStackUnderflow { at: usize },

    /// Too many open conditional blocks in one call level.
    #[error("jump stack overflow at {at}")]
    JumpStackOverflow { at: usize },

    /// A block closed, or a condition failed, with no open block to unwind.
    #[error("jump stack underflow at {at}")]
    JumpStackUnderflow { at: usize },

    /// Too many nested loops, switches or sleeps in one call level.
    #[error("loop nesting overflow at {at}")]
    LoopOverflow { at: usize },

    /// `NEXT`, `BREAK` or `SLEEPING` with no open loop.
    #[error("no enclosing loop at {at}")]
    NoEnclosingLoop { at: usize },

    /// `CALC`/`CALC2` division or modulo by zero.
    #[error("division by zero at {at}")]
    DivisionByZero { at: usize },

    /// A thread slot outside the pool was addressed by the host.
    #[error("thread slot {slot} out of range")]
    InvalidThread { slot: usize },
}
