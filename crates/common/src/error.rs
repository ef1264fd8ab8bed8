//! Decode errors for SCD instruction streams.

use thiserror::Error;

/// Errors that occur while decoding script bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The byte is not present in the opcode table.
    #[error("unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    /// The instruction's table width runs past the end of the code.
    #[error("truncated instruction {opcode:#04x}: needs {width} bytes, {available} available")]
    Truncated {
        opcode: u8,
        width: usize,
        available: usize,
    },

    /// Program counter points outside the code.
    #[error("program counter {0} is past the end of the code")]
    OutOfBounds(usize),

    /// Script block is too short to hold its own offset table.
    #[error("invalid script block length: {0}")]
    InvalidLength(usize),

    /// An entry in the function offset table is misaligned or out of range.
    #[error("invalid offset {offset} for function {index} (block is {len} bytes)")]
    InvalidOffset {
        index: usize,
        offset: usize,
        len: usize,
    },
}
