//! Borrowed views over single encoded instructions.
//!
//! An instruction is `[opcode, ...params]` with a width fixed by the opcode
//! table. Multi-byte parameters are little-endian:
//! ```text
//! Byte 0:    opcode (u8)
//! Bytes 1..: parameters, layout depends on opcode
//! ```

use crate::error::DecodeError;
use crate::opcode::Opcode;

/// A single instruction, borrowed from the program's code bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// The operation to perform.
    pub opcode: Opcode,
    bytes: &'a [u8],
}

impl<'a> Instruction<'a> {
    /// Decode the instruction that starts at `pc` in `code`.
    pub fn decode_at(code: &'a [u8], pc: usize) -> Result<Self, DecodeError> {
        let byte = *code.get(pc).ok_or(DecodeError::OutOfBounds(pc))?;
        let opcode = Opcode::try_from(byte)?;
        let width = opcode.width();
        let bytes = code.get(pc..pc + width).ok_or(DecodeError::Truncated {
            opcode: byte,
            width,
            available: code.len() - pc,
        })?;
        Ok(Self { opcode, bytes })
    }

    /// The full encoded instruction, opcode byte included.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Encoded width in bytes.
    pub fn width(&self) -> usize {
        self.bytes.len()
    }

    /// Read the byte at `offset`.
    ///
    /// Offsets are fixed by the opcode's layout; reading past the width is a
    /// bug in the caller and panics.
    pub fn u8_at(&self, offset: usize) -> u8 {
        self.bytes[offset]
    }

    /// Read a little-endian u16 at `offset`.
    pub fn u16_at(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    /// Read a little-endian i16 at `offset`.
    pub fn i16_at(&self, offset: usize) -> i16 {
        self.u16_at(offset) as i16
    }
}
