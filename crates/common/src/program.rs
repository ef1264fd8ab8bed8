//! Program representation for SCD event scripts.
//!
//! A program is one contiguous block of instruction bytes plus a table of
//! entry points, one per event. Program counters are byte offsets into the
//! block, so every event shares a single address space and subroutine calls
//! are plain jumps to another entry point.

use crate::error::DecodeError;
use crate::instruction::Instruction;

/// A room's compiled event program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    code: Vec<u8>,
    entry_points: Vec<usize>,
}

impl Program {
    /// Create a program from raw code bytes and per-event entry points.
    pub fn new(code: Vec<u8>, entry_points: Vec<usize>) -> Self {
        Self { code, entry_points }
    }

    /// Concatenate per-event byte streams into one program.
    ///
    /// Event `i` starts where function `i` was placed.
    pub fn from_functions<I>(functions: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut code = Vec::new();
        let mut entry_points = Vec::new();
        for function in functions {
            entry_points.push(code.len());
            code.extend_from_slice(&function);
        }
        Self { code, entry_points }
    }

    /// Decode an SCD script block.
    ///
    /// The block opens with a table of little-endian u16 offsets, one per
    /// function. The first offset doubles as the table size, so the function
    /// count is `offsets[0] / 2`. Offsets are relative to the start of the
    /// block, which is kept whole as the code.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < 2 {
            return Err(DecodeError::InvalidLength(bytes.len()));
        }

        let table_len = u16::from_le_bytes([bytes[0], bytes[1]]) as usize;
        if table_len == 0 || table_len % 2 != 0 || table_len > bytes.len() {
            return Err(DecodeError::InvalidOffset {
                index: 0,
                offset: table_len,
                len: bytes.len(),
            });
        }

        let mut entry_points = Vec::with_capacity(table_len / 2);
        for (index, pair) in bytes[..table_len].chunks_exact(2).enumerate() {
            let offset = u16::from_le_bytes([pair[0], pair[1]]) as usize;
            if offset < table_len || offset > bytes.len() {
                return Err(DecodeError::InvalidOffset {
                    index,
                    offset,
                    len: bytes.len(),
                });
            }
            entry_points.push(offset);
        }

        Ok(Self {
            code: bytes.to_vec(),
            entry_points,
        })
    }

    /// The raw code bytes.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Entry point of an event, if it exists.
    pub fn entry_point(&self, event: u8) -> Option<usize> {
        self.entry_points.get(event as usize).copied()
    }

    /// Number of events in the program.
    pub fn event_count(&self) -> usize {
        self.entry_points.len()
    }

    /// Decode the instruction at a program counter.
    pub fn instruction_at(&self, pc: usize) -> Result<Instruction<'_>, DecodeError> {
        Instruction::decode_at(&self.code, pc)
    }

    /// Size of the code in bytes.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true if the program has no code.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
