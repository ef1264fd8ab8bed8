//! Global script state: flag bit arrays and script variables.
//!
//! Both stores are shared by every thread for the interpreter's lifetime.
//! Entries spring into existence on first read with value 0 and are only
//! ever dropped by [`ScriptState::clear`].

use std::collections::HashMap;

/// Flag bits addressed by `(array, bit)` and 16-bit variables addressed by id.
#[derive(Debug, Clone, Default)]
pub struct ScriptState {
    bits: HashMap<u8, HashMap<u8, u8>>,
    variables: HashMap<u8, i16>,
}

impl ScriptState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a flag bit, creating it as 0 if it was never touched.
    pub fn bit(&mut self, array: u8, bit: u8) -> u8 {
        *self.bits.entry(array).or_default().entry(bit).or_insert(0)
    }

    /// Store a flag bit. Any nonzero value is stored as 1.
    pub fn set_bit(&mut self, array: u8, bit: u8, value: u8) {
        self.bits
            .entry(array)
            .or_default()
            .insert(bit, u8::from(value != 0));
    }

    /// Invert a flag bit, returning the new value.
    pub fn flip_bit(&mut self, array: u8, bit: u8) -> u8 {
        let slot = self.bits.entry(array).or_default().entry(bit).or_insert(0);
        *slot ^= 1;
        *slot
    }

    /// Read a variable, creating it as 0 if it was never touched.
    pub fn variable(&mut self, id: u8) -> i16 {
        *self.variables.entry(id).or_insert(0)
    }

    pub fn set_variable(&mut self, id: u8, value: i16) {
        self.variables.insert(id, value);
    }

    /// Drop every flag and variable. Used on a full state reset.
    pub fn clear(&mut self) {
        self.bits.clear();
        self.variables.clear();
    }

    /// Number of flag bits that have been read or written.
    pub fn touched_bits(&self) -> usize {
        self.bits.values().map(HashMap::len).sum()
    }

    /// Number of variables that have been read or written.
    pub fn touched_variables(&self) -> usize {
        self.variables.len()
    }
}
