//! In-code assembler for event scripts.
//!
//! [`FunctionBuilder`] emits one event's instruction bytes and back-patches
//! block lengths so callers never count bytes by hand. The lengths follow
//! the conventions the interpreter relies on:
//!
//! - an `IFEL_CK` block spans its body up to and including the `ELSE_CK` or
//!   `ENDIF` that terminates it;
//! - an `ELSE_CK` block spans the else-body, which has no trailing `ENDIF`;
//! - a `FOR` block spans its body and the closing `NEXT`;
//! - a `SWITCH` block spans every case and the closing `ESWITCH`;
//! - a `CASE` block spans that case's body only.

use crate::opcode::Opcode;
use crate::operator::{BitOp, CalcOp, CompareOp};

/// An emitted block opener whose length is patched when the block closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a block must be closed to patch its length"]
pub struct Block {
    opcode: Opcode,
    at: usize,
}

/// Byte emitter for a single event.
#[derive(Debug, Clone, Default)]
pub struct FunctionBuilder {
    code: Vec<u8>,
}

impl FunctionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one instruction. `params` is zero-padded to the table width.
    ///
    /// # Panics
    ///
    /// Panics if `params` does not fit the opcode's width.
    pub fn emit(&mut self, opcode: Opcode, params: &[u8]) -> &mut Self {
        let width = opcode.width();
        assert!(
            params.len() < width,
            "{} takes {} parameter bytes, got {}",
            opcode.mnemonic(),
            width - 1,
            params.len()
        );
        self.code.push(opcode as u8);
        self.code.extend_from_slice(params);
        self.code.resize(self.code.len() + width - 1 - params.len(), 0);
        self
    }

    /// Append bytes verbatim, bypassing the opcode table.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.code.extend_from_slice(bytes);
        self
    }

    /// Current size in bytes.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// The bytes emitted so far.
    pub fn build(&self) -> Vec<u8> {
        self.code.clone()
    }

    fn open(&mut self, opcode: Opcode, params: &[u8]) -> Block {
        let at = self.code.len();
        self.emit(opcode, params);
        Block { opcode, at }
    }

    /// # Panics
    ///
    /// Panics if the block body does not fit a 16-bit length.
    fn patch(&mut self, block: Block) {
        let len = self.code.len() - (block.at + block.opcode.width());
        let Ok(len) = u16::try_from(len) else {
            panic!(
                "{} block at {} spans {len} bytes, more than a u16 length",
                block.opcode.mnemonic(),
                block.at
            );
        };
        self.code[block.at + 2..block.at + 4].copy_from_slice(&len.to_le_bytes());
    }

    // ---- Events and threads ----

    pub fn nop(&mut self) -> &mut Self {
        self.emit(Opcode::Nop, &[])
    }

    pub fn evt_end(&mut self) -> &mut Self {
        self.emit(Opcode::EvtEnd, &[])
    }

    /// Start `event` on thread `slot` (0xFF for the first dead slot).
    pub fn evt_exec(&mut self, slot: u8, event: u8) -> &mut Self {
        self.emit(Opcode::EvtExec, &[slot, Opcode::Gosub as u8, event])
    }

    pub fn evt_kill(&mut self, slot: u8) -> &mut Self {
        self.emit(Opcode::EvtKill, &[slot])
    }

    pub fn gosub(&mut self, event: u8) -> &mut Self {
        self.emit(Opcode::Gosub, &[event])
    }

    pub fn ret(&mut self) -> &mut Self {
        self.emit(Opcode::Return, &[])
    }

    /// `SLEEP` followed by its `SLEEPING` partner.
    pub fn sleep(&mut self, ticks: u16) -> &mut Self {
        let [lo, hi] = ticks.to_le_bytes();
        self.emit(Opcode::Sleep, &[Opcode::Sleeping as u8, lo, hi]);
        self.emit(Opcode::Sleeping, &[lo, hi])
    }

    // ---- Blocks ----

    pub fn if_start(&mut self) -> Block {
        self.open(Opcode::IfStart, &[])
    }

    /// Terminate the if-body of `block` and open its else-body.
    pub fn else_start(&mut self, block: Block) -> Block {
        debug_assert_eq!(block.opcode, Opcode::IfStart);
        let else_block = self.open(Opcode::ElseStart, &[]);
        self.patch(block);
        else_block
    }

    /// Close an if-body with `ENDIF`, or close an else-body.
    pub fn end_if(&mut self, block: Block) -> &mut Self {
        if block.opcode == Opcode::IfStart {
            self.emit(Opcode::EndIf, &[]);
        }
        self.patch(block);
        self
    }

    pub fn for_start(&mut self, count: u16) -> Block {
        let [lo, hi] = count.to_le_bytes();
        self.open(Opcode::For, &[0, 0, 0, lo, hi])
    }

    pub fn for_end(&mut self, block: Block) -> &mut Self {
        self.emit(Opcode::ForEnd, &[]);
        self.patch(block);
        self
    }

    pub fn switch(&mut self, var: u8) -> Block {
        self.open(Opcode::Switch, &[var])
    }

    pub fn case(&mut self, value: i16) -> Block {
        let [lo, hi] = value.to_le_bytes();
        self.open(Opcode::Case, &[0, 0, 0, lo, hi])
    }

    pub fn end_case(&mut self, block: Block) -> &mut Self {
        self.patch(block);
        self
    }

    pub fn default_case(&mut self) -> &mut Self {
        self.emit(Opcode::Default, &[])
    }

    pub fn end_switch(&mut self, block: Block) -> &mut Self {
        self.emit(Opcode::EndSwitch, &[]);
        self.patch(block);
        self
    }

    pub fn break_loop(&mut self) -> &mut Self {
        self.emit(Opcode::Break, &[])
    }

    pub fn goto(&mut self) -> &mut Self {
        self.emit(Opcode::Goto, &[])
    }

    // ---- Flags and variables ----

    pub fn check_bit(&mut self, array: u8, bit: u8, expected: u8) -> &mut Self {
        self.emit(Opcode::CheckBit, &[array, bit, expected])
    }

    pub fn set_bit(&mut self, array: u8, bit: u8, op: BitOp) -> &mut Self {
        self.emit(Opcode::SetBit, &[array, bit, op as u8])
    }

    pub fn compare(&mut self, var: u8, op: CompareOp, value: i16) -> &mut Self {
        let [lo, hi] = value.to_le_bytes();
        self.emit(Opcode::Compare, &[0, var, op as u8, lo, hi])
    }

    pub fn save(&mut self, var: u8, value: i16) -> &mut Self {
        let [lo, hi] = value.to_le_bytes();
        self.emit(Opcode::Save, &[var, lo, hi])
    }

    pub fn copy(&mut self, dest: u8, src: u8) -> &mut Self {
        self.emit(Opcode::Copy, &[dest, src])
    }

    pub fn calc(&mut self, op: CalcOp, var: u8, value: i16) -> &mut Self {
        let [lo, hi] = value.to_le_bytes();
        self.emit(Opcode::Calc, &[0, op as u8, var, lo, hi])
    }

    pub fn calc2(&mut self, op: CalcOp, var: u8, src: u8) -> &mut Self {
        self.emit(Opcode::Calc2, &[op as u8, var, src])
    }

    // ---- World ----

    pub fn work_set(&mut self, kind: u8, index: u8) -> &mut Self {
        self.emit(Opcode::WorkSet, &[kind, index])
    }

    pub fn pos_set(&mut self, x: i16, y: i16, z: i16) -> &mut Self {
        let mut params = vec![0];
        for v in [x, y, z] {
            params.extend_from_slice(&v.to_le_bytes());
        }
        self.emit(Opcode::PosSet, &params)
    }

    pub fn cut_chg(&mut self, camera: u8) -> &mut Self {
        self.emit(Opcode::CutChg, &[camera])
    }
}
