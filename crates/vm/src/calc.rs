//! Flag, variable and calculator opcodes.

use scd_common::{BitOp, CalcOp, CompareOp, Instruction};
use tracing::warn;

use crate::error::ScriptError;
use crate::execute::{Dispatcher, Signal};
use crate::world::World;

/// Apply `op` as `lhs <op> rhs` with 16-bit wrapping semantics.
pub fn apply_calc(op: CalcOp, lhs: i16, rhs: i16, at: usize) -> Result<i16, ScriptError> {
    if op.divides() && rhs == 0 {
        return Err(ScriptError::DivisionByZero { at });
    }
    Ok(match op {
        CalcOp::Add => lhs.wrapping_add(rhs),
        CalcOp::Sub => lhs.wrapping_sub(rhs),
        CalcOp::Mul => lhs.wrapping_mul(rhs),
        CalcOp::Div => lhs.wrapping_div(rhs),
        CalcOp::Mod => lhs.wrapping_rem(rhs),
        CalcOp::Or => lhs | rhs,
        CalcOp::And => lhs & rhs,
        CalcOp::Xor => lhs ^ rhs,
        CalcOp::Not => !lhs,
        CalcOp::Shl => lhs.wrapping_shl(rhs as u32),
        CalcOp::Shr => (lhs as u16).wrapping_shr(rhs as u32) as i16,
        CalcOp::Sar => lhs.wrapping_shr(rhs as u32),
    })
}

impl<W: World + ?Sized> Dispatcher<'_, W> {
    pub(crate) fn exec_check_bit(&mut self, instr: &Instruction<'_>) -> Signal {
        let value = self.state.bit(instr.u8_at(1), instr.u8_at(2));
        if value == instr.u8_at(3) {
            Signal::Continue
        } else {
            Signal::ConditionFalse
        }
    }

    pub(crate) fn exec_set_bit(&mut self, instr: &Instruction<'_>) -> Signal {
        let (array, bit) = (instr.u8_at(1), instr.u8_at(2));
        match BitOp::try_from(instr.u8_at(3)) {
            Ok(BitOp::Clear) => self.state.set_bit(array, bit, 0),
            Ok(BitOp::Set) => self.state.set_bit(array, bit, 1),
            Ok(BitOp::Flip) => {
                self.state.flip_bit(array, bit);
            }
            Err(op) => warn!(array, bit, op, "unknown SET operation, ignored"),
        }
        Signal::Continue
    }

    pub(crate) fn exec_compare(&mut self, instr: &Instruction<'_>) -> Signal {
        let var = instr.u8_at(2);
        let rhs = instr.i16_at(4);
        let op = match CompareOp::try_from(instr.u8_at(3)) {
            Ok(op) => op,
            Err(op) => {
                warn!(var, op, "unknown CMP operator, treated as false");
                return Signal::ConditionFalse;
            }
        };
        if op.test(self.state.variable(var), rhs) {
            Signal::Continue
        } else {
            Signal::ConditionFalse
        }
    }

    pub(crate) fn exec_save(&mut self, instr: &Instruction<'_>) -> Signal {
        self.state.set_variable(instr.u8_at(1), instr.i16_at(2));
        Signal::Continue
    }

    pub(crate) fn exec_copy(&mut self, instr: &Instruction<'_>) -> Signal {
        let value = self.state.variable(instr.u8_at(2));
        self.state.set_variable(instr.u8_at(1), value);
        Signal::Continue
    }

    pub(crate) fn exec_calc(
        &mut self,
        instr: &Instruction<'_>,
        at: usize,
    ) -> Result<Signal, ScriptError> {
        let var = instr.u8_at(3);
        let rhs = instr.i16_at(4);
        self.calc_into(instr.u8_at(2), var, rhs, at)
    }

    pub(crate) fn exec_calc2(
        &mut self,
        instr: &Instruction<'_>,
        at: usize,
    ) -> Result<Signal, ScriptError> {
        let var = instr.u8_at(2);
        let rhs = self.state.variable(instr.u8_at(3));
        self.calc_into(instr.u8_at(1), var, rhs, at)
    }

    fn calc_into(&mut self, op: u8, var: u8, rhs: i16, at: usize) -> Result<Signal, ScriptError> {
        let op = match CalcOp::try_from(op) {
            Ok(op) => op,
            Err(op) => {
                warn!(var, op, "unknown CALC operator, ignored");
                return Ok(Signal::Continue);
            }
        };
        let lhs = self.state.variable(var);
        self.state.set_variable(var, apply_calc(op, lhs, rhs, at)?);
        Ok(Signal::Continue)
    }
}
