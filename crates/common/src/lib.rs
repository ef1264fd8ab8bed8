//! SCD event-script common types and instruction encoding.
//!
//! This crate provides the format-level data structures shared by the
//! interpreter and by anything that produces scripts:
//!
//! - [`Opcode`] — every opcode byte with its encoded width (the opcode table)
//! - [`Instruction`] — a width-checked view over one encoded instruction
//! - [`Program`] — code bytes plus the per-event entry-point table
//! - [`layout`] — typed parameter records for world-facing opcodes
//! - [`operator`] — bit, compare and arithmetic operator codes
//! - [`FunctionBuilder`] — an in-code assembler with block-length patching
//! - [`DecodeError`] — errors from decoding byte streams

pub mod builder;
pub mod error;
pub mod instruction;
pub mod layout;
pub mod opcode;
pub mod operator;
pub mod program;

// Re-export commonly used types at the crate root.
pub use builder::{Block, FunctionBuilder};
pub use error::DecodeError;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use operator::{BitOp, CalcOp, CompareOp};
pub use program::Program;

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy that generates a random valid Opcode.
    fn arb_opcode() -> impl Strategy<Value = Opcode> {
        prop::sample::select(opcode::ALL_OPCODES)
    }

    proptest! {
        /// Any opcode emitted with zeroed parameters decodes back to itself
        /// and consumes exactly its table width.
        #[test]
        fn emitted_opcode_decodes_with_table_width(op in arb_opcode()) {
            let mut f = FunctionBuilder::new();
            f.emit(op, &[]);
            let code = f.build();
            let instr = Instruction::decode_at(&code, 0).unwrap();
            prop_assert_eq!(instr.opcode, op);
            prop_assert_eq!(instr.width(), op.width());
            prop_assert_eq!(code.len(), op.width());
        }

        /// For any byte, the width lookup either succeeds with the variant's
        /// width or reports that exact byte as unknown.
        #[test]
        fn width_lookup_is_total(byte in any::<u8>()) {
            match opcode::width_of(byte) {
                Ok(width) => prop_assert_eq!(width, Opcode::try_from(byte).unwrap().width()),
                Err(e) => prop_assert_eq!(e, DecodeError::UnknownOpcode(byte)),
            }
        }

        /// Walking a sequence of emitted instructions by table width lands on
        /// every instruction boundary.
        #[test]
        fn stepping_by_width_visits_each_instruction(
            ops in prop::collection::vec(arb_opcode(), 0..40)
        ) {
            let mut f = FunctionBuilder::new();
            for &op in &ops {
                f.emit(op, &[]);
            }
            let program = Program::from_functions(vec![f.build()]);
            let mut pc = 0;
            for &op in &ops {
                let instr = program.instruction_at(pc).unwrap();
                prop_assert_eq!(instr.opcode, op);
                pc += instr.width();
            }
            prop_assert_eq!(pc, program.len());
        }
    }
}
