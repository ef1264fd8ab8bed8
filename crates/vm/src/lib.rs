//! SCD event-script interpreter.
//!
//! A room's event program runs on a pool of cooperative script threads:
//! - [`Interpreter`] owns the threads and the global flag/variable state
//! - each tick runs every live thread until it sleeps, unwinds or ends
//! - world-facing opcodes are forwarded to a host-provided [`World`]
//! - [`Scheduler`] turns a variable frame clock into fixed 1/30 s ticks
//!
//! # Usage
//!
//! ```
//! use scd_common::{BitOp, FunctionBuilder, Program};
//! use scd_vm::{Interpreter, World};
//!
//! #[derive(Default)]
//! struct Camera(Option<u8>);
//!
//! impl World for Camera {
//!     fn change_camera(&mut self, camera: u8) {
//!         self.0 = Some(camera);
//!     }
//! }
//!
//! let mut event = FunctionBuilder::new();
//! event.set_bit(0, 5, BitOp::Set);
//! let block = event.if_start();
//! event.check_bit(0, 5, 1).cut_chg(3);
//! event.end_if(block).evt_end();
//! let program = Program::from_functions([event.build()]);
//!
//! let mut interpreter = Interpreter::new();
//! let mut world = Camera::default();
//! interpreter.start_event(&program, 0).unwrap();
//! interpreter.tick(&program, &mut world).unwrap();
//!
//! assert_eq!(world.0, Some(3));
//! assert_eq!(interpreter.live_threads(), 0);
//! ```

pub mod calc;
pub mod error;
pub(crate) mod execute;
pub mod machine;
pub mod scheduler;
pub mod state;
pub mod thread;
pub mod world;

pub use calc::apply_calc;
pub use error::ScriptError;
pub use execute::ANY_SLOT;
pub use machine::{Interpreter, StepOutcome, MAX_THREADS};
pub use scheduler::{Scheduler, TICK_INTERVAL};
pub use state::ScriptState;
pub use thread::{
    CallLevel, LoopSlot, ScriptThread, ThreadStatus, WorkKind, WorkTarget, JUMP_STACK_DEPTH,
    LOOP_SLOTS, MAX_CALL_LEVELS,
};
pub use world::World;
