//! Sophia8 Virtual Machine
//!
//! Byte-accurate interpreter for Sophia8 memory images: the register
//! file, descending stack, carry flag, memory-mapped keyboard/TTY,
//! the full instruction set, source-level breakpoints and resumable
//! state snapshots.
//!
//! ## Example
//!
//! ```rust
//! use sophia8_runtime::{RunOutcome, ScriptedIo, Vm};
//!
//! // SET #0x21, R0; STORE R0, 0xFF03; HALT
//! let program = [0x04, 0x21, 0xF2, 0x02, 0xF2, 0xFF, 0x03, 0x00];
//!
//! let mut vm = Vm::new(ScriptedIo::default());
//! vm.memory.ram_mut()[..program.len()].copy_from_slice(&program);
//! assert_eq!(vm.run().unwrap(), RunOutcome::Halted);
//! assert_eq!(vm.io.output(), b"!");
//! ```

pub mod breakpoint;
pub mod error;
pub mod execute;
pub mod io;
pub mod memory;
pub mod snapshot;
pub mod state;
pub mod vm;

pub use breakpoint::{load_map, resolve, Breakpoint};
pub use error::{Result, RuntimeError};
pub use io::{Console, Io, ScriptedIo};
pub use memory::Memory;
pub use state::MachineState;
pub use vm::{dump_memory, self_test_code, RunOutcome, Vm, VmConfig};
