//! The Sophia8 virtual machine driver.
//!
//! Owns the machine state, the memory bus and the I/O backend, and runs
//! the fetch-decode-execute loop until the stop trigger is set. An
//! armed breakpoint halts the machine just before the instruction at
//! its address executes, dumps the registers and saves a resumable
//! snapshot.

use crate::breakpoint::Breakpoint;
use crate::error::Result;
use crate::execute::step;
use crate::io::Io;
use crate::memory::Memory;
use crate::snapshot;
use crate::state::MachineState;
use sophia8_spec::{Opcode, Reg, MEM_SIZE};
use std::path::PathBuf;

/// VM configuration.
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Log each executed cycle to stderr.
    pub trace: bool,

    /// Stop after this many cycles. `None` runs until HALT, matching
    /// the hardware semantics; tests set a limit.
    pub max_cycles: Option<u64>,

    /// Where a breakpoint hit saves its snapshot.
    pub snapshot_path: PathBuf,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            trace: false,
            max_cycles: None,
            snapshot_path: PathBuf::from(snapshot::DEBUG_IMAGE),
        }
    }
}

/// Why the run loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// STOP was triggered by HALT, an unknown opcode or a fault.
    Halted,
    /// The armed breakpoint was hit; a snapshot was saved.
    Breakpoint(u16),
    /// The configured cycle limit was reached.
    CycleLimit,
}

/// The virtual machine.
pub struct Vm<I: Io> {
    pub state: MachineState,
    pub memory: Memory,
    pub io: I,
    config: VmConfig,
    breakpoint: Option<Breakpoint>,
}

impl<I: Io> Vm<I> {
    /// A fresh machine: registers at startup values, memory HALT-filled.
    pub fn new(io: I) -> Self {
        Self::with_config(io, VmConfig::default())
    }

    pub fn with_config(io: I, config: VmConfig) -> Self {
        Vm {
            state: MachineState::new(),
            memory: Memory::new(),
            io,
            config,
            breakpoint: None,
        }
    }

    /// Load a raw memory image.
    pub fn load_image(&mut self, image: &[u8]) -> Result<()> {
        self.memory.load_image(image)
    }

    /// Adopt state and memory restored from a snapshot.
    pub fn resume_from(&mut self, state: MachineState, memory: Memory) {
        self.state = state;
        self.memory = memory;
    }

    /// Arm a breakpoint. Only one may be armed at a time.
    pub fn set_breakpoint(&mut self, breakpoint: Breakpoint) {
        self.breakpoint = Some(breakpoint);
    }

    /// Run until STOP, breakpoint hit or cycle limit.
    pub fn run(&mut self) -> Result<RunOutcome> {
        let mut cycles: u64 = 0;

        while !self.state.stop {
            if let Some(bp) = &self.breakpoint {
                if self.state.ip == bp.addr {
                    println!("BREAK at 0x{:04X} ({}:{})", bp.addr, bp.file, bp.line_no);
                    println!("{}", self.state.dump());
                    snapshot::save(&self.config.snapshot_path, &self.state, &self.memory)?;
                    self.state.stop = true;
                    return Ok(RunOutcome::Breakpoint(bp.addr));
                }
            }

            if let Some(limit) = self.config.max_cycles {
                if cycles >= limit {
                    return Ok(RunOutcome::CycleLimit);
                }
            }

            if self.config.trace {
                let byte = self
                    .memory
                    .ram()
                    .get(self.state.ip as usize)
                    .copied()
                    .unwrap_or(0);
                match Opcode::from_u8(byte) {
                    Some(op) => eprintln!(
                        "[{:6}] IP={:#06x} {}",
                        cycles, self.state.ip, op
                    ),
                    None => eprintln!(
                        "[{:6}] IP={:#06x} ?{:#04x}",
                        cycles, self.state.ip, byte
                    ),
                }
            }

            step(&mut self.state, &mut self.memory, &mut self.io);
            cycles += 1;
        }

        Ok(RunOutcome::Halted)
    }
}

/// The built-in self-test: the instruction-exercise program the VM runs
/// when started without an image. Loaded at address 0 and entered
/// directly; the final jump lands in HALT-filled memory.
pub fn self_test_code() -> Vec<u8> {
    const R0: u8 = Reg::GPR_TOKEN_BASE;
    const R1: u8 = R0 + 1;
    const R2: u8 = R0 + 2;
    const R3: u8 = R0 + 3;
    const R4: u8 = R0 + 4;
    const R5: u8 = R0 + 5;
    const R6: u8 = R0 + 6;
    const R7: u8 = R0 + 7;

    vec![
        0x04, 0x0A, R0, //        SET #0x0A, R0
        0x02, R0, 0xFF, 0xC0, //  STORE R0, 0xFFC0
        0x01, 0xFF, 0xC0, R1, //  LOAD 0xFFC0, R1
        0x04, 0x01, R0, //        register ripple
        0x04, 0x02, R1, //
        0x04, 0x03, R2, //
        0x04, 0x04, R3, //
        0x04, 0x05, R4, //
        0x04, 0x06, R5, //
        0x04, 0x07, R6, //
        0x04, 0x08, R7, //
        0x10, R0, //              PUSH R0..R7
        0x10, R1, //
        0x10, R2, //
        0x10, R3, //
        0x10, R4, //
        0x10, R5, //
        0x10, R6, //
        0x10, R7, //
        0x11, R0, //              POP R0..R7 (reversed values)
        0x11, R1, //
        0x11, R2, //
        0x11, R3, //
        0x11, R4, //
        0x11, R5, //
        0x11, R6, //
        0x11, R7, //
        0x04, 0x00, R7, //        wrap exercises
        0x04, 0xFF, R6, //
        0x06, R7, //              DEC R7 (0x00 -> 0xFF, carry)
        0x05, R6, //              INC R6 (0xFF -> 0x00, carry)
        0x04, 0xBB, R0, //        indirect store
        0x04, 0xFF, R1, //
        0x04, 0xC1, R2, //
        0x03, R0, R1, R2, //      STORER R0, R1, R2
        0x08, R0, 0x10, //        CMP R0, #0x10
        0x09, R0, R1, //          CMPR R0, R1
        0xFF, //                  NOP
        0x04, 0xFE, R0, //        fill loop: mem[0xFE01..0xFE0A]
        0x04, 0x0A, R1, //
        0x03, R1, R0, R1, //      STORER R1, R0, R1   <- 0x0067
        0x06, R1, //              DEC R1
        0x0B, R1, 0x00, 0x67, //  JNZ R1, 0x0067
        0x04, 0xAA, R0, //        carry exercises
        0x0E, 0x01, R0, //        ADD #0x01, R0
        0x0E, 0xFF, R0, //        ADD #0xFF, R0 (overflow)
        0x04, 0x00, R1, //
        0x0F, R0, R1, //          ADDR R0, R1
        0x12, 0x00, 0xC9, //      CALL 0x00C9 (the trailing RET)
        0x04, 0x09, R0, //
        0x14, 0x0A, R0, //        SUB #0x0A, R0 (borrow)
        0x04, 0x09, R1, //
        0x04, 0x0A, R2, //
        0x15, R1, R2, //          SUBR R1, R2
        0x04, 0xEE, R1, //
        0x16, 0xEE, R0, R1, //    MUL #0xEE, R0, R1
        0x04, 0xEE, R0, //
        0x04, 0xEE, R2, //
        0x17, R0, R1, R2, //      MULR R0, R1, R2
        0x04, 0x0A, R0, //
        0x18, 0x06, R0, R1, //    DIV #0x06, R0, R1
        0x04, 0x06, R0, //
        0x04, 0x0A, R1, //
        0x19, R0, R1, R2, //      DIVR R0, R1, R2
        0x04, 0x01, R0, //
        0x1A, 0x07, R0, //        SHL #0x07, R0
        0x1A, 0x01, R0, //        SHL #0x01, R0 (bit out)
        0x04, 0x80, R0, //
        0x1B, 0x07, R0, //        SHR #0x07, R0
        0x1B, 0x01, R0, //        SHR #0x01, R0 (bit out)
        0x07, 0xAB, 0xCD, //      JMP 0xABCD (HALT-filled memory)
        0x13, //                  RET          <- 0x00C9
    ]
}

/// Hex dump of the full memory, 64 bytes per row.
pub fn dump_memory(memory: &Memory) -> String {
    let mut out = String::new();
    for (i, byte) in memory.ram().iter().enumerate() {
        if i % 64 == 0 {
            out.push_str(&format!("\n0x{:04x}:", i));
        }
        out.push_str(&format!(" {:02x}", byte));
    }
    out.push('\n');
    debug_assert_eq!(memory.ram().len(), MEM_SIZE);
    out
}
