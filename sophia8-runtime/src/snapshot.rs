//! VM state snapshots.
//!
//! A snapshot is the full machine state serialized for later resume:
//!
//! ```text
//! offset  size   field
//! 0       4      magic "S8DI"
//! 4       1      version (0x01)
//! 5       8      R0..R7
//! 13      2      IP (big-endian)
//! 15      2      SP (big-endian)
//! 17      2      BP (big-endian)
//! 19      1      carry (0 or 1)
//! 20      7      reserved, zero
//! 27      65535  memory image
//! ```
//!
//! Save then restore yields bit-identical state; restoring clears the
//! stop trigger so execution can continue.

use crate::error::{Result, RuntimeError};
use crate::memory::Memory;
use crate::state::MachineState;
use sophia8_spec::{MEM_SIZE, SNAPSHOT_HEADER_LEN, SNAPSHOT_LEN, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
use std::path::Path;

/// Default snapshot file written on a breakpoint hit.
pub const DEBUG_IMAGE: &str = "debug.img";

/// Serialize machine state and memory.
pub fn write(state: &MachineState, memory: &Memory) -> Vec<u8> {
    let mut out = Vec::with_capacity(SNAPSHOT_LEN);
    out.extend_from_slice(&SNAPSHOT_MAGIC);
    out.push(SNAPSHOT_VERSION);
    out.extend_from_slice(&state.regs);
    out.extend_from_slice(&state.ip.to_be_bytes());
    out.extend_from_slice(&state.sp.to_be_bytes());
    out.extend_from_slice(&state.bp.to_be_bytes());
    out.push(state.carry as u8);
    out.extend_from_slice(&[0u8; 7]);
    out.extend_from_slice(memory.ram());
    out
}

/// Deserialize a snapshot, verifying magic and version.
pub fn read(bytes: &[u8]) -> Result<(MachineState, Memory)> {
    if bytes.len() != SNAPSHOT_LEN {
        return Err(RuntimeError::InvalidSnapshot(format!(
            "expected {} bytes, found {}",
            SNAPSHOT_LEN,
            bytes.len()
        )));
    }
    if bytes[0..4] != SNAPSHOT_MAGIC {
        return Err(RuntimeError::InvalidSnapshot("bad magic".to_string()));
    }
    if bytes[4] != SNAPSHOT_VERSION {
        return Err(RuntimeError::InvalidSnapshot(format!(
            "unsupported version {}",
            bytes[4]
        )));
    }

    let mut state = MachineState::new();
    state.regs.copy_from_slice(&bytes[5..13]);
    state.ip = u16::from_be_bytes([bytes[13], bytes[14]]);
    state.sp = u16::from_be_bytes([bytes[15], bytes[16]]);
    state.bp = u16::from_be_bytes([bytes[17], bytes[18]]);
    state.carry = bytes[19] != 0;
    state.stop = false; // restoration always resumes

    let mut memory = Memory::new();
    memory
        .ram_mut()
        .copy_from_slice(&bytes[SNAPSHOT_HEADER_LEN..SNAPSHOT_HEADER_LEN + MEM_SIZE]);

    Ok((state, memory))
}

/// Save a snapshot to a file.
pub fn save(path: &Path, state: &MachineState, memory: &Memory) -> Result<()> {
    std::fs::write(path, write(state, memory))?;
    Ok(())
}

/// Load a snapshot from a file.
pub fn load(path: &Path) -> Result<(MachineState, Memory)> {
    let bytes = std::fs::read(path)?;
    read(&bytes)
}

/// Quick check whether a byte buffer looks like a snapshot file.
pub fn is_snapshot(bytes: &[u8]) -> bool {
    bytes.len() >= 5 && bytes[0..4] == SNAPSHOT_MAGIC
}
