//! Machine register state.

use sophia8_spec::MEM_SIZE;

/// The Sophia8 register file and flags.
///
/// Eight 8-bit general-purpose registers, three 16-bit pointer
/// registers, a one-bit carry flag and the stop trigger. The stack
/// starts at the top of memory and grows down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineState {
    /// General-purpose registers R0..R7.
    pub regs: [u8; 8],
    /// Instruction pointer.
    pub ip: u16,
    /// Stack pointer.
    pub sp: u16,
    /// Base pointer.
    pub bp: u16,
    /// Carry flag.
    pub carry: bool,
    /// Stop trigger; the run loop exits when set.
    pub stop: bool,
}

impl MachineState {
    /// Startup state: registers cleared, SP and BP at the top of memory.
    pub fn new() -> Self {
        MachineState {
            regs: [0; 8],
            ip: 0x0000,
            sp: MEM_SIZE as u16,
            bp: MEM_SIZE as u16,
            carry: false,
            stop: false,
        }
    }

    /// One-line register dump in the machine's traditional format.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (i, value) in self.regs.iter().enumerate() {
            out.push_str(&format!("R{} = 0x{:02x} ", i, value));
        }
        out.push_str(&format!("IP = 0x{:04x} ", self.ip));
        out.push_str(&format!("SP = 0x{:04x} ", self.sp));
        out.push_str(&format!("BP = 0x{:04x} ", self.bp));
        out.push_str(&format!("C = {}", if self.carry { 1 } else { 0 }));
        out
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_state() {
        let state = MachineState::new();
        assert_eq!(state.regs, [0; 8]);
        assert_eq!(state.ip, 0x0000);
        assert_eq!(state.sp, 0xFFFF);
        assert_eq!(state.bp, 0xFFFF);
        assert!(!state.carry);
        assert!(!state.stop);
    }

    #[test]
    fn test_dump_format() {
        let mut state = MachineState::new();
        state.regs[0] = 0x0A;
        state.carry = true;
        let dump = state.dump();
        assert!(dump.starts_with("R0 = 0x0a "));
        assert!(dump.contains("SP = 0xffff"));
        assert!(dump.ends_with("C = 1"));
    }
}
