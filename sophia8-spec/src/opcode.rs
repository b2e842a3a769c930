//! Opcode definitions for the Sophia8 instruction set.
//!
//! Opcodes occupy one byte. The regular instructions are 0x01-0x1C,
//! with two special encodings: HALT = 0x00 (so zero-filled memory halts
//! the machine) and NOP = 0xFF.
//!
//! Each opcode carries a fixed byte length and an ordered operand
//! signature; both tables are shared verbatim by the assembler encoder
//! and the VM decoder.

use serde::{Deserialize, Serialize};

/// Kind of a single instruction operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    /// 16-bit absolute address: a numeric literal or a label. Emitted
    /// big-endian, never written with a leading `#`.
    Addr16,
    /// 8-bit immediate, written with a leading `#`.
    Imm8,
    /// General-purpose register R0..R7 only.
    Gpr,
    /// Any register: R0..R7, IP, SP or BP.
    AnyReg,
}

/// Instruction opcode (primary byte).
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// HALT: sets the stop trigger
    Halt = 0x00,
    /// LOAD a, Rn: Rn = mem[a]
    Load = 0x01,
    /// STORE Rn, a: mem[a] = Rn
    Store = 0x02,
    /// STORER Rs, Rh, Rl: mem[(Rh << 8) | Rl] = Rs
    Storer = 0x03,
    /// SET #i, Rn: Rn = i
    Set = 0x04,
    /// INC Rn: Rn += 1, carry on wrap to 0x00
    Inc = 0x05,
    /// DEC Rn: Rn -= 1, carry on wrap to 0xFF
    Dec = 0x06,
    /// JMP a: IP = a
    Jmp = 0x07,
    /// CMP Rn, #i: destructive compare (Rn -= i, carry on borrow)
    Cmp = 0x08,
    /// CMPR Rn, Rm: destructive compare (Rn -= Rm, carry on borrow)
    Cmpr = 0x09,
    /// JZ Rn, a: jump if Rn == 0
    Jz = 0x0A,
    /// JNZ Rn, a: jump if Rn != 0
    Jnz = 0x0B,
    /// JC a: jump if carry set
    Jc = 0x0C,
    /// JNC a: jump if carry clear
    Jnc = 0x0D,
    /// ADD #i, Rn: Rn += i, carry on overflow
    Add = 0x0E,
    /// ADDR Rs, Rd: Rd += Rs, carry on overflow
    Addr = 0x0F,
    /// PUSH r: push register (8-bit for GPRs, 16-bit for IP/SP/BP)
    Push = 0x10,
    /// POP r: pop register (8-bit for GPRs, 16-bit for IP/SP/BP)
    Pop = 0x11,
    /// CALL a: push return address, IP = a
    Call = 0x12,
    /// RET: pop return address into IP
    Ret = 0x13,
    /// SUB #i, Rn: Rn -= i, carry on borrow
    Sub = 0x14,
    /// SUBR Rs, Rd: Rd -= Rs, carry on borrow
    Subr = 0x15,
    /// MUL #i, Rh, Rl: 16-bit product of Rl and i split into Rh:Rl
    Mul = 0x16,
    /// MULR Rs, Rh, Rl: as MUL with a register multiplier
    Mulr = 0x17,
    /// DIV #i, Rq, Rr: Rq = Rq / i, Rr = Rq % i
    Div = 0x18,
    /// DIVR Rs, Rq, Rr: as DIV with a register divisor
    Divr = 0x19,
    /// SHL #n, Rn: shift left, carry = last bit shifted out
    Shl = 0x1A,
    /// SHR #n, Rn: shift right, carry = last bit shifted out
    Shr = 0x1B,
    /// LOADR Rd, Rh, Rl: Rd = mem[(Rh << 8) | Rl]
    Loadr = 0x1C,
    /// NOP: advances IP by one
    Nop = 0xFF,
}

impl Opcode {
    /// Try to convert from the primary byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Opcode::Halt),
            0x01 => Some(Opcode::Load),
            0x02 => Some(Opcode::Store),
            0x03 => Some(Opcode::Storer),
            0x04 => Some(Opcode::Set),
            0x05 => Some(Opcode::Inc),
            0x06 => Some(Opcode::Dec),
            0x07 => Some(Opcode::Jmp),
            0x08 => Some(Opcode::Cmp),
            0x09 => Some(Opcode::Cmpr),
            0x0A => Some(Opcode::Jz),
            0x0B => Some(Opcode::Jnz),
            0x0C => Some(Opcode::Jc),
            0x0D => Some(Opcode::Jnc),
            0x0E => Some(Opcode::Add),
            0x0F => Some(Opcode::Addr),
            0x10 => Some(Opcode::Push),
            0x11 => Some(Opcode::Pop),
            0x12 => Some(Opcode::Call),
            0x13 => Some(Opcode::Ret),
            0x14 => Some(Opcode::Sub),
            0x15 => Some(Opcode::Subr),
            0x16 => Some(Opcode::Mul),
            0x17 => Some(Opcode::Mulr),
            0x18 => Some(Opcode::Div),
            0x19 => Some(Opcode::Divr),
            0x1A => Some(Opcode::Shl),
            0x1B => Some(Opcode::Shr),
            0x1C => Some(Opcode::Loadr),
            0xFF => Some(Opcode::Nop),
            _ => None,
        }
    }

    /// Convert to the primary byte.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse an assembly mnemonic (case-sensitive, upper case).
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        match mnemonic {
            "HALT" => Some(Opcode::Halt),
            "LOAD" => Some(Opcode::Load),
            "STORE" => Some(Opcode::Store),
            "STORER" => Some(Opcode::Storer),
            "SET" => Some(Opcode::Set),
            "INC" => Some(Opcode::Inc),
            "DEC" => Some(Opcode::Dec),
            "JMP" => Some(Opcode::Jmp),
            "CMP" => Some(Opcode::Cmp),
            "CMPR" => Some(Opcode::Cmpr),
            "JZ" => Some(Opcode::Jz),
            "JNZ" => Some(Opcode::Jnz),
            "JC" => Some(Opcode::Jc),
            "JNC" => Some(Opcode::Jnc),
            "ADD" => Some(Opcode::Add),
            "ADDR" => Some(Opcode::Addr),
            "PUSH" => Some(Opcode::Push),
            "POP" => Some(Opcode::Pop),
            "CALL" => Some(Opcode::Call),
            "RET" => Some(Opcode::Ret),
            "SUB" => Some(Opcode::Sub),
            "SUBR" => Some(Opcode::Subr),
            "MUL" => Some(Opcode::Mul),
            "MULR" => Some(Opcode::Mulr),
            "DIV" => Some(Opcode::Div),
            "DIVR" => Some(Opcode::Divr),
            "SHL" => Some(Opcode::Shl),
            "SHR" => Some(Opcode::Shr),
            "LOADR" => Some(Opcode::Loadr),
            "NOP" => Some(Opcode::Nop),
            _ => None,
        }
    }

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Halt => "HALT",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Storer => "STORER",
            Opcode::Set => "SET",
            Opcode::Inc => "INC",
            Opcode::Dec => "DEC",
            Opcode::Jmp => "JMP",
            Opcode::Cmp => "CMP",
            Opcode::Cmpr => "CMPR",
            Opcode::Jz => "JZ",
            Opcode::Jnz => "JNZ",
            Opcode::Jc => "JC",
            Opcode::Jnc => "JNC",
            Opcode::Add => "ADD",
            Opcode::Addr => "ADDR",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Sub => "SUB",
            Opcode::Subr => "SUBR",
            Opcode::Mul => "MUL",
            Opcode::Mulr => "MULR",
            Opcode::Div => "DIV",
            Opcode::Divr => "DIVR",
            Opcode::Shl => "SHL",
            Opcode::Shr => "SHR",
            Opcode::Loadr => "LOADR",
            Opcode::Nop => "NOP",
        }
    }

    /// Total encoded length in bytes, opcode included.
    pub const fn len(self) -> usize {
        match self {
            Opcode::Halt | Opcode::Nop | Opcode::Ret => 1,
            Opcode::Inc | Opcode::Dec | Opcode::Push | Opcode::Pop => 2,
            Opcode::Set
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Shl
            | Opcode::Shr
            | Opcode::Cmp
            | Opcode::Cmpr
            | Opcode::Addr
            | Opcode::Subr
            | Opcode::Jmp
            | Opcode::Call
            | Opcode::Jc
            | Opcode::Jnc => 3,
            Opcode::Load
            | Opcode::Store
            | Opcode::Storer
            | Opcode::Loadr
            | Opcode::Jz
            | Opcode::Jnz
            | Opcode::Mul
            | Opcode::Mulr
            | Opcode::Div
            | Opcode::Divr => 4,
        }
    }

    /// Ordered operand signature. Source-operand order; the emitted byte
    /// order per mnemonic follows the same sequence.
    pub const fn operands(self) -> &'static [OperandKind] {
        use OperandKind::*;
        match self {
            Opcode::Halt | Opcode::Nop | Opcode::Ret => &[],
            Opcode::Load => &[Addr16, Gpr],
            Opcode::Store => &[Gpr, Addr16],
            Opcode::Storer | Opcode::Loadr => &[Gpr, Gpr, Gpr],
            Opcode::Set | Opcode::Add | Opcode::Sub | Opcode::Shl | Opcode::Shr => &[Imm8, Gpr],
            Opcode::Inc | Opcode::Dec => &[Gpr],
            Opcode::Jmp | Opcode::Call | Opcode::Jc | Opcode::Jnc => &[Addr16],
            Opcode::Jz | Opcode::Jnz => &[Gpr, Addr16],
            Opcode::Cmp => &[Gpr, Imm8],
            Opcode::Cmpr | Opcode::Addr | Opcode::Subr => &[Gpr, Gpr],
            Opcode::Mul | Opcode::Div => &[Imm8, Gpr, Gpr],
            Opcode::Mulr | Opcode::Divr => &[Gpr, Gpr, Gpr],
            Opcode::Push | Opcode::Pop => &[AnyReg],
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
