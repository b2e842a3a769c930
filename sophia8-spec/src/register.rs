//! Register definitions and token bytes.
//!
//! Register operands are encoded literally inside instructions as token
//! bytes: R0..R7 are 0xF2..0xF9, IP is 0xFA, SP is 0xFB and BP is 0xFC.
//! The VM decodes an operand byte back through [`Reg::from_token`]; an
//! unknown token byte stops the machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of general-purpose registers.
pub const NUM_GPRS: usize = 8;

/// A Sophia8 register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg {
    /// General-purpose 8-bit register R0..R7.
    Gpr(u8),
    /// 16-bit instruction pointer.
    Ip,
    /// 16-bit stack pointer.
    Sp,
    /// 16-bit base pointer.
    Bp,
}

impl Reg {
    /// First general-purpose register token byte (R0).
    pub const GPR_TOKEN_BASE: u8 = 0xF2;

    /// Token byte for IP.
    pub const IP_TOKEN: u8 = 0xFA;

    /// Token byte for SP.
    pub const SP_TOKEN: u8 = 0xFB;

    /// Token byte for BP.
    pub const BP_TOKEN: u8 = 0xFC;

    /// Decode an encoded token byte.
    pub fn from_token(token: u8) -> Option<Self> {
        match token {
            0xF2..=0xF9 => Some(Reg::Gpr(token - Self::GPR_TOKEN_BASE)),
            Self::IP_TOKEN => Some(Reg::Ip),
            Self::SP_TOKEN => Some(Reg::Sp),
            Self::BP_TOKEN => Some(Reg::Bp),
            _ => None,
        }
    }

    /// The token byte emitted into instructions.
    pub fn token(self) -> u8 {
        match self {
            Reg::Gpr(i) => Self::GPR_TOKEN_BASE + (i & 0x07),
            Reg::Ip => Self::IP_TOKEN,
            Reg::Sp => Self::SP_TOKEN,
            Reg::Bp => Self::BP_TOKEN,
        }
    }

    /// Parse an assembly register name (case-sensitive): `R0`..`R7`,
    /// `IP`, `SP`, `BP`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "IP" => Some(Reg::Ip),
            "SP" => Some(Reg::Sp),
            "BP" => Some(Reg::Bp),
            _ => {
                let bytes = name.as_bytes();
                if bytes.len() == 2 && bytes[0] == b'R' && (b'0'..=b'7').contains(&bytes[1]) {
                    Some(Reg::Gpr(bytes[1] - b'0'))
                } else {
                    None
                }
            }
        }
    }

    /// Whether this is one of R0..R7.
    #[inline]
    pub fn is_gpr(self) -> bool {
        matches!(self, Reg::Gpr(_))
    }

    /// Index 0..7 for general-purpose registers.
    pub fn gpr_index(self) -> Option<usize> {
        match self {
            Reg::Gpr(i) => Some(i as usize),
            _ => None,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::Gpr(i) => write!(f, "R{}", i),
            Reg::Ip => write!(f, "IP"),
            Reg::Sp => write!(f, "SP"),
            Reg::Bp => write!(f, "BP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_values() {
        assert_eq!(Reg::Gpr(0).token(), 0xF2);
        assert_eq!(Reg::Gpr(7).token(), 0xF9);
        assert_eq!(Reg::Ip.token(), 0xFA);
        assert_eq!(Reg::Sp.token(), 0xFB);
        assert_eq!(Reg::Bp.token(), 0xFC);
    }

    #[test]
    fn test_token_round_trip() {
        for token in 0xF2..=0xFC {
            let reg = Reg::from_token(token).unwrap();
            assert_eq!(reg.token(), token);
        }
        assert_eq!(Reg::from_token(0xF1), None);
        assert_eq!(Reg::from_token(0xFD), None);
        assert_eq!(Reg::from_token(0x00), None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Reg::from_name("R0"), Some(Reg::Gpr(0)));
        assert_eq!(Reg::from_name("R7"), Some(Reg::Gpr(7)));
        assert_eq!(Reg::from_name("IP"), Some(Reg::Ip));
        assert_eq!(Reg::from_name("SP"), Some(Reg::Sp));
        assert_eq!(Reg::from_name("BP"), Some(Reg::Bp));
        assert_eq!(Reg::from_name("R8"), None);
        assert_eq!(Reg::from_name("r0"), None); // case-sensitive
        assert_eq!(Reg::from_name("C"), None);
    }

    #[test]
    fn test_gpr_index() {
        assert_eq!(Reg::Gpr(3).gpr_index(), Some(3));
        assert_eq!(Reg::Sp.gpr_index(), None);
        assert!(Reg::Gpr(0).is_gpr());
        assert!(!Reg::Ip.is_gpr());
    }

    #[test]
    fn test_display() {
        assert_eq!(Reg::Gpr(5).to_string(), "R5");
        assert_eq!(Reg::Bp.to_string(), "BP");
    }
}
