//! Error types for the Sophia8 assembler.
//!
//! All assembler errors are strict and fatal: no warnings, no recovery.
//! Every error carries the originating file, line number, line text and
//! the full include chain that led to the line.

use thiserror::Error;

/// What went wrong, without location context.
#[derive(Debug, Error)]
pub enum AsmErrorKind {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file {0}: {1}")]
    ReadError(String, String),

    #[error("Invalid .include syntax. Expected: .include \"file.s8\"")]
    InvalidIncludeSyntax,

    #[error("Include cycle detected: {}", .chain.join(" -> "))]
    IncludeCycle { chain: Vec<String> },

    #[error("Multiple inclusion is forbidden (already included): {0}")]
    MultipleInclusion(String),

    #[error("Duplicate label '{0}'")]
    DuplicateLabel(String),

    #[error("Undefined label '{0}'")]
    UndefinedLabel(String),

    #[error("Unknown directive '{0}'")]
    UnknownDirective(String),

    #[error("Unknown instruction '{0}'")]
    UnknownInstruction(String),

    #[error("{mnemonic} expects {expected} operand(s), found {found}")]
    BadOperandCount {
        mnemonic: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid immediate operand: {0}")]
    BadImmediate(String),

    #[error("Invalid address operand: {0}")]
    BadAddress(String),

    #[error("Invalid register '{0}'")]
    BadRegister(String),

    #[error("Invalid .byte literal: {0}")]
    BadByteLiteral(String),

    #[error("Invalid .word literal: {0}")]
    BadWordLiteral(String),

    #[error("Invalid string escape: {0}")]
    BadStringEscape(String),

    #[error("Non-ASCII character in .string (only 7-bit ASCII allowed)")]
    NonAsciiString,

    #[error(".org must be >= 0x0003 (0x0000..0x0002 hold the entry stub)")]
    OrgBelowReserved,

    #[error(".org (no operand) may appear only once")]
    DuplicateEntryMarker,

    #[error("No .org found (mandatory; use .org <addr> and/or .org)")]
    MissingOrg,

    #[error("Overlap at address 0x{0:04X}")]
    Overlap(u16),

    #[error("Emission out of range at address 0x{0:X}")]
    OutOfRange(u32),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// An assembler error with full source context.
#[derive(Debug, Error)]
#[error("{kind} at {file}:{line_no}")]
pub struct AsmError {
    pub kind: AsmErrorKind,
    pub file: String,
    /// 1-based line number, 0 when no line applies.
    pub line_no: u32,
    /// Original source line text.
    pub line: String,
    /// Canonical paths, entry file first.
    pub include_chain: Vec<String>,
}

impl AsmError {
    /// An error with no source line attached (e.g. file-level failures).
    pub fn bare(kind: AsmErrorKind, file: impl Into<String>, chain: Vec<String>) -> Self {
        AsmError {
            kind,
            file: file.into(),
            line_no: 0,
            line: String::new(),
            include_chain: chain,
        }
    }

    /// Multi-line diagnostic report, suitable for stderr.
    pub fn report(&self) -> String {
        let mut out = format!("ERROR: {}\n", self.kind);
        if !self.file.is_empty() {
            out.push_str(&format!("At: {}", self.file));
            if self.line_no > 0 {
                out.push_str(&format!(":{}", self.line_no));
            }
            out.push('\n');
        }
        if !self.line.is_empty() {
            out.push_str(&format!(">> {}\n", self.line));
        }
        if !self.include_chain.is_empty() {
            out.push_str("Include chain:\n");
            for (i, path) in self.include_chain.iter().enumerate() {
                out.push_str(&format!("  [{}] {}\n", i, path));
            }
        }
        out
    }
}

/// Result type for assembler operations.
pub type Result<T> = std::result::Result<T, AsmError>;
