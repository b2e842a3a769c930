//! Runtime error types for the Sophia8 VM.
//!
//! These cover the breakpoint and snapshot paths only. Faults inside a
//! running program (unknown opcode, bad register token) are not errors:
//! they transition the machine to a stopped state without diagnostics.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Debug map file not found: {0}")]
    MissingDebFile(String),

    #[error("Invalid debug map file {0}: {1}")]
    InvalidDebFile(String, String),

    #[error("No record for breakpoint {file}:{line}")]
    BreakpointNotFound { file: String, line: u32 },

    #[error("No executable code on line {file}:{line}")]
    NoExecutableOnLine { file: String, line: u32 },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Invalid image size: expected {expected} bytes, found {found}")]
    InvalidImage { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RuntimeError::BreakpointNotFound {
            file: "main.s8".to_string(),
            line: 12,
        };
        assert_eq!(err.to_string(), "No record for breakpoint main.s8:12");

        let err = RuntimeError::InvalidImage {
            expected: 65535,
            found: 12,
        };
        assert_eq!(
            err.to_string(),
            "Invalid image size: expected 65535 bytes, found 12"
        );
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RuntimeError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }
}
