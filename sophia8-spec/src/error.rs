//! Error types for the shared ISA contracts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Invalid debug map record at line {line_no}: {text}")]
    InvalidDebugLine { line_no: usize, text: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_debug_line_display() {
        let err = SpecError::InvalidDebugLine {
            line_no: 7,
            text: "garbage".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid debug map record at line 7: garbage"
        );
    }
}
