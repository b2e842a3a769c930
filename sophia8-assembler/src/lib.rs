//! Sophia8 Assembler
//!
//! Compiles Sophia8 assembly (with transitive textual `.include`,
//! labels, origin directives and data directives) into a full
//! 65 535-byte memory image plus a line-granular debug map.
//!
//! The pipeline is strict and deterministic: preprocessor (include
//! expansion with cycle and include-once enforcement), pass 1 (symbol
//! table and layout), pass 2 (byte emission with overlap detection).
//! Identical input always produces byte-identical outputs.
//!
//! ## Example
//!
//! ```rust
//! use sophia8_assembler::{assemble_lines, SourceLine};
//!
//! let lines: Vec<SourceLine> = ".org\nHALT\n"
//!     .lines()
//!     .enumerate()
//!     .map(|(i, text)| SourceLine {
//!         text: text.to_string(),
//!         file: "demo.s8".to_string(),
//!         line_no: i as u32 + 1,
//!         include_chain: vec!["demo.s8".to_string()],
//!     })
//!     .collect();
//!
//! let assembly = assemble_lines(lines).unwrap();
//! assert_eq!(assembly.entry, 0x0003);
//! ```

pub mod assembler;
pub mod emit;
pub mod error;
pub mod layout;
pub mod parser;
pub mod preprocess;

pub use assembler::{
    assemble_file, assemble_lines, debug_map_path, preprocessed_path, write_outputs, Assembly,
};
pub use error::{AsmError, AsmErrorKind, Result};
pub use preprocess::{preprocess, render_preprocessed, SourceLine};
