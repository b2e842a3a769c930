//! Debug map (`.deb`) record model and text format.
//!
//! The assembler emits one record per run of bytes (one per instruction,
//! one per data directive) plus one for the implicit entry stub. The VM
//! breakpoint resolver reads the same format back. Both sides live here
//! so the two cannot drift apart.
//!
//! Record line format:
//!
//! ```text
//! AAAA  LEN  KIND  BYTES...  file:line: original source line
//! ```
//!
//! where `AAAA` is a four-digit uppercase hex start address, `LEN` a
//! three-character right-aligned decimal byte count, `KIND` is `CODE` or
//! `DATA`, and `BYTES` is an uppercase two-digit hex dump. Lines starting
//! with `;` are comments; the `; Binary:` header comment records the
//! image the map was produced for.

use crate::error::SpecError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel file name used for assembler-generated emissions.
pub const IMPLICIT_FILE: &str = "<implicit>";

/// Whether a record covers an instruction or data bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DebugKind {
    Code,
    Data,
}

impl fmt::Display for DebugKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugKind::Code => write!(f, "CODE"),
            DebugKind::Data => write!(f, "DATA"),
        }
    }
}

/// One emitted run of bytes and the source line it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugRecord {
    /// Absolute start address of the emission.
    pub addr: u16,
    /// The emitted bytes.
    pub bytes: Vec<u8>,
    pub kind: DebugKind,
    /// Originating file path, or [`IMPLICIT_FILE`].
    pub file: String,
    /// 1-based line number, 0 for implicit records.
    pub line_no: u32,
    /// Original source text.
    pub text: String,
}

impl DebugRecord {
    /// Render the record as one map line.
    pub fn format_line(&self) -> String {
        let dump = self
            .bytes
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{:04X}  {:>3}  {}  {}  {}:{}: {}",
            self.addr,
            self.bytes.len(),
            self.kind,
            dump,
            self.file,
            self.line_no,
            self.text
        )
    }

    /// Parse one map line. Accepts everything [`Self::format_line`]
    /// emits; the caller is expected to have skipped comments and
    /// blank lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut cursor = Cursor::new(line);

        let addr = u16::from_str_radix(cursor.token()?, 16).ok()?;
        let len: usize = cursor.token()?.parse().ok()?;
        let kind = match cursor.token()? {
            "CODE" => DebugKind::Code,
            "DATA" => DebugKind::Data,
            _ => return None,
        };

        let mut bytes = Vec::with_capacity(len);
        for _ in 0..len {
            bytes.push(u8::from_str_radix(cursor.token()?, 16).ok()?);
        }

        let (file, line_no, text) = split_location(cursor.rest())?;
        Some(DebugRecord {
            addr,
            bytes,
            kind,
            file,
            line_no,
            text,
        })
    }
}

/// Whitespace-token cursor over a record line.
struct Cursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Cursor { line, pos: 0 }
    }

    fn token(&mut self) -> Option<&'a str> {
        let rest = &self.line[self.pos..];
        let start = rest.find(|c: char| !c.is_ascii_whitespace())?;
        let rest = &rest[start..];
        let end = rest
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(rest.len());
        self.pos += start + end;
        Some(&rest[..end])
    }

    fn rest(&self) -> &'a str {
        self.line[self.pos..].trim_start()
    }
}

/// Split a `file:line: text` location field. The file may itself
/// contain colons; the first `:<digits>:` run wins.
fn split_location(loc: &str) -> Option<(String, u32, String)> {
    for (i, _) in loc.match_indices(':') {
        let after = &loc[i + 1..];
        let digits_end = after
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after.len());
        if digits_end == 0 {
            continue;
        }
        if after[digits_end..].starts_with(':') {
            let file = loc[..i].to_string();
            let line_no: u32 = after[..digits_end].parse().ok()?;
            let mut text = &after[digits_end + 1..];
            if let Some(stripped) = text.strip_prefix(' ') {
                text = stripped;
            }
            return Some((file, line_no, text.to_string()));
        }
    }
    None
}

/// A parsed `.deb` file: the image it describes plus its records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugMap {
    /// Image path recorded in the `; Binary:` header, if present.
    pub binary: Option<String>,
    pub records: Vec<DebugRecord>,
}

impl DebugMap {
    /// Render a complete map file for `records`, referencing the output
    /// image path. Records are sorted by ascending address, CODE before
    /// DATA at the same address.
    pub fn render(records: &[DebugRecord], binary_path: &str) -> String {
        let mut sorted: Vec<&DebugRecord> = records.iter().collect();
        sorted.sort_by(|a, b| a.addr.cmp(&b.addr).then(a.kind.cmp(&b.kind)));

        let mut out = String::new();
        out.push_str("; s8asm debug map (.deb)\n");
        out.push_str(
            "; This file is generated automatically and matches the emitted binary image exactly.\n",
        );
        out.push_str(&format!("; Binary: {}\n", binary_path));
        out.push_str("; Format: AAAA  LEN  KIND  BYTES...  file:line: original source line\n\n");

        for rec in sorted {
            out.push_str(&rec.format_line());
            out.push('\n');
        }
        out
    }

    /// Parse a map file. Comment and blank lines are skipped; the
    /// `; Binary:` header is captured when present.
    pub fn parse(text: &str) -> Result<Self, SpecError> {
        let mut binary = None;
        let mut records = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(stripped) = trimmed.strip_prefix(';') {
                if let Some(path) = stripped.trim_start().strip_prefix("Binary:") {
                    binary = Some(path.trim().to_string());
                }
                continue;
            }
            let rec = DebugRecord::parse_line(trimmed).ok_or_else(|| {
                SpecError::InvalidDebugLine {
                    line_no: idx + 1,
                    text: trimmed.to_string(),
                }
            })?;
            records.push(rec);
        }

        Ok(DebugMap { binary, records })
    }
}
