//! Source-level breakpoint resolution against a debug map.
//!
//! A breakpoint request names a source file and a line number. The
//! resolver finds the CODE record for that line (exact path match
//! first, path basename as fallback) and arms the record with the
//! smallest start address. A line that only has DATA records cannot be
//! broken on.

use crate::error::{Result, RuntimeError};
use sophia8_spec::{DebugKind, DebugMap, DebugRecord};
use std::path::Path;

/// A resolved, armed breakpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breakpoint {
    /// Address the VM halts at.
    pub addr: u16,
    /// Source file from the matched record.
    pub file: String,
    /// Source line number.
    pub line_no: u32,
}

/// Load and parse a `.deb` file.
pub fn load_map(path: &Path) -> Result<DebugMap> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RuntimeError::MissingDebFile(path.display().to_string())
        } else {
            RuntimeError::Io(e)
        }
    })?;
    DebugMap::parse(&text)
        .map_err(|e| RuntimeError::InvalidDebFile(path.display().to_string(), e.to_string()))
}

/// Resolve `file:line` to a breakpoint address within a parsed map.
pub fn resolve(map: &DebugMap, file: &str, line: u32) -> Result<Breakpoint> {
    let code_match = best_match(&map.records, file, line, DebugKind::Code);
    if let Some(rec) = code_match {
        return Ok(Breakpoint {
            addr: rec.addr,
            file: rec.file.clone(),
            line_no: rec.line_no,
        });
    }

    let any_match = best_match(&map.records, file, line, DebugKind::Data);
    if any_match.is_some() {
        return Err(RuntimeError::NoExecutableOnLine {
            file: file.to_string(),
            line,
        });
    }

    Err(RuntimeError::BreakpointNotFound {
        file: file.to_string(),
        line,
    })
}

/// Among records of `kind` on `line`, pick the smallest address,
/// preferring exact file matches over basename matches.
fn best_match<'a>(
    records: &'a [DebugRecord],
    file: &str,
    line: u32,
    kind: DebugKind,
) -> Option<&'a DebugRecord> {
    let on_line = |rec: &&DebugRecord| rec.kind == kind && rec.line_no == line;

    let exact = records
        .iter()
        .filter(on_line)
        .filter(|rec| rec.file == file)
        .min_by_key(|rec| rec.addr);
    if exact.is_some() {
        return exact;
    }

    let wanted = basename(file);
    records
        .iter()
        .filter(on_line)
        .filter(|rec| basename(&rec.file) == wanted)
        .min_by_key(|rec| rec.addr)
}

fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(addr: u16, kind: DebugKind, file: &str, line_no: u32) -> DebugRecord {
        DebugRecord {
            addr,
            bytes: vec![0x00],
            kind,
            file: file.to_string(),
            line_no,
            text: String::new(),
        }
    }

    fn map(records: Vec<DebugRecord>) -> DebugMap {
        DebugMap {
            binary: Some("prog.bin".to_string()),
            records,
        }
    }

    #[test]
    fn test_exact_file_match() {
        let m = map(vec![
            record(0x0100, DebugKind::Code, "/src/main.s8", 5),
            record(0x0200, DebugKind::Code, "/src/other.s8", 5),
        ]);
        let bp = resolve(&m, "/src/main.s8", 5).unwrap();
        assert_eq!(bp.addr, 0x0100);
    }

    #[test]
    fn test_basename_fallback() {
        let m = map(vec![record(0x0300, DebugKind::Code, "/build/src/main.s8", 7)]);
        let bp = resolve(&m, "main.s8", 7).unwrap();
        assert_eq!(bp.addr, 0x0300);
        assert_eq!(bp.file, "/build/src/main.s8");
    }

    #[test]
    fn test_smallest_address_wins() {
        let m = map(vec![
            record(0x0500, DebugKind::Code, "main.s8", 3),
            record(0x0200, DebugKind::Code, "main.s8", 3),
        ]);
        let bp = resolve(&m, "main.s8", 3).unwrap();
        assert_eq!(bp.addr, 0x0200);
    }

    #[test]
    fn test_data_only_line_is_not_executable() {
        let m = map(vec![record(0x0200, DebugKind::Data, "main.s8", 2)]);
        let err = resolve(&m, "main.s8", 2).unwrap_err();
        assert!(matches!(err, RuntimeError::NoExecutableOnLine { .. }));
    }

    #[test]
    fn test_no_match_at_all() {
        let m = map(vec![record(0x0200, DebugKind::Code, "main.s8", 2)]);
        let err = resolve(&m, "main.s8", 99).unwrap_err();
        assert!(matches!(err, RuntimeError::BreakpointNotFound { .. }));
    }

    #[test]
    fn test_exact_match_beats_basename_match() {
        let m = map(vec![
            record(0x0100, DebugKind::Code, "/a/main.s8", 4),
            record(0x0050, DebugKind::Code, "/b/main.s8", 4),
        ]);
        // Exact path match wins even though the other has a lower address.
        let bp = resolve(&m, "/a/main.s8", 4).unwrap();
        assert_eq!(bp.addr, 0x0100);
    }

    #[test]
    fn test_load_map_missing_file() {
        let err = load_map(Path::new("/nonexistent/prog.deb")).unwrap_err();
        assert!(matches!(err, RuntimeError::MissingDebFile(_)));
    }

    #[test]
    fn test_load_map_invalid_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.deb");
        std::fs::write(&path, "this is not a debug map\n").unwrap();
        let err = load_map(&path).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidDebFile(_, _)));
    }
}
