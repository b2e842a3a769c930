//! Textual `.include` preprocessor.
//!
//! Expands the entry file into a flat, ordered stream of source-line
//! records. Each record keeps its originating canonical file path,
//! 1-based line number, original text and the include chain that led to
//! it, so every later diagnostic can point at real source.
//!
//! Two disjoint structures guard inclusion: a LIFO stack of files
//! currently being expanded (cycle detection) and a grow-only set of
//! every file ever included (include-once enforcement). They must stay
//! separate.

use crate::error::{AsmError, AsmErrorKind, Result};
use crate::parser::{peel_labels, strip_comment};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One line of the flattened source stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLine {
    /// Original text, untrimmed (final newline removed).
    pub text: String,
    /// Canonical path of the originating file.
    pub file: String,
    /// 1-based line number within that file.
    pub line_no: u32,
    /// Canonical paths from the entry file down to this file.
    pub include_chain: Vec<String>,
}

impl SourceLine {
    /// A synthetic line for errors that have no real source position.
    pub fn synthetic() -> Self {
        SourceLine {
            text: String::new(),
            file: String::new(),
            line_no: 0,
            include_chain: Vec::new(),
        }
    }
}

/// Error constructor bound to a source line.
pub(crate) fn err_at(kind: AsmErrorKind, sl: &SourceLine) -> AsmError {
    AsmError {
        kind,
        file: sl.file.clone(),
        line_no: sl.line_no,
        line: sl.text.clone(),
        include_chain: sl.include_chain.clone(),
    }
}

/// Canonicalize where possible, fall back to an absolute path.
fn canonical_or_absolute(path: &Path) -> PathBuf {
    if let Ok(canon) = path.canonicalize() {
        return canon;
    }
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Expand `entry` and every transitive `.include` into a flat stream.
pub fn preprocess(entry: &Path) -> Result<Vec<SourceLine>> {
    let entry = canonical_or_absolute(entry);
    let mut out = Vec::new();
    let mut stack: Vec<PathBuf> = Vec::new();
    let mut included: HashSet<String> = HashSet::new();
    expand_file(&entry, &entry, &mut out, &mut stack, &mut included, Vec::new())?;
    Ok(out)
}

fn expand_file(
    file: &Path,
    entry: &Path,
    out: &mut Vec<SourceLine>,
    stack: &mut Vec<PathBuf>,
    included: &mut HashSet<String>,
    chain: Vec<String>,
) -> Result<()> {
    let canon = canonical_or_absolute(file);
    let canon_s = canon.display().to_string();

    if stack.iter().any(|p| *p == canon) {
        let mut cycle: Vec<String> = stack.iter().map(|p| p.display().to_string()).collect();
        cycle.push(canon_s.clone());
        return Err(AsmError::bare(
            AsmErrorKind::IncludeCycle { chain: cycle },
            canon_s,
            chain,
        ));
    }

    if included.contains(&canon_s) {
        return Err(AsmError::bare(
            AsmErrorKind::MultipleInclusion(canon_s.clone()),
            canon_s,
            chain,
        ));
    }
    included.insert(canon_s.clone());

    stack.push(canon.clone());
    let mut chain = chain;
    chain.push(canon_s.clone());

    let text = read_file(&canon, &canon_s, &chain)?;

    for (idx, raw) in text.lines().enumerate() {
        let sl = SourceLine {
            text: raw.to_string(),
            file: canon_s.clone(),
            line_no: idx as u32 + 1,
            include_chain: chain.clone(),
        };

        let code = strip_comment(raw);
        if code.is_empty() {
            out.push(sl);
            continue;
        }

        // `.include` may be preceded by labels; the directive (and any
        // labels on its line) is replaced by the included content.
        let (_labels, scan) = peel_labels(code);

        if let Some(rest) = scan.strip_prefix(".include") {
            let operand = rest.trim();
            let inc = parse_include_operand(operand).ok_or_else(|| {
                err_at(AsmErrorKind::InvalidIncludeSyntax, &sl)
            })?;
            let inc_path = resolve_include(&canon, entry, inc, &sl)?;
            expand_file(&inc_path, entry, out, stack, included, chain.clone())?;
            continue;
        }

        out.push(sl);
    }

    stack.pop();
    Ok(())
}

/// Extract the quoted path from a `.include` operand.
fn parse_include_operand(operand: &str) -> Option<&str> {
    let bytes = operand.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'"' || bytes[bytes.len() - 1] != b'"' {
        return None;
    }
    Some(&operand[1..operand.len() - 1])
}

/// Resolve an include path: absolute paths as-is, relative paths first
/// against the including file's directory, then the entry file's.
fn resolve_include(
    including: &Path,
    entry: &Path,
    inc: &str,
    at: &SourceLine,
) -> Result<PathBuf> {
    let rel = Path::new(inc);
    if rel.is_absolute() {
        if rel.exists() {
            return Ok(canonical_or_absolute(rel));
        }
        return Err(err_at(AsmErrorKind::FileNotFound(inc.to_string()), at));
    }

    if let Some(dir) = including.parent() {
        let candidate = dir.join(rel);
        if candidate.exists() {
            return Ok(canonical_or_absolute(&candidate));
        }
    }
    if let Some(dir) = entry.parent() {
        let candidate = dir.join(rel);
        if candidate.exists() {
            return Ok(canonical_or_absolute(&candidate));
        }
    }
    Err(err_at(AsmErrorKind::FileNotFound(inc.to_string()), at))
}

fn read_file(path: &Path, canon_s: &str, chain: &[String]) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            AsmErrorKind::FileNotFound(canon_s.to_string())
        } else {
            AsmErrorKind::ReadError(canon_s.to_string(), e.to_string())
        };
        AsmError::bare(kind, canon_s, chain.to_vec())
    })
}

/// Render the flattened stream as a diagnostic text file: a begin-file
/// marker at each change of origin and a `;@ file:line` marker before
/// every verbatim line.
pub fn render_preprocessed(lines: &[SourceLine]) -> String {
    let mut out = String::new();
    out.push_str("; s8asm preprocessed output (all .include expanded)\n");
    out.push_str("; This file is generated to aid debugging.\n\n");

    let mut last_file = "";
    for sl in lines {
        if sl.file != last_file {
            out.push_str(&format!("\n; ===== BEGIN FILE: {} =====\n", sl.file));
            last_file = &sl.file;
        }
        out.push_str(&format!(";@ {}:{}\n", sl.file, sl.line_no));
        out.push_str(&sl.text);
        out.push('\n');
    }
    out
}
