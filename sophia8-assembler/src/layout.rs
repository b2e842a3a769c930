//! Assembler pass 1: symbol binding and location layout.
//!
//! Walks the flattened source stream once, binding every label to the
//! current location counter and recording one [`Item`] per directive or
//! instruction with its absolute address and byte size. No bytes are
//! produced here; pass 2 consumes the item list.

use crate::error::{AsmErrorKind, Result};
use crate::parser::{
    decode_string_literal, is_ident, parse_int_literal, peel_labels, split_operands,
    strip_comment, StringLitError,
};
use crate::preprocess::{err_at, SourceLine};
use sophia8_spec::{Opcode, DEFAULT_ORIGIN, MEM_SIZE};
use std::collections::HashMap;

/// Whether an item is a data directive or an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Directive,
    Instruction,
}

/// One layout record produced by pass 1.
#[derive(Clone, Debug)]
pub struct Item {
    pub kind: ItemKind,
    /// Directive name (`.byte`, ...) or mnemonic (`SET`, ...).
    pub name: String,
    /// Operand tokens, comma-split and trimmed.
    pub ops: Vec<String>,
    /// Absolute address where emission begins.
    pub addr: u16,
    /// Reserved byte length.
    pub size: usize,
    /// Originating source line.
    pub src: SourceLine,
}

/// Pass-1 output: items in source order, the symbol table and the
/// resolved entry address.
#[derive(Clone, Debug)]
pub struct Layout {
    pub items: Vec<Item>,
    pub symbols: HashMap<String, u16>,
    pub entry: u16,
}

/// Run pass 1 over the flattened source stream.
pub fn layout(lines: &[SourceLine]) -> Result<Layout> {
    let mut symbols: HashMap<String, u16> = HashMap::new();
    let mut items: Vec<Item> = Vec::new();

    let mut lc: u32 = DEFAULT_ORIGIN as u32;
    let mut any_org = false;
    let mut entry_marker: Option<u16> = None;
    let mut first_org: Option<u16> = None;

    for sl in lines {
        let code = strip_comment(&sl.text);
        if code.is_empty() {
            continue;
        }

        let (labels, rest) = peel_labels(code);
        for label in labels {
            if symbols.contains_key(label) {
                return Err(err_at(AsmErrorKind::DuplicateLabel(label.to_string()), sl));
            }
            symbols.insert(label.to_string(), lc as u16);
        }
        if rest.is_empty() {
            continue;
        }

        if rest.starts_with('.') {
            layout_directive(
                rest,
                sl,
                &mut lc,
                &mut any_org,
                &mut entry_marker,
                &mut first_org,
                &mut items,
            )?;
        } else {
            layout_instruction(rest, sl, &mut lc, &mut items)?;
        }

        if lc > MEM_SIZE as u32 {
            return Err(err_at(AsmErrorKind::OutOfRange(lc), sl));
        }
    }

    if !any_org {
        let at = lines.first().cloned().unwrap_or_else(SourceLine::synthetic);
        return Err(err_at(AsmErrorKind::MissingOrg, &at));
    }

    let entry = match (entry_marker, first_org) {
        (Some(addr), _) => addr,
        (None, Some(addr)) => addr,
        (None, None) => {
            let at = lines.first().cloned().unwrap_or_else(SourceLine::synthetic);
            return Err(err_at(AsmErrorKind::MissingOrg, &at));
        }
    };

    Ok(Layout {
        items,
        symbols,
        entry,
    })
}

fn layout_directive(
    code: &str,
    sl: &SourceLine,
    lc: &mut u32,
    any_org: &mut bool,
    entry_marker: &mut Option<u16>,
    first_org: &mut Option<u16>,
    items: &mut Vec<Item>,
) -> Result<()> {
    let (name, rest) = match code.find(char::is_whitespace) {
        Some(pos) => (&code[..pos], code[pos..].trim()),
        None => (code, ""),
    };
    let ops = split_operands(rest);

    match name {
        ".org" => {
            *any_org = true;
            if ops.is_empty() {
                // Entry marker: records the current LC, does not move it.
                if entry_marker.is_some() {
                    return Err(err_at(AsmErrorKind::DuplicateEntryMarker, sl));
                }
                *entry_marker = Some(*lc as u16);
                push_dir(items, ".org", ops, *lc, 0, sl);
            } else {
                if ops.len() != 1 {
                    return Err(err_at(
                        AsmErrorKind::BadOperandCount {
                            mnemonic: ".org".to_string(),
                            expected: 1,
                            found: ops.len(),
                        },
                        sl,
                    ));
                }
                let op = &ops[0];
                if op.starts_with('#') || is_ident(op) {
                    return Err(err_at(AsmErrorKind::BadAddress(op.clone()), sl));
                }
                let addr = parse_int_literal(op)
                    .ok_or_else(|| err_at(AsmErrorKind::BadAddress(op.clone()), sl))?;
                if addr > 0xFFFF {
                    return Err(err_at(AsmErrorKind::BadAddress(op.clone()), sl));
                }
                if addr < DEFAULT_ORIGIN as u32 {
                    return Err(err_at(AsmErrorKind::OrgBelowReserved, sl));
                }
                if first_org.is_none() {
                    *first_org = Some(addr as u16);
                }
                *lc = addr;
                push_dir(items, ".org", ops, *lc, 0, sl);
            }
        }
        ".byte" => {
            if ops.is_empty() {
                return Err(err_at(
                    AsmErrorKind::BadOperandCount {
                        mnemonic: ".byte".to_string(),
                        expected: 1,
                        found: 0,
                    },
                    sl,
                ));
            }
            let size = ops.len();
            push_dir(items, ".byte", ops, *lc, size, sl);
            *lc += size as u32;
        }
        ".word" => {
            if ops.is_empty() {
                return Err(err_at(
                    AsmErrorKind::BadOperandCount {
                        mnemonic: ".word".to_string(),
                        expected: 1,
                        found: 0,
                    },
                    sl,
                ));
            }
            let size = ops.len() * 2;
            push_dir(items, ".word", ops, *lc, size, sl);
            *lc += size as u32;
        }
        ".string" => {
            let bytes = decode_string(rest, sl)?;
            let size = bytes.len() + 1; // implicit NUL terminator
            push_dir(items, ".string", vec![rest.to_string()], *lc, size, sl);
            *lc += size as u32;
        }
        ".include" => {
            // Expanded during preprocessing; reaching pass 1 means the
            // input bypassed the preprocessor.
            return Err(err_at(
                AsmErrorKind::Internal("unexpected .include after preprocessing".to_string()),
                sl,
            ));
        }
        other => {
            return Err(err_at(AsmErrorKind::UnknownDirective(other.to_string()), sl));
        }
    }
    Ok(())
}

fn layout_instruction(
    code: &str,
    sl: &SourceLine,
    lc: &mut u32,
    items: &mut Vec<Item>,
) -> Result<()> {
    let (mnemonic, rest) = match code.find(char::is_whitespace) {
        Some(pos) => (&code[..pos], code[pos..].trim()),
        None => (code, ""),
    };

    let opcode = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| err_at(AsmErrorKind::UnknownInstruction(mnemonic.to_string()), sl))?;

    let ops = split_operands(rest);
    let expected = opcode.operands().len();
    if ops.len() != expected {
        return Err(err_at(
            AsmErrorKind::BadOperandCount {
                mnemonic: mnemonic.to_string(),
                expected,
                found: ops.len(),
            },
            sl,
        ));
    }

    let size = opcode.len();
    items.push(Item {
        kind: ItemKind::Instruction,
        name: mnemonic.to_string(),
        ops,
        addr: *lc as u16,
        size,
        src: sl.clone(),
    });
    *lc += size as u32;
    Ok(())
}

fn push_dir(
    items: &mut Vec<Item>,
    name: &str,
    ops: Vec<String>,
    lc: u32,
    size: usize,
    sl: &SourceLine,
) {
    items.push(Item {
        kind: ItemKind::Directive,
        name: name.to_string(),
        ops,
        addr: lc as u16,
        size,
        src: sl.clone(),
    });
}

/// Decode a `.string` operand, mapping literal errors to assembler
/// error kinds.
pub(crate) fn decode_string(quoted: &str, sl: &SourceLine) -> Result<Vec<u8>> {
    decode_string_literal(quoted).map_err(|e| {
        let kind = match e {
            StringLitError::Syntax => {
                AsmErrorKind::BadStringEscape("expected: .string \"text\"".to_string())
            }
            StringLitError::BadEscape(msg) => AsmErrorKind::BadStringEscape(msg),
            StringLitError::NonAscii => AsmErrorKind::NonAsciiString,
        };
        err_at(kind, sl)
    })
}
