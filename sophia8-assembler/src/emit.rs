//! Assembler pass 2: byte emission.
//!
//! Walks the pass-1 item list in order and writes every byte into a
//! zero-filled 65 535-byte image. A parallel occupancy bitmap catches
//! overlapping emissions; the three entry-stub bytes are pre-marked and
//! written last, bypassing the check.

use crate::error::{AsmErrorKind, Result};
use crate::layout::{decode_string, Item, ItemKind, Layout};
use crate::parser::{is_ident, parse_int_literal};
use crate::preprocess::{err_at, SourceLine};
use sophia8_spec::{
    DebugKind, DebugRecord, Opcode, OperandKind, Reg, IMPLICIT_FILE, MEM_SIZE,
};
use std::collections::HashMap;

/// Pass-2 output: the finished image and its debug records.
#[derive(Clone, Debug)]
pub struct Emission {
    /// Full 65 535-byte memory image.
    pub image: Vec<u8>,
    /// One record per emitted item plus the implicit entry stub.
    pub records: Vec<DebugRecord>,
    /// Resolved entry address.
    pub entry: u16,
}

struct Emitter {
    image: Vec<u8>,
    occupied: Vec<bool>,
}

impl Emitter {
    fn new() -> Self {
        let mut occupied = vec![false; MEM_SIZE];
        // Entry stub bytes are reserved up front.
        occupied[0] = true;
        occupied[1] = true;
        occupied[2] = true;
        Emitter {
            image: vec![0u8; MEM_SIZE],
            occupied,
        }
    }

    fn byte(&mut self, cursor: &mut u32, value: u8, sl: &SourceLine) -> Result<()> {
        let addr = *cursor;
        if addr >= MEM_SIZE as u32 {
            return Err(err_at(AsmErrorKind::OutOfRange(addr), sl));
        }
        if self.occupied[addr as usize] {
            return Err(err_at(AsmErrorKind::Overlap(addr as u16), sl));
        }
        self.image[addr as usize] = value;
        self.occupied[addr as usize] = true;
        *cursor += 1;
        Ok(())
    }

    fn word_be(&mut self, cursor: &mut u32, value: u16, sl: &SourceLine) -> Result<()> {
        self.byte(cursor, (value >> 8) as u8, sl)?;
        self.byte(cursor, (value & 0xFF) as u8, sl)
    }
}

/// Run pass 2 over a pass-1 layout.
pub fn emit(layout: &Layout) -> Result<Emission> {
    let mut emitter = Emitter::new();
    let mut records: Vec<DebugRecord> = Vec::new();

    for item in &layout.items {
        match item.kind {
            ItemKind::Directive => {
                emit_directive(item, &layout.symbols, &mut emitter, &mut records)?
            }
            ItemKind::Instruction => {
                emit_instruction(item, &layout.symbols, &mut emitter, &mut records)?
            }
        }
    }

    // Implicit entry stub: JMP <entry>, bypassing the occupancy check
    // (those bytes were pre-marked and nothing else may claim them).
    let entry = layout.entry;
    let stub = vec![Opcode::Jmp.to_u8(), (entry >> 8) as u8, (entry & 0xFF) as u8];
    emitter.image[0] = stub[0];
    emitter.image[1] = stub[1];
    emitter.image[2] = stub[2];
    records.push(DebugRecord {
        addr: 0x0000,
        bytes: stub,
        kind: DebugKind::Code,
        file: IMPLICIT_FILE.to_string(),
        line_no: 0,
        text: "JMP <entry>".to_string(),
    });

    Ok(Emission {
        image: emitter.image,
        records,
        entry,
    })
}

fn emit_directive(
    item: &Item,
    symbols: &HashMap<String, u16>,
    emitter: &mut Emitter,
    records: &mut Vec<DebugRecord>,
) -> Result<()> {
    if item.name == ".org" {
        return Ok(());
    }

    let sl = &item.src;
    let mut cursor = item.addr as u32;
    let mut span: Vec<u8> = Vec::with_capacity(item.size);

    match item.name.as_str() {
        ".byte" => {
            for op in &item.ops {
                if op.starts_with('#') || is_ident(op) {
                    return Err(err_at(AsmErrorKind::BadByteLiteral(op.clone()), sl));
                }
                let value = parse_int_literal(op)
                    .filter(|v| *v <= 0xFF)
                    .ok_or_else(|| err_at(AsmErrorKind::BadByteLiteral(op.clone()), sl))?;
                span.push(value as u8);
                emitter.byte(&mut cursor, value as u8, sl)?;
            }
        }
        ".word" => {
            // Kept as tokens from pass 1: labels resolve here.
            for op in &item.ops {
                if op.starts_with('#') {
                    return Err(err_at(AsmErrorKind::BadWordLiteral(op.clone()), sl));
                }
                let value = if is_ident(op) {
                    symbols
                        .get(op.as_str())
                        .copied()
                        .ok_or_else(|| err_at(AsmErrorKind::UndefinedLabel(op.clone()), sl))?
                } else {
                    parse_int_literal(op)
                        .filter(|v| *v <= 0xFFFF)
                        .ok_or_else(|| err_at(AsmErrorKind::BadWordLiteral(op.clone()), sl))?
                        as u16
                };
                span.push((value >> 8) as u8);
                span.push((value & 0xFF) as u8);
                emitter.word_be(&mut cursor, value, sl)?;
            }
        }
        ".string" => {
            let bytes = decode_string(&item.ops[0], sl)?;
            for b in bytes {
                span.push(b);
                emitter.byte(&mut cursor, b, sl)?;
            }
            span.push(0x00);
            emitter.byte(&mut cursor, 0x00, sl)?; // implicit terminator
        }
        other => {
            return Err(err_at(
                AsmErrorKind::Internal(format!("no emission for directive {}", other)),
                sl,
            ));
        }
    }

    records.push(DebugRecord {
        addr: item.addr,
        bytes: span,
        kind: DebugKind::Data,
        file: sl.file.clone(),
        line_no: sl.line_no,
        text: sl.text.clone(),
    });
    Ok(())
}

fn emit_instruction(
    item: &Item,
    symbols: &HashMap<String, u16>,
    emitter: &mut Emitter,
    records: &mut Vec<DebugRecord>,
) -> Result<()> {
    let sl = &item.src;
    let opcode = Opcode::from_mnemonic(&item.name).ok_or_else(|| {
        err_at(
            AsmErrorKind::Internal(format!("no opcode for {}", item.name)),
            sl,
        )
    })?;

    let mut cursor = item.addr as u32;
    let mut span: Vec<u8> = Vec::with_capacity(item.size);

    span.push(opcode.to_u8());
    emitter.byte(&mut cursor, opcode.to_u8(), sl)?;

    // The emitted operand byte order follows the source operand order
    // for every mnemonic.
    for (kind, op) in opcode.operands().iter().zip(&item.ops) {
        match kind {
            OperandKind::Addr16 => {
                let addr = resolve_addr16(op, symbols, sl)?;
                span.push((addr >> 8) as u8);
                span.push((addr & 0xFF) as u8);
                emitter.word_be(&mut cursor, addr, sl)?;
            }
            OperandKind::Imm8 => {
                let imm = resolve_imm8(op, sl)?;
                span.push(imm);
                emitter.byte(&mut cursor, imm, sl)?;
            }
            OperandKind::Gpr => {
                let token = resolve_reg(op, OperandKind::Gpr, sl)?;
                span.push(token);
                emitter.byte(&mut cursor, token, sl)?;
            }
            OperandKind::AnyReg => {
                let token = resolve_reg(op, OperandKind::AnyReg, sl)?;
                span.push(token);
                emitter.byte(&mut cursor, token, sl)?;
            }
        }
    }

    records.push(DebugRecord {
        addr: item.addr,
        bytes: span,
        kind: DebugKind::Code,
        file: sl.file.clone(),
        line_no: sl.line_no,
        text: sl.text.clone(),
    });
    Ok(())
}

/// Resolve an address operand: a label or a 16-bit numeric literal.
fn resolve_addr16(
    token: &str,
    symbols: &HashMap<String, u16>,
    sl: &SourceLine,
) -> Result<u16> {
    if token.is_empty() || token.starts_with('#') {
        return Err(err_at(AsmErrorKind::BadAddress(token.to_string()), sl));
    }
    if is_ident(token) {
        return symbols
            .get(token)
            .copied()
            .ok_or_else(|| err_at(AsmErrorKind::UndefinedLabel(token.to_string()), sl));
    }
    parse_int_literal(token)
        .filter(|v| *v <= 0xFFFF)
        .map(|v| v as u16)
        .ok_or_else(|| err_at(AsmErrorKind::BadAddress(token.to_string()), sl))
}

/// Resolve an immediate operand: `#` followed by an 8-bit literal.
fn resolve_imm8(token: &str, sl: &SourceLine) -> Result<u8> {
    let Some(literal) = token.strip_prefix('#') else {
        return Err(err_at(AsmErrorKind::BadImmediate(token.to_string()), sl));
    };
    parse_int_literal(literal)
        .filter(|v| *v <= 0xFF)
        .map(|v| v as u8)
        .ok_or_else(|| err_at(AsmErrorKind::BadImmediate(token.to_string()), sl))
}

/// Resolve a register operand to its token byte.
fn resolve_reg(token: &str, kind: OperandKind, sl: &SourceLine) -> Result<u8> {
    let reg = Reg::from_name(token)
        .ok_or_else(|| err_at(AsmErrorKind::BadRegister(token.to_string()), sl))?;
    if kind == OperandKind::Gpr && !reg.is_gpr() {
        return Err(err_at(AsmErrorKind::BadRegister(token.to_string()), sl));
    }
    Ok(reg.token())
}
