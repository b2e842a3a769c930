//! Strictness tests: every malformed input must fail with the right
//! error kind, never assemble loosely.

use sophia8_assembler::{assemble_lines, AsmErrorKind, SourceLine};

fn lines(src: &str) -> Vec<SourceLine> {
    src.lines()
        .enumerate()
        .map(|(i, text)| SourceLine {
            text: text.to_string(),
            file: "bad.s8".to_string(),
            line_no: i as u32 + 1,
            include_chain: vec!["bad.s8".to_string()],
        })
        .collect()
}

fn kind_of(src: &str) -> AsmErrorKind {
    assemble_lines(lines(src)).unwrap_err().kind
}

#[test]
fn test_undefined_label() {
    assert!(matches!(
        kind_of(".org\nJMP NOWHERE\n"),
        AsmErrorKind::UndefinedLabel(_)
    ));
}

#[test]
fn test_immediate_without_hash() {
    assert!(matches!(
        kind_of(".org\nSET 5, R0\n"),
        AsmErrorKind::BadImmediate(_)
    ));
}

#[test]
fn test_immediate_out_of_range() {
    assert!(matches!(
        kind_of(".org\nSET #256, R0\n"),
        AsmErrorKind::BadImmediate(_)
    ));
}

#[test]
fn test_address_with_hash() {
    assert!(matches!(
        kind_of(".org\nJMP #0x0100\n"),
        AsmErrorKind::BadAddress(_)
    ));
}

#[test]
fn test_address_out_of_range() {
    assert!(matches!(
        kind_of(".org\nJMP 0x10000\n"),
        AsmErrorKind::BadAddress(_)
    ));
}

#[test]
fn test_pointer_register_where_gpr_required() {
    // SET requires R0..R7; SP is only valid for PUSH/POP.
    assert!(matches!(
        kind_of(".org\nSET #1, SP\n"),
        AsmErrorKind::BadRegister(_)
    ));
}

#[test]
fn test_push_accepts_pointer_registers() {
    let asm = assemble_lines(lines(".org\nPUSH SP\nPUSH BP\nPUSH IP\nPOP BP\nHALT\n")).unwrap();
    assert_eq!(&asm.image[0x0003..0x0005], &[0x10, 0xFB]);
    assert_eq!(&asm.image[0x0005..0x0007], &[0x10, 0xFC]);
    assert_eq!(&asm.image[0x0007..0x0009], &[0x10, 0xFA]);
    assert_eq!(&asm.image[0x0009..0x000B], &[0x11, 0xFC]);
}

#[test]
fn test_unknown_register() {
    assert!(matches!(
        kind_of(".org\nINC R9\n"),
        AsmErrorKind::BadRegister(_)
    ));
}

#[test]
fn test_byte_rejects_labels_and_immediates() {
    assert!(matches!(
        kind_of(".org\nL: .byte L\n"),
        AsmErrorKind::BadByteLiteral(_)
    ));
    assert!(matches!(
        kind_of(".org\n.byte #1\n"),
        AsmErrorKind::BadByteLiteral(_)
    ));
    assert!(matches!(
        kind_of(".org\n.byte 300\n"),
        AsmErrorKind::BadByteLiteral(_)
    ));
}

#[test]
fn test_word_rejects_immediates_and_range() {
    assert!(matches!(
        kind_of(".org\n.word #1\n"),
        AsmErrorKind::BadWordLiteral(_)
    ));
    assert!(matches!(
        kind_of(".org\n.word 0x10000\n"),
        AsmErrorKind::BadWordLiteral(_)
    ));
}

#[test]
fn test_word_undefined_label() {
    assert!(matches!(
        kind_of(".org\n.word MISSING\n"),
        AsmErrorKind::UndefinedLabel(_)
    ));
}

#[test]
fn test_string_bad_escape() {
    assert!(matches!(
        kind_of(".org\n.string \"a\\q\"\n"),
        AsmErrorKind::BadStringEscape(_)
    ));
    assert!(matches!(
        kind_of(".org\n.string \"\\x4z\"\n"),
        AsmErrorKind::BadStringEscape(_)
    ));
}

#[test]
fn test_string_non_ascii() {
    assert!(matches!(
        kind_of(".org\n.string \"caf\u{e9}\"\n"),
        AsmErrorKind::NonAsciiString
    ));
}

#[test]
fn test_trailing_comma_is_tolerated() {
    let asm = assemble_lines(lines(".org 0x0100\n.byte 1,2,3,\n.org\nHALT\n")).unwrap();
    assert_eq!(&asm.image[0x0100..0x0103], &[1, 2, 3]);
}

#[test]
fn test_error_location_points_at_offending_line() {
    let err = assemble_lines(lines(".org\nHALT\nJMP NOWHERE\n")).unwrap_err();
    assert_eq!(err.line_no, 3);
    assert_eq!(err.line, "JMP NOWHERE");
    assert_eq!(err.file, "bad.s8");
    assert_eq!(err.include_chain, vec!["bad.s8".to_string()]);
}

#[test]
fn test_operand_arity_is_strict_for_every_shape() {
    // Too many operands.
    assert!(matches!(
        kind_of(".org\nHALT R0\n"),
        AsmErrorKind::BadOperandCount { .. }
    ));
    assert!(matches!(
        kind_of(".org\nINC R0, R1\n"),
        AsmErrorKind::BadOperandCount { .. }
    ));
    // Too few.
    assert!(matches!(
        kind_of(".org\nMUL #2, R0\n"),
        AsmErrorKind::BadOperandCount { .. }
    ));
}
