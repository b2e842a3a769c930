//! End-to-end assembler tests over real files and full programs.

use sophia8_assembler::{assemble_file, assemble_lines, AsmErrorKind, SourceLine};
use sophia8_spec::{DebugKind, DebugMap, MEM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn lines(src: &str) -> Vec<SourceLine> {
    src.lines()
        .enumerate()
        .map(|(i, text)| SourceLine {
            text: text.to_string(),
            file: "test.s8".to_string(),
            line_no: i as u32 + 1,
            include_chain: vec!["test.s8".to_string()],
        })
        .collect()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_entry_marker_only_program() {
    // .org / START: / HALT => stub JMP 0x0003, HALT at 0x0003.
    let asm = assemble_lines(lines(".org\nSTART:\nHALT\n")).unwrap();
    assert_eq!(asm.image.len(), MEM_SIZE);
    assert_eq!(&asm.image[0..3], &[0x07, 0x00, 0x03]);
    assert_eq!(asm.image[3], 0x00);
    assert!(asm.image[4..].iter().all(|&b| b == 0));
}

#[test]
fn test_hello_world_image_bytes() {
    let src = "\
.org 0x0200
Msg: .string \"Hi\"
.org
SET #0x48, R0
STORE R0, 0xFF03
SET #0x69, R0
STORE R0, 0xFF03
HALT
";
    let asm = assemble_lines(lines(src)).unwrap();

    // Data: 'H' 'i' NUL at 0x0200.
    assert_eq!(&asm.image[0x0200..0x0203], &[0x48, 0x69, 0x00]);
    // Entry marker follows the string.
    assert_eq!(asm.entry, 0x0203);
    assert_eq!(&asm.image[0..3], &[0x07, 0x02, 0x03]);
    // SET #0x48, R0 / STORE R0, 0xFF03.
    assert_eq!(&asm.image[0x0203..0x0206], &[0x04, 0x48, 0xF2]);
    assert_eq!(&asm.image[0x0206..0x020A], &[0x02, 0xF2, 0xFF, 0x03]);
    // Second pair, then HALT.
    assert_eq!(&asm.image[0x020A..0x020D], &[0x04, 0x69, 0xF2]);
    assert_eq!(&asm.image[0x020D..0x0211], &[0x02, 0xF2, 0xFF, 0x03]);
    assert_eq!(asm.image[0x0211], 0x00);
}

#[test]
fn test_counter_loop_encoding() {
    let src = ".org\nSET #0x03, R0\nL: DEC R0\nJNZ R0, L\nHALT\n";
    let asm = assemble_lines(lines(src)).unwrap();

    assert_eq!(&asm.image[0x0003..0x0006], &[0x04, 0x03, 0xF2]);
    assert_eq!(&asm.image[0x0006..0x0008], &[0x06, 0xF2]); // L: DEC R0
    assert_eq!(&asm.image[0x0008..0x000C], &[0x0B, 0xF2, 0x00, 0x06]); // JNZ R0, L
    assert_eq!(asm.image[0x000C], 0x00);
}

#[test]
fn test_call_return_encoding() {
    let src = ".org\nCALL P\nHALT\nP: SET #0x5A, R0\nRET\n";
    let asm = assemble_lines(lines(src)).unwrap();

    // CALL at 0x0003, HALT at 0x0006, P at 0x0007.
    assert_eq!(&asm.image[0x0003..0x0006], &[0x12, 0x00, 0x07]);
    assert_eq!(asm.image[0x0006], 0x00);
    assert_eq!(&asm.image[0x0007..0x000A], &[0x04, 0x5A, 0xF2]);
    assert_eq!(asm.image[0x000A], 0x13);
}

#[test]
fn test_label_references_encode_label_address() {
    let src = ".org 0x1234\nTARGET: HALT\n.org\nJMP TARGET\n";
    let asm = assemble_lines(lines(src)).unwrap();
    // JMP TARGET at entry 0x1235 carries bytes {07, 12, 34}.
    assert_eq!(&asm.image[0x1235..0x1238], &[0x07, 0x12, 0x34]);
}

#[test]
fn test_word_directive_resolves_labels_big_endian() {
    let src = ".org 0x0100\nVEC: .word TARGET, 0xBEEF\n.org 0x2000\nTARGET: HALT\n";
    let asm = assemble_lines(lines(src)).unwrap();
    assert_eq!(&asm.image[0x0100..0x0104], &[0x20, 0x00, 0xBE, 0xEF]);
}

#[test]
fn test_overlap_detection() {
    let src = ".org 0x0100\n.byte 1,2\n.org 0x0100\n.byte 3\n";
    let err = assemble_lines(lines(src)).unwrap_err();
    assert!(matches!(err.kind, AsmErrorKind::Overlap(0x0100)));
}

#[test]
fn test_overlap_with_entry_stub_region() {
    // Nothing may claim 0x0000..0x0002; pass 1 already rejects
    // .org below 0x0003.
    let src = ".org 0x0000\n.byte 1\n";
    let err = assemble_lines(lines(src)).unwrap_err();
    assert!(matches!(err.kind, AsmErrorKind::OrgBelowReserved));
}

#[test]
fn test_debug_records_cover_all_emissions_disjointly() {
    let src = "\
.org 0x0200
Msg: .string \"Hey\"
Tab: .byte 1,2,3
.org
SET #0x01, R0
INC R0
HALT
";
    let asm = assemble_lines(lines(src)).unwrap();

    // One record per item plus the implicit stub.
    assert_eq!(asm.records.len(), 6);

    // Byte ranges are pairwise disjoint.
    let mut ranges: Vec<(u32, u32)> = asm
        .records
        .iter()
        .map(|r| (r.addr as u32, r.addr as u32 + r.bytes.len() as u32))
        .collect();
    ranges.sort();
    for pair in ranges.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "overlapping records: {:?}", pair);
    }

    // Every record's bytes match the image content.
    for rec in &asm.records {
        let start = rec.addr as usize;
        assert_eq!(&asm.image[start..start + rec.bytes.len()], &rec.bytes[..]);
    }

    // Data records for the directives, code records for the rest.
    let data_count = asm
        .records
        .iter()
        .filter(|r| r.kind == DebugKind::Data)
        .count();
    assert_eq!(data_count, 2);
}

#[test]
fn test_debug_map_round_trip() {
    let src = ".org 0x0200\nMsg: .string \"A\"\n.org\nHALT\n";
    let asm = assemble_lines(lines(src)).unwrap();
    let text = DebugMap::render(&asm.records, "prog.bin");

    let map = DebugMap::parse(&text).unwrap();
    assert_eq!(map.binary.as_deref(), Some("prog.bin"));
    assert_eq!(map.records.len(), asm.records.len());

    // The implicit stub record is first after sorting (address 0).
    assert_eq!(map.records[0].addr, 0);
    assert_eq!(map.records[0].file, "<implicit>");
    assert_eq!(map.records[0].bytes, vec![0x07, 0x02, 0x02]);
}

#[test]
fn test_assemble_file_with_includes() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "lib.s8",
        "PUTC: STORE R0, 0xFF03\n    RET\n",
    );
    let main = write(
        dir.path(),
        "main.s8",
        ".org 0x0800\n.include \"lib.s8\"\n.org\nSTART:\n    SET #0x21, R0\n    CALL PUTC\n    HALT\n",
    );

    let asm = assemble_file(&main).unwrap();
    // PUTC at 0x0800: STORE R0, 0xFF03 then RET.
    assert_eq!(&asm.image[0x0800..0x0804], &[0x02, 0xF2, 0xFF, 0x03]);
    assert_eq!(asm.image[0x0804], 0x13);
    // Entry after the library code.
    assert_eq!(asm.entry, 0x0805);
    // CALL PUTC resolves across files.
    assert_eq!(&asm.image[0x0808..0x080B], &[0x12, 0x08, 0x00]);
    // Records carry real originating files.
    assert!(asm
        .records
        .iter()
        .any(|r| r.file.ends_with("lib.s8") && r.kind == DebugKind::Code));
}

#[test]
fn test_include_cycle_fails_with_chain() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.s8", ".org\n.include \"b.s8\"\n");
    write(dir.path(), "b.s8", ".include \"a.s8\"\n");
    let a = dir.path().join("a.s8");

    let err = assemble_file(&a).unwrap_err();
    match err.kind {
        AsmErrorKind::IncludeCycle { chain } => {
            assert!(chain[0].ends_with("a.s8"));
            assert!(chain[1].ends_with("b.s8"));
            assert!(chain[2].ends_with("a.s8"));
        }
        other => panic!("expected IncludeCycle, got {:?}", other),
    }
}

#[test]
fn test_write_outputs_produces_all_three_files() {
    let dir = tempdir().unwrap();
    let main = write(dir.path(), "main.s8", ".org\nHALT\n");
    let out = dir.path().join("prog.bin");

    let asm = assemble_file(&main).unwrap();
    sophia8_assembler::write_outputs(&asm, &out).unwrap();

    let bin = fs::read(&out).unwrap();
    assert_eq!(bin.len(), MEM_SIZE);
    assert_eq!(&bin[0..3], &[0x07, 0x00, 0x03]);

    let deb = fs::read_to_string(dir.path().join("prog.deb")).unwrap();
    assert!(deb.contains("; Binary:"));
    assert!(deb.contains("CODE"));
    assert!(deb.contains("07 00 03"));

    let pre = fs::read_to_string(dir.path().join("prog.pre.s8")).unwrap();
    assert!(pre.contains("; ===== BEGIN FILE:"));
    assert!(pre.contains(";@ "));
    assert!(pre.contains("\nHALT\n"));
}

#[test]
fn test_reassembly_is_byte_identical_including_sidecars() {
    let dir = tempdir().unwrap();
    write(dir.path(), "lib.s8", "NOP\n");
    let main = write(
        dir.path(),
        "main.s8",
        ".org 0x0500\n.include \"lib.s8\"\n.org\nHALT\n",
    );
    let out = dir.path().join("prog.bin");

    let a = assemble_file(&main).unwrap();
    sophia8_assembler::write_outputs(&a, &out).unwrap();
    let bin1 = fs::read(&out).unwrap();
    let deb1 = fs::read(dir.path().join("prog.deb")).unwrap();
    let pre1 = fs::read(dir.path().join("prog.pre.s8")).unwrap();

    let b = assemble_file(&main).unwrap();
    sophia8_assembler::write_outputs(&b, &out).unwrap();
    assert_eq!(bin1, fs::read(&out).unwrap());
    assert_eq!(deb1, fs::read(dir.path().join("prog.deb")).unwrap());
    assert_eq!(pre1, fs::read(dir.path().join("prog.pre.s8")).unwrap());
}
