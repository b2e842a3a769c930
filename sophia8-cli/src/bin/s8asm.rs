//! `s8asm` - the Sophia8 assembler front end.
//!
//! Assembles an entry file into a full memory image and always writes
//! the preprocessed dump and debug map next to the output.
//!
//! Exit codes: 0 on success, 1 on assembly error, 2 on usage error.

use clap::Parser;
use sophia8_assembler::{assemble_file, write_outputs};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "s8asm",
    about = "Sophia8 Assembler",
    after_help = "\
What it produces:
  <output.bin>     Full 0xFFFF-byte memory image (0x0000..0xFFFE), zero-filled
  <output.pre.s8>  Fully preprocessed source (.include expanded) with ';@ file:line' markers
  <output.deb>     Debug map used by sophia8 for file:line breakpoints

Key rules (strict):
  - Implicit entry stub at 0x0000..0x0002: JMP <entry>. User code/data must start >= 0x0003
  - .org <addr> sets absolute location (numeric literal only); .org (no operand) marks entry (once)
  - .include is textual, include-once is enforced, include cycles are errors
  - Labels are global and case-sensitive; duplicates and undefined labels are errors
  - .byte: numeric literals only; .word: literals or labels; .string: 7-bit ASCII with escapes
  - Any overlapping emission is an error"
)]
struct Args {
    /// Input assembly file
    input: PathBuf,

    /// Output image file
    #[arg(short, long, default_value = "sophia8_image.bin")]
    output: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let assembly = match assemble_file(&args.input) {
        Ok(assembly) => assembly,
        Err(e) => {
            eprint!("{}", e.report());
            return ExitCode::from(1);
        }
    };

    if let Err(e) = write_outputs(&assembly, &args.output) {
        eprintln!("ERROR: {}", e);
        return ExitCode::from(1);
    }

    println!(
        "OK: wrote {} bytes to {}",
        assembly.image.len(),
        args.output.display()
    );
    ExitCode::SUCCESS
}
