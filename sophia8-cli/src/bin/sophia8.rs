//! `sophia8` - the Sophia8 virtual machine front end.
//!
//! ```text
//! sophia8                                      run built-in self-test
//! sophia8 <image.bin>                          load and run
//! sophia8 <program.deb>                        load map, then its bin, run
//! sophia8 <program.deb> <file> <line>          run to breakpoint
//! sophia8 debug.img                            resume from snapshot
//! sophia8 debug.img <program.deb> <file> <line>  resume with new breakpoint
//! ```
//!
//! Exit codes: 0 on normal halt, 1 on breakpoint setup failure, 2 on
//! usage error.

use clap::Parser;
use sophia8_runtime::{
    breakpoint, dump_memory, self_test_code, snapshot, Console, RuntimeError, Vm,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "sophia8",
    about = "Sophia8 Virtual Machine",
    after_help = "\
Arguments:
  (none)                                   Run the built-in self-test
  <image.bin>                              Load a raw memory image and run
  <program.deb>                            Load a debug map, then its binary, and run
  <program.deb> <file> <line>              Run until the source line is reached
  debug.img                                Resume from a snapshot
  debug.img <program.deb> <file> <line>    Resume with a new breakpoint"
)]
struct Args {
    /// Image, debug map or snapshot, optionally followed by a
    /// breakpoint location
    #[arg(num_args = 0..=4)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match dispatch(&args.args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Usage(msg)) => {
            eprintln!("ERROR: {}", msg);
            ExitCode::from(2)
        }
        Err(Failure::Runtime(e)) => {
            eprintln!("ERROR: {}", e);
            ExitCode::from(1)
        }
    }
}

enum Failure {
    Usage(String),
    Runtime(RuntimeError),
}

impl From<RuntimeError> for Failure {
    fn from(e: RuntimeError) -> Self {
        Failure::Runtime(e)
    }
}

fn dispatch(args: &[String]) -> Result<(), Failure> {
    match args {
        [] => self_test(),
        [file] => run_single(Path::new(file)),
        [file, source, line] => {
            let line = parse_line(line)?;
            run_with_breakpoint(Path::new(file), None, source, line)
        }
        [snap, deb, source, line] => {
            let line = parse_line(line)?;
            run_with_breakpoint(Path::new(deb), Some(Path::new(snap)), source, line)
        }
        _ => Err(Failure::Usage(
            "expected at most 4 arguments (see --help)".to_string(),
        )),
    }
}

fn parse_line(text: &str) -> Result<u32, Failure> {
    text.parse()
        .map_err(|_| Failure::Usage(format!("invalid line number: {}", text)))
}

/// No arguments: run the instruction-exercise program over HALT-filled
/// memory, then dump memory and registers.
fn self_test() -> Result<(), Failure> {
    let mut vm = Vm::new(Console::new());
    let code = self_test_code();
    vm.memory.ram_mut()[..code.len()].copy_from_slice(&code);
    vm.run()?;
    println!("{}", dump_memory(&vm.memory));
    println!("{}", vm.state.dump());
    Ok(())
}

/// One argument: a snapshot resumes, a debug map locates its binary,
/// anything else is a raw image.
fn run_single(path: &Path) -> Result<(), Failure> {
    let bytes = std::fs::read(path).map_err(RuntimeError::from)?;

    let mut vm = Vm::new(Console::new());
    if snapshot::is_snapshot(&bytes) {
        let (state, memory) = snapshot::read(&bytes)?;
        vm.resume_from(state, memory);
    } else if path.extension().is_some_and(|e| e == "deb") {
        let image = image_for_map(path)?;
        vm.load_image(&image)?;
    } else {
        vm.load_image(&bytes)?;
    }
    vm.run()?;
    Ok(())
}

/// Run (or resume) to a `file:line` breakpoint described by a debug map.
fn run_with_breakpoint(
    deb: &Path,
    snapshot_file: Option<&Path>,
    source: &str,
    line: u32,
) -> Result<(), Failure> {
    let map = breakpoint::load_map(deb)?;
    let bp = breakpoint::resolve(&map, source, line)?;

    let mut vm = Vm::new(Console::new());
    match snapshot_file {
        Some(snap) => {
            let (state, memory) = snapshot::load(snap)?;
            vm.resume_from(state, memory);
        }
        None => {
            let image = image_for_map(deb)?;
            vm.load_image(&image)?;
        }
    }
    vm.set_breakpoint(bp);
    vm.run()?;
    Ok(())
}

/// Locate and read the binary a debug map was written for. A relative
/// `; Binary:` path resolves against the map's directory.
fn image_for_map(deb: &Path) -> Result<Vec<u8>, Failure> {
    let map = breakpoint::load_map(deb)?;
    let binary = map.binary.ok_or_else(|| {
        RuntimeError::InvalidDebFile(
            deb.display().to_string(),
            "no '; Binary:' header".to_string(),
        )
    })?;

    let mut path = PathBuf::from(&binary);
    if path.is_relative() {
        if let Some(dir) = deb.parent() {
            path = dir.join(path);
        }
    }
    Ok(std::fs::read(&path).map_err(RuntimeError::from)?)
}
