//! Assembly driver: preprocessing, both passes and output files.

use crate::emit::emit;
use crate::error::Result;
use crate::layout::layout;
use crate::preprocess::{preprocess, render_preprocessed, SourceLine};
use sophia8_spec::{DebugMap, DebugRecord};
use std::path::{Path, PathBuf};

/// A finished assembly job.
#[derive(Clone, Debug)]
pub struct Assembly {
    /// Full 65 535-byte memory image.
    pub image: Vec<u8>,
    /// Debug records, in emission order.
    pub records: Vec<DebugRecord>,
    /// The flattened source stream the image was built from.
    pub lines: Vec<SourceLine>,
    /// Resolved entry address.
    pub entry: u16,
}

/// Assemble an already-preprocessed line stream.
pub fn assemble_lines(lines: Vec<SourceLine>) -> Result<Assembly> {
    let layout = layout(&lines)?;
    let emission = emit(&layout)?;
    Ok(Assembly {
        image: emission.image,
        records: emission.records,
        lines,
        entry: emission.entry,
    })
}

/// Preprocess and assemble an entry file.
pub fn assemble_file(input: &Path) -> Result<Assembly> {
    let lines = preprocess(input)?;
    assemble_lines(lines)
}

/// Sidecar path for the debug map: `prog.bin` -> `prog.deb`.
pub fn debug_map_path(output: &Path) -> PathBuf {
    output.with_extension("deb")
}

/// Sidecar path for the preprocessed dump: `prog.bin` -> `prog.pre.s8`.
pub fn preprocessed_path(output: &Path) -> PathBuf {
    output.with_extension("pre.s8")
}

/// Write the image plus both sidecar files next to `output`.
pub fn write_outputs(assembly: &Assembly, output: &Path) -> std::io::Result<()> {
    std::fs::write(
        preprocessed_path(output),
        render_preprocessed(&assembly.lines),
    )?;
    std::fs::write(output, &assembly.image)?;
    std::fs::write(
        debug_map_path(output),
        DebugMap::render(&assembly.records, &output.display().to_string()),
    )?;
    Ok(())
}
