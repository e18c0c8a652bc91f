//! Persistence for populations and run output.
//!
//! Checkpoints use bincode for binary serialization and LZ4 for
//! compression, behind a 4-byte magic and a format version. The run's best
//! program is written as a JSON document carrying its symbolic form plus
//! fitness metadata, so it can be inspected and reloaded against a registry.

use crate::gp::sexpr;
use crate::gp::symbols::Registry;
use crate::gp::tree::Program;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Magic bytes for file format identification.
const MAGIC: &[u8; 4] = b"ARBR";

/// Current format version.
const VERSION: u8 = 1;

/// Evolution checkpoint containing the population and run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Generation number at the time of saving.
    pub generation: u32,
    /// The population, with whatever fitness was last assigned.
    pub population: Vec<Program>,
    /// Best fitness seen so far in the run.
    pub best_fitness: f64,
    /// Seed the run was started with.
    pub rng_seed: u64,
}

/// Save a checkpoint with compression.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn save_checkpoint(checkpoint: &Checkpoint, path: &Path) -> io::Result<()> {
    let encoded = bincode::serialize(checkpoint)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let compressed = lz4_flex::compress_prepend_size(&encoded);

    let mut file = fs::File::create(path)?;
    file.write_all(MAGIC)?;
    file.write_all(&[VERSION])?;
    file.write_all(&compressed)?;
    Ok(())
}

/// Load a checkpoint.
///
/// # Errors
///
/// Returns an error if the file format is invalid or decompression fails.
pub fn load_checkpoint(path: &Path) -> io::Result<Checkpoint> {
    let mut file = fs::File::open(path)?;

    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "invalid file magic"));
    }

    let mut version = [0u8; 1];
    file.read_exact(&mut version)?;
    if version[0] != VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported version: {}", version[0]),
        ));
    }

    let mut compressed = Vec::new();
    file.read_to_end(&mut compressed)?;
    let decompressed = lz4_flex::decompress_size_prepended(&compressed)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    bincode::deserialize(&decompressed).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Path of the checkpoint file for a generation.
#[must_use]
pub fn checkpoint_path(output_dir: &Path, generation: u32) -> PathBuf {
    output_dir.join(format!("gen_{generation:05}.bin"))
}

/// Path of the best-program file within an output directory.
#[must_use]
pub fn best_program_path(output_dir: &Path) -> PathBuf {
    output_dir.join("best.json")
}

/// The run's best program in interchange form, with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestProgram {
    /// Generation the program first appeared in.
    pub generation: u32,
    /// Fitness assigned when it was found.
    pub fitness: f64,
    /// Symbolic program form (see [`crate::gp::to_json`]).
    pub program: serde_json::Value,
}

/// Write a program as a best-program JSON document.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn save_best_program(
    program: &Program,
    registry: &Registry,
    generation: u32,
    path: &Path,
) -> io::Result<()> {
    let doc = BestProgram {
        generation,
        fitness: program.score(),
        program: sexpr::to_json(&program.root, registry),
    };
    let json = serde_json::to_string_pretty(&doc)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}

/// Load a best-program document back into a program.
///
/// The symbolic form is resolved against the given registry; the recorded
/// fitness is kept on the program.
///
/// # Errors
///
/// Returns an error if the file is missing, malformed, or names symbols the
/// registry lacks.
pub fn load_best_program(path: &Path, registry: &Registry) -> io::Result<Program> {
    let json = fs::read_to_string(path)?;
    let doc: BestProgram = serde_json::from_str(&json)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let root = sexpr::from_json(&doc.program, registry)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    Ok(Program {
        root,
        fitness: Some(doc.fitness),
    })
}
