//! Compilation database handling.
//!
//! Loads a `compile_commands.json` file, or generates one in a build
//! directory via ninja before loading it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::PlocError;
use crate::Result;

/// One compilation-database entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CompileCommand {
    /// Working directory for the compile.
    pub directory: String,
    /// Full compiler invocation.
    pub command: String,
    /// Path to the source file as referenced in the invocation.
    pub file: String,
}

/// Load a compilation database from the given path.
pub fn load_compile_commands(path: &Path) -> Result<Vec<CompileCommand>> {
    let data = fs::read_to_string(path).map_err(|source| PlocError::CompileCommandsRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| PlocError::CompileCommandsJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Generate a compilation database in the given build directory and return
/// its path.
///
/// Runs `ninja -t compdb` to emit the database, then `autoninja` to bring
/// generated sources up to date. Both are best-effort; their exit statuses
/// are not inspected.
pub fn generate_compile_commands(build_dir: &Path, out: &mut dyn Write) -> Result<PathBuf> {
    if !build_dir.is_dir() {
        return Err(PlocError::BuildDirNotFound(build_dir.to_path_buf()));
    }
    let db = build_dir.join("compile_commands.json");
    writeln!(out, "Generating compile commands in {}.", db.display())?;

    let compdb = format!(
        "ninja -C {} -t compdb cxx cc > {}",
        build_dir.display(),
        db.display()
    );
    let _ = Command::new("sh").arg("-c").arg(&compdb).status();
    let autoninja = format!("autoninja -C {}", build_dir.display());
    let _ = Command::new("sh").arg("-c").arg(&autoninja).status();

    Ok(db)
}
