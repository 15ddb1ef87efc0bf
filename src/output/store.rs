use crate::error::OutputError;
use crate::parser::Perspective;
use crate::reducer::{Stance, StratifiedResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The full perspective set for one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    #[serde(default)]
    pub input: String,
    pub perspectives: Vec<Perspective>,
}

/// Write `output.json`. Readers never observe a partially written file.
pub fn write_run_output(path: &Path, output: &RunOutput) -> Result<(), OutputError> {
    let json = serde_json::to_vec_pretty(output)?;
    write_atomic(path, &json)
}

pub fn load_run_output(path: &Path) -> Result<RunOutput, OutputError> {
    let content = fs::read_to_string(path).map_err(|e| OutputError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Write one JSON array per stance into `dir`, returning the paths written.
pub fn write_stratified(dir: &Path, result: &StratifiedResult) -> Result<Vec<PathBuf>, OutputError> {
    fs::create_dir_all(dir).map_err(OutputError::CreateDir)?;

    let mut written = Vec::with_capacity(Stance::ALL.len());
    for stance in Stance::ALL {
        let path = dir.join(format!("{}.json", stance));
        let json = serde_json::to_vec_pretty(result.get(stance))?;
        write_atomic(&path, &json)?;
        written.push(path);
    }
    Ok(written)
}

/// Write through a temp file in the destination directory, then rename over.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(OutputError::CreateDir)?;

    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
