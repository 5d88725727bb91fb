// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::model::PipelineFile;
use crate::config::validate::validate_pipeline;

/// Load a pipeline description from a given path.
///
/// This only performs TOML deserialization; it does **not** perform
/// semantic validation (reference resolution, cycle checks). Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<PipelineFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading pipeline file at {:?}", path))?;

    let pipeline: PipelineFile = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML pipeline from {:?}", path))?;

    Ok(pipeline)
}

/// Load a pipeline description and run semantic validation.
///
/// This is the recommended entry point: everything that passes it can be
/// handed to [`PipelineFile::build`] and scheduled, with only the
/// schedule-time error classes (satisfaction loops, inconsistent filter
/// orders) left to surface.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PipelineFile> {
    let pipeline = load_from_path(&path)?;
    validate_pipeline(&pipeline)?;
    Ok(pipeline)
}

/// Default pipeline file path: `Pipeline.toml` in the current working
/// directory.
pub fn default_pipeline_path() -> PathBuf {
    PathBuf::from("Pipeline.toml")
}
