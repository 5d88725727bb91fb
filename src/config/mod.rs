// src/config/mod.rs

//! Declarative pipeline descriptions.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a pipeline file from disk (`loader.rs`).
//! - Validate references and acyclicity (`validate.rs`).
//!
//! The core scheduler does not depend on this module; it exists for
//! callers who prefer describing a pipeline in a file over driving the
//! [`crate::schedule::Scheduler`] API directly.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ActionConfig, KindConfig, PipelineFile, RegionConfig};
pub use validate::validate_pipeline;
