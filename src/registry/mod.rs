// src/registry/mod.rs

//! Declaration-time state of a pipeline.
//!
//! - [`actions`] stores every registered action with its direct
//!   dependencies and cost.
//! - [`regions`] stores the named filter chains and their fills.
//! - [`relations`] records which actions satisfy (render unnecessary)
//!   which others.

pub mod actions;
pub mod regions;
pub mod relations;

pub use actions::ActionRegistry;
pub use regions::{RegionDef, RegionSet};
pub use relations::Relations;
