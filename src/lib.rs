// src/lib.rs

//! `cutdag` — a dependency-aware action scheduler for analysis pipelines.
//!
//! Callers register three kinds of action — *filters* (selections that
//! gate downstream work), *variables* (pure derived quantities) and
//! *fills* (terminal accumulations) — each with explicit dependencies and
//! a cost estimate, and declare named *regions* as ordered filter chains.
//! [`Scheduler::schedule`] merges everything into a single execution tree
//! that shares common prefixes across regions, orders variable
//! dependencies cheapest-first, eliminates filters subsumed by stronger
//! ones and rejects unsatisfiable or circular requests before any real
//! work is attempted.
//!
//! The crate never executes actions: consumers walk the returned
//! [`ScheduleTree`] and run each node's action themselves, in
//! parent-to-child order. Each action appears exactly once in the tree,
//! which is what lets an execution layer parallelise per-branch work.

pub mod action;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod registry;
pub mod schedule;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;

pub use crate::action::{Action, ActionKind};
pub use crate::errors::ScheduleError;
pub use crate::schedule::{NodeId, ScheduleNode, ScheduleTree, Scheduler};

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the pipeline file, builds a scheduler from it,
/// schedules, and prints the resulting tree.
pub fn run(args: CliArgs) -> Result<()> {
    let pipeline =
        load_and_validate(&args.config).with_context(|| format!("loading {}", args.config))?;
    let mut scheduler = pipeline.build()?;

    let inputs: Vec<String> = pipeline
        .inputs
        .iter()
        .cloned()
        .chain(args.inputs.iter().cloned())
        .collect();
    info!(pipeline = %args.config, inputs = inputs.len(), "scheduling");

    let tree = scheduler
        .schedule(inputs)
        .with_context(|| format!("scheduling pipeline from {}", args.config))?;

    print_tree(&tree);
    if args.used_variables {
        println!();
        println!("used variables:");
        for name in tree.used_variables() {
            println!("  - {name}");
        }
    }
    Ok(())
}

/// Indented listing of a schedule tree, with region labels.
fn print_tree(tree: &ScheduleTree) {
    for (id, depth) in tree.walk() {
        let node = tree.node(id);
        let indent = "  ".repeat(depth);
        let mut line = format!("{indent}{} [{}", node.action.name, node.action.kind);
        if node.action.cost != 0.0 {
            line.push_str(&format!(", cost {}", node.action.cost));
        }
        line.push(']');
        if let Some(region) = &node.region {
            line.push_str(&format!(" (region: {region})"));
        }
        println!("{line}");
    }
}
