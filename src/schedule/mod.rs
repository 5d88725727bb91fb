// src/schedule/mod.rs

//! The scheduling core.
//!
//! - [`tree`] holds the arena-indexed schedule trees.
//! - [`raw`] merges region chains into the raw tree.
//! - [`expand`] resolves transitive dependencies per action.
//! - [`assemble`] interleaves the expanded chains into the final tree.
//!
//! [`Scheduler`] ties it together: callers register actions, declare
//! regions and satisfaction relations, then call [`Scheduler::schedule`]
//! once to obtain the merged execution tree.

mod assemble;
mod expand;
mod raw;
pub mod tree;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::action::{Action, ActionKind, DepMap};
use crate::errors::{Result, ScheduleError};
use crate::registry::{ActionRegistry, RegionDef, RegionSet, Relations};

pub use tree::{NodeId, ScheduleNode, ScheduleTree};

/// One pipeline's worth of declarations and the logic to turn them into an
/// execution tree.
///
/// A scheduler is a plain value: single-threaded, no interior mutability,
/// no I/O. [`Scheduler::schedule`] either runs to completion or fails with
/// a [`ScheduleError`]; there is no partial progress to observe.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    registry: ActionRegistry,
    regions: RegionSet,
    relations: Relations,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action with its direct dependencies.
    ///
    /// Dependencies need not exist yet; they are resolved at schedule
    /// time. Attach a cost with [`Action::with_cost`] before registering.
    pub fn register_action(
        &mut self,
        action: Action,
        dependencies: impl IntoIterator<Item = Action>,
    ) -> Result<()> {
        if action.kind == ActionKind::Filter && self.regions.contains(&action.name) {
            return Err(ScheduleError::FilterNameIsRegion(action.name));
        }
        self.registry
            .register(action, dependencies.into_iter().collect())
    }

    /// Declare a region as an ordered chain of filter names.
    ///
    /// If the first name is itself a region, its chain is spliced in as a
    /// prefix (one level, not recursive).
    pub fn declare_region<I, S>(&mut self, name: &str, filters: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.registry.contains(&Action::filter(name)) {
            return Err(ScheduleError::DuplicateRegion(name.to_string()));
        }
        self.regions
            .declare(name, filters.into_iter().map(Into::into).collect())
    }

    /// Attach a fill action to a region's endpoint.
    pub fn add_fill_to_region(&mut self, region: &str, fill: &str) -> Result<()> {
        self.regions.add_fill(region, fill)
    }

    /// Declare that `filter` subsumes each filter named in `satisfied`.
    pub fn declare_filter_satisfies<I, S>(&mut self, filter: &str, satisfied: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.declare_filter_satisfies(filter, satisfied);
    }

    /// Declare that the variable action `primary` also defines each name
    /// in `outputs`.
    pub fn declare_multi_output_variable<I, S>(&mut self, primary: &str, outputs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.declare_multi_output(primary, outputs);
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    /// The declared regions.
    pub fn region_defs(&self) -> &BTreeMap<String, RegionDef> {
        self.regions.defs()
    }

    /// Direct dependencies of a registered action.
    pub fn dependencies_of(&self, action: &Action) -> Result<&BTreeSet<Action>> {
        self.registry.dependencies(action)
    }

    /// Registered cost of an action.
    pub fn cost_of(&self, action: &Action) -> Result<f32> {
        self.registry.cost(action)
    }

    /// Fully expand one action's transitive dependencies against the
    /// current registry and relations. Pure: identical inputs give an
    /// identical map.
    pub fn expand_action(
        &self,
        action: &Action,
        pre_existing: &BTreeSet<Action>,
    ) -> Result<DepMap> {
        expand::expand(action, self, pre_existing, &mut Vec::new())
    }

    /// Build the full schedule.
    ///
    /// `pre_existing` names inputs that are available without computation
    /// (dataset columns, say); each is treated as an already-satisfied
    /// variable. Returns the root of the merged, ordered tree.
    pub fn schedule<I, S>(&mut self, pre_existing: I) -> Result<ScheduleTree>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.close_transitively()?;
        let raw = raw::build_raw_tree(&self.regions)?;
        let pre: BTreeSet<Action> = pre_existing
            .into_iter()
            .map(|name| Action::variable(name))
            .collect();
        debug!(
            regions = self.regions.defs().len(),
            pre_existing = pre.len(),
            "assembling schedule"
        );
        let tree = assemble::Assembler::new(&*self, raw).run(pre)?;
        info!(nodes = tree.node_count(), "schedule complete");
        Ok(tree)
    }
}
