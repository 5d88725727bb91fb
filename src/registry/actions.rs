// src/registry/actions.rs

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::action::Action;
use crate::errors::{Result, ScheduleError};

/// Reserved for the root node of every schedule tree.
pub const ROOT_NAME: &str = "ROOT";

/// Store of every declared action, keyed by `(kind, name)`.
///
/// The key itself carries the registered cost (identity comparison ignores
/// it), so a cost lookup is a key retrieval. Dependency sets are stored
/// verbatim: nothing checks at registration time that a dependency exists,
/// because dependencies may legitimately name actions registered later or
/// actions only reachable through satisfaction relations. Unresolvable
/// references surface as errors during expansion instead.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    entries: BTreeMap<Action, BTreeSet<Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action together with its direct dependencies.
    pub fn register(&mut self, action: Action, dependencies: BTreeSet<Action>) -> Result<()> {
        if action.name.is_empty() {
            return Err(ScheduleError::EmptyActionName(action.kind));
        }
        if action.name == ROOT_NAME {
            return Err(ScheduleError::ReservedActionName(action.kind));
        }
        if self.entries.contains_key(&action) {
            return Err(ScheduleError::DuplicateAction {
                kind: action.kind,
                name: action.name,
            });
        }
        debug!(action = %action, deps = dependencies.len(), "registering action");
        self.entries.insert(action, dependencies);
        Ok(())
    }

    /// Whether `(kind, name)` has a registry entry.
    pub fn contains(&self, action: &Action) -> bool {
        self.entries.contains_key(action)
    }

    /// Direct dependencies of a registered action.
    pub fn dependencies(&self, action: &Action) -> Result<&BTreeSet<Action>> {
        self.entries
            .get(action)
            .ok_or_else(|| ScheduleError::UndefinedAction {
                kind: action.kind,
                name: action.name.clone(),
            })
    }

    /// The cost recorded at registration time.
    pub fn cost(&self, action: &Action) -> Result<f32> {
        self.entries
            .get_key_value(action)
            .map(|(stored, _)| stored.cost)
            .ok_or_else(|| ScheduleError::UndefinedAction {
                kind: action.kind,
                name: action.name.clone(),
            })
    }

    /// Iterate over every registered action.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.entries.keys()
    }
}
