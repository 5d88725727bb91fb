// src/registry/relations.rs

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::action::{Action, ActionKind};
use crate::errors::{Result, ScheduleError};

/// Records "action A is satisfied by (rendered unnecessary by) action B"
/// facts.
///
/// Two origins: an action defining several outputs registers each
/// secondary output as satisfied by the primary, and filters may be
/// explicitly declared to subsume other filters. The filter side of the
/// map is closed transitively once before scheduling; the variable side is
/// resolved lazily, one substitution at a time, during expansion.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    satisfied_by: BTreeMap<Action, BTreeSet<Action>>,
}

impl Relations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `filter` also satisfies the condition of each filter
    /// named in `satisfied`.
    pub fn declare_filter_satisfies<I, S>(&mut self, filter: &str, satisfied: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in satisfied {
            self.satisfied_by
                .entry(Action::filter(name))
                .or_default()
                .insert(Action::filter(filter));
        }
    }

    /// Declare that the variable action `primary` defines every name in
    /// `outputs` as a secondary output.
    pub fn declare_multi_output<I, S>(&mut self, primary: &str, outputs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in outputs {
            self.satisfied_by
                .entry(Action::variable(name))
                .or_default()
                .insert(Action::variable(primary));
        }
    }

    /// The full satisfied-by set of an action, if it has one.
    pub fn satisfied_by(&self, action: &Action) -> Option<&BTreeSet<Action>> {
        self.satisfied_by.get(action)
    }

    /// If `action` is covered by `candidates`, return the covering action:
    /// `action` itself when `consider_self` and it is a candidate, else the
    /// least element of the intersection between its satisfied-by set and
    /// `candidates`.
    pub fn satisfier(
        &self,
        action: &Action,
        candidates: &BTreeSet<Action>,
        consider_self: bool,
    ) -> Option<Action> {
        if consider_self && candidates.contains(action) {
            return Some(action.clone());
        }
        self.satisfied_by
            .get(action)?
            .intersection(candidates)
            .next()
            .cloned()
    }

    /// Close the filter side of the relation transitively, so that a chain
    /// "A satisfies B satisfies C" collapses to both A and B directly
    /// satisfying C. Fails on a cycle, reporting the chain that produced it
    /// (this is also where a filter declared to satisfy itself is caught).
    pub fn close_transitively(&mut self) -> Result<()> {
        let keys: Vec<Action> = self
            .satisfied_by
            .keys()
            .filter(|a| a.kind == ActionKind::Filter)
            .cloned()
            .collect();
        let mut done = BTreeSet::new();
        for key in keys {
            let mut stack = Vec::new();
            self.close_one(&key, &mut stack, &mut done)?;
        }
        Ok(())
    }

    fn close_one(
        &mut self,
        action: &Action,
        stack: &mut Vec<Action>,
        done: &mut BTreeSet<Action>,
    ) -> Result<()> {
        if done.contains(action) {
            return Ok(());
        }
        if stack.contains(action) {
            let mut chain = stack.clone();
            chain.push(action.clone());
            return Err(ScheduleError::SatisfactionLoop { chain });
        }
        stack.push(action.clone());

        // Snapshot before descending: the real set grows as satisfiers of
        // our satisfiers are folded in.
        let direct: Vec<Action> = self
            .satisfied_by
            .get(action)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        for satisfier in direct {
            if satisfier.kind != ActionKind::Filter {
                continue;
            }
            if self.satisfied_by.contains_key(&satisfier) {
                self.close_one(&satisfier, stack, done)?;
                let inherited = self.satisfied_by[&satisfier].clone();
                trace!(action = %action, via = %satisfier, "folding in transitive satisfiers");
                if let Some(set) = self.satisfied_by.get_mut(action) {
                    set.extend(inherited);
                }
            }
        }

        stack.pop();
        done.insert(action.clone());
        Ok(())
    }

    /// Given the set of filters collected while expanding one action, map
    /// every filter that is satisfied by another member of the set (never
    /// by itself) to its strongest known replacement. Chains are resolved
    /// so that no value is itself a key.
    pub fn replacement_map(&self, filters: &BTreeSet<Action>) -> BTreeMap<Action, Action> {
        let mut map: BTreeMap<Action, Action> = BTreeMap::new();
        for action in filters {
            if let Some(by) = self.satisfier(action, filters, false) {
                debug!(weak = %action, strong = %by, "redundant filter");
                // Anything already replacing *to* this action must follow
                // it to the new satisfier.
                for value in map.values_mut() {
                    if value == action {
                        *value = by.clone();
                    }
                }
                map.insert(action.clone(), by);
            }
        }
        // Resolve remaining chains (weak -> strong -> stronger). The
        // relation is acyclic after `close_transitively`, so this
        // terminates.
        let keys: Vec<Action> = map.keys().cloned().collect();
        for key in keys {
            let mut value = map[&key].clone();
            while let Some(next) = map.get(&value) {
                value = next.clone();
            }
            map.insert(key, value);
        }
        map
    }
}
