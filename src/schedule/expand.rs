// src/schedule/expand.rs

//! Recursive dependency expansion.
//!
//! For one action, resolve its full transitive dependency set against the
//! registry and the satisfaction relations, producing a map from every
//! involved action (cost-ordered) to its remaining direct dependencies.
//! The map always contains an entry for the expanded action itself, which
//! is what guarantees the assembler a ready entry at every step.
//!
//! This is a pure function of registry + relations + `pre_existing`:
//! expanding the same action twice against unchanged state yields an
//! identical map.

use std::collections::BTreeSet;

use tracing::trace;

use crate::action::{Action, ActionKind, ByCost, DepMap};
use crate::errors::{Result, ScheduleError};
use crate::schedule::Scheduler;

/// Expand `action`, skipping anything covered by `pre_existing`.
///
/// `processing` is the stack of actions currently being expanded above
/// this call; meeting one of them again is a circular dependency.
pub(crate) fn expand(
    action: &Action,
    scheduler: &Scheduler,
    pre_existing: &BTreeSet<Action>,
    processing: &mut Vec<Action>,
) -> Result<DepMap> {
    if processing.contains(action) {
        return Err(ScheduleError::CircularDependency {
            kind: action.kind,
            name: action.name.clone(),
        });
    }

    // A variable with no registry entry may still be reachable as the
    // secondary output of another action: substitute through the
    // satisfied-by map until a registered action turns up.
    let mut resolved = action.clone();
    if action.kind == ActionKind::Variable {
        let mut seen: Vec<Action> = Vec::new();
        while !scheduler.registry().contains(&resolved) {
            if seen.contains(&resolved) {
                seen.push(resolved);
                return Err(ScheduleError::SatisfactionLoop { chain: seen });
            }
            seen.push(resolved.clone());
            let substitute = scheduler
                .relations()
                .satisfied_by(&resolved)
                .and_then(|set| set.iter().next().cloned())
                .ok_or_else(|| ScheduleError::UndefinedAction {
                    kind: resolved.kind,
                    name: resolved.name.clone(),
                })?;
            trace!(wanted = %resolved, using = %substitute, "satisfaction substitution");
            resolved = substitute;
        }
        // Substitution can land on an action already being expanded,
        // e.g. a variable depending on one of its own outputs.
        if resolved != *action && processing.contains(&resolved) {
            return Err(ScheduleError::CircularDependency {
                kind: resolved.kind,
                name: resolved.name.clone(),
            });
        }
    }
    resolved.cost = scheduler.registry().cost(&resolved)?;

    let mut output = DepMap::new();
    // Make sure the action gets an entry even with no dependencies at all.
    output.entry(ByCost(resolved.clone())).or_default();
    processing.push(resolved.clone());

    // Filters met along the way, for the redundancy pass below.
    let mut filters: BTreeSet<Action> = BTreeSet::new();
    let mut direct: BTreeSet<Action> = BTreeSet::new();
    let declared = scheduler.registry().dependencies(&resolved)?.clone();
    for dep in declared {
        if let Some(by) = scheduler.relations().satisfier(&dep, pre_existing, true) {
            trace!(dep = %dep, by = %by, "dependency already covered");
            continue;
        }
        if dep.kind == ActionKind::Filter {
            filters.insert(dep.clone());
        }
        direct.insert(dep.clone());
        let expanded = expand(&dep, scheduler, pre_existing, processing)?;
        for (key, blockers) in expanded {
            if key.0.kind == ActionKind::Filter {
                filters.insert(key.0.clone());
            }
            // First entry wins; duplicates are identical by construction.
            output.entry(key).or_insert(blockers);
        }
    }
    processing.pop();

    if let Some(own) = output.get_mut(&ByCost(resolved.clone())) {
        *own = direct;
    }

    // Collapse redundant filters: drop each weak filter's own entry and
    // rewrite it to its replacement wherever it blocks something else.
    let replacements = scheduler.relations().replacement_map(&filters);
    for (weak, strong) in &replacements {
        output.retain(|key, _| key.0 != *weak);
        for blockers in output.values_mut() {
            if blockers.remove(weak) {
                blockers.insert(strong.clone());
            }
        }
    }
    Ok(output)
}
