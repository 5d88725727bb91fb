// src/schedule/assemble.rs

//! Final tree assembly.
//!
//! `add_children` merges a set of expanded source nodes (from the raw
//! tree) under a target node of the output tree: ready variables are
//! chained in ahead of everything, cheapest first; the remaining sources
//! are grouped by the filter or fill they want next; resolved sources hand
//! their own children up for re-expansion against the grown pre-existing
//! set; then the whole thing recurses per group. Every source owns its
//! working dependency map, so draining one sibling never aliases another.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::action::{Action, ActionKind, ByCost};
use crate::errors::{Result, ScheduleError};
use crate::registry::actions::ROOT_NAME;
use crate::schedule::Scheduler;
use crate::schedule::expand::expand;
use crate::schedule::tree::{NodeId, ScheduleTree};

pub(crate) struct Assembler<'s> {
    scheduler: &'s Scheduler,
    /// The raw tree; node payloads are drained as sources are consumed.
    raw: ScheduleTree,
    /// The full tree under construction.
    out: ScheduleTree,
}

impl<'s> Assembler<'s> {
    pub(crate) fn new(scheduler: &'s Scheduler, raw: ScheduleTree) -> Self {
        Self {
            scheduler,
            raw,
            out: ScheduleTree::new(Action::filter(ROOT_NAME)),
        }
    }

    /// Expand the raw root's children and merge them into the output tree.
    pub(crate) fn run(mut self, pre_existing: BTreeSet<Action>) -> Result<ScheduleTree> {
        let sources: Vec<NodeId> = self.raw.children(self.raw.root()).to_vec();
        for &id in &sources {
            let action = self.raw[id].action.clone();
            let deps = expand(&action, self.scheduler, &pre_existing, &mut Vec::new())?;
            self.raw.node_mut(id).deps = deps;
        }
        let target = self.out.root();
        self.add_children(sources, target, pre_existing)?;
        Ok(self.out)
    }

    fn add_children(
        &mut self,
        sources: Vec<NodeId>,
        target: NodeId,
        mut pre_existing: BTreeSet<Action>,
    ) -> Result<()> {
        if sources.is_empty() {
            return Ok(());
        }

        // A source filter that is already covered here means the request
        // was inconsistent: it was declared with its own explicit position
        // in a region chain, and something else got there first.
        for &id in &sources {
            let action = &self.raw[id].action;
            if action.kind == ActionKind::Filter
                && let Some(by) = self
                    .scheduler
                    .relations()
                    .satisfier(action, &pre_existing, true)
            {
                return Err(ScheduleError::FilterAlreadyScheduled {
                    name: action.name.clone(),
                    satisfied_by: (by != *action).then(|| by.name),
                });
            }
        }

        // Chain in every ready variable, cheapest first, descending the
        // target as we go. Placing one variable can make another ready, so
        // rescan until none is left.
        let mut current = target;
        loop {
            let mut best: Option<Action> = None;
            for &id in &sources {
                let next = self.raw[id].next_ready()?;
                if next.kind != ActionKind::Variable {
                    continue;
                }
                let better = match &best {
                    None => true,
                    Some(b) => ByCost(next.clone()) < ByCost(b.clone()),
                };
                if better {
                    best = Some(next.clone());
                }
            }
            let Some(variable) = best else { break };
            trace!(variable = %variable, "placing ready variable");
            current = self.out.add_child(current, variable.clone());
            pre_existing.insert(variable.clone());
            for &id in &sources {
                self.raw
                    .node_mut(id)
                    .remove_dependency(&variable, self.scheduler.relations());
            }
        }

        // Every source now wants a filter or fill next; group by it.
        let mut grouped: BTreeMap<Action, Vec<NodeId>> = BTreeMap::new();
        for id in sources {
            let next = self.raw[id].next_ready()?.clone();
            grouped.entry(next).or_default().push(id);
        }

        for (action, group) in grouped {
            debug!(action = %action, sources = group.len(), "placing action");
            let new_child = self.out.add_child(current, action.clone());
            let mut remaining: Vec<NodeId> = Vec::new();
            let mut hoisted: Vec<NodeId> = Vec::new();
            for id in group {
                self.raw
                    .node_mut(id)
                    .remove_dependency(&action, self.scheduler.relations());
                let node = self.raw.node_mut(id);
                if node.deps.is_empty() {
                    // Fully resolved: this output node *is* the source's
                    // action. Carry its region label over and hand its
                    // children up to be scheduled beneath it.
                    if let Some(region) = node.region.take() {
                        let slot = &mut self.out.node_mut(new_child).region;
                        if let Some(existing) = slot {
                            return Err(ScheduleError::IdenticalRegionsResolved {
                                first: existing.clone(),
                                second: region,
                            });
                        }
                        *slot = Some(region);
                    }
                    hoisted.extend(std::mem::take(&mut node.children));
                } else {
                    remaining.push(id);
                }
            }

            let mut next_pre = pre_existing.clone();
            next_pre.insert(action.clone());
            // Hoisted children were never expanded (or were expanded
            // against a smaller pre-existing set); redo them here.
            for &child in &hoisted {
                let child_action = self.raw[child].action.clone();
                let deps = expand(&child_action, self.scheduler, &next_pre, &mut Vec::new())?;
                self.raw.node_mut(child).deps = deps;
            }
            let mut next_sources = remaining;
            next_sources.extend(hoisted);
            self.add_children(next_sources, new_child, next_pre)?;
        }
        Ok(())
    }
}
