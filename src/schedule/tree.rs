// src/schedule/tree.rs

//! Arena-indexed schedule trees.
//!
//! Both the raw tree (region prefix merge, no dependency information) and
//! the final tree share one node type. Nodes live in a `Vec` and refer to
//! their children by [`NodeId`], so moving subtrees around during assembly
//! is an index splice, never a deep copy. During full-schedule
//! construction a node additionally owns its working dependency map, which
//! is drained as ancestors are placed; in the final tree every map is
//! empty.

use std::collections::BTreeSet;
use std::ops::Index;

use crate::action::{Action, ActionKind, DepMap};
use crate::errors::{Result, ScheduleError};
use crate::registry::Relations;

/// Index of a node within its [`ScheduleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// "Perform this action, then do these children."
#[derive(Debug, Clone)]
pub struct ScheduleNode {
    pub action: Action,
    /// Set on the terminal filter of a region's chain.
    pub region: Option<String>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) deps: DepMap,
}

impl ScheduleNode {
    fn new(action: Action) -> Self {
        Self {
            action,
            region: None,
            children: Vec::new(),
            deps: DepMap::new(),
        }
    }

    /// The cheapest dependency with no remaining dependencies of its own:
    /// the next action eligible for scheduling on this node's behalf.
    ///
    /// Failing is a logic error, not a user error — a correctly expanded
    /// map always contains at least one ready entry (the node's own action
    /// becomes ready once everything else is placed).
    pub(crate) fn next_ready(&self) -> Result<&Action> {
        self.deps
            .iter()
            .find(|(_, blockers)| blockers.is_empty())
            .map(|(key, _)| &key.0)
            .ok_or_else(|| ScheduleError::NoReadyDependency(self.action.name.clone()))
    }

    /// Drop `action` — and anything it satisfies — from this node's
    /// working map, both as a direct entry and inside every remaining
    /// entry's blocker set.
    pub(crate) fn remove_dependency(&mut self, action: &Action, relations: &Relations) {
        let placed = BTreeSet::from([action.clone()]);
        self.deps
            .retain(|key, _| relations.satisfier(&key.0, &placed, true).is_none());
        for blockers in self.deps.values_mut() {
            blockers.retain(|indirect| relations.satisfier(indirect, &placed, true).is_none());
        }
    }
}

/// A tree of [`ScheduleNode`]s backed by a flat arena.
#[derive(Debug, Clone)]
pub struct ScheduleTree {
    nodes: Vec<ScheduleNode>,
}

impl ScheduleTree {
    /// Create a tree holding only a root performing `action`.
    pub(crate) fn new(action: Action) -> Self {
        Self {
            nodes: vec![ScheduleNode::new(action)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &ScheduleNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut ScheduleNode {
        &mut self.nodes[id.0]
    }

    /// Append a new child performing `action` under `parent`.
    pub(crate) fn add_child(&mut self, parent: NodeId, action: Action) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ScheduleNode::new(action));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// The existing child of `parent` whose action has this name, if any.
    pub(crate) fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child.0].action.name == name)
    }

    /// Ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Preorder traversal from the root, yielding each node with its depth
    /// (root at depth 0). Children are visited in their scheduled order.
    pub fn walk(&self) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        let mut stack = vec![(self.root(), 0usize)];
        std::iter::from_fn(move || {
            let (id, depth) = stack.pop()?;
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push((child, depth + 1));
            }
            Some((id, depth))
        })
    }

    /// Distinct variable names appearing in the schedule, in first-use
    /// (preorder) order. Consumers use this to restrict which dataset
    /// columns they read.
    pub fn used_variables(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for (id, _) in self.walk() {
            let action = &self.nodes[id.0].action;
            if action.kind == ActionKind::Variable && seen.insert(action.name.clone()) {
                out.push(action.name.clone());
            }
        }
        out
    }
}

impl Index<NodeId> for ScheduleTree {
    type Output = ScheduleNode;

    fn index(&self, id: NodeId) -> &ScheduleNode {
        self.node(id)
    }
}
