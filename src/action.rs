// src/action.rs

//! The basic vocabulary of the scheduler: action kinds, actions and the
//! two orderings used over them.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The kind of work an action performs.
///
/// The set is closed: the expander and assembler match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    /// Imposes a selection and may open a branch in the execution tree.
    Filter,
    /// Derives a new quantity; pure, no selection.
    Variable,
    /// Terminal accumulation (e.g. filling a histogram); never depended on
    /// by anything downstream.
    Fill,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Filter => "filter",
            ActionKind::Variable => "variable",
            ActionKind::Fill => "fill",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A uniquely named, typed unit of work.
///
/// Identity — and therefore equality, ordering and hashing — is
/// `(kind, name)` only. `cost` is a scheduling heuristic carried alongside;
/// an `Action` captured before registration may hold a stale cost of 0, so
/// the expander always refreshes it from the registry before it matters.
#[derive(Debug, Clone)]
pub struct Action {
    pub kind: ActionKind,
    pub name: String,
    pub cost: f32,
}

impl Action {
    pub fn new(kind: ActionKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            cost: 0.0,
        }
    }

    pub fn filter(name: impl Into<String>) -> Self {
        Self::new(ActionKind::Filter, name)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(ActionKind::Variable, name)
    }

    pub fn fill(name: impl Into<String>) -> Self {
        Self::new(ActionKind::Fill, name)
    }

    /// Builder-style cost attachment, used at registration time.
    pub fn with_cost(mut self, cost: f32) -> Self {
        self.cost = cost;
        self
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

impl Eq for Action {}

impl PartialOrd for Action {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Action {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// The ordering used while picking the next action to schedule: cost first
/// (via `total_cmp`, so the order is total), identity as the tie-break.
///
/// Unlike [`Action`] itself, equality here includes the cost so that it
/// stays consistent with the ordering.
#[derive(Debug, Clone)]
pub struct ByCost(pub Action);

impl PartialEq for ByCost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ByCost {}

impl PartialOrd for ByCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByCost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .cost
            .total_cmp(&other.0.cost)
            .then_with(|| self.0.cmp(&other.0))
    }
}

/// Working dependency map: an action and its direct + indirect dependencies,
/// each mapped to its own remaining direct dependencies, kept in cost order
/// so that the cheapest ready entry is found first.
pub type DepMap = BTreeMap<ByCost, BTreeSet<Action>>;
