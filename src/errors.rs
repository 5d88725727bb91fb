// src/errors.rs

//! Crate-wide error type for the scheduling core.
//!
//! Every failure names the offending action (kind + name) so the caller can
//! locate the faulty declaration. All errors are fatal to the `schedule()`
//! call that raised them; the caller fixes the pipeline and re-invokes.

use thiserror::Error;

use crate::action::{Action, ActionKind};

pub type Result<T> = std::result::Result<T, ScheduleError>;

#[derive(Debug, Error)]
pub enum ScheduleError {
    // --- declaration errors ---
    #[error("empty {0} names are not allowed")]
    EmptyActionName(ActionKind),

    #[error("'ROOT' is a reserved name (attempted {0} registration)")]
    ReservedActionName(ActionKind),

    #[error("{kind} '{name}' is already defined")]
    DuplicateAction { kind: ActionKind, name: String },

    #[error("filter name '{0}' is already used as a region name")]
    FilterNameIsRegion(String),

    #[error("empty region names are not allowed")]
    EmptyRegionName,

    #[error("'ROOT' is a reserved name (attempted region declaration)")]
    ReservedRegionName,

    #[error("region name '{0}' is already used")]
    DuplicateRegion(String),

    #[error("no region named '{0}' declared")]
    UnknownRegion(String),

    #[error("region definitions for '{first}' and '{second}' are identical")]
    IdenticalRegions { first: String, second: String },

    // --- resolution errors ---
    #[error("no {kind} named '{name}' defined")]
    UndefinedAction { kind: ActionKind, name: String },

    #[error(
        "closed loop in satisfaction relations: {}",
        .chain.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" -> ")
    )]
    SatisfactionLoop { chain: Vec<Action> },

    #[error("circular dependency found on {kind} '{name}'")]
    CircularDependency { kind: ActionKind, name: String },

    #[error(
        "filter '{name}' {} (it was probably pulled in as a dependency)",
        .satisfied_by
            .as_ref()
            .map(|by| format!("was already satisfied by '{by}'"))
            .unwrap_or_else(|| "already exists in the schedule".to_string())
    )]
    FilterAlreadyScheduled {
        name: String,
        /// `None` means the filter itself was already scheduled; `Some`
        /// names the stronger filter that satisfied it.
        satisfied_by: Option<String>,
    },

    #[error(
        "region definitions for '{first}' and '{second}' are identical after dependency resolution"
    )]
    IdenticalRegionsResolved { first: String, second: String },

    // --- logic errors (unreachable for any consistent expansion) ---
    #[error("no ready dependency left on '{0}'")]
    NoReadyDependency(String),
}
