// src/schedule/raw.rs

//! The raw schedule: region filter chains merged into a prefix tree.
//!
//! A set of chains like
//!
//! ```text
//! A -- B -- C
//! A -- B -- D
//! A -- E -- F
//! ```
//!
//! becomes
//!
//! ```text
//!           C
//!      B -- |
//!      |    D
//! A -- |
//!      |
//!      E -- F
//! ```
//!
//! with the region name recorded on each chain's terminal node and one
//! fill child appended per associated fill. No dependency information is
//! involved yet; child order here is unspecified and is decided later by
//! the assembler.

use tracing::debug;

use crate::action::Action;
use crate::errors::{Result, ScheduleError};
use crate::registry::RegionSet;
use crate::registry::actions::ROOT_NAME;
use crate::schedule::tree::ScheduleTree;

/// Merge every declared region into a raw tree rooted at `ROOT`.
pub(crate) fn build_raw_tree(regions: &RegionSet) -> Result<ScheduleTree> {
    let mut tree = ScheduleTree::new(Action::filter(ROOT_NAME));
    for (name, def) in regions.defs() {
        let mut current = tree.root();
        let mut chain = def.filters.iter();
        // Follow the existing prefix, then append whatever suffix is new.
        while let Some(filter) = chain.next() {
            match tree.child_named(current, filter) {
                Some(existing) => current = existing,
                None => {
                    current = tree.add_child(current, Action::filter(filter));
                    for rest in chain.by_ref() {
                        current = tree.add_child(current, Action::filter(rest));
                    }
                }
            }
        }

        let terminal = tree.node_mut(current);
        if let Some(existing) = &terminal.region {
            return Err(ScheduleError::IdenticalRegions {
                first: existing.clone(),
                second: name.clone(),
            });
        }
        terminal.region = Some(name.clone());

        for fill in &def.fills {
            tree.add_child(current, Action::fill(fill));
        }
        debug!(region = %name, "merged region into raw tree");
    }
    Ok(tree)
}
