// src/registry/regions.rs

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::errors::{Result, ScheduleError};
use crate::registry::actions::ROOT_NAME;

/// One analysis selection path: an ordered chain of filter names plus the
/// fills to perform at its endpoint.
#[derive(Debug, Clone, Default)]
pub struct RegionDef {
    pub filters: Vec<String>,
    pub fills: BTreeSet<String>,
}

/// The named regions of a pipeline.
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    defs: BTreeMap<String, RegionDef>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a region.
    ///
    /// If the first entry of `filters` names an existing region, that
    /// region's own chain is spliced in as a prefix (one level of
    /// substitution, not recursive). The caller is responsible for checking
    /// the name against registered filter actions; everything else is
    /// checked here.
    pub fn declare(&mut self, name: &str, filters: Vec<String>) -> Result<()> {
        if name.is_empty() {
            return Err(ScheduleError::EmptyRegionName);
        }
        if name == ROOT_NAME {
            return Err(ScheduleError::ReservedRegionName);
        }
        if self.defs.contains_key(name) {
            return Err(ScheduleError::DuplicateRegion(name.to_string()));
        }

        let filters = match filters.first().and_then(|first| self.defs.get(first)) {
            Some(parent) => {
                let mut spliced = parent.filters.clone();
                spliced.extend(filters.into_iter().skip(1));
                spliced
            }
            None => filters,
        };

        debug!(region = name, chain = ?filters, "declaring region");
        self.defs.insert(
            name.to_string(),
            RegionDef {
                filters,
                fills: BTreeSet::new(),
            },
        );
        Ok(())
    }

    /// Associate a fill action with a region's endpoint.
    pub fn add_fill(&mut self, region: &str, fill: &str) -> Result<()> {
        let def = self
            .defs
            .get_mut(region)
            .ok_or_else(|| ScheduleError::UnknownRegion(region.to_string()))?;
        def.fills.insert(fill.to_string());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// The region definitions, keyed by name.
    pub fn defs(&self) -> &BTreeMap<String, RegionDef> {
        &self.defs
    }
}
