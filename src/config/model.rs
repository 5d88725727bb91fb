// src/config/model.rs

use std::collections::BTreeMap;

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::action::{Action, ActionKind};
use crate::schedule::Scheduler;

/// Top-level pipeline description as read from a TOML file.
///
/// ```toml
/// inputs = ["jet_pts", "n_jets"]
///
/// [action.two_jets]
/// kind = "filter"
/// needs_variables = ["n_jets"]
///
/// [action.m_jj]
/// kind = "variable"
/// cost = 2.0
/// needs_filters = ["two_jets"]
///
/// [action.h_mjj]
/// kind = "fill"
/// needs_variables = ["m_jj"]
///
/// [region.signal]
/// filters = ["two_jets"]
/// fills = ["h_mjj"]
/// ```
///
/// All sections are optional at the serde level; semantic requirements are
/// enforced by `validate::validate_pipeline`.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineFile {
    /// Branch names available without computation (the pre-existing set).
    #[serde(default)]
    pub inputs: Vec<String>,

    /// All actions from `[action.<name>]`, keyed by action name.
    #[serde(default)]
    pub action: BTreeMap<String, ActionConfig>,

    /// All regions from `[region.<name>]`, keyed by region name.
    #[serde(default)]
    pub region: BTreeMap<String, RegionConfig>,
}

/// Action kind as spelled in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindConfig {
    Filter,
    Variable,
    Fill,
}

impl From<KindConfig> for ActionKind {
    fn from(kind: KindConfig) -> Self {
        match kind {
            KindConfig::Filter => ActionKind::Filter,
            KindConfig::Variable => ActionKind::Variable,
            KindConfig::Fill => ActionKind::Fill,
        }
    }
}

/// `[action.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionConfig {
    pub kind: KindConfig,

    /// Scheduling cost heuristic; no fixed units.
    #[serde(default)]
    pub cost: f32,

    /// Filters this action depends on.
    #[serde(default)]
    pub needs_filters: Vec<String>,

    /// Variables this action depends on.
    #[serde(default)]
    pub needs_variables: Vec<String>,

    /// Filters this (filter) action subsumes.
    #[serde(default)]
    pub satisfies: Vec<String>,

    /// Secondary outputs this (variable) action also defines.
    #[serde(default)]
    pub defines: Vec<String>,
}

impl ActionConfig {
    /// The declared dependencies as `Action`s.
    pub fn dependencies(&self) -> impl Iterator<Item = Action> + '_ {
        self.needs_filters
            .iter()
            .map(|name| Action::filter(name))
            .chain(self.needs_variables.iter().map(|name| Action::variable(name)))
    }
}

/// `[region.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    /// Ordered filter chain. The first entry may name another region, in
    /// which case that region's chain is spliced in as a prefix.
    pub filters: Vec<String>,

    /// Fills performed at the region's endpoint.
    #[serde(default)]
    pub fills: Vec<String>,
}

impl PipelineFile {
    /// Build a [`Scheduler`] from this description.
    ///
    /// Actions are registered first (sorted order). Regions are declared
    /// in prefix-dependency order, since a region whose chain starts with
    /// another region's name must be declared after it for the splice to
    /// happen; `validate_pipeline` has already rejected prefix cycles.
    pub fn build(&self) -> anyhow::Result<Scheduler> {
        let mut scheduler = Scheduler::new();
        for (name, cfg) in &self.action {
            let action = Action::new(cfg.kind.into(), name).with_cost(cfg.cost);
            scheduler
                .register_action(action, cfg.dependencies())
                .with_context(|| format!("registering action '{name}'"))?;
            if !cfg.satisfies.is_empty() {
                scheduler.declare_filter_satisfies(name, cfg.satisfies.iter().cloned());
            }
            if !cfg.defines.is_empty() {
                scheduler.declare_multi_output_variable(name, cfg.defines.iter().cloned());
            }
        }

        let mut pending: Vec<(&String, &RegionConfig)> = self.region.iter().collect();
        while !pending.is_empty() {
            let mut deferred = Vec::new();
            let mut progressed = false;
            for (name, cfg) in pending {
                let waiting_on_prefix = cfg.filters.first().is_some_and(|first| {
                    self.region.contains_key(first) && !scheduler.region_defs().contains_key(first)
                });
                if waiting_on_prefix {
                    deferred.push((name, cfg));
                    continue;
                }
                scheduler
                    .declare_region(name, cfg.filters.iter().cloned())
                    .with_context(|| format!("declaring region '{name}'"))?;
                for fill in &cfg.fills {
                    scheduler
                        .add_fill_to_region(name, fill)
                        .with_context(|| format!("adding fill '{fill}' to region '{name}'"))?;
                }
                progressed = true;
            }
            if !progressed {
                bail!(
                    "region prefix references form a cycle: {:?}",
                    deferred.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>()
                );
            }
            pending = deferred;
        }
        Ok(scheduler)
    }
}
