// src/config/validate.rs

use std::collections::BTreeSet;

use anyhow::{Result, anyhow};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{KindConfig, PipelineFile};

/// Run semantic validation against a loaded pipeline description.
///
/// This checks:
/// - there is at least one region
/// - `satisfies` only appears on filters, `defines` only on variables
/// - every referenced filter is declared as one
/// - every referenced variable is declared, listed in `inputs`, or a
///   secondary output of some variable's `defines`
/// - every region chain entry and fill name resolves
/// - region prefix references (first chain entry naming another region)
///   contain no cycle
/// - the declared dependency graph has no cycles
///
/// Satisfaction-relation loops are left to the scheduler itself, which
/// reports them with the full chain.
pub fn validate_pipeline(pipeline: &PipelineFile) -> Result<()> {
    ensure_has_regions(pipeline)?;
    validate_kind_fields(pipeline)?;
    validate_references(pipeline)?;
    validate_region_prefixes(pipeline)?;
    validate_dependency_graph(pipeline)?;
    Ok(())
}

fn ensure_has_regions(pipeline: &PipelineFile) -> Result<()> {
    if pipeline.region.is_empty() {
        return Err(anyhow!(
            "pipeline must contain at least one [region.<name>] section"
        ));
    }
    Ok(())
}

fn validate_kind_fields(pipeline: &PipelineFile) -> Result<()> {
    for (name, action) in &pipeline.action {
        if !action.satisfies.is_empty() && action.kind != KindConfig::Filter {
            return Err(anyhow!(
                "action '{}' declares `satisfies` but is not a filter",
                name
            ));
        }
        if !action.defines.is_empty() && action.kind != KindConfig::Variable {
            return Err(anyhow!(
                "action '{}' declares `defines` but is not a variable",
                name
            ));
        }
    }
    Ok(())
}

fn validate_references(pipeline: &PipelineFile) -> Result<()> {
    let declared = |name: &str, kind: KindConfig| {
        pipeline
            .action
            .get(name)
            .is_some_and(|action| action.kind == kind)
    };
    // Variable names that resolve indirectly.
    let defined: BTreeSet<&str> = pipeline
        .action
        .values()
        .flat_map(|action| action.defines.iter().map(String::as_str))
        .chain(pipeline.inputs.iter().map(String::as_str))
        .collect();

    for (name, action) in &pipeline.action {
        for dep in &action.needs_filters {
            if !declared(dep, KindConfig::Filter) {
                return Err(anyhow!(
                    "action '{}' needs unknown filter '{}'",
                    name,
                    dep
                ));
            }
        }
        for dep in &action.needs_variables {
            if !declared(dep, KindConfig::Variable) && !defined.contains(dep.as_str()) {
                return Err(anyhow!(
                    "action '{}' needs unknown variable '{}'",
                    name,
                    dep
                ));
            }
        }
        for satisfied in &action.satisfies {
            if !declared(satisfied, KindConfig::Filter) {
                return Err(anyhow!(
                    "filter '{}' satisfies unknown filter '{}'",
                    name,
                    satisfied
                ));
            }
        }
    }

    for (name, region) in &pipeline.region {
        for (index, entry) in region.filters.iter().enumerate() {
            // Only the first entry may name another region.
            let region_prefix = index == 0 && pipeline.region.contains_key(entry);
            if !region_prefix && !declared(entry, KindConfig::Filter) {
                return Err(anyhow!(
                    "region '{}' references unknown filter '{}'",
                    name,
                    entry
                ));
            }
        }
        for fill in &region.fills {
            if !declared(fill, KindConfig::Fill) {
                return Err(anyhow!(
                    "region '{}' references unknown fill '{}'",
                    name,
                    fill
                ));
            }
        }
    }
    Ok(())
}

fn validate_region_prefixes(pipeline: &PipelineFile) -> Result<()> {
    for start in pipeline.region.keys() {
        let mut seen = vec![start.as_str()];
        let mut current = start.as_str();
        while let Some(next) = pipeline
            .region
            .get(current)
            .and_then(|region| region.filters.first())
            .filter(|first| pipeline.region.contains_key(*first))
        {
            if seen.contains(&next.as_str()) {
                return Err(anyhow!(
                    "region prefix references form a cycle starting from '{}'",
                    start
                ));
            }
            seen.push(next.as_str());
            current = next.as_str();
        }
    }
    Ok(())
}

fn validate_dependency_graph(pipeline: &PipelineFile) -> Result<()> {
    // Edge direction: dependency -> dependent. Action identity in the file
    // is the bare name per kind; the graph mixes kinds, which is fine for
    // acyclicity since names are shared only via explicit references.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in pipeline.action.keys() {
        graph.add_node(name.as_str());
    }
    for (name, action) in &pipeline.action {
        for dep in action.needs_filters.iter().chain(&action.needs_variables) {
            if pipeline.action.contains_key(dep) {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(anyhow!(
            "cycle detected in declared dependencies involving '{}'",
            cycle.node_id()
        )),
    }
}
