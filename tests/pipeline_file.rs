use std::error::Error;
use std::io::Write;

use tempfile::NamedTempFile;

use cutdag::config::{load_and_validate, load_from_path, validate_pipeline};

type TestResult = Result<(), Box<dyn Error>>;

fn write_pipeline(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

const DIJET_PIPELINE: &str = r#"
inputs = ["jet_pts"]

[action.n_jets]
kind = "variable"
cost = 1.0
needs_variables = ["jet_pts"]

[action.trig]
kind = "filter"

[action.two_jets]
kind = "filter"
needs_variables = ["n_jets"]

[action.m_jj]
kind = "variable"
cost = 3.0
needs_filters = ["two_jets"]

[action.h_mjj]
kind = "fill"
needs_variables = ["m_jj"]

[region.presel]
filters = ["trig"]

[region.sr]
filters = ["presel", "two_jets"]
fills = ["h_mjj"]
"#;

#[test]
fn pipeline_file_round_trip() -> TestResult {
    let file = write_pipeline(DIJET_PIPELINE)?;
    let pipeline = load_and_validate(file.path())?;
    let mut scheduler = pipeline.build()?;

    let tree = scheduler.schedule(pipeline.inputs.clone())?;

    // trig -> n_jets -> two_jets -> m_jj -> h_mjj, one node each.
    let order: Vec<String> = tree
        .walk()
        .map(|(id, _)| tree.node(id).action.name.clone())
        .collect();
    assert_eq!(order, vec!["ROOT", "trig", "n_jets", "two_jets", "m_jj", "h_mjj"]);
    assert_eq!(tree.used_variables(), vec!["n_jets", "m_jj"]);
    Ok(())
}

#[test]
fn unknown_references_fail_validation() -> TestResult {
    let file = write_pipeline(
        r#"
[action.sel]
kind = "filter"
needs_variables = ["ghost"]

[region.sr]
filters = ["sel"]
"#,
    )?;
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.to_string().contains("ghost"), "{err}");
    Ok(())
}

#[test]
fn declared_cycles_fail_validation() -> TestResult {
    let file = write_pipeline(
        r#"
[action.a]
kind = "variable"
needs_variables = ["b"]

[action.b]
kind = "variable"
needs_variables = ["a"]

[action.sel]
kind = "filter"
needs_variables = ["a"]

[region.sr]
filters = ["sel"]
"#,
    )?;
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.to_string().contains("cycle"), "{err}");
    Ok(())
}

#[test]
fn satisfies_is_filter_only() -> TestResult {
    let file = write_pipeline(
        r#"
[action.v]
kind = "variable"
satisfies = ["w"]

[action.w]
kind = "filter"

[region.sr]
filters = ["w"]
"#,
    )?;
    let pipeline = load_from_path(file.path())?;
    let err = validate_pipeline(&pipeline).unwrap_err();
    assert!(err.to_string().contains("satisfies"), "{err}");
    Ok(())
}

#[test]
fn region_prefix_cycles_fail_validation() -> TestResult {
    let file = write_pipeline(
        r#"
[action.sel]
kind = "filter"

[region.a]
filters = ["b", "sel"]

[region.b]
filters = ["a", "sel"]
"#,
    )?;
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.to_string().contains("cycle"), "{err}");
    Ok(())
}

#[test]
fn pipelines_need_at_least_one_region() -> TestResult {
    let file = write_pipeline(
        r#"
[action.sel]
kind = "filter"
"#,
    )?;
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.to_string().contains("region"), "{err}");
    Ok(())
}

#[test]
fn secondary_outputs_count_as_declared_variables() -> TestResult {
    let file = write_pipeline(
        r#"
[action.reco]
kind = "variable"
cost = 2.0
defines = ["pt", "eta"]

[action.sel]
kind = "filter"
needs_variables = ["pt"]

[region.sr]
filters = ["sel"]
"#,
    )?;
    let pipeline = load_and_validate(file.path())?;
    let mut scheduler = pipeline.build()?;
    let tree = scheduler.schedule(pipeline.inputs.clone())?;

    let order: Vec<String> = tree
        .walk()
        .map(|(id, _)| tree.node(id).action.name.clone())
        .collect();
    assert_eq!(order, vec!["ROOT", "reco", "sel"]);
    Ok(())
}
