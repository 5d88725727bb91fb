use std::error::Error;

use cutdag::{Action, ScheduleError, Scheduler};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn empty_action_names_are_rejected() {
    let mut scheduler = Scheduler::new();
    let err = scheduler.register_action(Action::filter(""), []).unwrap_err();
    assert!(matches!(err, ScheduleError::EmptyActionName(_)), "{err}");
}

#[test]
fn root_is_reserved_for_actions_and_regions() {
    let mut scheduler = Scheduler::new();
    let err = scheduler
        .register_action(Action::variable("ROOT"), [])
        .unwrap_err();
    assert!(matches!(err, ScheduleError::ReservedActionName(_)), "{err}");

    let err = scheduler
        .declare_region("ROOT", ["A"])
        .unwrap_err();
    assert!(matches!(err, ScheduleError::ReservedRegionName), "{err}");

    let err = scheduler.declare_region("", ["A"]).unwrap_err();
    assert!(matches!(err, ScheduleError::EmptyRegionName), "{err}");
}

#[test]
fn duplicate_registration_is_rejected() -> TestResult {
    let mut scheduler = Scheduler::new();
    scheduler.register_action(Action::filter("sel"), [])?;
    let err = scheduler
        .register_action(Action::filter("sel"), [])
        .unwrap_err();
    assert!(matches!(err, ScheduleError::DuplicateAction { .. }), "{err}");
    Ok(())
}

#[test]
fn identity_is_kind_and_name() -> TestResult {
    // The same name under a different kind is a different action.
    let mut scheduler = Scheduler::new();
    scheduler.register_action(Action::filter("x"), [])?;
    scheduler.register_action(Action::variable("x"), [])?;
    Ok(())
}

#[test]
fn region_and_filter_names_share_a_namespace() -> TestResult {
    let mut scheduler = Scheduler::new();
    scheduler.register_action(Action::filter("sel"), [])?;
    scheduler.declare_region("sr", ["sel"])?;

    // Filter name taken by a region:
    let err = scheduler.register_action(Action::filter("sr"), []).unwrap_err();
    assert!(matches!(err, ScheduleError::FilterNameIsRegion(_)), "{err}");

    // Region name taken by a filter:
    let err = scheduler.declare_region("sel", ["sel"]).unwrap_err();
    assert!(matches!(err, ScheduleError::DuplicateRegion(_)), "{err}");

    // Region name taken by another region:
    let err = scheduler.declare_region("sr", ["sel"]).unwrap_err();
    assert!(matches!(err, ScheduleError::DuplicateRegion(_)), "{err}");
    Ok(())
}

#[test]
fn fills_require_a_declared_region() {
    let mut scheduler = Scheduler::new();
    let err = scheduler.add_fill_to_region("nowhere", "h").unwrap_err();
    assert!(matches!(err, ScheduleError::UnknownRegion(_)), "{err}");
}

#[test]
fn identical_region_definitions_are_rejected() -> TestResult {
    let mut scheduler = Scheduler::new();
    scheduler.register_action(Action::filter("A"), [])?;
    scheduler.declare_region("R1", ["A"])?;
    scheduler.declare_region("R2", ["A"])?;

    let err = scheduler.schedule::<_, String>([]).unwrap_err();
    assert!(matches!(err, ScheduleError::IdenticalRegions { .. }), "{err}");
    Ok(())
}

#[test]
fn regions_identical_after_resolution_are_rejected() -> TestResult {
    // The chains differ as declared, but B is subsumed by A (which it
    // also depends on), so both regions collapse onto the A node.
    let mut scheduler = Scheduler::new();
    scheduler.register_action(Action::filter("A"), [])?;
    scheduler.register_action(Action::filter("B"), [Action::filter("A")])?;
    scheduler.declare_filter_satisfies("A", ["B"]);
    scheduler.declare_region("R1", ["A"])?;
    scheduler.declare_region("R2", ["B"])?;

    let err = scheduler.schedule::<_, String>([]).unwrap_err();
    assert!(
        matches!(err, ScheduleError::IdenticalRegionsResolved { .. }),
        "{err}"
    );
    Ok(())
}

#[test]
fn unresolvable_dependency_fails_at_schedule_time() -> TestResult {
    let mut scheduler = Scheduler::new();
    // Depending on something unregistered is fine at declaration time...
    scheduler.register_action(Action::filter("sel"), [Action::variable("ghost")])?;
    scheduler.declare_region("sr", ["sel"])?;

    // ...and a hard error once the schedule is built.
    let err = scheduler.schedule::<_, String>([]).unwrap_err();
    assert!(matches!(err, ScheduleError::UndefinedAction { .. }), "{err}");
    Ok(())
}

#[test]
fn circular_dependencies_are_rejected() -> TestResult {
    let mut scheduler = Scheduler::new();
    scheduler.register_action(Action::variable("a"), [Action::variable("b")])?;
    scheduler.register_action(Action::variable("b"), [Action::variable("a")])?;
    scheduler.register_action(Action::filter("sel"), [Action::variable("a")])?;
    scheduler.declare_region("sr", ["sel"])?;

    let err = scheduler.schedule::<_, String>([]).unwrap_err();
    assert!(matches!(err, ScheduleError::CircularDependency { .. }), "{err}");
    Ok(())
}

#[test]
fn filter_listed_after_its_subsumer_is_inconsistent() -> TestResult {
    // The region asks for fLoose *after* fTight, but fTight already
    // satisfies it; honouring the requested order is impossible.
    let mut scheduler = Scheduler::new();
    scheduler.register_action(Action::filter("fTight"), [])?;
    scheduler.register_action(Action::filter("fLoose"), [])?;
    scheduler.declare_filter_satisfies("fTight", ["fLoose"]);
    scheduler.declare_region("sr", ["fTight", "fLoose"])?;

    let err = scheduler.schedule::<_, String>([]).unwrap_err();
    match err {
        ScheduleError::FilterAlreadyScheduled { name, satisfied_by } => {
            assert_eq!(name, "fLoose");
            assert_eq!(satisfied_by.as_deref(), Some("fTight"));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn repeated_filter_in_one_chain_is_inconsistent() -> TestResult {
    let mut scheduler = Scheduler::new();
    scheduler.register_action(Action::filter("A"), [])?;
    scheduler.declare_region("sr", ["A", "A"])?;

    let err = scheduler.schedule::<_, String>([]).unwrap_err();
    match err {
        ScheduleError::FilterAlreadyScheduled { name, satisfied_by } => {
            assert_eq!(name, "A");
            assert_eq!(satisfied_by, None);
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn errors_name_the_offending_action() -> TestResult {
    let mut scheduler = Scheduler::new();
    scheduler.register_action(Action::filter("sel"), [Action::variable("ghost")])?;
    scheduler.declare_region("sr", ["sel"])?;

    let err = scheduler.schedule::<_, String>([]).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("ghost"), "message was: {message}");
    assert!(message.contains("variable"), "message was: {message}");
    Ok(())
}
