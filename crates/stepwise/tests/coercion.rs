//! Behavioural tests for argument coercion and step configuration errors.

mod common;

use common::Calls;
use rstest::{fixture, rstest};
use serial_test::serial;
use stepwise::coercion::CoercionMode;
use stepwise::config;
use stepwise::document::{Feature, Scenario, Step};
use stepwise::reporting::{RunReport, ScenarioRecord, Status};
use stepwise::{ConfigError, Context, HostRunner, StdRunner, Suite, SuiteError, SuiteOptions, UnitStatus};

/// Clears the process-wide coercion override when dropped.
struct OverrideGuard;

impl OverrideGuard {
    fn strict(strict: bool) -> Self {
        config::set_strict_coercion(strict);
        Self
    }
}

impl Drop for OverrideGuard {
    fn drop(&mut self) {
        config::clear_strict_coercion_override();
    }
}

#[fixture]
fn calls() -> Calls {
    Calls::new()
}

fn apples_suite(options: SuiteOptions, calls: &Calls) -> Suite {
    let mut suite = Suite::new(options);
    let seen = calls.clone();
    suite.add_step("^I have (.*) apples$", move |_: &mut dyn HostRunner, _: &mut Context, n: i32| {
        seen.push(format!("apples={n}"));
    });
    suite
}

fn run_text(suite: &Suite, text: &str) -> RunReport {
    let feature = Feature::new("Feature", "Coercion")
        .with_scenario(Scenario::new("Scenario", "Apples").with_step(Step::new("Given", text)));
    let mut runner = StdRunner::new("suite");
    let Ok(report) = suite.run_features(&mut runner, &[feature]) else {
        panic!("suite configuration should be valid");
    };
    report
}

fn first_scenario(report: &RunReport) -> &ScenarioRecord {
    let Some(scenario) = report.scenarios().next() else {
        panic!("a scenario record was expected");
    };
    scenario
}

#[rstest]
#[serial]
fn lenient_mode_substitutes_zero(calls: Calls) {
    let suite = apples_suite(SuiteOptions::new().with_coercion(CoercionMode::Lenient), &calls);

    let report = run_text(&suite, "I have many apples");

    assert_eq!(calls.events(), ["apples=0"]);
    assert_eq!(first_scenario(&report).status, Status::Passed);
}

#[rstest]
#[serial]
fn strict_mode_fails_the_step(calls: Calls) {
    let suite = apples_suite(SuiteOptions::new().with_coercion(CoercionMode::Strict), &calls);

    let report = run_text(&suite, "I have many apples");

    assert!(calls.events().is_empty());
    let scenario = first_scenario(&report);
    assert_eq!(scenario.status, Status::Failed);
    let Some(message) = scenario.message.as_deref() else {
        panic!("strict coercion failure should carry a message");
    };
    assert!(message.contains("cannot convert `many`"), "unexpected message: {message}");
}

#[rstest]
#[serial]
fn process_override_selects_strict_mode(calls: Calls) {
    let _guard = OverrideGuard::strict(true);
    let suite = apples_suite(SuiteOptions::new(), &calls);

    let report = run_text(&suite, "I have many apples");

    assert_eq!(first_scenario(&report).status, Status::Failed);
    assert_eq!(calls.count("apples=0"), 0);
}

#[rstest]
#[serial]
fn explicit_mode_beats_the_override(calls: Calls) {
    let _guard = OverrideGuard::strict(true);
    let suite = apples_suite(SuiteOptions::new().with_coercion(CoercionMode::Lenient), &calls);

    run_text(&suite, "I have many apples");

    assert_eq!(calls.events(), ["apples=0"]);
}

#[rstest]
#[case("a price of 2.5", "price=2.5")]
#[case("a price of -0.25", "price=-0.25")]
fn float_tokens_deliver_floats(calls: Calls, #[case] text: &str, #[case] expected: &str) {
    let mut suite = Suite::new(SuiteOptions::new());
    let seen = calls.clone();
    suite.add_step("a price of {float}", move |_: &mut dyn HostRunner, _: &mut Context, price: f64| {
        seen.push(format!("price={price}"));
    });

    run_text(&suite, text);

    assert_eq!(calls.events(), [expected]);
}

#[rstest]
fn text_arguments_arrive_verbatim(calls: Calls) {
    let mut suite = Suite::new(SuiteOptions::new());
    let seen = calls.clone();
    suite.add_step("^I say \"([^\"]*)\" to (\\w+)$", move |_: &mut dyn HostRunner, _: &mut Context, what: String, who: String| {
        seen.push(format!("{who}: {what}"));
    });

    run_text(&suite, "I say \"hello there\" to Sam");

    assert_eq!(calls.events(), ["Sam: hello there"]);
}

#[rstest]
fn handler_shape_mismatch_blocks_the_run(calls: Calls) {
    let mut suite = Suite::new(SuiteOptions::new().with_before_scenario(calls.hook("before-scenario")));
    suite.add_step("^(\\d+) plus (\\d+)$", |_: &mut dyn HostRunner, _: &mut Context, _: i32| {});
    let [ConfigError::HandlerShape { arity, groups, .. }] = suite.config_errors() else {
        panic!("one handler shape error expected");
    };
    assert_eq!(*arity, 1);
    assert_eq!(groups, &[2]);

    let feature = Feature::new("Feature", "Broken")
        .with_scenario(Scenario::new("Scenario", "Sum").with_step(Step::new("Given", "1 plus 2")));
    let mut runner = StdRunner::new("suite");
    let outcome = suite.run_features(&mut runner, &[feature]);

    assert!(matches!(outcome, Err(SuiteError::InvalidConfiguration(ref errors)) if errors.len() == 1));
    assert!(calls.events().is_empty());
    assert_eq!(runner.status(), UnitStatus::Failed);
    assert!(runner
        .report()
        .errors()
        .any(|message| message == "the test contains invalid step definitions"));
}

#[rstest]
fn invalid_patterns_are_collected() {
    let mut suite = Suite::new(SuiteOptions::new());
    suite
        .add_step("^unclosed (group$", |_: &mut dyn HostRunner, _: &mut Context| {})
        .add_step("^fine$", |_: &mut dyn HostRunner, _: &mut Context| {});

    assert!(matches!(suite.config_errors(), [ConfigError::Pattern { .. }]));
    assert_eq!(suite.registry().len(), 1);
}

#[rstest]
fn custom_parameter_types_expand_in_patterns(calls: Calls) {
    let mut suite = Suite::new(SuiteOptions::new());
    let Ok(()) = suite.add_parameter_types("{colour}", ["(red)", "(green)"]) else {
        panic!("parameter type should register");
    };
    let seen = calls.clone();
    suite.add_step("a {colour} light", move |_: &mut dyn HostRunner, _: &mut Context, colour: String| {
        seen.push(colour);
    });

    run_text(&suite, "a green light");

    assert_eq!(calls.events(), ["green"]);
}
