//! Running suites from feature files on disk.

mod common;

use std::fs;

use camino::Utf8PathBuf;
use common::Calls;
use rstest::{fixture, rstest};
use stepwise::reporting::{Status, json};
use stepwise::{Context, HostRunner, StdRunner, Suite, SuiteError, SuiteOptions};
use tempfile::TempDir;

const BASKET: &str = "\
@shop
Feature: Basket

  Background:
    Given an empty basket

  Scenario: Adding fruit
    When I add 2 apples
    Then the basket holds 2 items

  Scenario Outline: Adding more
    When I add <count> apples
    Then the basket holds <count> items

    Examples:
      | count |
      | 3     |
      | 5     |
";

const WIP: &str = "\
Feature: Unfinished

  @wip
  Scenario: Later
    When I add 1 apples
";

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn write(&self, name: &str, contents: &str) {
        let written = fs::write(self.root.join(name), contents);
        assert!(written.is_ok(), "cannot write {name}");
    }

    fn pattern(&self) -> String {
        self.root.join("*.feature").into_string()
    }
}

#[fixture]
fn workspace() -> Workspace {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("temp dir");
    };
    let Ok(root) = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()) else {
        panic!("temp dir should be UTF-8");
    };
    Workspace { _dir: dir, root }
}

fn basket_suite(options: SuiteOptions, calls: &Calls) -> Suite {
    let mut suite = Suite::new(options);
    let added = calls.clone();
    suite
        .add_step("^an empty basket$", |_: &mut dyn HostRunner, ctx: &mut Context| {
            ctx.set("items", 0_u32);
        })
        .add_step("^I add {int} apples$", move |_: &mut dyn HostRunner, ctx: &mut Context, n: u32| {
            added.push(format!("add {n}"));
            let items = ctx.get::<_, u32>(&"items").copied().unwrap_or_default();
            ctx.set("items", items + n);
        })
        .add_step(
            "^the basket holds {int} items$",
            |runner: &mut dyn HostRunner, ctx: &mut Context, expected: u32| {
                let items = ctx.get::<_, u32>(&"items").copied();
                if items != Some(expected) {
                    runner.error(&format!("expected {expected} items, found {items:?}"));
                }
            },
        );
    suite
}

#[rstest]
fn runs_discovered_feature_files(workspace: Workspace) {
    workspace.write("basket.feature", BASKET);
    let calls = Calls::new();
    let suite = basket_suite(SuiteOptions::new().with_features_path(workspace.pattern()), &calls);
    let mut runner = StdRunner::new("suite");

    let Ok(report) = suite.run(&mut runner) else {
        panic!("suite should run");
    };

    assert!(!report.has_failures(), "unexpected errors: {:?}", runner.report().errors().collect::<Vec<_>>());
    assert_eq!(calls.events(), ["add 2", "add 3", "add 5"]);
    assert_eq!(report.scenario_totals(), (2, 0, 0));
    let Some(feature) = report.features.first() else {
        panic!("feature record expected");
    };
    assert_eq!(feature.tags, ["@shop"]);
    assert!(feature.path.as_ref().is_some_and(|path| path.ends_with("basket.feature")));
}

#[rstest]
fn broken_files_are_reported_and_others_still_run(workspace: Workspace) {
    workspace.write("a_broken.feature", "this is not gherkin");
    workspace.write("b_basket.feature", BASKET);
    let calls = Calls::new();
    let suite = basket_suite(SuiteOptions::new().with_features_path(workspace.pattern()), &calls);
    let mut runner = StdRunner::new("suite");

    let Ok(report) = suite.run(&mut runner) else {
        panic!("suite should run");
    };

    let [failure] = report.load_failures.as_slice() else {
        panic!("one load failure expected");
    };
    assert!(failure.path.ends_with("a_broken.feature"));
    assert_eq!(report.features.len(), 1);
    assert_eq!(calls.count("add 2"), 1);
    assert!(report.has_failures());
    assert!(runner.report().errors().next().is_some());
}

#[rstest]
#[case(Vec::new(), (0, 0, 1))]
#[case(vec!["@other"], (0, 0, 1))]
fn ignored_tags_apply_to_files(
    workspace: Workspace,
    #[case] extra: Vec<&str>,
    #[case] totals: (usize, usize, usize),
) {
    workspace.write("wip.feature", WIP);
    let calls = Calls::new();
    let ignored = extra.into_iter().chain(["wip"]);
    let options = SuiteOptions::new()
        .with_features_path(workspace.pattern())
        .with_ignored_tags(ignored);
    let suite = basket_suite(options, &calls);
    let mut runner = StdRunner::new("suite");

    let Ok(report) = suite.run(&mut runner) else {
        panic!("suite should run");
    };

    assert!(calls.events().is_empty());
    assert_eq!(report.scenario_totals(), totals);
}

#[rstest]
fn malformed_search_patterns_abort_the_run() {
    let suite = Suite::new(SuiteOptions::new().with_features_path("features/[*.feature"));
    let mut runner = StdRunner::new("suite");

    let outcome = suite.run(&mut runner);

    assert!(matches!(outcome, Err(SuiteError::Discovery(_))));
    assert!(runner.report().errors().next().is_some());
}

#[rstest]
fn reports_render_as_json(workspace: Workspace) {
    workspace.write("basket.feature", BASKET);
    let calls = Calls::new();
    let suite = basket_suite(SuiteOptions::new().with_features_path(workspace.pattern()), &calls);
    let mut runner = StdRunner::new("suite");
    let Ok(report) = suite.run(&mut runner) else {
        panic!("suite should run");
    };

    let Ok(rendered) = json::to_string(&report) else {
        panic!("report should serialize");
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&rendered) else {
        panic!("rendered report should be valid JSON");
    };

    let at = |pointer: &str| value.pointer(pointer).cloned().unwrap_or_default();
    assert_eq!(at("/features/0/name"), "Basket");
    assert_eq!(at("/features/0/status"), Status::Passed.label());
    assert_eq!(at("/features/0/scenarios/0/id"), "basket;adding-fruit");
    assert_eq!(at("/features/0/scenarios/0/steps/0/background"), true);
    assert_eq!(at("/features/0/scenarios/0/steps/1/text"), "I add 2 apples");
    assert_eq!(at("/features/0/scenarios/1/steps/1/example"), "Example #1");
    assert!(value.get("load_failures").is_none());
}
