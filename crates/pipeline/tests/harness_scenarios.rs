//! End-to-end harness scenarios with a scripted runner.
//!
//! Covers stage ordering, fail-fast behaviour, the test opt-out,
//! environment hand-off and service cleanup on every exit path.

mod support;

use std::ffi::OsStr;

use stagehand_core::env::{INJECTED_LOG_LEVEL, INSTANCE_URL_VAR, LOG_OVERRIDE_VAR};
use stagehand_core::{
    Component, LAUNCH_FAILURE_STATUS, OutputMode, RunOutcome, Stage, StageFailure,
};
use stagehand_pipeline::{Harness, HarnessOptions};

use support::{CallKind, RecordingSignaller, ScriptedRunner, config_with, inherited};

fn harness(
    names: &[&str],
    options: HarnessOptions,
    runner: ScriptedRunner,
) -> Harness<ScriptedRunner, RecordingSignaller> {
    Harness::with_signaller(
        config_with(names),
        options,
        runner,
        RecordingSignaller::default(),
    )
}

async fn run(h: &Harness<ScriptedRunner, RecordingSignaller>) -> RunOutcome {
    let configurator = h.configurator(inherited(&[("PATH", "/usr/bin")]));
    h.run_with(&configurator).await
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn all_builds_and_tests_pass() {
    let h = harness(
        &["svc-a", "svc-b"],
        HarnessOptions::default(),
        ScriptedRunner::new(),
    );

    let outcome = run(&h).await;

    assert_eq!(outcome, RunOutcome::Success);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        h.runner().commands(),
        vec!["cargo build -p svc-a", "cargo build -p svc-b", "cargo test"]
    );
    assert!(h.signaller().sent().is_empty(), "no services were tracked");
}

#[tokio::test]
async fn second_build_failure_stops_pipeline() {
    let h = harness(
        &["svc-a", "svc-b"],
        HarnessOptions::default(),
        ScriptedRunner::new().with_status("cargo build -p svc-b", 2),
    );

    let outcome = run(&h).await;

    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(
        outcome,
        RunOutcome::Failed(StageFailure::Build {
            component: Component::new("svc-b"),
            status: 2,
        })
    );
    assert_eq!(h.runner().count("build"), 2);
    assert_eq!(h.runner().count("test"), 0);
}

#[tokio::test]
async fn opt_out_skips_tests() {
    let options = HarnessOptions {
        run_workspace_tests: false,
        ..HarnessOptions::default()
    };
    let h = harness(&["svc-a"], options, ScriptedRunner::new());

    let outcome = run(&h).await;

    assert_eq!(outcome, RunOutcome::Success);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(h.runner().commands(), vec!["cargo build -p svc-a"]);
}

#[tokio::test]
async fn test_failure_reports_tests_stage() {
    let h = harness(
        &["svc-a", "svc-b"],
        HarnessOptions::default(),
        ScriptedRunner::new().with_status("cargo test", 3),
    );

    let outcome = run(&h).await;

    assert_eq!(outcome.exit_code(), 1);
    let failure = outcome.failure().expect("run should fail");
    assert_eq!(failure.stage(), Stage::Tests);
    assert_eq!(failure.stage().to_string(), "tests");
    assert_eq!(failure.status(), 3);
}

// =============================================================================
// Fail-fast
// =============================================================================

#[tokio::test]
async fn build_failure_at_any_position_runs_exactly_n_plus_one_builds() {
    let names = ["c0", "c1", "c2", "c3", "c4"];
    for failing in 0..names.len() {
        let runner =
            ScriptedRunner::new().with_status(&format!("cargo build -p {}", names[failing]), 101);
        let h = harness(&names, HarnessOptions::default(), runner);

        let outcome = run(&h).await;

        assert_eq!(
            h.runner().count("build"),
            failing + 1,
            "failing at index {failing}"
        );
        assert_eq!(h.runner().count("test"), 0);
        assert_eq!(
            outcome.failure().map(StageFailure::stage),
            Some(Stage::Build(Component::new(names[failing])))
        );
    }
}

#[tokio::test]
async fn launch_failure_of_build_tool_uses_sentinel() {
    let h = harness(
        &["svc-a"],
        HarnessOptions::default(),
        ScriptedRunner::new().with_status("cargo build -p svc-a", LAUNCH_FAILURE_STATUS),
    );

    let outcome = run(&h).await;

    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(
        outcome.failure().map(StageFailure::status),
        Some(LAUNCH_FAILURE_STATUS)
    );
}

// =============================================================================
// Environment hand-off
// =============================================================================

#[tokio::test]
async fn quiet_run_injects_debug_and_pins_test_config() {
    let h = harness(&["svc-a"], HarnessOptions::default(), ScriptedRunner::new());

    run(&h).await;

    let calls = h.runner().calls();
    let build = &calls[0];
    let test = &calls[1];

    assert_eq!(build.output, OutputMode::Quiet);
    assert_eq!(build.env.get(LOG_OVERRIDE_VAR), Some(OsStr::new(INJECTED_LOG_LEVEL)));
    assert_eq!(build.env.get("PATH"), Some(OsStr::new("/usr/bin")));
    assert!(!build.env.contains("ELUDRIS_CONF"));

    assert_eq!(test.env.get("ELUDRIS_CONF"), Some(OsStr::new("tests/Eludris.toml")));
    assert_eq!(test.env.get(INSTANCE_URL_VAR), Some(OsStr::new("http://0.0.0.0:7159")));
}

#[tokio::test]
async fn verbose_run_respects_caller_override() {
    let options = HarnessOptions {
        output: OutputMode::Inherit,
        run_workspace_tests: true,
    };
    let h = harness(&["svc-a"], options, ScriptedRunner::new());
    let configurator = h.configurator(inherited(&[(LOG_OVERRIDE_VAR, "oprish=trace")]));

    h.run_with(&configurator).await;

    for call in h.runner().calls() {
        assert_eq!(call.output, OutputMode::Inherit);
        assert_eq!(call.env.get(LOG_OVERRIDE_VAR), Some(OsStr::new("oprish=trace")));
    }
}

#[tokio::test]
async fn quiet_run_strips_caller_override() {
    let h = harness(&["svc-a"], HarnessOptions::default(), ScriptedRunner::new());
    let configurator = h.configurator(inherited(&[(LOG_OVERRIDE_VAR, "info")]));

    h.run_with(&configurator).await;

    for call in h.runner().calls() {
        assert!(!call.env.contains(LOG_OVERRIDE_VAR));
    }
}

// =============================================================================
// Service lifecycle
// =============================================================================

fn launching(names: &[&str], runner: ScriptedRunner) -> Harness<ScriptedRunner, RecordingSignaller> {
    let mut config = config_with(names);
    config.services.launch = true;
    Harness::with_signaller(
        config,
        HarnessOptions::default(),
        runner,
        RecordingSignaller::default(),
    )
}

#[tokio::test]
async fn launched_services_are_stopped_after_success() {
    let h = launching(&["oprish", "pandemonium", "effis"], ScriptedRunner::new());

    let outcome = run(&h).await;

    assert_eq!(outcome, RunOutcome::Success);
    let spawns: Vec<_> = h
        .runner()
        .calls()
        .into_iter()
        .filter(|c| c.kind == CallKind::Spawn)
        .collect();
    assert_eq!(spawns.len(), 3);
    assert!(
        spawns
            .iter()
            .all(|c| c.env.get("ELUDRIS_CONF") == Some(OsStr::new("tests/Eludris.toml")))
    );

    let mut sent = h.signaller().sent();
    sent.sort_unstable();
    assert_eq!(sent, vec![1000, 1001, 1002], "each service signalled once");
}

#[tokio::test]
async fn services_start_after_builds_and_before_tests() {
    let h = launching(&["svc-a", "svc-b"], ScriptedRunner::new());

    run(&h).await;

    assert_eq!(
        h.runner().commands(),
        vec![
            "cargo build -p svc-a",
            "cargo build -p svc-b",
            "cargo run -p svc-a",
            "cargo run -p svc-b",
            "cargo test",
        ]
    );
}

#[tokio::test]
async fn launched_services_are_stopped_after_test_failure() {
    let h = launching(
        &["svc-a", "svc-b"],
        ScriptedRunner::new().with_status("cargo test", 3),
    );

    let outcome = run(&h).await;

    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(h.signaller().sent().len(), 2);
}

#[tokio::test]
async fn launch_failure_stops_services_already_started() {
    let h = launching(
        &["svc-a", "svc-b", "svc-c"],
        ScriptedRunner::new().with_spawn_failure("cargo run -p svc-b"),
    );

    let outcome = run(&h).await;

    assert_eq!(
        outcome,
        RunOutcome::Failed(StageFailure::Launch {
            component: Component::new("svc-b"),
            status: LAUNCH_FAILURE_STATUS,
        })
    );
    assert_eq!(h.runner().count("run"), 2, "svc-c is never launched");
    assert_eq!(h.runner().count("test"), 0);
    assert_eq!(h.signaller().sent(), vec![1000], "only svc-a was running");
}

#[tokio::test]
async fn build_failure_launches_nothing() {
    let h = launching(
        &["svc-a", "svc-b"],
        ScriptedRunner::new().with_status("cargo build -p svc-a", 1),
    );

    run(&h).await;

    assert_eq!(h.runner().count("run"), 0);
    assert!(h.signaller().sent().is_empty());
}

#[tokio::test]
async fn service_that_exited_before_cleanup_is_not_signalled() {
    let h = launching(
        &["svc-a", "svc-b"],
        ScriptedRunner::new().with_early_exit("cargo run -p svc-a"),
    );

    let outcome = run(&h).await;

    assert_eq!(outcome, RunOutcome::Success);
    assert_eq!(h.signaller().sent(), vec![1001], "svc-a's pid is no longer ours");
}
