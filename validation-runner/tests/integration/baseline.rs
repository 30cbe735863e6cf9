// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use color_eyre::eyre::Result;
use maplit::btreemap;
use pretty_assertions::assert_eq;
use validation_runner::{
    compare::{BaselineComparison, TestFinding, compare_with_last_run},
    run_result::RunResult,
    vcs::VcsInfo,
};

fn run(branch: &str, commit: &str, add_retcode: i32, mul_errors: u64) -> RunResult {
    RunResult::build(
        VcsInfo::new(branch, commit),
        vec![
            test_result("./add", &["1", "2"], add_retcode, 0, btreemap! { "add" => 1 }),
            test_result("./mul", &["3"], 0, mul_errors, btreemap! { "imul" => 1 }),
        ],
    )
}

#[test]
fn new_branch_compares_against_master() -> Result<()> {
    let mut store = JsonRowStore::default();
    run("master", "00000001", 0, 0).write_to_store(&mut store)?;

    let current = run("feature", "00000002", 1, 3);
    let comparison = compare_with_last_run(&current, &store, "master")?;
    let report = comparison.report().expect("master run is the baseline");

    assert_eq!(report.baseline(), &VcsInfo::new("master", "00000001"));
    assert_eq!(report.pairs_checked(), 2);
    assert_eq!(report.regression_count(), 1);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(
        report
            .findings()
            .iter()
            .map(TestFinding::command_line)
            .collect::<Vec<_>>(),
        ["./add 1 2", "./mul 3"]
    );
    assert_eq!(store.lookup_count(), 2);

    Ok(())
}

#[test]
fn latest_run_on_same_branch_wins() -> Result<()> {
    let mut store = JsonRowStore::default();
    run("master", "00000001", 0, 0).write_to_store(&mut store)?;
    run("feature", "00000002", 1, 0).write_to_store(&mut store)?;
    run("feature", "00000003", 0, 5).write_to_store(&mut store)?;

    let current = run("feature", "00000004", 0, 5);
    let comparison = compare_with_last_run(&current, &store, "master")?;

    assert_eq!(comparison.regression_count(), Some(0));
    let report = comparison.report().expect("feature run is the baseline");
    assert_eq!(report.baseline().commit, "00000003");
    assert!(report.findings().is_empty());
    assert_eq!(store.lookup_count(), 1);

    Ok(())
}

#[test]
fn empty_store_has_no_previous_run() -> Result<()> {
    let store = JsonRowStore::default();
    let current = run("feature", "00000002", 0, 0);

    let comparison = compare_with_last_run(&current, &store, "master")?;
    match comparison {
        BaselineComparison::NoPreviousRun { branches_tried } => {
            assert_eq!(branches_tried, ["feature", "master"]);
        }
        BaselineComparison::Compared(report) => panic!("unexpected comparison: {report:?}"),
    }

    Ok(())
}

#[test]
fn exported_run_becomes_next_baseline() -> Result<()> {
    let mut store = JsonRowStore::default();

    let first = run("master", "00000001", 0, 0);
    let comparison = compare_with_last_run(&first, &store, "master")?;
    assert_eq!(comparison.regression_count(), None);
    first.write_to_store(&mut store)?;

    let second = run("master", "00000002", 2, 0);
    let comparison = compare_with_last_run(&second, &store, "master")?;
    assert_eq!(comparison.regression_count(), Some(1));

    Ok(())
}
