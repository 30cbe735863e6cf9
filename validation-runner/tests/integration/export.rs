// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use color_eyre::eyre::{Result, ensure};
use maplit::btreemap;
use pretty_assertions::assert_eq;
use validation_runner::{
    errors::ExportError,
    run_result::{RunOrigin, RunResult},
    store::RunStore,
    vcs::VcsInfo,
};

fn sample_run() -> RunResult {
    RunResult::build(
        VcsInfo::new("feature/jit", "9f8e7d6c"),
        vec![
            test_result("./hello", &[], 0, 0, btreemap! { "mov" => 4, "ret" => 1 }),
            test_result(
                "./args",
                &["with space", "--flag"],
                0,
                2,
                btreemap! { "mov" => 2, "call:near" => 1 },
            ),
            test_result("./crash", &["segv"], 139, 7, btreemap! { "ud2" => 1 }),
        ],
    )
}

#[test]
fn exported_run_reads_back_as_baseline() -> Result<()> {
    let run = sample_run();
    let mut store = JsonRowStore::default();

    let run_id = run.write_to_store(&mut store)?;
    assert_eq!(store.run_rows(), 1);
    assert_eq!(store.test_rows_for(run_id), 3);

    let stored = store
        .get_last_run("feature/jit")?
        .expect("run was stored on feature/jit");
    assert_eq!(stored.vcs(), run.vcs());
    assert_eq!(stored.counters(), run.counters());
    assert_eq!(stored.coverage(), run.coverage());
    assert_eq!(stored.coverage_log(), run.coverage_log());
    assert_eq!(stored.test_results(), run.test_results());
    ensure!(
        matches!(stored.origin(), RunOrigin::Fresh { .. }),
        "rebuilt runs carry their test results"
    );

    Ok(())
}

#[test]
fn record_rehydrates_aggregates() -> Result<()> {
    let run = sample_run();
    let record = run.to_record();

    // The crashing test doesn't qualify, so its coverage and errors are excluded.
    assert_eq!(record.total_tests, 3);
    assert_eq!(record.passed_tests, 2);
    assert_eq!(record.unique_instr, 3);
    assert_eq!(record.counters.errors, 2);
    assert_eq!(record.coverage_log, "call:near:1\nmov:6\nret:1\n");

    let json = serde_json::to_string(&record)?;
    let rehydrated = RunResult::from_record(serde_json::from_str(&json)?);
    assert_eq!(rehydrated.coverage(), run.coverage());
    assert_eq!(rehydrated.coverage().get("call:near"), Some(1));
    assert_eq!(rehydrated.unique_instr(), run.unique_instr());
    assert!(rehydrated.test_results().is_empty());

    Ok(())
}

#[test]
fn export_stops_at_first_failed_test() {
    let run = sample_run();
    let mut store = JsonRowStore {
        close_after_tests: Some(1),
        ..Default::default()
    };

    let error = run
        .write_to_store(&mut store)
        .expect_err("store closes after one test");
    match error {
        ExportError::InsertTest {
            run_id,
            index,
            command_line,
            error: JsonStoreError::Closed,
        } => {
            assert_eq!(index, 1);
            assert_eq!(command_line, "./args 'with space' --flag");
            assert_eq!(store.run_rows(), 1);
            assert_eq!(store.test_rows_for(run_id), 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
