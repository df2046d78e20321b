// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::TestEnv;
use rpscrape_relay::domain::models::run_request::RunRequest;
use rpscrape_relay::utils::errors::{RunError, RunErrorKind};
use serde_json::json;
use std::time::{Duration, Instant};

const WRITES_TWO_RACES: &str = r#"
printf '%s' '[{"course":"Ascot","off_time":"14:30","race_name":"Queen Anne"},{"course":"York","off_time":"15:05","race_name":"Ebor"}]' > "data/$1.json"
echo "wrote data/$1.json"
"#;

#[tokio::test]
async fn test_run_publishes_to_local_sinks() {
    let env = TestEnv::with_tool(WRITES_TWO_RACES, "");
    let request = RunRequest::parse("racecards", "2025-06-17").unwrap();

    let result = env.coordinator().execute(&request).await.unwrap();

    assert_eq!(result.record_count, 2);
    assert!(result.is_fully_published());
    assert_eq!(result.source_file, env.data_dir().join("2025-06-17.json"));

    let expected = json!([
        {"course": "Ascot", "off_time": "14:30", "race_name": "Queen Anne"},
        {"course": "York", "off_time": "15:05", "race_name": "Ebor"}
    ]);
    assert_eq!(env.slot("OUTPUT"), Some(expected.clone()));
    assert_eq!(serde_json::Value::Array(env.dataset_items()), expected);
}

#[tokio::test]
async fn test_repeated_runs_append_dataset_and_overwrite_slot() {
    let env = TestEnv::with_tool(WRITES_TWO_RACES, "");
    let coordinator = env.coordinator();

    coordinator.execute(&RunRequest::default()).await.unwrap();
    coordinator.execute(&RunRequest::default()).await.unwrap();

    assert_eq!(env.dataset_items().len(), 4);
    assert_eq!(env.slot("OUTPUT").unwrap().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_nested_racecards_are_flattened_and_split() {
    let script = r#"
cat > data/racecards.json <<'JSON'
{"GB": {"Ascot": {"14:30": {"race_name": "Queen Anne", "runners": [{"name": "A"}]},
                  "15:05": {"race_name": "No field"}},
        "Royal Windsor": {"18:00": {"race_name": "Evening", "runners": []}}}}
JSON
"#;
    let env = TestEnv::with_tool(script, "[publish]\nsplit_by_course = true\n");

    let result = env.coordinator().execute(&RunRequest::default()).await.unwrap();

    assert_eq!(result.record_count, 2);
    assert_eq!(result.course_slots.len(), 2);

    let output = env.slot("OUTPUT").unwrap();
    assert_eq!(output[0]["country"], "GB");
    assert_eq!(output[0]["course"], "Ascot");
    assert_eq!(output[0]["off_time"], "14:30");
    assert_eq!(output[1]["course"], "Royal Windsor");

    assert_eq!(env.slot("COURSE-Ascot").unwrap().as_array().unwrap().len(), 1);
    assert!(env.slot("COURSE-Royal-Windsor").is_some());
}

#[tokio::test]
async fn test_script_failure_publishes_nothing() {
    let env = TestEnv::with_tool("echo 'no racecards for that date' >&2\nexit 3\n", "");

    let err = env
        .coordinator()
        .execute(&RunRequest::default())
        .await
        .unwrap_err();

    match err {
        RunError::ExecutionFailed {
            exit_code, stderr, ..
        } => {
            assert_eq!(exit_code, Some(3));
            assert!(stderr.contains("no racecards"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(env.slot("OUTPUT").is_none());
    assert!(env.dataset_items().is_empty());
}

#[tokio::test]
async fn test_script_timeout_is_killed() {
    let env = TestEnv::with_tool("exec sleep 30\n", "[run]\ntimeout_secs = 1\n");

    let started = Instant::now();
    let err = env
        .coordinator()
        .execute(&RunRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), RunErrorKind::ExecutionTimeout);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(env.slot("OUTPUT").is_none());
}

#[tokio::test]
async fn test_clean_exit_without_output() {
    let env = TestEnv::with_tool("echo nothing to do\n", "");

    let err = env
        .coordinator()
        .execute(&RunRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), RunErrorKind::NoOutputFound);
}

#[tokio::test]
async fn test_racedays_uses_its_own_entry_point() {
    let env = TestEnv::with_tool(WRITES_TWO_RACES, "");
    std::fs::write(
        env.tool_root.join("scripts/racedays.py"),
        "printf '[{\"course\": \"Chester\", \"day\": \"%s\"}]' \"$1\" > data/days.json\n",
    )
    .unwrap();

    let request = RunRequest::parse("racedays", "tomorrow").unwrap();
    let result = env.coordinator().execute(&request).await.unwrap();

    assert_eq!(result.record_count, 1);
    assert_eq!(env.slot("OUTPUT"), Some(json!([{"course": "Chester", "day": "tomorrow"}])));
}
