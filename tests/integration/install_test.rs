// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::TestEnv;
use rpscrape_relay::domain::models::run_request::RunRequest;
use rpscrape_relay::utils::errors::RunErrorKind;

const WRITES_ONE_RACE: &str = r#"printf '[{"course": "Epsom", "off_time": "16:30"}]' > data/out.json"#;

#[tokio::test]
async fn test_missing_tool_is_cloned_then_run() {
    let env = TestEnv::empty("");
    env.install_fake_git(WRITES_ONE_RACE);
    assert!(!env.tool_root.exists());

    let coordinator = env.coordinator();
    let result = coordinator.execute(&RunRequest::default()).await.unwrap();

    assert_eq!(result.record_count, 1);
    assert!(env.tool_root.join("scripts/racecards.py").is_file());
    assert_eq!(env.clone_count(), 1);

    // 第二次运行直接使用已安装的工具
    coordinator.execute(&RunRequest::default()).await.unwrap();
    assert_eq!(env.clone_count(), 1);

    let leftovers: Vec<_> = std::fs::read_dir(env.dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name.contains(".partial-") || name.ends_with(".lock"))
        .collect();
    assert!(leftovers.is_empty(), "leftovers: {:?}", leftovers);
}

#[tokio::test]
async fn test_missing_git_is_tool_unavailable() {
    let env = TestEnv::empty("");

    let err = env
        .coordinator()
        .execute(&RunRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), RunErrorKind::ToolUnavailable);
    assert!(!env.tool_root.exists());
}
