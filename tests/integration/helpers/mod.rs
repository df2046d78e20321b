// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use rpscrape_relay::application::use_cases::run_coordinator::RunCoordinator;
use rpscrape_relay::config::settings::Settings;
use rpscrape_relay::engines::process_engine::ProcessEngine;
use rpscrape_relay::infrastructure::storage::create_sinks;
use serde_json::Value;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// 测试环境：配置文件、存储目录和模拟的外部工具
#[allow(dead_code)]
pub struct TestEnv {
    pub dir: TempDir,
    pub tool_root: PathBuf,
    pub storage_root: PathBuf,
    pub config_path: PathBuf,
}

impl TestEnv {
    /// 创建空环境，工具目录尚不存在
    pub fn empty(extra_config: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let tool_root = dir.path().join("rpscrape");
        let storage_root = dir.path().join("storage");
        let config_path = dir.path().join("relay.toml");

        let config = format!(
            r#"
[tool]
root = "{root}"
interpreter = "sh"
git_program = "{git}"

[storage]
storage_type = "local"
local_path = "{storage}"
{extra}
"#,
            root = tool_root.display(),
            git = dir.path().join("fake-git").display(),
            storage = storage_root.display(),
            extra = extra_config,
        );
        std::fs::write(&config_path, config).unwrap();

        Self {
            dir,
            tool_root,
            storage_root,
            config_path,
        }
    }

    /// 创建已安装工具的环境，两个入口脚本使用同一段 sh 脚本
    pub fn with_tool(script: &str, extra_config: &str) -> Self {
        let env = Self::empty(extra_config);
        write_tool(&env.tool_root, script);
        env
    }

    pub fn settings(&self) -> Settings {
        Settings::load(Some(&self.config_path)).unwrap()
    }

    pub fn coordinator(&self) -> RunCoordinator<ProcessEngine> {
        let settings = self.settings();
        let sinks = create_sinks(&settings.storage).unwrap();
        RunCoordinator::from_settings(Arc::new(ProcessEngine), sinks, &settings)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.tool_root.join("data")
    }

    /// 安装一个把 `clone <url> <target>` 实现为写出工具目录的假 git
    pub fn install_fake_git(&self, script: &str) {
        let body = format!(
            "#!/bin/sh\n[ \"$1\" = clone ] || exit 9\ntarget=\"$3\"\nmkdir -p \"$target/scripts\" \"$target/data\"\ncat > \"$target/scripts/racecards.py\" <<'SCRIPT'\n{script}\nSCRIPT\ncp \"$target/scripts/racecards.py\" \"$target/scripts/racedays.py\"\necho \"$2\" >> \"{log}\"\n",
            script = script,
            log = self.dir.path().join("git.log").display(),
        );
        let path = self.dir.path().join("fake-git");
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// 假 git 被调用的次数
    pub fn clone_count(&self) -> usize {
        std::fs::read_to_string(self.dir.path().join("git.log"))
            .map(|log| log.lines().count())
            .unwrap_or(0)
    }

    /// 读取键值存储中的槽位
    pub fn slot(&self, key: &str) -> Option<Value> {
        let path = self
            .storage_root
            .join("key_value_stores/default")
            .join(format!("{}.json", key));
        std::fs::read(path)
            .ok()
            .map(|data| serde_json::from_slice(&data).unwrap())
    }

    /// 按写入顺序读取数据集记录
    pub fn dataset_items(&self) -> Vec<Value> {
        let dir = self.storage_root.join("datasets/default");
        let mut paths: Vec<PathBuf> = match std::fs::read_dir(&dir) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => return Vec::new(),
        };
        paths.sort();
        paths
            .into_iter()
            .map(|p| serde_json::from_slice(&std::fs::read(p).unwrap()).unwrap())
            .collect()
    }
}

pub fn write_tool(root: &Path, script: &str) {
    std::fs::create_dir_all(root.join("scripts")).unwrap();
    std::fs::create_dir_all(root.join("data")).unwrap();
    std::fs::write(root.join("scripts/racecards.py"), script).unwrap();
    std::fs::write(root.join("scripts/racedays.py"), script).unwrap();
}
