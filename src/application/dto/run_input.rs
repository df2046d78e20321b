// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use validator::{Validate, ValidationErrors};

use crate::domain::models::run_request::{RunRequest, DEFAULT_COMMAND, DEFAULT_DATE};
use crate::domain::repositories::key_value_repository::KeyValueRepository;
use crate::utils::errors::RunError;

/// 宿主平台存放运行输入的键
pub const INPUT_KEY: &str = "INPUT";

/// 输入读取错误
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read input file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid input from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// 运行输入数据传输对象
///
/// 来自宿主平台的原始输入，只校验是否存在并补齐默认值。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct RunInputDto {
    /// racecards 或 racedays
    #[serde(default = "default_command")]
    #[validate(length(min = 1, max = 64, message = "Command cannot be empty"))]
    pub command: String,
    /// today 或具体日期
    #[serde(default = "default_date")]
    #[validate(length(max = 64))]
    pub date: String,
}

fn default_command() -> String {
    DEFAULT_COMMAND.to_string()
}

fn default_date() -> String {
    DEFAULT_DATE.to_string()
}

impl Default for RunInputDto {
    fn default() -> Self {
        Self {
            command: default_command(),
            date: default_date(),
        }
    }
}

impl RunInputDto {
    /// 解析 JSON 输入，`null` 或空内容视为默认输入
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let input: Option<Self> = serde_json::from_slice(data)?;
        Ok(input.unwrap_or_default())
    }

    /// 用命令行参数覆盖输入
    pub fn with_overrides(mut self, command: Option<String>, date: Option<String>) -> Self {
        if let Some(command) = command {
            self.command = command;
        }
        if let Some(date) = date {
            self.date = date;
        }
        self
    }

    /// 转换为运行请求
    ///
    /// # 返回值
    ///
    /// * `Ok(RunRequest)` - 命令有效
    /// * `Err(RunError::UnknownCommand)` - 命令既不是 racecards 也不是 racedays
    pub fn into_request(self) -> Result<RunRequest, RunError> {
        RunRequest::parse(&self.command, &self.date)
    }
}

/// 读取运行输入
///
/// 优先级从低到高：默认值、键值存储中的 `INPUT`、`input_file`、命令行参数。
/// 给出 `input_file` 时不再读取 `INPUT`；读取 `INPUT` 失败时记录警告并使用默认值。
///
/// # 参数
///
/// * `key_value` - 宿主平台的键值存储
/// * `input_file` - `--input` 指定的 JSON 文件
/// * `command` - `--command` 参数
/// * `date` - `--date` 参数
pub async fn resolve(
    key_value: &dyn KeyValueRepository,
    input_file: Option<&Path>,
    command: Option<String>,
    date: Option<String>,
) -> Result<RunInputDto, InputError> {
    let input = match input_file {
        Some(path) => {
            let data = tokio::fs::read(path).await.map_err(|source| InputError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            RunInputDto::from_slice(&data).map_err(|source| InputError::Parse {
                origin: path.display().to_string(),
                source,
            })?
        }
        None => match key_value.get(INPUT_KEY).await {
            Ok(Some(data)) => RunInputDto::from_slice(&data).map_err(|source| InputError::Parse {
                origin: format!("{}/{}", key_value.id(), INPUT_KEY),
                source,
            })?,
            Ok(None) => RunInputDto::default(),
            Err(e) => {
                warn!("Failed to read {} from key-value store: {}", INPUT_KEY, e);
                RunInputDto::default()
            }
        },
    };

    let input = input.with_overrides(command, date);
    input.validate()?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::run_request::Command;
    use crate::infrastructure::storage::InMemoryKeyValueStore;
    use crate::utils::errors::RunErrorKind;
    use tempfile::TempDir;

    async fn store_with_input(body: &str) -> InMemoryKeyValueStore {
        let store = InMemoryKeyValueStore::new();
        store.save(INPUT_KEY, body.as_bytes()).await.unwrap();
        store
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let input = RunInputDto::from_slice(b"{}").unwrap();
        assert_eq!(input, RunInputDto::default());
        assert_eq!(input.command, "racecards");
        assert_eq!(input.date, "today");
    }

    #[test]
    fn test_null_and_empty_input() {
        assert_eq!(RunInputDto::from_slice(b"null").unwrap(), RunInputDto::default());
        assert_eq!(RunInputDto::from_slice(b"  \n").unwrap(), RunInputDto::default());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let input = RunInputDto::from_slice(br#"{"command": "racedays", "date": "2025-06-17"}"#)
            .unwrap()
            .with_overrides(None, Some("tomorrow".to_string()));
        assert_eq!(input.command, "racedays");
        assert_eq!(input.date, "tomorrow");

        let request = input.into_request().unwrap();
        assert_eq!(request.command(), Command::Racedays);
        assert_eq!(request.date(), "tomorrow");
    }

    #[test]
    fn test_validation() {
        let input = RunInputDto {
            command: String::new(),
            date: "today".to_string(),
        };
        assert!(input.validate().is_err());
        assert!(RunInputDto::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_command() {
        let input = RunInputDto::default().with_overrides(Some("results".to_string()), None);
        let err = input.into_request().unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::UnknownCommand);
    }

    #[tokio::test]
    async fn test_resolve_defaults_without_any_input() {
        let store = InMemoryKeyValueStore::new();
        let input = resolve(&store, None, None, None).await.unwrap();
        assert_eq!(input, RunInputDto::default());
    }

    #[tokio::test]
    async fn test_resolve_reads_input_record() {
        let store = store_with_input(r#"{"command": "racedays", "date": "2025-01-01"}"#).await;
        let input = resolve(&store, None, None, None).await.unwrap();
        assert_eq!(input.command, "racedays");
        assert_eq!(input.date, "2025-01-01");
    }

    #[tokio::test]
    async fn test_resolve_priority_file_over_record_flags_over_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("input.json");
        std::fs::write(&file, r#"{"command": "racecards", "date": "2025-06-17"}"#).unwrap();
        let store = store_with_input(r#"{"command": "racedays", "date": "2025-01-01"}"#).await;

        let from_file = resolve(&store, Some(&file), None, None).await.unwrap();
        assert_eq!(from_file.command, "racecards");
        assert_eq!(from_file.date, "2025-06-17");

        let with_flag = resolve(&store, Some(&file), None, Some("tomorrow".to_string()))
            .await
            .unwrap();
        assert_eq!(with_flag.command, "racecards");
        assert_eq!(with_flag.date, "tomorrow");

        let flags_over_record = resolve(&store, None, Some("racecards".to_string()), None)
            .await
            .unwrap();
        assert_eq!(flags_over_record.command, "racecards");
        assert_eq!(flags_over_record.date, "2025-01-01");
    }

    #[tokio::test]
    async fn test_resolve_reports_bad_sources() {
        let dir = TempDir::new().unwrap();
        let store = store_with_input("{not json").await;

        let err = resolve(&store, None, None, None).await.unwrap_err();
        assert!(matches!(err, InputError::Parse { .. }));

        let missing = dir.path().join("missing.json");
        let err = resolve(&store, Some(&missing), None, None).await.unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));

        let empty = InMemoryKeyValueStore::new();
        let err = resolve(&empty, None, Some(String::new()), None).await.unwrap_err();
        assert!(matches!(err, InputError::Invalid(_)));
    }
}
