// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::errors::RunError;

/// 默认命令
pub const DEFAULT_COMMAND: &str = "racecards";
/// 默认日期参数
pub const DEFAULT_DATE: &str = "today";

/// 外部工具命令
///
/// 每个命令对应外部工具中的一个入口脚本。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// 赛事卡片
    #[default]
    Racecards,
    /// 赛事日
    Racedays,
}

impl Command {
    /// 所有支持的命令
    pub const ALL: [Command; 2] = [Command::Racecards, Command::Racedays];

    /// 命令对应的入口脚本文件名
    pub fn entry_point(&self) -> &'static str {
        match self {
            Command::Racecards => "racecards.py",
            Command::Racedays => "racedays.py",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Racecards => "racecards",
            Command::Racedays => "racedays",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "racecards" => Ok(Command::Racecards),
            "racedays" => Ok(Command::Racedays),
            other => Err(RunError::UnknownCommand(other.to_string())),
        }
    }
}

/// 运行请求
///
/// 一次运行的命令与日期参数，创建后不可变。
/// 日期是自由格式的标记，例如 `today` 或 ISO 日期，原样传给外部工具。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRequest {
    command: Command,
    date: String,
}

impl RunRequest {
    /// 创建运行请求，空白日期回落到默认值 `today`
    pub fn new(command: Command, date: impl Into<String>) -> Self {
        let date = date.into();
        let date = if date.trim().is_empty() {
            DEFAULT_DATE.to_string()
        } else {
            date.trim().to_string()
        };
        Self { command, date }
    }

    /// 从原始字符串解析运行请求
    ///
    /// # 返回值
    ///
    /// * `Ok(RunRequest)` - 解析成功
    /// * `Err(RunError::UnknownCommand)` - 命令既不是 racecards 也不是 racedays
    pub fn parse(command: &str, date: &str) -> Result<Self, RunError> {
        Ok(Self::new(command.parse()?, date))
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn date(&self) -> &str {
        &self.date
    }
}

impl Default for RunRequest {
    fn default() -> Self {
        Self::new(Command::default(), DEFAULT_DATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::RunErrorKind;
    use std::collections::HashSet;

    #[test]
    fn test_every_command_has_distinct_entry_point() {
        let entry_points: HashSet<&str> = Command::ALL.iter().map(|c| c.entry_point()).collect();
        assert_eq!(entry_points.len(), Command::ALL.len());
        assert!(entry_points.iter().all(|e| !e.is_empty()));
    }

    #[test]
    fn test_parse_known_commands() {
        assert_eq!("racecards".parse::<Command>().unwrap(), Command::Racecards);
        assert_eq!("racedays".parse::<Command>().unwrap(), Command::Racedays);
        assert_eq!(" racedays ".parse::<Command>().unwrap(), Command::Racedays);
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        for raw in ["results", "", "RACECARDS", "racecards.py"] {
            let err = raw.parse::<Command>().unwrap_err();
            assert_eq!(err.kind(), RunErrorKind::UnknownCommand);
        }
    }

    #[test]
    fn test_blank_date_defaults_to_today() {
        let request = RunRequest::parse("racedays", "   ").unwrap();
        assert_eq!(request.command(), Command::Racedays);
        assert_eq!(request.date(), "today");

        let request = RunRequest::parse("racecards", "2025-03-14").unwrap();
        assert_eq!(request.date(), "2025-03-14");
    }

    #[test]
    fn test_default_request() {
        let request = RunRequest::default();
        assert_eq!(request.command(), Command::Racecards);
        assert_eq!(request.date(), DEFAULT_DATE);
    }
}
