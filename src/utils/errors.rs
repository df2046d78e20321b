// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::models::publish_result::SinkKind;

/// 运行错误类型
///
/// 每一种错误对本次运行都是致命的，不做内部重试，
/// 由运维人员根据日志中的上下文手动重新触发。
#[derive(Error, Debug)]
pub enum RunError {
    /// 外部工具不可用（克隆失败、入口脚本缺失、安装锁超时）
    #[error("Tool unavailable: {message}")]
    ToolUnavailable { message: String },

    /// 未知命令
    #[error("Unknown command: {0:?} (expected racecards or racedays)")]
    UnknownCommand(String),

    /// 子进程执行超时
    #[error("Execution of {command} for {date} timed out after {timeout_secs}s")]
    ExecutionTimeout {
        command: String,
        date: String,
        timeout_secs: u64,
    },

    /// 子进程以非零状态退出或无法启动
    #[error("Execution of {command} for {date} failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        command: String,
        date: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// 子进程成功结束但未找到输出文件
    #[error("No output file found in {dir}")]
    NoOutputFound { dir: PathBuf },

    /// 输出文件内容无法解码
    #[error("Malformed output in {path}: {message}")]
    MalformedOutput { path: PathBuf, message: String },

    /// 下游存储写入失败
    #[error("Write to {sink} sink failed: {message}")]
    SinkWriteFailed { sink: SinkKind, message: String },
}

impl RunError {
    pub fn kind(&self) -> RunErrorKind {
        match self {
            RunError::ToolUnavailable { .. } => RunErrorKind::ToolUnavailable,
            RunError::UnknownCommand(_) => RunErrorKind::UnknownCommand,
            RunError::ExecutionTimeout { .. } => RunErrorKind::ExecutionTimeout,
            RunError::ExecutionFailed { .. } => RunErrorKind::ExecutionFailed,
            RunError::NoOutputFound { .. } => RunErrorKind::NoOutputFound,
            RunError::MalformedOutput { .. } => RunErrorKind::MalformedOutput,
            RunError::SinkWriteFailed { sink, .. } => RunErrorKind::SinkWriteFailed(*sink),
        }
    }

    pub(crate) fn tool_unavailable(message: impl Into<String>) -> Self {
        RunError::ToolUnavailable {
            message: message.into(),
        }
    }
}

/// 错误种类，用于日志、指标标签和运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunErrorKind {
    ToolUnavailable,
    UnknownCommand,
    ExecutionTimeout,
    ExecutionFailed,
    NoOutputFound,
    MalformedOutput,
    SinkWriteFailed(SinkKind),
}

impl RunErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunErrorKind::ToolUnavailable => "tool_unavailable",
            RunErrorKind::UnknownCommand => "unknown_command",
            RunErrorKind::ExecutionTimeout => "execution_timeout",
            RunErrorKind::ExecutionFailed => "execution_failed",
            RunErrorKind::NoOutputFound => "no_output_found",
            RunErrorKind::MalformedOutput => "malformed_output",
            RunErrorKind::SinkWriteFailed(SinkKind::Dataset) => "sink_write_failed_dataset",
            RunErrorKind::SinkWriteFailed(SinkKind::KeyValue) => "sink_write_failed_key_value",
        }
    }
}

impl fmt::Display for RunErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
