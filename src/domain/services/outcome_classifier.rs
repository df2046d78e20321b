// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use crate::domain::models::run_request::RunRequest;
use crate::engines::traits::ExecutionOutcome;
use crate::utils::errors::RunError;

/// 错误信息中保留的 stderr 尾部字符数
const STDERR_TAIL_CHARS: usize = 2000;

/// 将子进程执行结果映射为运行结果
///
/// 纯函数，不访问进程或文件系统。超时优先于退出码判断，
/// 因为被终止的进程退出码没有意义。
pub fn classify(
    outcome: &ExecutionOutcome,
    request: &RunRequest,
    timeout: Duration,
) -> Result<(), RunError> {
    if outcome.timed_out {
        return Err(RunError::ExecutionTimeout {
            command: request.command().to_string(),
            date: request.date().to_string(),
            timeout_secs: timeout.as_secs(),
        });
    }

    if outcome.exit_code != Some(0) {
        return Err(RunError::ExecutionFailed {
            command: request.command().to_string(),
            date: request.date().to_string(),
            exit_code: outcome.exit_code,
            stderr: tail(outcome.stderr.trim(), STDERR_TAIL_CHARS),
        });
    }

    Ok(())
}

/// 保留字符串末尾的至多 `max_chars` 个字符
pub fn tail(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    let skipped: String = text.chars().skip(count - max_chars).collect();
    format!("...{}", skipped)
}
