// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::publish_result::PublishResult;
use crate::utils::errors::RunError;

/// 所有存储均写入成功
pub const EXIT_SUCCESS: u8 = 0;
/// 运行失败或任一存储写入失败
pub const EXIT_FAILURE: u8 = 1;

/// 把一次运行的结果映射为进程退出状态
///
/// 只有拿到发布结果且没有任何存储写入失败时返回 0。
/// 致命错误（包括 `UnknownCommand`）和任何 `SinkWriteFailed` 都返回 1。
pub fn exit_code(outcome: &Result<PublishResult, RunError>) -> u8 {
    match outcome {
        Ok(result) if result.sink_failures().is_empty() => EXIT_SUCCESS,
        Ok(_) | Err(_) => EXIT_FAILURE,
    }
}
