// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::engines::traits::{EngineError, ExecutionOutcome, ExecutionRequest, ProcessRunner};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

/// 进程结束后等待输出读取完成的最长时间
///
/// 被终止进程的子进程可能仍持有管道，超过该时间后放弃读取。
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// 子进程引擎
///
/// 基于 tokio::process 实现，捕获标准输出和标准错误，
/// 超时后终止子进程。
pub struct ProcessEngine;

#[async_trait]
impl ProcessRunner for ProcessEngine {
    /// 运行子进程
    ///
    /// # 参数
    ///
    /// * `request` - 执行请求
    ///
    /// # 返回值
    ///
    /// * `Ok(ExecutionOutcome)` - 进程已退出或已因超时被终止
    /// * `Err(EngineError)` - 进程无法启动或等待失败
    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionOutcome, EngineError> {
        let start_time = Instant::now();

        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = request.working_dir {
            cmd.current_dir(dir);
        }

        debug!("Spawning process: {}", request.display());

        let mut child = cmd.spawn().map_err(|source| EngineError::Spawn {
            program: request.program.clone(),
            source,
        })?;

        let stdout_task = child.stdout.take().map(|s| tokio::spawn(read_stream(s)));
        let stderr_task = child.stderr.take().map(|s| tokio::spawn(read_stream(s)));

        let (exit_code, timed_out) = match timeout(request.timeout, child.wait()).await {
            Ok(status) => (status?.code(), false),
            Err(_) => {
                warn!(
                    "Process exceeded {}s timeout, killing: {}",
                    request.timeout.as_secs(),
                    request.display()
                );
                child.kill().await?;
                (None, true)
            }
        };

        let stdout = drain(stdout_task).await;
        let stderr = drain(stderr_task).await;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        debug!(
            "Process finished: exit_code={:?}, timed_out={}, duration={}ms",
            exit_code, timed_out, duration_ms
        );

        Ok(ExecutionOutcome {
            exit_code,
            stdout,
            stderr,
            timed_out,
            duration_ms,
        })
    }
}

async fn read_stream<R>(mut reader: R) -> String
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        debug!("Stopped reading process output: {}", e);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn drain(task: Option<JoinHandle<String>>) -> String {
    let Some(mut handle) = task else {
        return String::new();
    };
    match timeout(DRAIN_TIMEOUT, &mut handle).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            debug!("Output reader failed: {}", e);
            String::new()
        }
        Err(_) => {
            handle.abort();
            String::new()
        }
    }
}
