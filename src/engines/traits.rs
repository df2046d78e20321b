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

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 进程无法启动
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// 等待或读取进程时的IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 执行请求
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// 可执行程序
    pub program: String,
    /// 命令行参数
    pub args: Vec<String>,
    /// 工作目录
    pub working_dir: Option<PathBuf>,
    /// 墙钟超时
    pub timeout: Duration,
}

impl ExecutionRequest {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// 用于日志的命令行表示
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 执行结果
///
/// 子进程的带标签结果。失败种类的映射是基于此结构的纯函数。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// 退出码，被信号终止或超时被杀时为 None
    pub exit_code: Option<i32>,
    /// 标准输出
    pub stdout: String,
    /// 标准错误
    pub stderr: String,
    /// 是否因超时被终止
    pub timed_out: bool,
    /// 执行耗时（毫秒）
    pub duration_ms: u64,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// 进程执行器特质
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// 同步运行一个子进程直到退出或超时
    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionOutcome, EngineError>;
}
