// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::settings::{InstallSettings, ToolSettings};
use crate::engines::traits::{ExecutionRequest, ProcessRunner};
use crate::utils::errors::RunError;
use crate::utils::lock::FileLock;

/// 安装检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    /// 工具目录已存在
    AlreadyPresent,
    /// 本次运行完成了克隆
    Installed,
}

/// 外部工具安装器
///
/// 工具目录缺失时从源仓库克隆一次。克隆在锁文件保护下进行，
/// 先克隆到同级临时目录再重命名，失败时不会留下半成品目录。
pub struct ToolInstaller<P>
where
    P: ProcessRunner,
{
    runner: Arc<P>,
    root: PathBuf,
    repository_url: String,
    git_program: String,
    clone_timeout: Duration,
    lock_timeout: Duration,
}

impl<P> ToolInstaller<P>
where
    P: ProcessRunner,
{
    pub fn new(runner: Arc<P>, root: impl Into<PathBuf>, repository_url: impl Into<String>) -> Self {
        Self {
            runner,
            root: root.into(),
            repository_url: repository_url.into(),
            git_program: "git".to_string(),
            clone_timeout: Duration::from_secs(600),
            lock_timeout: Duration::from_secs(600),
        }
    }

    pub fn from_settings(runner: Arc<P>, tool: &ToolSettings, install: &InstallSettings) -> Self {
        Self {
            runner,
            root: PathBuf::from(&tool.root),
            repository_url: tool.repository_url.clone(),
            git_program: tool.git_program.clone(),
            clone_timeout: Duration::from_secs(install.clone_timeout_secs),
            lock_timeout: Duration::from_secs(install.lock_timeout_secs),
        }
    }

    pub fn with_timeouts(mut self, clone_timeout: Duration, lock_timeout: Duration) -> Self {
        self.clone_timeout = clone_timeout;
        self.lock_timeout = lock_timeout;
        self
    }

    /// 确保外部工具已安装
    ///
    /// # 返回值
    ///
    /// * `Ok(InstallStatus)` - 工具目录可用
    /// * `Err(RunError::ToolUnavailable)` - 克隆失败或等待安装锁超时
    pub async fn ensure_installed(&self) -> Result<InstallStatus, RunError> {
        if self.is_present().await {
            return Ok(InstallStatus::AlreadyPresent);
        }

        let name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                RunError::tool_unavailable(format!("invalid tool root {}", self.root.display()))
            })?;
        let parent = parent_dir(&self.root);
        let lock_path = parent.join(format!(".{}.lock", name));

        info!(
            "{} not found, waiting for install lock {}",
            self.root.display(),
            lock_path.display()
        );
        let _lock = FileLock::acquire(&lock_path, self.lock_timeout, self.clone_timeout)
            .await
            .map_err(|e| RunError::tool_unavailable(e.to_string()))?;

        if self.is_present().await {
            info!("{} was installed by a concurrent run", self.root.display());
            return Ok(InstallStatus::AlreadyPresent);
        }

        let staging = parent.join(format!(".{}.partial-{}", name, Uuid::new_v4()));
        if let Err(e) = self.clone_into(&parent, &staging).await {
            remove_partial(&staging).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&staging, &self.root).await {
            remove_partial(&staging).await;
            return Err(RunError::tool_unavailable(format!(
                "failed to move clone into {}: {}",
                self.root.display(),
                e
            )));
        }

        info!("Cloned {} into {}", self.repository_url, self.root.display());
        Ok(InstallStatus::Installed)
    }

    async fn clone_into(&self, parent: &Path, staging: &Path) -> Result<(), RunError> {
        let request = ExecutionRequest::new(&self.git_program, self.clone_timeout)
            .arg("clone")
            .arg(&self.repository_url)
            .arg(staging.to_string_lossy())
            .current_dir(parent);

        info!("Cloning: {}", request.display());

        let outcome = self.runner.run(&request).await.map_err(|e| {
            error!("Failed to start clone: {}", e);
            RunError::tool_unavailable(format!("failed to clone {}: {}", self.repository_url, e))
        })?;

        if outcome.timed_out {
            return Err(RunError::tool_unavailable(format!(
                "clone of {} timed out after {}s",
                self.repository_url,
                self.clone_timeout.as_secs()
            )));
        }

        if outcome.exit_code != Some(0) {
            error!("Clone failed: {}", outcome.stderr.trim());
            return Err(RunError::tool_unavailable(format!(
                "clone of {} exited with {:?}: {}",
                self.repository_url,
                outcome.exit_code,
                outcome.stderr.trim()
            )));
        }

        Ok(())
    }

    async fn is_present(&self) -> bool {
        tokio::fs::try_exists(&self.root).await.unwrap_or(false)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

async fn remove_partial(staging: &Path) {
    match tokio::fs::remove_dir_all(staging).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial clone {}: {}", staging.display(), e),
    }
}
