// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use tracing::{debug, warn};

/// 轮询锁文件的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 锁错误类型
#[derive(Error, Debug)]
pub enum LockError {
    /// 等待超时
    #[error("Timed out after {waited:?} waiting for lock {path}")]
    Timeout { path: PathBuf, waited: Duration },
    /// IO错误
    #[error("IO error on lock {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 基于锁文件的进程间互斥锁
///
/// 以 create-new 方式创建锁文件，创建成功即持有锁，
/// 释放时删除锁文件。超过 `stale_after` 仍未释放的锁文件视为遗留并被清理。
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
}

impl FileLock {
    /// 获取锁
    ///
    /// # 参数
    ///
    /// * `path` - 锁文件路径
    /// * `wait` - 最长等待时间
    /// * `stale_after` - 锁文件存在超过该时长即视为遗留
    pub async fn acquire(
        path: &Path,
        wait: Duration,
        stale_after: Duration,
    ) -> Result<Self, LockError> {
        let started = Instant::now();
        let io_err = |source| LockError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
            }
        }

        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .await
            {
                Ok(mut file) => {
                    let owner = format!("pid={}\n", std::process::id());
                    file.write_all(owner.as_bytes()).await.map_err(io_err)?;
                    debug!("Acquired lock {}", path.display());
                    return Ok(Self {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if let Some(observed) = Self::stale_mtime(path, stale_after).await {
                        warn!("Removing stale lock {}", path.display());
                        if remove_if_unchanged(path, observed).await.map_err(io_err)? {
                            continue;
                        }
                        debug!("Lock {} was replaced before removal", path.display());
                    }
                    if started.elapsed() >= wait {
                        return Err(LockError::Timeout {
                            path: path.to_path_buf(),
                            waited: started.elapsed(),
                        });
                    }
                    sleep(POLL_INTERVAL).await;
                }
                Err(e) => return Err(io_err(e)),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 锁文件已遗留时返回观察到的修改时间
    async fn stale_mtime(path: &Path, stale_after: Duration) -> Option<SystemTime> {
        let modified = tokio::fs::metadata(path).await.ok()?.modified().ok()?;
        let age = SystemTime::now().duration_since(modified).ok()?;
        (age > stale_after).then_some(modified)
    }
}

/// 仅当锁文件的修改时间仍为 `observed` 时删除它
///
/// 返回 `Ok(true)` 表示文件已不存在，可以重新尝试创建。
/// 重新检查与删除之间仍有极短的窗口，两个进程同时接管同一个遗留锁时
/// 其中一个可能删除另一个刚创建的锁文件。
async fn remove_if_unchanged(path: &Path, observed: SystemTime) -> std::io::Result<bool> {
    let current = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.modified()?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e),
    };
    if current != observed {
        return Ok(false);
    }
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e),
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to release lock {}: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lock_is_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rpscrape.lock");

        let lock = FileLock::acquire(&path, Duration::from_secs(1), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(path.exists());
        drop(lock);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_second_acquire_times_out_while_held() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rpscrape.lock");

        let _held = FileLock::acquire(&path, Duration::from_secs(1), Duration::from_secs(60))
            .await
            .unwrap();
        let err = FileLock::acquire(&path, Duration::from_millis(300), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, LockError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_stale_lock_is_taken_over() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rpscrape.lock");
        let file = std::fs::File::create(&path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(3600))
            .unwrap();
        drop(file);

        let lock = FileLock::acquire(&path, Duration::from_millis(300), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(lock.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_replaced_lock_is_not_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rpscrape.lock");
        let file = std::fs::File::create(&path).unwrap();
        let observed = SystemTime::now() - Duration::from_secs(3600);
        file.set_modified(observed).unwrap();

        // 另一个进程在此期间接管并重建了锁文件
        file.set_modified(SystemTime::now()).unwrap();
        drop(file);

        assert!(!remove_if_unchanged(&path, observed).await.unwrap());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unchanged_stale_lock_is_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rpscrape.lock");
        let file = std::fs::File::create(&path).unwrap();
        let observed = SystemTime::now() - Duration::from_secs(3600);
        file.set_modified(observed).unwrap();
        drop(file);

        let observed = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert!(remove_if_unchanged(&path, observed).await.unwrap());
        assert!(!path.exists());
        assert!(remove_if_unchanged(&path, observed).await.unwrap());
    }
}
