// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::{debug, warn};

use crate::utils::errors::RunError;

/// 文件系统 mtime 精度不足时允许的误差
const FRESHNESS_TOLERANCE: Duration = Duration::from_secs(2);

/// 扫描得到的候选输出文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputCandidate {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl OutputCandidate {
    pub fn new(path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            modified,
        }
    }
}

/// 选出修改时间最新的文件
///
/// 与文件名和输入顺序无关；修改时间相同时取路径字典序最大者。
/// 没有候选文件时返回 None。
pub fn select_latest(candidates: &[OutputCandidate]) -> Option<PathBuf> {
    candidates
        .iter()
        .max_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.path.cmp(&b.path))
        })
        .map(|candidate| candidate.path.clone())
}

/// 判断路径扩展名是否匹配（不区分大小写）
pub fn matches_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension.trim_start_matches('.')))
}

/// 扫描输出目录，收集匹配扩展名的文件
///
/// 目录不存在时返回空列表。扫描过程中消失的文件会被跳过。
pub async fn scan_output_dir(
    dir: &Path,
    extension: &str,
    recursive: bool,
) -> std::io::Result<Vec<OutputCandidate>> {
    let mut candidates = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = match fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let metadata = match fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };

            if metadata.is_dir() {
                if recursive {
                    pending.push(path);
                }
                continue;
            }

            if metadata.is_file() && matches_extension(&path, extension) {
                candidates.push(OutputCandidate::new(path, metadata.modified()?));
            }
        }
    }

    Ok(candidates)
}

/// 定位本次运行的输出文件
///
/// # 参数
///
/// * `dir` - 输出目录
/// * `extension` - 输出文件扩展名
/// * `recursive` - 是否递归扫描
/// * `not_before` - 若提供，早于该时间修改的文件不参与选择
///
/// # 返回值
///
/// * `Ok(PathBuf)` - 修改时间最新的输出文件
/// * `Err(RunError::NoOutputFound)` - 没有匹配的文件
pub async fn discover_latest(
    dir: &Path,
    extension: &str,
    recursive: bool,
    not_before: Option<SystemTime>,
) -> Result<PathBuf, RunError> {
    let candidates = match scan_output_dir(dir, extension, recursive).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("Failed to scan output directory {}: {}", dir.display(), e);
            return Err(RunError::NoOutputFound {
                dir: dir.to_path_buf(),
            });
        }
    };

    let total = candidates.len();
    let candidates: Vec<OutputCandidate> = match not_before {
        Some(threshold) => candidates
            .into_iter()
            .filter(|c| c.modified + FRESHNESS_TOLERANCE >= threshold)
            .collect(),
        None => candidates,
    };

    debug!(
        "Scanned {}: {} matching files, {} eligible",
        dir.display(),
        total,
        candidates.len()
    );

    select_latest(&candidates).ok_or_else(|| RunError::NoOutputFound {
        dir: dir.to_path_buf(),
    })
}
