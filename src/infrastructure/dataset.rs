// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use crate::domain::models::output_record::OutputRecord;
use crate::domain::repositories::dataset_repository::DatasetRepository;
use crate::domain::repositories::key_value_repository::StorageError;

/// 本地文件系统数据集
///
/// 布局：`<base>/datasets/<id>/000000001.json`，每条记录一个文件，
/// 编号延续已有记录，保证追加顺序。
pub struct LocalDataset {
    id: String,
    base_path: PathBuf,
}

impl LocalDataset {
    pub fn new(root: impl AsRef<Path>, id: impl Into<String>) -> Self {
        let id = id.into();
        let base_path = root.as_ref().join("datasets").join(&id);
        Self { id, base_path }
    }

    /// 已有记录文件的编号，按升序排列
    async fn item_indices(&self) -> Result<Vec<u64>, StorageError> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut indices = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(index) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }

    fn item_path(&self, index: u64) -> PathBuf {
        self.base_path.join(format!("{:09}.json", index))
    }
}

#[async_trait]
impl DatasetRepository for LocalDataset {
    fn id(&self) -> &str {
        &self.id
    }

    async fn push_items(&self, items: &[OutputRecord]) -> Result<String, StorageError> {
        fs::create_dir_all(&self.base_path).await?;

        let mut next = self.item_indices().await?.last().copied().unwrap_or(0) + 1;
        for item in items {
            let data = serde_json::to_vec_pretty(item)?;
            fs::write(self.item_path(next), data).await?;
            next += 1;
        }

        Ok(self.base_path.display().to_string())
    }

    async fn list_items(&self) -> Result<Vec<OutputRecord>, StorageError> {
        let mut items = Vec::new();
        for index in self.item_indices().await? {
            let data = fs::read(self.item_path(index)).await?;
            items.push(serde_json::from_slice(&data)?);
        }
        Ok(items)
    }
}

/// 内存数据集（用于测试和 memory 存储类型）
pub struct InMemoryDataset {
    id: String,
    items: RwLock<Vec<OutputRecord>>,
}

impl InMemoryDataset {
    pub fn new() -> Self {
        Self {
            id: "memory".to_string(),
            items: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryDataset {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatasetRepository for InMemoryDataset {
    fn id(&self) -> &str {
        &self.id
    }

    async fn push_items(&self, items: &[OutputRecord]) -> Result<String, StorageError> {
        let mut stored = self.items.write().await;
        stored.extend(items.iter().cloned());
        Ok(format!("memory://datasets/{}", self.id))
    }

    async fn list_items(&self) -> Result<Vec<OutputRecord>, StorageError> {
        Ok(self.items.read().await.clone())
    }
}
