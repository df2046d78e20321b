// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::config::settings::StorageSettings;
use crate::domain::repositories::dataset_repository::DatasetRepository;
use crate::domain::repositories::key_value_repository::{KeyValueRepository, StorageError};
use crate::infrastructure::dataset::{InMemoryDataset, LocalDataset};

/// 本地文件系统键值存储
///
/// 布局：`<base>/key_value_stores/<id>/<KEY>.json`
pub struct LocalKeyValueStore {
    id: String,
    base_path: PathBuf,
}

impl LocalKeyValueStore {
    pub fn new(root: impl AsRef<Path>, id: impl Into<String>) -> Self {
        let id = id.into();
        let base_path = root.as_ref().join("key_value_stores").join(&id);
        Self { id, base_path }
    }

    fn get_full_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueRepository for LocalKeyValueStore {
    fn id(&self) -> &str {
        &self.id
    }

    async fn save(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let full_path = self.get_full_path(key)?;

        // 确保目录存在
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let full_path = self.get_full_path(key)?;

        match fs::read(&full_path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let full_path = self.get_full_path(key)?;

        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let full_path = self.get_full_path(key)?;
        Ok(fs::try_exists(&full_path).await?)
    }
}

/// 内存键值存储（用于测试和 memory 存储类型）
pub struct InMemoryKeyValueStore {
    id: String,
    data: std::sync::Arc<tokio::sync::RwLock<std::collections::HashMap<String, Vec<u8>>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            id: "memory".to_string(),
            data: std::sync::Arc::new(tokio::sync::RwLock::new(std::collections::HashMap::new())),
        }
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueRepository for InMemoryKeyValueStore {
    fn id(&self) -> &str {
        &self.id
    }

    async fn save(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut map = self.data.write().await;
        map.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let map = self.data.read().await;
        Ok(map.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.data.write().await;
        map.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let map = self.data.read().await;
        Ok(map.contains_key(key))
    }
}

/// 键名只允许字母数字和 `!-_.'()`，不能为空
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!-_.'()".contains(c));
    if valid {
        Ok(())
    } else {
        Err(StorageError::Other(format!("Invalid key: {:?}", key)))
    }
}

/// 下游存储组合
pub struct Sinks {
    pub dataset: Arc<dyn DatasetRepository>,
    pub key_value: Arc<dyn KeyValueRepository>,
}

/// 存储工厂函数
pub fn create_sinks(settings: &StorageSettings) -> Result<Sinks, StorageError> {
    match settings.storage_type.as_str() {
        "local" => {
            let base_path = settings
                .local_path
                .as_ref()
                .cloned()
                .unwrap_or_else(|| "./storage".to_string());
            Ok(Sinks {
                dataset: Arc::new(LocalDataset::new(&base_path, &settings.dataset_id)),
                key_value: Arc::new(LocalKeyValueStore::new(
                    &base_path,
                    &settings.key_value_store_id,
                )),
            })
        }

        "memory" => Ok(Sinks {
            dataset: Arc::new(InMemoryDataset::new()),
            key_value: Arc::new(InMemoryKeyValueStore::new()),
        }),

        other => Err(StorageError::Other(format!(
            "Unsupported storage type: {}",
            other
        ))),
    }
}
