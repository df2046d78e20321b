// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 存储错误
    #[error("Storage error: {0}")]
    Other(String),
}

/// 键值存储特质
///
/// 每个键对应一个槽位，写入时覆盖原有值。
#[async_trait]
pub trait KeyValueRepository: Send + Sync {
    /// 存储标识
    fn id(&self) -> &str;

    /// 使用指定键保存数据，覆盖已有值
    async fn save(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// 根据键检索数据
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// 根据键删除数据
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// 检查是否存在指定键
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}
