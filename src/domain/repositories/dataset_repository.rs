// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use crate::domain::models::output_record::OutputRecord;
use crate::domain::repositories::key_value_repository::StorageError;

/// 数据集特质
///
/// 只追加，保持写入顺序，不去重，不校验结构。
#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// 数据集标识
    fn id(&self) -> &str;

    /// 按顺序追加一批记录，返回数据集引用
    async fn push_items(&self, items: &[OutputRecord]) -> Result<String, StorageError>;

    /// 按写入顺序列出全部记录
    async fn list_items(&self) -> Result<Vec<OutputRecord>, StorageError>;
}
