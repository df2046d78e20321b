// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::models::run_request::Command;
use crate::utils::errors::RunError;

/// 下游存储种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// 只追加的数据集
    Dataset,
    /// 单槽位键值存储
    KeyValue,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SinkKind::Dataset => write!(f, "dataset"),
            SinkKind::KeyValue => write!(f, "key_value"),
        }
    }
}

/// 单个存储的写入结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SinkStatus {
    /// 写入成功，附带存储中的引用
    Written { reference: String },
    /// 写入失败
    Failed { error: String },
}

impl SinkStatus {
    pub fn is_written(&self) -> bool {
        matches!(self, SinkStatus::Written { .. })
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            SinkStatus::Written { reference } => Some(reference),
            SinkStatus::Failed { .. } => None,
        }
    }
}

/// 按赛场拆分写入的键值槽位
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSlot {
    /// 赛场名称，多个赛场共用一个键时以逗号分隔
    pub course: String,
    /// 写入的键
    pub key: String,
    /// 该赛场的记录数
    pub record_count: usize,
    /// 写入结果
    pub status: SinkStatus,
}

/// 发布结果
///
/// 每次运行产出一次，汇总记录数、来源文件以及每个存储各自的写入结果。
/// 两个存储互相独立，因此不提供单一的成功标志。
#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    pub run_id: Uuid,
    pub command: Command,
    pub date: String,
    pub record_count: usize,
    pub source_file: PathBuf,
    pub dataset: SinkStatus,
    pub key_value: SinkStatus,
    pub course_slots: Vec<CourseSlot>,
    /// 发布完成时间
    pub finished_at: DateTime<Utc>,
}

impl PublishResult {
    /// 所有存储是否都写入成功
    pub fn is_fully_published(&self) -> bool {
        self.dataset.is_written()
            && self.key_value.is_written()
            && self.course_slots.iter().all(|slot| slot.status.is_written())
    }

    /// 每个写入失败的存储对应一个 `SinkWriteFailed` 错误
    ///
    /// 按赛场拆分的槽位失败归入键值存储，与主槽位合并为一条。
    pub fn sink_failures(&self) -> Vec<RunError> {
        let mut failures = Vec::new();

        if let SinkStatus::Failed { error } = &self.dataset {
            failures.push(RunError::SinkWriteFailed {
                sink: SinkKind::Dataset,
                message: error.clone(),
            });
        }

        let mut key_value_errors: Vec<String> = Vec::new();
        if let SinkStatus::Failed { error } = &self.key_value {
            key_value_errors.push(error.clone());
        }
        for slot in &self.course_slots {
            if let SinkStatus::Failed { error } = &slot.status {
                key_value_errors.push(format!("{}: {}", slot.key, error));
            }
        }
        if !key_value_errors.is_empty() {
            failures.push(RunError::SinkWriteFailed {
                sink: SinkKind::KeyValue,
                message: key_value_errors.join("; "),
            });
        }

        failures
    }
}
