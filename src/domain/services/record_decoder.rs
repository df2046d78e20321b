// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::Path;

use serde_json::{Map, Value};
use tokio::fs;

use crate::domain::models::output_record::OutputRecord;
use crate::utils::errors::RunError;

/// 读取并解码输出文件
///
/// 读取失败与内容无法解码一样报告为 `MalformedOutput`，并附带文件路径。
pub async fn read_output_file(path: &Path) -> Result<Vec<OutputRecord>, RunError> {
    let content = fs::read(path)
        .await
        .map_err(|e| malformed(path, format!("unreadable: {}", e)))?;
    decode_records(path, &content)
}

/// 将文件内容解码为输出记录序列
///
/// 支持两种布局：
/// - 对象数组：每个元素是一条记录，保持原有顺序
/// - 嵌套赛事卡片：`国家 → 赛场 → 开赛时间 → 赛事`，每场赛事展开为一条记录，
///   并在记录前部加入 `country`、`course`、`off_time` 字段
pub fn decode_records(path: &Path, content: &[u8]) -> Result<Vec<OutputRecord>, RunError> {
    let value: Value =
        serde_json::from_slice(content).map_err(|e| malformed(path, e.to_string()))?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(malformed(
                    path,
                    format!(
                        "element {} is {}, expected an object",
                        index,
                        type_name(&other)
                    ),
                )),
            })
            .collect(),
        Value::Object(root) => flatten_racecards(root).ok_or_else(|| {
            malformed(
                path,
                "object is not a country/course/off_time racecard layout".to_string(),
            )
        }),
        other => Err(malformed(
            path,
            format!("expected an array of records, found {}", type_name(&other)),
        )),
    }
}

/// 展开嵌套的赛事卡片布局
///
/// 不带 `runners` 的条目会被跳过；任一层级不是对象时返回 None。
pub fn flatten_racecards(root: Map<String, Value>) -> Option<Vec<OutputRecord>> {
    let mut records = Vec::new();

    for (country, courses) in root {
        let Value::Object(courses) = courses else {
            return None;
        };
        for (course, race_times) in courses {
            let Value::Object(race_times) = race_times else {
                return None;
            };
            for (off_time, race) in race_times {
                let Value::Object(race) = race else {
                    return None;
                };
                if !race.contains_key("runners") {
                    continue;
                }

                let mut record = OutputRecord::new();
                record.insert("country".to_string(), Value::String(country.clone()));
                record.insert("course".to_string(), Value::String(course.clone()));
                record.insert("off_time".to_string(), Value::String(off_time));
                record.extend(race);
                records.push(record);
            }
        }
    }

    Some(records)
}

fn malformed(path: &Path, message: String) -> RunError {
    RunError::MalformedOutput {
        path: path.to_path_buf(),
        message,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
