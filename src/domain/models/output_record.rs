// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::{Map, Value};

/// 输出记录
///
/// 外部工具产出的一条结构化赛事数据。字段集合由外部工具决定，
/// 这里不做任何假设，按不透明的 JSON 对象处理。
pub type OutputRecord = Map<String, Value>;

/// 读取记录中的字符串字段
pub fn string_field<'a>(record: &'a OutputRecord, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

/// 将记录序列转换为 JSON 数组
pub fn to_array(records: &[OutputRecord]) -> Value {
    Value::Array(records.iter().cloned().map(Value::Object).collect())
}
