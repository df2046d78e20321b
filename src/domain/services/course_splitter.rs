// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use deunicode::deunicode;

use crate::domain::models::output_record::{string_field, OutputRecord};

/// 按赛场拆分时键名的前缀
pub const COURSE_KEY_PREFIX: &str = "COURSE-";

/// 共用同一个键的一组记录
#[derive(Debug, Clone, PartialEq)]
pub struct CourseGroup {
    /// 键值存储中的键
    pub key: String,
    /// 映射到该键的赛场名称，按首次出现排序
    pub courses: Vec<String>,
    pub records: Vec<OutputRecord>,
}

/// 按赛场名称分组，保持赛场首次出现的顺序和组内记录顺序
///
/// 没有字符串类型 `course` 字段的记录不参与分组。
pub fn group_by_course(records: &[OutputRecord]) -> Vec<(String, Vec<OutputRecord>)> {
    let mut groups: Vec<(String, Vec<OutputRecord>)> = Vec::new();

    for record in records {
        let Some(course) = string_field(record, "course") else {
            continue;
        };
        match groups.iter_mut().find(|(name, _)| name == course) {
            Some((_, members)) => members.push(record.clone()),
            None => groups.push((course.to_string(), vec![record.clone()])),
        }
    }

    groups
}

/// 按键名分组
///
/// 清洗后得到相同键名的赛场合并为一组，避免后写的组覆盖先写的组。
/// 名称无法生成键的赛场放在第二个返回值中。
pub fn group_by_key(records: &[OutputRecord]) -> (Vec<CourseGroup>, Vec<String>) {
    let mut groups: Vec<CourseGroup> = Vec::new();
    let mut unusable = Vec::new();

    for (course, members) in group_by_course(records) {
        let Some(key) = course_key(&course) else {
            unusable.push(course);
            continue;
        };
        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => {
                group.courses.push(course);
                group.records.extend(members);
            }
            None => groups.push(CourseGroup {
                key,
                courses: vec![course],
                records: members,
            }),
        }
    }

    (groups, unusable)
}

/// 清洗赛场名称：只保留字母数字、空格、`-` 和 `_`，去掉尾部空白
pub fn safe_name(course: &str) -> String {
    let kept: String = course
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim_end().to_string()
}

/// 赛场对应的键值存储键名，清洗后为空时返回 None
///
/// 非 ASCII 字符先音译为 ASCII，键名只含 ASCII 字母数字、`-` 和 `_`。
pub fn course_key(course: &str) -> Option<String> {
    let ascii: String = deunicode(&safe_name(course))
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let name = ascii.split_whitespace().collect::<Vec<_>>().join("-");
    if name.is_empty() {
        None
    } else {
        Some(format!("{}{}", COURSE_KEY_PREFIX, name))
    }
}
