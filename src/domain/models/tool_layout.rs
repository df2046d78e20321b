// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::{Path, PathBuf};

use crate::config::settings::ToolSettings;
use crate::domain::models::run_request::Command;

/// 外部工具的目录布局
///
/// 协调器只依赖入口脚本所在目录和输出目录，不依赖输出文件名。
#[derive(Debug, Clone)]
pub struct ToolLayout {
    /// 工具根目录，子进程的工作目录
    pub root: PathBuf,
    /// 入口脚本所在的子目录（相对于根目录）
    pub scripts_dir: PathBuf,
    /// 输出文件所在的子目录（相对于根目录）
    pub output_dir: PathBuf,
    /// 运行入口脚本的解释器
    pub interpreter: String,
    /// 输出文件扩展名，不含点号
    pub output_extension: String,
    /// 是否递归扫描输出目录
    pub recursive_scan: bool,
}

impl ToolLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            scripts_dir: PathBuf::from("scripts"),
            output_dir: PathBuf::from("data"),
            interpreter: "python".to_string(),
            output_extension: "json".to_string(),
            recursive_scan: false,
        }
    }

    pub fn from_settings(settings: &ToolSettings) -> Self {
        Self {
            root: PathBuf::from(&settings.root),
            scripts_dir: PathBuf::from(&settings.scripts_dir),
            output_dir: PathBuf::from(&settings.output_dir),
            interpreter: settings.interpreter.clone(),
            output_extension: settings.output_extension.trim_start_matches('.').to_string(),
            recursive_scan: settings.recursive_scan,
        }
    }

    /// 入口脚本相对于根目录的路径，作为解释器参数
    pub fn entry_point(&self, command: Command) -> PathBuf {
        self.scripts_dir.join(command.entry_point())
    }

    /// 入口脚本的完整路径
    pub fn entry_point_path(&self, command: Command) -> PathBuf {
        self.root.join(self.entry_point(command))
    }

    /// 输出目录的完整路径
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
