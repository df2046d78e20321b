// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 应用程序配置设置
///
/// 包含外部工具、子进程、安装、输出定位、发布和存储等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 外部工具配置
    pub tool: ToolSettings,
    /// 子进程运行配置
    pub run: RunSettings,
    /// 工具安装配置
    pub install: InstallSettings,
    /// 输出定位配置
    pub discovery: DiscoverySettings,
    /// 发布配置
    pub publish: PublishSettings,
    /// 存储配置
    pub storage: StorageSettings,
}

/// 外部工具配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ToolSettings {
    /// 工具根目录
    pub root: String,
    /// 工具缺失时克隆的源仓库
    pub repository_url: String,
    /// git 可执行程序
    pub git_program: String,
    /// 运行入口脚本的解释器
    pub interpreter: String,
    /// 入口脚本目录（相对于根目录）
    pub scripts_dir: String,
    /// 输出目录（相对于根目录）
    pub output_dir: String,
    /// 输出文件扩展名
    pub output_extension: String,
    /// 是否递归扫描输出目录
    pub recursive_scan: bool,
}

/// 子进程运行配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RunSettings {
    /// 墙钟超时时间（秒）
    pub timeout_secs: u64,
}

/// 工具安装配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct InstallSettings {
    /// 克隆超时时间（秒）
    pub clone_timeout_secs: u64,
    /// 等待安装锁的最长时间（秒）
    pub lock_timeout_secs: u64,
}

/// 输出定位配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    /// 是否忽略早于本次子进程启动的文件
    pub only_fresh: bool,
}

/// 发布配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PublishSettings {
    /// 键值存储中保存完整记录数组的键
    pub output_key: String,
    /// 是否额外按赛场拆分写入
    pub split_by_course: bool,
}

/// 存储配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// 存储类型 (local, memory)
    pub storage_type: String,
    /// 本地存储路径 (当 type=local 时使用)
    pub local_path: Option<String>,
    /// 数据集标识
    pub dataset_id: String,
    /// 键值存储标识
    pub key_value_store_id: String,
}

impl Settings {
    /// 加载配置，可额外指定一个必须存在的配置文件
    ///
    /// 优先级从低到高：默认值、`config/default`、`config/<APP_ENVIRONMENT>`、
    /// 指定文件、`RPRELAY__` 前缀的环境变量
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let mut builder = Config::builder()
            // Default tool settings
            .set_default("tool.root", "./rpscrape")?
            .set_default("tool.repository_url", "https://github.com/joenano/rpscrape.git")?
            .set_default("tool.git_program", "git")?
            .set_default("tool.interpreter", "python")?
            .set_default("tool.scripts_dir", "scripts")?
            .set_default("tool.output_dir", "data")?
            .set_default("tool.output_extension", "json")?
            .set_default("tool.recursive_scan", false)?
            // Default run settings
            .set_default("run.timeout_secs", 300)?
            // Default install settings
            .set_default("install.clone_timeout_secs", 600)?
            .set_default("install.lock_timeout_secs", 600)?
            // Default discovery settings
            .set_default("discovery.only_fresh", false)?
            // Default publish settings
            .set_default("publish.output_key", "OUTPUT")?
            .set_default("publish.split_by_course", false)?
            // Default storage settings
            .set_default("storage.storage_type", "local")?
            .set_default("storage.local_path", "./storage")?
            .set_default("storage.dataset_id", "default")?
            .set_default("storage.key_value_store_id", "default")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(Environment::with_prefix("RPRELAY").separator("__"))
            .build()?
            .try_deserialize()
    }
}
