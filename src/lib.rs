// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含运行输入和运行协调用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含运行请求、发布结果等核心模型，领域服务和存储接口
pub mod domain;

/// 引擎模块
///
/// 实现子进程执行和外部工具安装
pub mod engines;

/// 基础设施模块
///
/// 提供数据集和键值存储的具体实现以及指标记录
pub mod infrastructure;

/// 工具模块
///
/// 提供错误类型、文件锁和日志初始化
pub mod utils;
