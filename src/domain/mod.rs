// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心逻辑，包括：
/// - 领域模型（models）：运行请求、输出记录、发布结果和运行状态
/// - 仓库接口（repositories）：数据集与键值存储的抽象接口
/// - 服务（services）：输出定位、结果分类、记录解码等纯逻辑
///
/// 领域层不依赖任何具体的进程或存储实现。
pub mod models;
pub mod repositories;
pub mod services;
