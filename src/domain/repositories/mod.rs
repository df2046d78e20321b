// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了发布记录所用的两个下游存储抽象，具体实现由基础设施层提供：
/// - 数据集（dataset_repository）：只追加、保持顺序的记录集合
/// - 键值存储（key_value_repository）：单槽位覆盖写入
///
/// 协调器只依赖这些接口，便于在测试中替换为内存实现或故障注入实现。
pub mod dataset_repository;
pub mod key_value_repository;
