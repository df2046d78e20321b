// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含下游存储的具体实现和指标记录：
/// - 数据集（dataset）：本地文件系统和内存数据集
/// - 指标（metrics）：运行、发布和子进程耗时指标
/// - 存储（storage）：本地文件系统和内存键值存储，以及存储工厂
///
/// 基础设施层依赖领域层的抽象接口，领域层不感知具体实现。
pub mod dataset;
pub mod metrics;
pub mod storage;
