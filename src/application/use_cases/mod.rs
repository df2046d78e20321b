// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// 一次运行即一个完整的业务流程：工具检查、子进程、输出定位、解码、发布
pub mod exit_status;
pub mod run_coordinator;
