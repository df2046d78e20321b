// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含运行输入的数据传输对象和运行协调用例
pub mod dto;
pub mod use_cases;
