// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 端到端运行测试
//!
//! 使用真实的子进程执行器和本地存储，外部工具由 sh 脚本模拟。

#![cfg(unix)]

pub mod helpers;
pub mod install_test;
pub mod run_test;
