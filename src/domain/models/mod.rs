// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了一次运行涉及的核心数据，包括：
/// - 运行请求（run_request）：命令与日期参数
/// - 输出记录（output_record）：外部工具产出的不透明结构化数据
/// - 发布结果（publish_result）：每个存储各自的写入结果
/// - 运行状态（run_state）：协调器的线性状态机
/// - 工具布局（tool_layout）：外部工具的入口脚本与输出目录
pub mod output_record;
pub mod publish_result;
pub mod run_request;
pub mod run_state;
pub mod tool_layout;
