// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含与进程和存储无关的纯逻辑，便于单独测试：
/// - 输出定位（output_discovery）：扫描输出目录并选出修改时间最新的文件
/// - 结果分类（outcome_classifier）：把子进程执行结果映射为错误种类
/// - 记录解码（record_decoder）：把输出文件解码为记录序列
/// - 赛场拆分（course_splitter）：按赛场分组记录并生成键名
pub mod course_splitter;
pub mod outcome_classifier;
pub mod output_discovery;
pub mod record_decoder;
