// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, describe_counter, describe_histogram, histogram};

use crate::domain::models::publish_result::SinkKind;
use crate::domain::models::run_request::Command;

/// 注册指标描述
///
/// 批处理二进制不安装导出器，未安装记录器时指标调用为空操作。
pub fn describe_metrics() {
    describe_counter!("rprelay_runs_total", "Total number of runs by command and outcome");
    describe_counter!(
        "rprelay_records_published_total",
        "Total number of records written per sink"
    );
    describe_counter!(
        "rprelay_sink_failures_total",
        "Total number of failed sink writes"
    );
    describe_histogram!(
        "rprelay_subprocess_duration_ms",
        "Wall-clock duration of the scraper subprocess in milliseconds"
    );
}

pub fn record_run(command: Command, outcome: &'static str) {
    counter!("rprelay_runs_total", "command" => command.as_str(), "outcome" => outcome)
        .increment(1);
}

pub fn record_published(sink: SinkKind, count: usize) {
    counter!("rprelay_records_published_total", "sink" => sink.to_string())
        .increment(count as u64);
}

pub fn record_sink_failure(sink: SinkKind) {
    counter!("rprelay_sink_failures_total", "sink" => sink.to_string()).increment(1);
}

pub fn record_subprocess_duration(command: Command, duration_ms: u64) {
    histogram!("rprelay_subprocess_duration_ms", "command" => command.as_str())
        .record(duration_ms as f64);
}
