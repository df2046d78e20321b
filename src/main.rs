// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rpscrape_relay::application::dto::run_input;
use rpscrape_relay::application::use_cases::exit_status::{exit_code, EXIT_FAILURE};
use rpscrape_relay::application::use_cases::run_coordinator::RunCoordinator;
use rpscrape_relay::config::settings::Settings;
use rpscrape_relay::domain::repositories::dataset_repository::DatasetRepository;
use rpscrape_relay::domain::repositories::key_value_repository::KeyValueRepository;
use rpscrape_relay::engines::process_engine::ProcessEngine;
use rpscrape_relay::infrastructure::metrics;
use rpscrape_relay::infrastructure::storage::create_sinks;
use rpscrape_relay::utils::telemetry;
use tracing::{error, info, warn};

/// 运行 rpscrape 并把结果发布到数据集和键值存储
#[derive(Parser, Debug)]
#[command(name = "rpscrape-relay", version, about)]
struct Cli {
    /// racecards 或 racedays
    #[arg(long)]
    command: Option<String>,

    /// 传给入口脚本的日期参数，例如 today 或 2025-06-17
    #[arg(long)]
    date: Option<String>,

    /// JSON 输入文件，覆盖键值存储中的 INPUT
    #[arg(long)]
    input: Option<PathBuf>,

    /// 额外的配置文件
    #[arg(long)]
    config: Option<PathBuf>,
}

/// 主函数
///
/// 一次调用即一次运行。任何运行错误或存储写入失败都以非零状态退出。
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    telemetry::init_telemetry();
    metrics::describe_metrics();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    // 1. Load configuration
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    info!("Configuration loaded");

    // 2. Initialize sinks
    let sinks = create_sinks(&settings.storage).context("Failed to initialize storage")?;
    info!(
        "Sinks ready: dataset {}, key-value store {}",
        sinks.dataset.id(),
        sinks.key_value.id()
    );

    // 3. Resolve input
    let input = run_input::resolve(
        sinks.key_value.as_ref(),
        cli.input.as_deref(),
        cli.command,
        cli.date,
    )
    .await
    .context("Failed to resolve input")?;
    let request = match input.into_request() {
        Ok(request) => request,
        Err(e) => {
            error!(kind = %e.kind(), "{}", e);
            return Ok(exit_code(&Err(e)));
        }
    };
    info!("Input: command={}, date={}", request.command(), request.date());

    // 4. Run
    let runner = Arc::new(ProcessEngine);
    let coordinator = RunCoordinator::from_settings(runner, sinks, &settings);

    let outcome = coordinator.execute(&request).await;
    if let Ok(result) = &outcome {
        for failure in result.sink_failures() {
            warn!(kind = %failure.kind(), "{}", failure);
        }

        info!(
            "Published {} records from {} (run {})",
            result.record_count,
            result.source_file.display(),
            result.run_id
        );
        if let Ok(summary) = serde_json::to_string(result) {
            info!("Result: {}", summary);
        }
    }

    Ok(exit_code(&outcome))
}
