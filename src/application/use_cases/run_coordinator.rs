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
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::Utc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::settings::Settings;
use crate::domain::models::output_record::{to_array, OutputRecord};
use crate::domain::models::publish_result::{CourseSlot, PublishResult, SinkKind, SinkStatus};
use crate::domain::models::run_request::RunRequest;
use crate::domain::models::run_state::RunState;
use crate::domain::models::tool_layout::ToolLayout;
use crate::domain::repositories::dataset_repository::DatasetRepository;
use crate::domain::repositories::key_value_repository::KeyValueRepository;
use crate::domain::services::{course_splitter, outcome_classifier, output_discovery, record_decoder};
use crate::engines::tool_installer::ToolInstaller;
use crate::engines::traits::{ExecutionRequest, ProcessRunner};
use crate::infrastructure::metrics;
use crate::infrastructure::storage::Sinks;
use crate::utils::errors::RunError;

/// 运行选项
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 子进程墙钟超时
    pub timeout: Duration,
    /// 键值存储中保存完整记录数组的键
    pub output_key: String,
    /// 是否额外按赛场拆分写入
    pub split_by_course: bool,
    /// 是否忽略早于子进程启动的文件
    pub only_fresh: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            output_key: "OUTPUT".to_string(),
            split_by_course: false,
            only_fresh: false,
        }
    }
}

impl RunOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.run.timeout_secs),
            output_key: settings.publish.output_key.clone(),
            split_by_course: settings.publish.split_by_course,
            only_fresh: settings.discovery.only_fresh,
        }
    }
}

/// 运行协调器
///
/// 确保外部工具存在，运行入口脚本，定位最新的输出文件，
/// 解码后发布到数据集和键值存储。整个流程没有重试。
pub struct RunCoordinator<P>
where
    P: ProcessRunner,
{
    layout: ToolLayout,
    installer: ToolInstaller<P>,
    runner: Arc<P>,
    dataset: Arc<dyn DatasetRepository>,
    key_value: Arc<dyn KeyValueRepository>,
    options: RunOptions,
}

impl<P> RunCoordinator<P>
where
    P: ProcessRunner,
{
    pub fn new(
        layout: ToolLayout,
        installer: ToolInstaller<P>,
        runner: Arc<P>,
        sinks: Sinks,
        options: RunOptions,
    ) -> Self {
        Self {
            layout,
            installer,
            runner,
            dataset: sinks.dataset,
            key_value: sinks.key_value,
            options,
        }
    }

    /// 按配置组装协调器
    pub fn from_settings(runner: Arc<P>, sinks: Sinks, settings: &Settings) -> Self {
        let installer = ToolInstaller::from_settings(runner.clone(), &settings.tool, &settings.install);
        Self::new(
            ToolLayout::from_settings(&settings.tool),
            installer,
            runner,
            sinks,
            RunOptions::from_settings(settings),
        )
    }

    /// 执行一次运行
    ///
    /// # 参数
    ///
    /// * `request` - 运行请求
    ///
    /// # 返回值
    ///
    /// * `Ok(PublishResult)` - 已尝试写入两个存储，各自结果见返回值
    /// * `Err(RunError)` - 发布之前的任一步骤失败，此时不会写入任何存储
    pub async fn execute(&self, request: &RunRequest) -> Result<PublishResult, RunError> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "run",
            run_id = %run_id,
            command = %request.command(),
            date = %request.date()
        );
        self.execute_run(run_id, request).instrument(span).await
    }

    async fn execute_run(&self, run_id: Uuid, request: &RunRequest) -> Result<PublishResult, RunError> {
        info!("Starting run");
        let mut state = RunState::NotStarted;

        let result = self.run_steps(run_id, request, &mut state).await;

        match &result {
            Ok(published) => {
                let outcome = if published.is_fully_published() {
                    "published"
                } else {
                    "partially_published"
                };
                metrics::record_run(request.command(), outcome);
                info!(
                    "Run finished: {} records from {}",
                    published.record_count,
                    published.source_file.display()
                );
            }
            Err(e) => {
                transition(&mut state, RunState::Failed(e.kind()));
                metrics::record_run(request.command(), e.kind().as_str());
                error!(kind = %e.kind(), "Run failed: {}", e);
            }
        }

        result
    }

    async fn run_steps(
        &self,
        run_id: Uuid,
        request: &RunRequest,
        state: &mut RunState,
    ) -> Result<PublishResult, RunError> {
        // 1. 工具检查
        let status = self.installer.ensure_installed().await?;
        debug!("Tool check: {:?}", status);
        transition(state, RunState::ToolChecked);

        // 2. 命令解析
        let entry_point = self.layout.entry_point(request.command());
        let entry_point_path = self.layout.entry_point_path(request.command());
        if !tokio::fs::try_exists(&entry_point_path).await.unwrap_or(false) {
            return Err(RunError::tool_unavailable(format!(
                "entry point not found: {}",
                entry_point_path.display()
            )));
        }

        // 3. 子进程
        let started_at = SystemTime::now();
        let execution = ExecutionRequest::new(&self.layout.interpreter, self.options.timeout)
            .arg(entry_point.to_string_lossy())
            .arg(request.date())
            .current_dir(self.layout.root());

        info!("Executing: {}", execution.display());

        let outcome = self.runner.run(&execution).await.map_err(|e| RunError::ExecutionFailed {
            command: request.command().to_string(),
            date: request.date().to_string(),
            exit_code: None,
            stderr: e.to_string(),
        })?;

        metrics::record_subprocess_duration(request.command(), outcome.duration_ms);
        if !outcome.stdout.trim().is_empty() {
            debug!("stdout: {}", outcome.stdout.trim());
        }
        if !outcome.success() {
            if !outcome.stderr.trim().is_empty() {
                warn!("stderr: {}", outcome.stderr.trim());
            }
        } else if !outcome.stderr.trim().is_empty() {
            debug!("stderr: {}", outcome.stderr.trim());
        }

        outcome_classifier::classify(&outcome, request, self.options.timeout)?;
        info!("Script executed successfully in {}ms", outcome.duration_ms);
        transition(state, RunState::ProcessRan);

        // 4. 定位输出文件
        let output_dir = self.layout.output_path();
        let source_file = output_discovery::discover_latest(
            &output_dir,
            &self.layout.output_extension,
            self.layout.recursive_scan,
            self.options.only_fresh.then_some(started_at),
        )
        .await?;
        info!("Found output file: {}", source_file.display());
        transition(state, RunState::OutputLocated);

        // 5. 解码
        let records = record_decoder::read_output_file(&source_file).await?;
        info!("Loaded {} records", records.len());

        // 6. 发布
        let published = self.publish(run_id, request, source_file, records).await;
        transition(state, RunState::Published);

        Ok(published)
    }

    async fn publish(
        &self,
        run_id: Uuid,
        request: &RunRequest,
        source_file: PathBuf,
        records: Vec<OutputRecord>,
    ) -> PublishResult {
        let dataset = match self.dataset.push_items(&records).await {
            Ok(reference) => {
                metrics::record_published(SinkKind::Dataset, records.len());
                info!("Pushed {} records to dataset {}", records.len(), reference);
                SinkStatus::Written { reference }
            }
            Err(e) => sink_failed(SinkKind::Dataset, e.to_string()),
        };

        let key_value = match self.write_slot(&self.options.output_key, &records).await {
            Ok(reference) => {
                metrics::record_published(SinkKind::KeyValue, records.len());
                info!("Stored records under {}", reference);
                SinkStatus::Written { reference }
            }
            Err(message) => sink_failed(SinkKind::KeyValue, message),
        };

        let course_slots = if self.options.split_by_course {
            self.publish_courses(&records).await
        } else {
            Vec::new()
        };

        PublishResult {
            run_id,
            command: request.command(),
            date: request.date().to_string(),
            record_count: records.len(),
            source_file,
            dataset,
            key_value,
            course_slots,
            finished_at: Utc::now(),
        }
    }

    async fn publish_courses(&self, records: &[OutputRecord]) -> Vec<CourseSlot> {
        let (groups, unusable) = course_splitter::group_by_key(records);
        for course in unusable {
            warn!("Skipping course with unusable name {:?}", course);
        }

        let mut slots = Vec::new();
        for group in groups {
            if group.courses.len() > 1 {
                warn!("Courses {:?} share key {}, storing them together", group.courses, group.key);
            }
            let course = group.courses.join(", ");
            let status = match self.write_slot(&group.key, &group.records).await {
                Ok(reference) => {
                    debug!("Stored {} records for {} under {}", group.records.len(), course, reference);
                    SinkStatus::Written { reference }
                }
                Err(message) => sink_failed(SinkKind::KeyValue, message),
            };
            slots.push(CourseSlot {
                course,
                key: group.key,
                record_count: group.records.len(),
                status,
            });
        }

        slots
    }

    async fn write_slot(&self, key: &str, records: &[OutputRecord]) -> Result<String, String> {
        let data = serde_json::to_vec(&to_array(records)).map_err(|e| e.to_string())?;
        self.key_value
            .save(key, &data)
            .await
            .map_err(|e| e.to_string())?;
        Ok(format!("{}/{}", self.key_value.id(), key))
    }
}

fn sink_failed(sink: SinkKind, message: String) -> SinkStatus {
    metrics::record_sink_failure(sink);
    let err = RunError::SinkWriteFailed {
        sink,
        message: message.clone(),
    };
    error!(kind = %err.kind(), "{}", err);
    SinkStatus::Failed { error: message }
}

fn transition(state: &mut RunState, next: RunState) {
    match state.advance(next) {
        Ok(advanced) => {
            debug!("Run state: {} -> {}", state, advanced);
            *state = advanced;
        }
        Err(e) => error!("{}", e),
    }
}
