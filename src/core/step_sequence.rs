use crate::domain::model::StepReport;
use crate::utils::error::Result;
use crate::utils::monitor::SetupMonitor;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// 單一步驟的執行結果
#[derive(Debug, Clone)]
pub struct StepResult {
    pub step_name: String,
    pub report: StepReport,
    pub duration: std::time::Duration,
}

/// 步驟執行上下文，用於在步驟間傳遞資料
#[derive(Debug, Clone)]
pub struct SetupContext {
    pub execution_id: String,
    pub project_dir: PathBuf,
    pub previous_results: Vec<StepResult>,
    pub shared_data: HashMap<String, serde_json::Value>,
}

impl SetupContext {
    pub fn new(execution_id: String, project_dir: PathBuf) -> Self {
        Self {
            execution_id,
            project_dir,
            previous_results: Vec::new(),
            shared_data: HashMap::new(),
        }
    }

    /// 獲取上一個步驟的結果
    pub fn get_previous_result(&self) -> Option<&StepResult> {
        self.previous_results.last()
    }

    /// 獲取指定名稱的步驟結果
    pub fn get_result_by_name(&self, name: &str) -> Option<&StepResult> {
        self.previous_results.iter().find(|r| r.step_name == name)
    }

    pub fn add_shared_data(&mut self, key: String, value: serde_json::Value) {
        self.shared_data.insert(key, value);
    }

    pub fn get_shared_data(&self, key: &str) -> Option<&serde_json::Value> {
        self.shared_data.get(key)
    }

    /// 共享資料中的路徑值（例如 venv 步驟發佈的直譯器路徑）
    pub fn get_shared_path(&self, key: &str) -> Option<PathBuf> {
        self.get_shared_data(key)
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
    }

    /// 添加結果到上下文；步驟發佈的 metadata 併入共享資料
    pub fn add_result(&mut self, result: StepResult) {
        for (key, value) in &result.report.metadata {
            self.shared_data.insert(key.clone(), value.clone());
        }
        self.previous_results.push(result);
    }
}

/// 帶上下文的設置步驟介面
#[async_trait::async_trait]
pub trait SetupStep: Send + Sync {
    async fn execute(&self, context: &SetupContext) -> Result<StepReport>;

    /// 用於標識步驟名稱
    fn name(&self) -> &str;

    /// 根據上下文決定是否執行
    fn should_run(&self, _context: &SetupContext) -> bool {
        true
    }
}

/// 步驟序列，負責順序執行多個帶上下文的步驟
pub struct StepSequence {
    steps: Vec<Box<dyn SetupStep>>, // 使用 trait object 支持多態
    monitor: Option<SetupMonitor>,
    monitor_enabled: bool,
    execution_id: String,
    project_dir: PathBuf,
}

impl StepSequence {
    pub fn new(execution_id: String, project_dir: &Path) -> Self {
        Self {
            steps: Vec::new(),
            monitor: None,
            monitor_enabled: false,
            execution_id,
            project_dir: project_dir.to_path_buf(),
        }
    }

    /// 啟用或禁用系統監控
    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor_enabled = enabled;
        if enabled {
            self.monitor = Some(SetupMonitor::new(enabled));
        }
        self
    }

    pub fn add_step(&mut self, step: Box<dyn SetupStep>) {
        self.steps.push(step);
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// 依序執行所有步驟
    pub async fn execute_all(&mut self) -> Result<Vec<StepResult>> {
        let mut results = Vec::new();
        let mut context =
            SetupContext::new(self.execution_id.clone(), self.project_dir.clone());

        if self.monitor_enabled {
            if let Some(monitor) = &self.monitor {
                monitor.log_stats("Setup started.");
            }
        }

        for step in &self.steps {
            let start_time = Instant::now();

            // 根據上下文決定是否執行
            if !step.should_run(&context) {
                tracing::info!("⏭️ Skipping step: {} (already satisfied)", step.name());
                continue;
            }

            match step.execute(&context).await {
                Ok(report) => {
                    let duration = start_time.elapsed();

                    let result = StepResult {
                        step_name: step.name().to_string(),
                        report,
                        duration,
                    };

                    tracing::info!(
                        "✅ Step completed: {} ({}, duration: {:?})",
                        result.step_name,
                        result.report.summary,
                        result.duration
                    );

                    if let Some(monitor) = &self.monitor {
                        monitor.log_stats(step.name());
                    }

                    // 將結果添加到上下文
                    context.add_result(result.clone());
                    results.push(result);
                }
                Err(e) => {
                    tracing::error!("❌ Step failed: {}: {}", step.name(), e);
                    return Err(e);
                }
            }
        }

        if self.monitor_enabled {
            if let Some(monitor) = &self.monitor {
                monitor.log_final_stats();
            }
        }

        Ok(results)
    }

    /// 獲取執行摘要
    pub fn get_execution_summary(results: &[StepResult]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let total_steps = results.len();
        let changed_steps = results.iter().filter(|r| r.report.changed).count();
        let total_duration: std::time::Duration = results.iter().map(|r| r.duration).sum();

        summary.insert(
            "total_steps".to_string(),
            serde_json::Value::Number(total_steps.into()),
        );
        summary.insert(
            "changed_steps".to_string(),
            serde_json::Value::Number(changed_steps.into()),
        );
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number((total_duration.as_millis() as u64).into()),
        );

        let step_names: Vec<serde_json::Value> = results
            .iter()
            .map(|r| serde_json::Value::String(r.step_name.clone()))
            .collect();
        summary.insert(
            "executed_steps".to_string(),
            serde_json::Value::Array(step_names),
        );

        summary
    }
}
