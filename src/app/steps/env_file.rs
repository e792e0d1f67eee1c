use crate::app::steps::resolve_path;
use crate::core::StepReport;
use crate::core::step_sequence::{SetupContext, SetupStep};
use crate::utils::error::{Result, SetupError};
use std::path::PathBuf;

/// 將 .env.example 複製為 .env。
/// 預設無條件覆寫（與原始安裝腳本一致）；覆寫前會留下備份。
pub struct EnvFileStep {
    example: PathBuf,
    target: PathBuf,
    overwrite: bool,
}

impl EnvFileStep {
    pub fn new(example: impl Into<PathBuf>, target: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            example: example.into(),
            target: target.into(),
            overwrite,
        }
    }
}

#[async_trait::async_trait]
impl SetupStep for EnvFileStep {
    async fn execute(&self, context: &SetupContext) -> Result<StepReport> {
        let example = resolve_path(&context.project_dir, &self.example);
        let target = resolve_path(&context.project_dir, &self.target);

        if !example.exists() {
            return Err(SetupError::EnvFileError {
                path: example.display().to_string(),
                details: "example file not found".to_string(),
            });
        }

        if target.exists() {
            let backup = backup_path(&target);
            std::fs::copy(&target, &backup)?;
            tracing::info!(
                "💾 Backed up existing {} to {}",
                target.display(),
                backup.display()
            );
        }

        let bytes = std::fs::copy(&example, &target)?;
        tracing::debug!(
            "Copied {} -> {} ({} bytes)",
            example.display(),
            target.display(),
            bytes
        );

        Ok(StepReport::changed(format!(
            "copied {} to {}",
            self.example.display(),
            self.target.display()
        ))
        .with_metadata(
            "env_file",
            serde_json::Value::String(target.display().to_string()),
        )
        .with_metadata("env_file_bytes", serde_json::Value::Number(bytes.into())))
    }

    fn name(&self) -> &str {
        "env_file"
    }

    fn should_run(&self, context: &SetupContext) -> bool {
        if self.overwrite {
            return true;
        }
        !resolve_path(&context.project_dir, &self.target).exists()
    }
}

fn backup_path(target: &std::path::Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| ".env".to_string());
    target.with_file_name(format!("{}.bak-{}", name, stamp))
}
