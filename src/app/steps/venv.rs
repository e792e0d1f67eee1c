use crate::app::steps::resolve_path;
use crate::core::StepReport;
use crate::core::python;
use crate::core::step_sequence::{SetupContext, SetupStep};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SetupError};
use std::path::PathBuf;

/// 以 `python -m venv` 建立虛擬環境。
/// 環境已存在時跳過，`force` 時先移除再重建。
pub struct VenvStep<R: CommandRunner> {
    venv_dir: PathBuf,
    python_override: Option<String>,
    force: bool,
    runner: R,
}

impl<R: CommandRunner> VenvStep<R> {
    pub fn new(venv_dir: impl Into<PathBuf>, python_override: Option<String>, force: bool, runner: R) -> Self {
        Self {
            venv_dir: venv_dir.into(),
            python_override,
            force,
            runner,
        }
    }
}

#[async_trait::async_trait]
impl<R: CommandRunner> SetupStep for VenvStep<R> {
    async fn execute(&self, context: &SetupContext) -> Result<StepReport> {
        let venv_path = resolve_path(&context.project_dir, &self.venv_dir);

        if self.force && venv_path.exists() {
            std::fs::remove_dir_all(&venv_path)?;
            tracing::info!("🧹 Removed existing environment: {}", venv_path.display());
        }

        let interpreter =
            python::discover_interpreter(&self.runner, self.python_override.as_deref()).await?;

        let args = vec![
            "-m".to_string(),
            "venv".to_string(),
            venv_path.display().to_string(),
        ];
        let output = self
            .runner
            .run(&interpreter, &args, Some(&context.project_dir))
            .await?;

        if !output.success() {
            return Err(SetupError::VenvError {
                path: venv_path.display().to_string(),
                details: output.stderr.trim().to_string(),
            });
        }

        let venv_python = python::venv_python(&venv_path);

        Ok(StepReport::changed(format!(
            "virtual environment created at {}",
            self.venv_dir.display()
        ))
        .with_metadata(
            "venv_python",
            serde_json::Value::String(venv_python.display().to_string()),
        )
        .with_metadata(
            "base_interpreter",
            serde_json::Value::String(interpreter),
        ))
    }

    fn name(&self) -> &str {
        "venv"
    }

    fn should_run(&self, context: &SetupContext) -> bool {
        if self.force {
            return true;
        }
        !python::venv_exists(&resolve_path(&context.project_dir, &self.venv_dir))
    }
}
