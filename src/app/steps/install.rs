use crate::app::steps::resolve_path;
use crate::core::StepReport;
use crate::core::python;
use crate::core::requirements;
use crate::core::step_sequence::{SetupContext, SetupStep};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SetupError};
use std::path::PathBuf;

/// 用環境內的 pip 安裝 requirements 檔案列出的套件
pub struct InstallStep<R: CommandRunner> {
    venv_dir: PathBuf,
    requirements: PathBuf,
    index_url: Option<String>,
    upgrade_pip: bool,
    extra_packages: Vec<String>,
    runner: R,
}

impl<R: CommandRunner> InstallStep<R> {
    pub fn new(
        venv_dir: impl Into<PathBuf>,
        requirements: impl Into<PathBuf>,
        runner: R,
    ) -> Self {
        Self {
            venv_dir: venv_dir.into(),
            requirements: requirements.into(),
            index_url: None,
            upgrade_pip: false,
            extra_packages: Vec::new(),
            runner,
        }
    }

    pub fn with_index_url(mut self, index_url: Option<String>) -> Self {
        self.index_url = index_url;
        self
    }

    pub fn with_upgrade_pip(mut self, upgrade_pip: bool) -> Self {
        self.upgrade_pip = upgrade_pip;
        self
    }

    pub fn with_extra_packages(mut self, packages: Vec<String>) -> Self {
        self.extra_packages = packages;
        self
    }

    /// 環境內的 pip 指令；沒有獨立的 pip 執行檔時退回 `python -m pip`
    fn pip_invocation(&self, context: &SetupContext) -> (String, Vec<String>) {
        let venv_path = resolve_path(&context.project_dir, &self.venv_dir);

        if let Some(pip) = python::venv_pip(&venv_path) {
            return (pip.display().to_string(), Vec::new());
        }

        let venv_python = context
            .get_shared_path("venv_python")
            .unwrap_or_else(|| python::venv_python(&venv_path));
        (
            venv_python.display().to_string(),
            vec!["-m".to_string(), "pip".to_string()],
        )
    }
}

#[async_trait::async_trait]
impl<R: CommandRunner> SetupStep for InstallStep<R> {
    async fn execute(&self, context: &SetupContext) -> Result<StepReport> {
        let requirements_path = resolve_path(&context.project_dir, &self.requirements);
        let specs = requirements::load_requirements(&requirements_path)?;

        if specs.is_empty() && self.extra_packages.is_empty() {
            tracing::warn!(
                "📭 No packages listed in {}, nothing to install",
                requirements_path.display()
            );
            return Ok(StepReport::unchanged("no packages to install"));
        }

        let (program, base_args) = self.pip_invocation(context);

        if self.upgrade_pip {
            let mut args = base_args.clone();
            args.extend([
                "install".to_string(),
                "--upgrade".to_string(),
                "pip".to_string(),
            ]);
            let output = self
                .runner
                .run(&program, &args, Some(&context.project_dir))
                .await?;
            if !output.success() {
                return Err(SetupError::InstallError {
                    details: format!("pip self-upgrade failed: {}", output.stderr.trim()),
                });
            }
            tracing::info!("⬆️ pip upgraded");
        }

        let mut args = base_args;
        args.push("install".to_string());
        args.push("-r".to_string());
        args.push(requirements_path.display().to_string());
        for package in &self.extra_packages {
            args.push(package.clone());
        }
        if let Some(index_url) = &self.index_url {
            args.push("--index-url".to_string());
            args.push(index_url.clone());
        }

        tracing::info!(
            "📦 Installing {} packages from {}",
            specs.len(),
            self.requirements.display()
        );

        let output = self
            .runner
            .run(&program, &args, Some(&context.project_dir))
            .await?;

        if !output.success() {
            return Err(SetupError::InstallError {
                details: output.stderr.trim().to_string(),
            });
        }

        let total = specs.len() + self.extra_packages.len();
        Ok(StepReport::changed(format!("installed {} packages", total))
            .with_metadata(
                "requirements_count",
                serde_json::Value::Number(specs.len().into()),
            )
            .with_metadata(
                "extra_packages_count",
                serde_json::Value::Number(self.extra_packages.len().into()),
            ))
    }

    fn name(&self) -> &str {
        "install"
    }
}
