use crate::app::steps::resolve_path;
use crate::core::StepReport;
use crate::core::python;
use crate::core::requirements;
use crate::core::step_sequence::{SetupContext, SetupStep};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SetupError};
use std::path::PathBuf;

/// 單一檢查的結果，`setup-doctor` 逐項顯示
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    fn pass(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: detail.into(),
        }
    }
}

/// 設置完成後的驗證：.env 與範例一致、venv 直譯器可用、套件已安裝
pub struct VerifyStep<R: CommandRunner> {
    example: PathBuf,
    target: PathBuf,
    venv_dir: PathBuf,
    requirements: PathBuf,
    expect_identical: bool,
    check_packages: bool,
    runner: R,
}

impl<R: CommandRunner> VerifyStep<R> {
    pub fn new(
        example: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        venv_dir: impl Into<PathBuf>,
        requirements: impl Into<PathBuf>,
        runner: R,
    ) -> Self {
        Self {
            example: example.into(),
            target: target.into(),
            venv_dir: venv_dir.into(),
            requirements: requirements.into(),
            expect_identical: true,
            check_packages: true,
            runner,
        }
    }

    /// .env 被刻意保留時不比對內容，只要求檔案存在
    pub fn with_expect_identical(mut self, expect_identical: bool) -> Self {
        self.expect_identical = expect_identical;
        self
    }

    pub fn with_check_packages(mut self, check_packages: bool) -> Self {
        self.check_packages = check_packages;
        self
    }

    /// 執行全部檢查並回報每一項的結果
    pub async fn run_checks(&self, context: &SetupContext) -> Vec<CheckOutcome> {
        let mut outcomes = Vec::new();

        outcomes.push(self.check_env_file(context));
        outcomes.push(self.check_venv(context).await);

        if self.check_packages {
            outcomes.extend(self.check_installed_packages(context).await);
        }

        outcomes
    }

    fn check_env_file(&self, context: &SetupContext) -> CheckOutcome {
        let example = resolve_path(&context.project_dir, &self.example);
        let target = resolve_path(&context.project_dir, &self.target);

        if !target.exists() {
            return CheckOutcome::fail("env_file", format!("{} does not exist", target.display()));
        }

        if !self.expect_identical {
            return CheckOutcome::pass("env_file", "target exists (content not compared)");
        }

        let example_bytes = match std::fs::read(&example) {
            Ok(bytes) => bytes,
            Err(e) => {
                return CheckOutcome::fail("env_file", format!("cannot read example: {}", e))
            }
        };
        let target_bytes = match std::fs::read(&target) {
            Ok(bytes) => bytes,
            Err(e) => return CheckOutcome::fail("env_file", format!("cannot read target: {}", e)),
        };

        if example_bytes == target_bytes {
            CheckOutcome::pass("env_file", "byte-identical to example")
        } else {
            CheckOutcome::fail("env_file", "differs from example")
        }
    }

    async fn check_venv(&self, context: &SetupContext) -> CheckOutcome {
        let venv_path = resolve_path(&context.project_dir, &self.venv_dir);

        if !python::venv_exists(&venv_path) {
            return CheckOutcome::fail(
                "venv",
                format!("no interpreter under {}", venv_path.display()),
            );
        }

        let venv_python = python::venv_python(&venv_path);
        match self
            .runner
            .run(
                &venv_python.display().to_string(),
                &["--version".to_string()],
                Some(&context.project_dir),
            )
            .await
        {
            Ok(output) if output.success() => {
                let version = if output.stdout.trim().is_empty() {
                    output.stderr.trim().to_string() // 舊版 Python 將版本印到 stderr
                } else {
                    output.stdout.trim().to_string()
                };
                CheckOutcome::pass("venv", version)
            }
            Ok(output) => CheckOutcome::fail(
                "venv",
                format!("interpreter exited with status {}", output.status),
            ),
            Err(e) => CheckOutcome::fail("venv", format!("interpreter did not run: {}", e)),
        }
    }

    async fn check_installed_packages(&self, context: &SetupContext) -> Vec<CheckOutcome> {
        let requirements_path = resolve_path(&context.project_dir, &self.requirements);
        let specs = match requirements::load_requirements(&requirements_path) {
            Ok(specs) => specs,
            Err(e) => return vec![CheckOutcome::fail("packages", e.to_string())],
        };

        if specs.is_empty() {
            return vec![CheckOutcome::pass("packages", "nothing required")];
        }

        let venv_path = resolve_path(&context.project_dir, &self.venv_dir);
        let venv_python = python::venv_python(&venv_path).display().to_string();

        let mut missing = Vec::new();
        for spec in &specs {
            let name = requirements::package_name(spec);
            if name.is_empty() {
                continue;
            }

            let args = vec![
                "-m".to_string(),
                "pip".to_string(),
                "show".to_string(),
                "--quiet".to_string(),
                name.clone(),
            ];
            let present = matches!(
                self.runner.run(&venv_python, &args, Some(&context.project_dir)).await,
                Ok(output) if output.success()
            );
            if !present {
                missing.push(name);
            }
        }

        if missing.is_empty() {
            vec![CheckOutcome::pass(
                "packages",
                format!("{} packages present", specs.len()),
            )]
        } else {
            vec![CheckOutcome::fail(
                "packages",
                format!("missing: {}", missing.join(", ")),
            )]
        }
    }
}

#[async_trait::async_trait]
impl<R: CommandRunner> SetupStep for VerifyStep<R> {
    async fn execute(&self, context: &SetupContext) -> Result<StepReport> {
        let outcomes = self.run_checks(context).await;

        let failed: Vec<&CheckOutcome> = outcomes.iter().filter(|o| !o.passed).collect();
        if !failed.is_empty() {
            return Err(SetupError::VerificationError {
                check: failed
                    .iter()
                    .map(|o| o.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                details: failed
                    .iter()
                    .map(|o| o.detail.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            });
        }

        Ok(
            StepReport::unchanged(format!("{} checks passed", outcomes.len())).with_metadata(
                "checks_passed",
                serde_json::Value::Number(outcomes.len().into()),
            ),
        )
    }

    fn name(&self) -> &str {
        "verify"
    }
}
