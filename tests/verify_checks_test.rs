use small_setup::domain::model::CommandOutput;
use small_setup::utils::error::SetupError;
use small_setup::{CommandRunner, SetupContext, SetupStep, VerifyStep};
use std::path::Path;
use tempfile::TempDir;

/// 所有指令都成功的假執行器
#[derive(Clone, Default)]
struct OkRunner;

impl CommandRunner for OkRunner {
    async fn run(
        &self,
        _program: &str,
        _args: &[String],
        _cwd: Option<&Path>,
    ) -> small_setup::Result<CommandOutput> {
        Ok(CommandOutput {
            status: 0,
            stdout: "Python 3.11.4".to_string(),
            stderr: String::new(),
        })
    }
}

/// `pip show` 對指定套件回報未安裝
#[derive(Clone)]
struct MissingPackageRunner {
    missing: String,
}

impl CommandRunner for MissingPackageRunner {
    async fn run(
        &self,
        _program: &str,
        args: &[String],
        _cwd: Option<&Path>,
    ) -> small_setup::Result<CommandOutput> {
        let status = if args.contains(&"show".to_string()) && args.contains(&self.missing) {
            1
        } else {
            0
        };
        Ok(CommandOutput {
            status,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

fn context(temp: &TempDir) -> SetupContext {
    SetupContext::new("verify_test".to_string(), temp.path().to_path_buf())
}

fn write_bootstrapped_project(temp: &TempDir) {
    std::fs::write(temp.path().join(".env.example"), "KEY=\n").unwrap();
    std::fs::write(temp.path().join(".env"), "KEY=\n").unwrap();
    std::fs::write(temp.path().join("requirements.txt"), "numpy\nkeyboard\n").unwrap();

    let venv = temp.path().join("venv");
    std::fs::create_dir_all(venv.join("bin")).unwrap();
    std::fs::write(venv.join("bin").join("python"), b"").unwrap();
}

fn verify_step<R: CommandRunner>(runner: R) -> VerifyStep<R> {
    VerifyStep::new(".env.example", ".env", "venv", "requirements.txt", runner)
}

#[tokio::test]
async fn test_all_checks_pass() {
    let temp = TempDir::new().unwrap();
    write_bootstrapped_project(&temp);

    let step = verify_step(OkRunner);
    let outcomes = step.run_checks(&context(&temp)).await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.passed));

    let report = step.execute(&context(&temp)).await.unwrap();
    assert!(!report.changed);
}

#[tokio::test]
async fn test_env_drift_is_detected() {
    let temp = TempDir::new().unwrap();
    write_bootstrapped_project(&temp);
    std::fs::write(temp.path().join(".env"), "KEY=edited\n").unwrap();

    let step = verify_step(OkRunner);
    let outcomes = step.run_checks(&context(&temp)).await;

    let env_check = outcomes.iter().find(|o| o.name == "env_file").unwrap();
    assert!(!env_check.passed);
    assert!(env_check.detail.contains("differs"));

    // 保留模式下只要求檔案存在
    let step = verify_step(OkRunner).with_expect_identical(false);
    let outcomes = step.run_checks(&context(&temp)).await;
    assert!(outcomes.iter().find(|o| o.name == "env_file").unwrap().passed);
}

#[tokio::test]
async fn test_missing_venv_fails_check() {
    let temp = TempDir::new().unwrap();
    write_bootstrapped_project(&temp);
    std::fs::remove_dir_all(temp.path().join("venv")).unwrap();

    let step = verify_step(OkRunner);
    let outcomes = step.run_checks(&context(&temp)).await;

    let venv_check = outcomes.iter().find(|o| o.name == "venv").unwrap();
    assert!(!venv_check.passed);

    let err = step.execute(&context(&temp)).await.unwrap_err();
    assert!(matches!(err, SetupError::VerificationError { .. }));
}

#[tokio::test]
async fn test_missing_package_is_reported_by_name() {
    let temp = TempDir::new().unwrap();
    write_bootstrapped_project(&temp);

    let step = verify_step(MissingPackageRunner {
        missing: "keyboard".to_string(),
    });
    let outcomes = step.run_checks(&context(&temp)).await;

    let packages_check = outcomes.iter().find(|o| o.name == "packages").unwrap();
    assert!(!packages_check.passed);
    assert!(packages_check.detail.contains("keyboard"));
    assert!(!packages_check.detail.contains("numpy"));
}

#[tokio::test]
async fn test_package_checks_can_be_skipped() {
    let temp = TempDir::new().unwrap();
    write_bootstrapped_project(&temp);

    let step = verify_step(MissingPackageRunner {
        missing: "keyboard".to_string(),
    })
    .with_check_packages(false);

    let outcomes = step.run_checks(&context(&temp)).await;
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.passed));
}
