use small_setup::domain::model::CommandOutput;
use small_setup::utils::error::SetupError;
use small_setup::{
    CommandRunner, EnvFileStep, InstallStep, SetupEngine, StepSequence, VenvStep, VerifyStep,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// 模擬外部指令：記錄每次呼叫，`python -m venv` 時建立假的環境目錄
#[derive(Clone, Default)]
struct FakeRunner {
    calls: Arc<Mutex<Vec<String>>>,
    fail_matching: Option<String>,
}

impl FakeRunner {
    fn new() -> Self {
        Self::default()
    }

    fn failing_on(pattern: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_matching: Some(pattern.to_string()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        _cwd: Option<&Path>,
    ) -> small_setup::Result<CommandOutput> {
        let line = format!("{} {}", program, args.join(" "));
        self.calls.lock().unwrap().push(line.clone());

        if let Some(pattern) = &self.fail_matching {
            if line.contains(pattern) {
                return Ok(CommandOutput {
                    status: 1,
                    stdout: String::new(),
                    stderr: "simulated failure".to_string(),
                });
            }
        }

        if args.len() >= 3 && args[0] == "-m" && args[1] == "venv" {
            let dir = PathBuf::from(&args[2]);
            std::fs::create_dir_all(dir.join("bin")).unwrap();
            std::fs::write(dir.join("bin").join("python"), b"").unwrap();
            std::fs::write(dir.join("bin").join("pip"), b"").unwrap();
        }

        Ok(CommandOutput {
            status: 0,
            stdout: "Python 3.11.4".to_string(),
            stderr: String::new(),
        })
    }
}

fn write_project_files(temp: &TempDir) {
    std::fs::write(
        temp.path().join(".env.example"),
        "OPENAI_API_KEY=\nWHISPER_MODEL=base\n",
    )
    .unwrap();
    std::fs::write(
        temp.path().join("requirements.txt"),
        "numpy>=1.24\nopenai==1.3.0\nsounddevice\n",
    )
    .unwrap();
}

fn build_sequence(temp: &TempDir, runner: FakeRunner, force: bool) -> StepSequence {
    let mut sequence = StepSequence::new("test_run".to_string(), temp.path());
    sequence.add_step(Box::new(EnvFileStep::new(".env.example", ".env", true)));
    sequence.add_step(Box::new(VenvStep::new("venv", None, force, runner.clone())));
    sequence.add_step(Box::new(InstallStep::new(
        "venv",
        "requirements.txt",
        runner.clone(),
    )));
    sequence.add_step(Box::new(VerifyStep::new(
        ".env.example",
        ".env",
        "venv",
        "requirements.txt",
        runner,
    )));
    sequence
}

#[tokio::test]
async fn test_end_to_end_bootstrap() {
    let temp = TempDir::new().unwrap();
    write_project_files(&temp);

    let runner = FakeRunner::new();
    let sequence = build_sequence(&temp, runner.clone(), false);
    let mut engine = SetupEngine::new(sequence);

    let results = engine.run().await.unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(results[0].step_name, "env_file");
    assert_eq!(results[3].step_name, "verify");

    // .env 與範例一致
    let env = std::fs::read(temp.path().join(".env")).unwrap();
    let example = std::fs::read(temp.path().join(".env.example")).unwrap();
    assert_eq!(env, example);

    // 假的 venv 目錄已建立
    assert!(temp.path().join("venv").join("bin").join("python").exists());

    // 指令順序：直譯器探測、venv 建立、pip 安裝、驗證
    let calls = runner.calls();
    assert!(calls[0].starts_with("python3 --version"));
    assert!(calls.iter().any(|c| c.contains("-m venv")));
    let install_call = calls
        .iter()
        .find(|c| c.contains("install -r"))
        .expect("pip install call");
    assert!(install_call.contains("requirements.txt"));
    assert!(calls.iter().any(|c| c.contains("pip show --quiet numpy")));
}

#[tokio::test]
async fn test_second_run_skips_existing_venv() {
    let temp = TempDir::new().unwrap();
    write_project_files(&temp);

    let runner = FakeRunner::new();
    let mut engine = SetupEngine::new(build_sequence(&temp, runner.clone(), false));
    engine.run().await.unwrap();

    let first_venv_calls = runner
        .calls()
        .iter()
        .filter(|c| c.contains("-m venv"))
        .count();
    assert_eq!(first_venv_calls, 1);

    // 第二次執行：venv 已存在，步驟被跳過
    let mut engine = SetupEngine::new(build_sequence(&temp, runner.clone(), false));
    let results = engine.run().await.unwrap();

    let venv_calls = runner
        .calls()
        .iter()
        .filter(|c| c.contains("-m venv"))
        .count();
    assert_eq!(venv_calls, 1);
    assert!(results.iter().all(|r| r.step_name != "venv"));
}

#[tokio::test]
async fn test_force_recreates_venv() {
    let temp = TempDir::new().unwrap();
    write_project_files(&temp);

    let runner = FakeRunner::new();
    let mut engine = SetupEngine::new(build_sequence(&temp, runner.clone(), false));
    engine.run().await.unwrap();

    let mut engine = SetupEngine::new(build_sequence(&temp, runner.clone(), true));
    engine.run().await.unwrap();

    let venv_calls = runner
        .calls()
        .iter()
        .filter(|c| c.contains("-m venv"))
        .count();
    assert_eq!(venv_calls, 2);
}

#[tokio::test]
async fn test_install_failure_stops_sequence() {
    let temp = TempDir::new().unwrap();
    write_project_files(&temp);

    let runner = FakeRunner::failing_on("install -r");
    let sequence = build_sequence(&temp, runner.clone(), false);
    let mut engine = SetupEngine::new(sequence);

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, SetupError::InstallError { .. }));
    assert_eq!(
        err.severity(),
        small_setup::utils::error::ErrorSeverity::Medium
    );

    // 安裝失敗後不應執行驗證
    assert!(!runner.calls().iter().any(|c| c.contains("pip show")));
}

#[tokio::test]
async fn test_interpreter_discovery_falls_back() {
    let temp = TempDir::new().unwrap();
    write_project_files(&temp);

    // python3 失敗、python 成功
    let runner = FakeRunner::failing_on("python3 --version");
    let mut sequence = StepSequence::new("fallback".to_string(), temp.path());
    sequence.add_step(Box::new(VenvStep::new("venv", None, false, runner.clone())));

    let mut engine = SetupEngine::new(sequence);
    engine.run().await.unwrap();

    let calls = runner.calls();
    assert!(calls.contains(&"python3 --version".to_string()));
    assert!(calls.contains(&"python --version".to_string()));
    assert!(calls.iter().any(|c| c.starts_with("python -m venv")));
}

#[tokio::test]
async fn test_explicit_interpreter_is_used() {
    let temp = TempDir::new().unwrap();
    write_project_files(&temp);

    let runner = FakeRunner::new();
    let mut sequence = StepSequence::new("explicit".to_string(), temp.path());
    sequence.add_step(Box::new(VenvStep::new(
        "venv",
        Some("python3.11".to_string()),
        false,
        runner.clone(),
    )));

    let mut engine = SetupEngine::new(sequence);
    engine.run().await.unwrap();

    assert!(runner
        .calls()
        .iter()
        .any(|c| c.starts_with("python3.11 -m venv")));
}
