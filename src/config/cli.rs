use crate::core::CommandOutput;
use crate::domain::ports::CommandRunner;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::Path;
use tokio::process::Command;

/// 以 tokio 子行程執行外部指令的實作
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    envs: HashMap<String, String>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每個指令都帶上這些環境變數（對應設定檔的 [environment] 區段）
    pub fn with_envs(envs: HashMap<String, String>) -> Self {
        Self { envs }
    }
}

impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }

        tracing::debug!("Running command: {} {}", program, args.join(" "));
        let output = cmd.output().await?;

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_output() {
        let runner = SystemRunner::new();
        let output = tokio_test::block_on(runner.run(
            "sh",
            &["-c".to_string(), "echo ready".to_string()],
            None,
        ))
        .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout.trim(), "ready");
    }

    #[test]
    fn test_run_reports_failure_status() {
        let runner = SystemRunner::new();
        let output = tokio_test::block_on(runner.run(
            "sh",
            &["-c".to_string(), "exit 3".to_string()],
            None,
        ))
        .unwrap();

        assert!(!output.success());
        assert_eq!(output.status, 3);
    }

    #[test]
    fn test_run_applies_envs() {
        let mut envs = HashMap::new();
        envs.insert("PIP_NO_CACHE_DIR".to_string(), "1".to_string());
        let runner = SystemRunner::with_envs(envs);

        let output = tokio_test::block_on(runner.run(
            "sh",
            &["-c".to_string(), "printf %s \"$PIP_NO_CACHE_DIR\"".to_string()],
            None,
        ))
        .unwrap();

        assert_eq!(output.stdout, "1");
    }
}
