use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SetupError};
use std::path::{Path, PathBuf};

/// 按照慣例順序嘗試的直譯器名稱
pub const INTERPRETER_CANDIDATES: [&str; 2] = ["python3", "python"];

/// 尋找可用的 Python 直譯器。
/// 指定 `preferred` 時只嘗試該直譯器，否則依序探測候選名稱。
pub async fn discover_interpreter<R: CommandRunner>(
    runner: &R,
    preferred: Option<&str>,
) -> Result<String> {
    let mut tried = Vec::new();

    if let Some(python) = preferred {
        tried.push(python.to_string());
        if probe(runner, python).await {
            return Ok(python.to_string());
        }
    } else {
        for name in INTERPRETER_CANDIDATES {
            tried.push(name.to_string());
            if probe(runner, name).await {
                tracing::debug!("Found interpreter: {}", name);
                return Ok(name.to_string());
            }
        }
    }

    Err(SetupError::InterpreterNotFound {
        tried: tried.join(", "),
    })
}

async fn probe<R: CommandRunner>(runner: &R, name: &str) -> bool {
    matches!(
        runner.run(name, &["--version".to_string()], None).await,
        Ok(out) if out.success()
    )
}

/// venv 內的 python 路徑（Unix 為 bin/，Windows 為 Scripts/）
pub fn venv_python(venv_dir: &Path) -> PathBuf {
    let unix = venv_dir.join("bin").join("python");
    let windows = venv_dir.join("Scripts").join("python.exe");

    if unix.exists() {
        unix
    } else if windows.exists() {
        windows
    } else if cfg!(windows) {
        windows
    } else {
        unix
    }
}

/// venv 內的 pip 路徑；不存在時回傳 None，呼叫端退回 `python -m pip`
pub fn venv_pip(venv_dir: &Path) -> Option<PathBuf> {
    let unix = venv_dir.join("bin").join("pip");
    let windows = venv_dir.join("Scripts").join("pip.exe");

    if unix.exists() {
        Some(unix)
    } else if windows.exists() {
        Some(windows)
    } else {
        None
    }
}

pub fn venv_exists(venv_dir: &Path) -> bool {
    venv_dir.join("bin").join("python").exists()
        || venv_dir.join("Scripts").join("python.exe").exists()
}
