use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Python interpreter not found (tried: {tried})")]
    InterpreterNotFound { tried: String },

    #[error("Command '{program}' exited with status {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("Environment file error for {path}: {details}")]
    EnvFileError { path: String, details: String },

    #[error("Virtual environment error at {path}: {details}")]
    VenvError { path: String, details: String },

    #[error("Requirements error in {path}: {details}")]
    RequirementsError { path: String, details: String },

    #[error("Dependency installation failed: {details}")]
    InstallError { details: String },

    #[error("Verification failed for {check}: {details}")]
    VerificationError { check: String, details: String },
}

/// 錯誤分類，用於日誌與統計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Environment,
    Install,
    Verification,
    Io,
}

/// 錯誤嚴重程度，決定 CLI 退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SetupError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SetupError::IoError(_) | SetupError::SerializationError(_) => ErrorCategory::Io,
            SetupError::ConfigError { .. }
            | SetupError::ConfigValidationError { .. }
            | SetupError::MissingConfigError { .. }
            | SetupError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            SetupError::InterpreterNotFound { .. }
            | SetupError::CommandFailed { .. }
            | SetupError::EnvFileError { .. }
            | SetupError::VenvError { .. } => ErrorCategory::Environment,
            SetupError::RequirementsError { .. } | SetupError::InstallError { .. } => {
                ErrorCategory::Install
            }
            SetupError::VerificationError { .. } => ErrorCategory::Verification,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 配置問題可由使用者立即修正
            SetupError::ConfigError { .. }
            | SetupError::ConfigValidationError { .. }
            | SetupError::MissingConfigError { .. }
            | SetupError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            // 沒有直譯器就什麼都做不了
            SetupError::InterpreterNotFound { .. } => ErrorSeverity::Critical,
            // 外部指令失敗通常可重試（網路問題、暫時鎖定的檔案）
            SetupError::CommandFailed { .. } | SetupError::InstallError { .. } => {
                ErrorSeverity::Medium
            }
            SetupError::EnvFileError { .. }
            | SetupError::VenvError { .. }
            | SetupError::RequirementsError { .. } => ErrorSeverity::High,
            SetupError::VerificationError { .. } => ErrorSeverity::Low,
            SetupError::IoError(_) | SetupError::SerializationError(_) => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SetupError::InterpreterNotFound { tried } => {
                format!("No Python interpreter was found on PATH (tried: {})", tried)
            }
            SetupError::EnvFileError { path, details } => {
                format!("Could not prepare the environment file '{}': {}", path, details)
            }
            SetupError::VenvError { path, details } => {
                format!("Could not create the virtual environment '{}': {}", path, details)
            }
            SetupError::RequirementsError { path, details } => {
                format!("Could not read requirements from '{}': {}", path, details)
            }
            SetupError::InstallError { details } => {
                format!("Package installation did not complete: {}", details)
            }
            SetupError::VerificationError { check, details } => {
                format!("Post-setup check '{}' failed: {}", check, details)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SetupError::ConfigError { .. }
            | SetupError::ConfigValidationError { .. }
            | SetupError::InvalidConfigValueError { .. } => {
                "Check the flag values or the setup-config.toml file".to_string()
            }
            SetupError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            SetupError::InterpreterNotFound { .. } => {
                "Install Python 3 or pass an explicit interpreter with --python".to_string()
            }
            SetupError::CommandFailed { program, .. } => {
                format!("Re-run with --verbose and inspect the output of '{}'", program)
            }
            SetupError::EnvFileError { .. } => {
                "Make sure .env.example exists in the project directory".to_string()
            }
            SetupError::VenvError { .. } => {
                "Remove the broken environment directory and re-run with --force".to_string()
            }
            SetupError::RequirementsError { .. } => {
                "Make sure requirements.txt exists and every -r include resolves".to_string()
            }
            SetupError::InstallError { .. } => {
                "Check network access and the package index, then re-run".to_string()
            }
            SetupError::VerificationError { .. } => {
                "Run setup-doctor for a per-check breakdown".to_string()
            }
            SetupError::IoError(_) | SetupError::SerializationError(_) => {
                "Check file permissions and free disk space".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SetupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classification() {
        let err = SetupError::InterpreterNotFound {
            tried: "python3, python".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.category(), ErrorCategory::Environment);

        let err = SetupError::VerificationError {
            check: "env_file".to_string(),
            details: "differs".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Verification);
    }

    #[test]
    fn test_recovery_suggestion_mentions_field() {
        let err = SetupError::MissingConfigError {
            field: "install.requirements".to_string(),
        };
        assert!(err.recovery_suggestion().contains("install.requirements"));
    }
}
