use crate::core::ConfigProvider;
use crate::utils::error::{Result, SetupError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub project: ProjectConfig,
    pub env_file: EnvFileConfig,
    pub venv: VenvConfig,
    pub install: InstallConfig,
    pub verify: Option<VerifyConfig>,
    pub monitoring: Option<MonitoringConfig>,
    pub error_handling: Option<ErrorHandlingConfig>,
    pub environment: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvFileConfig {
    pub example: String,
    pub target: String,
    pub overwrite: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenvConfig {
    pub dir: String,
    pub python: Option<String>,
    pub force: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    pub requirements: String,
    pub index_url: Option<String>,
    pub upgrade_pip: Option<bool>,
    pub extra_packages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    pub enabled: Option<bool>,
    pub check_packages: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub system_stats: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    pub on_verify_failure: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SetupError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SetupError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PIP_INDEX_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("env_file.example", &self.env_file.example)?;
        validation::validate_path("env_file.target", &self.env_file.target)?;
        validation::validate_distinct_paths(
            "env_file.example",
            &self.env_file.example,
            "env_file.target",
            &self.env_file.target,
        )?;
        validation::validate_path("venv.dir", &self.venv.dir)?;
        validation::validate_path("install.requirements", &self.install.requirements)?;

        if let Some(python) = &self.venv.python {
            validation::validate_non_empty_string("venv.python", python)?;
        }

        if let Some(index_url) = &self.install.index_url {
            validation::validate_index_url("install.index_url", index_url)?;
        }

        if let Some(packages) = &self.install.extra_packages {
            for package in packages {
                validation::validate_non_empty_string("install.extra_packages", package)?;
            }
        }

        // 驗證失敗處理策略
        let valid_policies = ["fail", "warn"];
        if let Some(policy) = self
            .error_handling
            .as_ref()
            .and_then(|e| e.on_verify_failure.as_deref())
        {
            if !valid_policies.contains(&policy) {
                return Err(SetupError::InvalidConfigValueError {
                    field: "error_handling.on_verify_failure".to_string(),
                    value: policy.to_string(),
                    reason: format!(
                        "Unsupported policy. Valid policies: {}",
                        valid_policies.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }

    /// 是否覆寫既有的 .env
    pub fn overwrite_env(&self) -> bool {
        self.env_file.overwrite.unwrap_or(true)
    }

    /// 是否強制重建 venv
    pub fn force_recreate(&self) -> bool {
        self.venv.force.unwrap_or(false)
    }

    /// 安裝前是否升級 pip
    pub fn upgrade_pip_enabled(&self) -> bool {
        self.install.upgrade_pip.unwrap_or(false)
    }

    /// requirements 之外額外安裝的套件
    pub fn extra_packages(&self) -> &[String] {
        self.install
            .extra_packages
            .as_deref()
            .unwrap_or(&[])
    }

    /// 是否執行驗證步驟
    pub fn verify_enabled(&self) -> bool {
        self.verify
            .as_ref()
            .and_then(|v| v.enabled)
            .unwrap_or(true)
    }

    /// 驗證時是否逐一檢查套件
    pub fn check_packages(&self) -> bool {
        self.verify
            .as_ref()
            .and_then(|v| v.check_packages)
            .unwrap_or(true)
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// 驗證失敗時的處理策略
    pub fn on_verify_failure(&self) -> &str {
        self.error_handling
            .as_ref()
            .and_then(|e| e.on_verify_failure.as_deref())
            .unwrap_or("fail")
    }

    /// 傳給每個外部指令的環境變數
    pub fn command_environment(&self) -> HashMap<String, String> {
        self.environment.clone().unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn env_example(&self) -> &str {
        &self.env_file.example
    }

    fn env_target(&self) -> &str {
        &self.env_file.target
    }

    fn venv_dir(&self) -> &str {
        &self.venv.dir
    }

    fn requirements(&self) -> &str {
        &self.install.requirements
    }

    fn python(&self) -> Option<&str> {
        self.venv.python.as_deref()
    }

    fn index_url(&self) -> Option<&str> {
        self.install.index_url.as_deref()
    }

    fn overwrite_env(&self) -> bool {
        self.overwrite_env()
    }

    fn upgrade_pip(&self) -> bool {
        self.upgrade_pip_enabled()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[project]
name = "whisper-writer"
description = "Speech-to-text tray app"
version = "1.0.0"

[env_file]
example = ".env.example"
target = ".env"

[venv]
dir = "venv"

[install]
requirements = "requirements.txt"
upgrade_pip = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.project.name, "whisper-writer");
        assert_eq!(config.venv.dir, "venv");
        assert!(config.upgrade_pip_enabled());
        assert!(config.overwrite_env());
        assert!(config.verify_enabled());
        assert_eq!(config.on_verify_failure(), "fail");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_PIP_INDEX", "https://mirror.test/simple");

        let toml_content = r#"
[project]
name = "test"
description = "test"
version = "1.0"

[env_file]
example = ".env.example"
target = ".env"

[venv]
dir = "venv"

[install]
requirements = "requirements.txt"
index_url = "${TEST_PIP_INDEX}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.install.index_url.as_deref(),
            Some("https://mirror.test/simple")
        );

        std::env::remove_var("TEST_PIP_INDEX");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[project]
name = "test"
description = "test"
version = "1.0"

[env_file]
example = ".env"
target = ".env"

[venv]
dir = "venv"

[install]
requirements = "requirements.txt"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_verify_policy() {
        let toml_content = r#"
[project]
name = "test"
description = "test"
version = "1.0"

[env_file]
example = ".env.example"
target = ".env"

[venv]
dir = "venv"

[install]
requirements = "requirements.txt"

[error_handling]
on_verify_failure = "retry"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[project]
name = "file-test"
description = "File test"
version = "1.0"

[env_file]
example = ".env.example"
target = ".env"
overwrite = false

[venv]
dir = ".venv"
python = "python3.11"

[install]
requirements = "requirements.txt"

[environment]
PIP_NO_CACHE_DIR = "1"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.project.name, "file-test");
        assert!(!config.overwrite_env());
        assert_eq!(config.venv.python.as_deref(), Some("python3.11"));
        assert_eq!(
            config.command_environment().get("PIP_NO_CACHE_DIR"),
            Some(&"1".to_string())
        );
    }
}
