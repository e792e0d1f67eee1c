#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "small-setup"))]
#[cfg_attr(
    feature = "cli",
    command(about = "A small bootstrap tool for Python project environments")
)]
pub struct CliConfig {
    #[cfg_attr(feature = "cli", arg(long, default_value = ".env.example"))]
    pub env_example: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = ".env"))]
    pub env_file: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "venv"))]
    pub venv_dir: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "requirements.txt"))]
    pub requirements: String,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Explicit Python interpreter to create the venv with")
    )]
    pub python: Option<String>,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Alternative package index for pip install")
    )]
    pub index_url: Option<String>,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Keep an existing .env instead of overwriting it")
    )]
    pub preserve_env: bool,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Recreate the virtual environment even if it exists")
    )]
    pub force: bool,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Upgrade pip inside the environment before installing")
    )]
    pub upgrade_pip: bool,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Skip the post-setup verification checks")
    )]
    pub no_verify: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable resource monitoring"))]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn env_example(&self) -> &str {
        &self.env_example
    }

    fn env_target(&self) -> &str {
        &self.env_file
    }

    fn venv_dir(&self) -> &str {
        &self.venv_dir
    }

    fn requirements(&self) -> &str {
        &self.requirements
    }

    fn python(&self) -> Option<&str> {
        self.python.as_deref()
    }

    fn index_url(&self) -> Option<&str> {
        self.index_url.as_deref()
    }

    fn overwrite_env(&self) -> bool {
        !self.preserve_env
    }

    fn upgrade_pip(&self) -> bool {
        self.upgrade_pip
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("env_example", &self.env_example)?;
        validation::validate_path("env_file", &self.env_file)?;
        validation::validate_path("venv_dir", &self.venv_dir)?;
        validation::validate_path("requirements", &self.requirements)?;
        validation::validate_distinct_paths(
            "env_example",
            &self.env_example,
            "env_file",
            &self.env_file,
        )?;

        if let Some(python) = &self.python {
            validation::validate_non_empty_string("python", python)?;
        }
        if let Some(index_url) = &self.index_url {
            validation::validate_index_url("index_url", index_url)?;
        }

        Ok(())
    }
}
