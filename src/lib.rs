pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::SystemRunner, CliConfig};

pub use app::steps::{EnvFileStep, InstallStep, VenvStep, VerifyStep};
pub use config::toml_config::TomlConfig;
pub use core::setup::SetupEngine;
pub use core::step_sequence::{SetupContext, SetupStep, StepResult, StepSequence};
pub use domain::ports::{CommandRunner, ConfigProvider};
pub use utils::error::{Result, SetupError};
