use crate::domain::model::CommandOutput;
use crate::utils::error::Result;
use std::path::Path;

/// 外部指令執行的抽象介面，測試時可用假實作替換
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> impl std::future::Future<Output = Result<CommandOutput>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn env_example(&self) -> &str;
    fn env_target(&self) -> &str;
    fn venv_dir(&self) -> &str;
    fn requirements(&self) -> &str;
    fn python(&self) -> Option<&str>;
    fn index_url(&self) -> Option<&str>;
    fn overwrite_env(&self) -> bool;
    fn upgrade_pip(&self) -> bool;
}
