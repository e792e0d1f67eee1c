pub mod env_file;
pub mod install;
pub mod venv;
pub mod verify;

pub use env_file::EnvFileStep;
pub use install::InstallStep;
pub use venv::VenvStep;
pub use verify::{CheckOutcome, VerifyStep};

use std::path::{Path, PathBuf};

/// 相對路徑以專案目錄為基準
pub(crate) fn resolve_path(project_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}
