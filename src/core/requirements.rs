use crate::utils::error::{Result, SetupError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 讀取 requirements 檔案並展開成套件規格清單。
/// 支援 `#` 註解、空行與遞迴的 `-r` 引入；其他選項行會被略過。
pub fn load_requirements(path: &Path) -> Result<Vec<String>> {
    let mut visited = HashSet::new();
    let mut specs = Vec::new();
    read_file(path, &mut visited, &mut specs)?;
    Ok(specs)
}

fn read_file(path: &Path, visited: &mut HashSet<PathBuf>, specs: &mut Vec<String>) -> Result<()> {
    let canonical = path
        .canonicalize()
        .map_err(|_| SetupError::RequirementsError {
            path: path.display().to_string(),
            details: "file not found".to_string(),
        })?;

    if !visited.insert(canonical.clone()) {
        return Err(SetupError::RequirementsError {
            path: path.display().to_string(),
            details: "circular -r include".to_string(),
        });
    }

    let content = std::fs::read_to_string(&canonical)?;

    for raw_line in content.lines() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(included) = line
            .strip_prefix("-r ")
            .or_else(|| line.strip_prefix("--requirement "))
        {
            // 相對路徑以包含它的檔案為基準，與 pip 行為一致
            let base = canonical.parent().unwrap_or_else(|| Path::new("."));
            read_file(&base.join(included.trim()), visited, specs)?;
            continue;
        }

        if line.starts_with('-') {
            // 其他 pip 選項（--index-url、-e 等）原樣交給 pip，不列入驗證
            tracing::debug!("Skipping option line in requirements: {}", line);
            continue;
        }

        specs.push(line.to_string());
    }

    Ok(())
}

/// 去除行內註解：行首的 `#` 或前面是空白的 ` #`
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// 從套件規格取出純套件名稱，供 `pip show` 驗證使用。
/// 例如 `requests[socks]>=2.3` -> `requests`，`torch @ https://...` -> `torch`
pub fn package_name(spec: &str) -> String {
    let delimiters = ['[', '<', '>', '=', '!', '~', ';', '@', ' '];
    let end = spec
        .find(|c| delimiters.contains(&c))
        .unwrap_or(spec.len());
    spec[..end].trim().to_string()
}
