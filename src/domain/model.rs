use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 外部指令的執行結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub summary: String,
    pub changed: bool,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StepReport {
    pub fn changed(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            changed: true,
            metadata: HashMap::new(),
        }
    }

    pub fn unchanged(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            changed: false,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}
