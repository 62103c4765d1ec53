use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::ConfigError;
use crate::query::executor::EvaluatorConfig;
use crate::query::optimizer::EstimatorConfig;

/// 日志配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// 为 false 时只输出到标准错误
    pub to_file: bool,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
    /// 写文件的同时复制到标准错误
    pub console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            to_file: false,
            dir: "logs".to_string(),
            file: "rpqdb".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
            console: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub estimator: EstimatorConfig,
    pub evaluator: EvaluatorConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
