//! 基数估算配置
//!
//! ## 使用示例
//!
//! ```rust
//! use rpqdb::query::optimizer::{EstimationMode, EstimatorConfig};
//!
//! // 默认配置：单步精确统计，短序列用组合公式，长序列用采样
//! let config = EstimatorConfig::default();
//!
//! // 固定随机种子，便于复现
//! let reproducible = EstimatorConfig {
//!     seed: Some(7),
//!     mode: EstimationMode::Sampling,
//!     ..Default::default()
//! };
//! assert_eq!(reproducible.sample_budget, config.sample_budget);
//! ```

use serde::{Deserialize, Serialize};

/// 默认采样预算
pub const DEFAULT_SAMPLE_BUDGET: usize = 256;

/// 估算方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMode {
    /// 逐步组合公式
    Formula,
    /// 基于索引的采样估算
    Sampling,
    /// 按序列长度选择：长度 1 精确，短序列公式，长序列采样
    Auto,
}

/// 基数估算器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// 采样前沿的最大规模
    ///
    /// 预算越大估算越准确，预算覆盖全部前沿时采样估算等于精确值
    pub sample_budget: usize,

    /// 估算方式
    pub mode: EstimationMode,

    /// `Auto` 模式下启用采样的最短序列长度
    pub sampling_min_length: usize,

    /// 随机种子；为空时每次估算使用系统熵
    pub seed: Option<u64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            sample_budget: DEFAULT_SAMPLE_BUDGET,
            mode: EstimationMode::Auto,
            sampling_min_length: 3,
            seed: None,
        }
    }
}

impl EstimatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 仅使用组合公式
    pub fn formula_only() -> Self {
        Self {
            mode: EstimationMode::Formula,
            ..Default::default()
        }
    }

    /// 仅使用采样估算
    pub fn sampling(sample_budget: usize, seed: Option<u64>) -> Self {
        Self {
            sample_budget,
            mode: EstimationMode::Sampling,
            seed,
            ..Default::default()
        }
    }
}
