//! 查询优化模块
//!
//! ## 模块结构
//!
//! - `config` - 估算器配置
//! - `label_index` - 按标签的正向/反向邻接索引与精确统计
//! - `sampling` - 蓄水池采样与基于下标的采样
//! - `estimator` - 基数估算器
//! - `planner` - 代价引导的递归切分计划优化器

pub mod config;
pub mod estimator;
pub mod label_index;
pub mod planner;
pub mod sampling;

pub use config::{EstimationMode, EstimatorConfig, DEFAULT_SAMPLE_BUDGET};
pub use estimator::CardinalityEstimator;
pub use label_index::{AdjacencyIndex, LabelIndex, LabelIndexSet};
pub use planner::{optimize, PlanOptimizer};
pub use sampling::{sample_indices, ReservoirSampling};
