//! 查询执行模块
//!
//! - `intermediate` - 中间结果、投影、连接与统计
//! - `cache` - 以路径签名为键的并发缓存
//! - `dispatcher` - 基于线程池的并发计划执行
//! - `evaluator` - 顶层求值器
//! - `config` - 求值器配置

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod evaluator;
pub mod intermediate;

pub use cache::{CacheSnapshot, CacheStats, PathCache};
pub use config::{EvaluatorConfig, DEFAULT_WORKER_THREADS};
pub use dispatcher::{Dispatcher, PlanHandle, ResultCache};
pub use evaluator::{Evaluator, EvaluatorCacheStats};
pub use intermediate::{compute_stats, join, project, Intermediate};
