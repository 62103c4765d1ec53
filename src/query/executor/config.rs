//! 求值器配置

use serde::{Deserialize, Serialize};

/// 默认工作线程数
pub const DEFAULT_WORKER_THREADS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// 工作线程数，0 表示使用 CPU 核数
    pub worker_threads: usize,

    /// 是否通过线程池并发执行计划
    pub parallel: bool,

    /// 是否缓存子路径的中间结果
    pub cache_intermediates: bool,

    /// 已挂载估算器时是否用优化器重写计划
    pub use_estimator: bool,

    /// 工作线程栈大小（字节），未设置时使用系统默认值
    pub worker_stack_size: Option<usize>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
            parallel: true,
            cache_intermediates: true,
            use_estimator: true,
            worker_stack_size: None,
        }
    }
}

impl EvaluatorConfig {
    /// 单线程递归求值
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }

    /// 实际使用的工作线程数
    pub fn effective_workers(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.worker_threads
        }
    }
}
