//! 计划优化器
//!
//! 将展平的步骤序列递归切分为二叉连接树。
//! 每一层枚举所有切分点 `i`（左侧 `[0..=i]`，右侧 `(i..n)`），
//! 以 `max(左估算路径数, 右估算路径数)` 为代价选取代价最小的切分，
//! 代价相同时取最小的切分下标，然后分别递归左右两侧。
//!
//! 这是自顶向下的贪心切分，不是对所有树形的动态规划。

use std::collections::HashMap;

use crate::core::error::QueryError;
use crate::core::types::{CardStat, PathSignature, Step};
use crate::query::ast::QueryTree;
use crate::query::optimizer::estimator::CardinalityEstimator;

/// 计划优化器
///
/// 同一次优化中子序列会在不同层重复出现，估算结果按签名记忆。
pub struct PlanOptimizer<'a> {
    estimator: &'a CardinalityEstimator,
    memo: HashMap<PathSignature, CardStat>,
    estimator_calls: usize,
}

impl<'a> PlanOptimizer<'a> {
    pub fn new(estimator: &'a CardinalityEstimator) -> Self {
        Self {
            estimator,
            memo: HashMap::new(),
            estimator_calls: 0,
        }
    }

    /// 为步骤序列构建计划树
    pub fn optimize(&mut self, path: &[Step]) -> Result<QueryTree, QueryError> {
        if path.is_empty() {
            return Err(QueryError::EmptyPath);
        }
        Ok(self.build(path))
    }

    /// 实际调用估算器的次数（不含记忆命中）
    pub fn estimator_calls(&self) -> usize {
        self.estimator_calls
    }

    fn build(&mut self, path: &[Step]) -> QueryTree {
        if let [step] = path {
            return QueryTree::leaf(*step);
        }

        let split = self.best_split(path);
        let (left, right) = path.split_at(split + 1);
        QueryTree::concat(self.build(left), self.build(right))
    }

    /// 代价最小的切分点；切分点 `i` 表示左侧为 `[0..=i]`
    fn best_split(&mut self, path: &[Step]) -> usize {
        let mut best: Option<(u64, usize)> = None;

        for split in 0..path.len() - 1 {
            let (left, right) = path.split_at(split + 1);
            let left_estimate = self.estimate(left);
            let right_estimate = self.estimate(right);
            let cost = left_estimate.no_paths.max(right_estimate.no_paths);

            log::trace!(
                "切分 {} @ {}: 左 {} 右 {} 代价 {}",
                PathSignature::from_steps(path),
                split,
                left_estimate,
                right_estimate,
                cost
            );

            if best.map_or(true, |(best_cost, _)| cost < best_cost) {
                best = Some((cost, split));
            }
        }

        best.map(|(_, split)| split).unwrap_or(0)
    }

    fn estimate(&mut self, steps: &[Step]) -> CardStat {
        let signature = PathSignature::from_steps(steps);
        if let Some(stat) = self.memo.get(&signature) {
            return *stat;
        }

        self.estimator_calls += 1;
        let stat = self.estimator.estimate(steps);
        self.memo.insert(signature, stat);
        stat
    }
}

/// 便捷函数：用给定估算器优化步骤序列
pub fn optimize(estimator: &CardinalityEstimator, path: &[Step]) -> Result<QueryTree, QueryError> {
    PlanOptimizer::new(estimator).optimize(path)
}
