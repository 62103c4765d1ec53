//! 查询求值器
//!
//! 顶层流程：
//! 1. 展平查询树并校验标签
//! 2. 按签名查询统计缓存，命中直接返回
//! 3. 挂载估算器时由优化器重新生成计划，否则按原树执行
//! 4. 同步递归或经调度器并发执行计划
//! 5. 计算统计并按原始序列签名写入统计缓存
//!
//! 两个缓存都是并发映射，同一个求值器可被多个线程同时调用。
//! 出错的查询不会写入任何缓存。

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::core::error::{QueryError, RpqResult};
use crate::core::types::{CardStat, Step};
use crate::graph::Graph;
use crate::query::ast::QueryTree;
use crate::query::executor::cache::{CacheSnapshot, PathCache};
use crate::query::executor::config::EvaluatorConfig;
use crate::query::executor::dispatcher::{Dispatcher, ResultCache};
use crate::query::executor::intermediate::{compute_stats, join, project, Intermediate};
use crate::query::optimizer::estimator::CardinalityEstimator;
use crate::query::optimizer::planner::PlanOptimizer;

/// 两个缓存的统计快照
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EvaluatorCacheStats {
    pub results: CacheSnapshot,
    pub stats: CacheSnapshot,
}

pub struct Evaluator {
    graph: Arc<Graph>,
    config: EvaluatorConfig,
    estimator: Option<Arc<CardinalityEstimator>>,
    result_cache: Arc<ResultCache>,
    stat_cache: PathCache<CardStat>,
    dispatcher: Option<Dispatcher>,
}

impl Evaluator {
    pub fn new(graph: Arc<Graph>) -> RpqResult<Self> {
        Self::with_config(graph, EvaluatorConfig::default())
    }

    /// 按配置创建求值器；并发模式下工作线程启动失败时返回错误
    pub fn with_config(graph: Arc<Graph>, config: EvaluatorConfig) -> RpqResult<Self> {
        let dispatcher = if config.parallel {
            Some(Dispatcher::new(config.effective_workers(), config.worker_stack_size)?)
        } else {
            None
        };

        Ok(Self {
            graph,
            config,
            estimator: None,
            result_cache: Arc::new(PathCache::new("intermediate")),
            stat_cache: PathCache::new("cardstat"),
            dispatcher,
        })
    }

    /// 挂载估算器，之后的查询由优化器生成计划
    pub fn attach_estimator(&mut self, estimator: Arc<CardinalityEstimator>) {
        self.estimator = Some(estimator);
    }

    pub fn estimator(&self) -> Option<&Arc<CardinalityEstimator>> {
        self.estimator.as_ref()
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// 准备已挂载的估算器
    pub fn prepare(&self) {
        if let Some(estimator) = &self.estimator {
            estimator.prepare();
        }
    }

    /// 求值查询并返回基数统计
    pub fn evaluate(&self, query: &QueryTree) -> RpqResult<CardStat> {
        let path = query.flatten();
        self.validate(&path)?;

        let signature = path.signature();
        if let Some(stats) = self.stat_cache.get(&signature) {
            log::debug!("统计缓存命中: {}", signature);
            return Ok(stats);
        }

        let started = Instant::now();
        let plan = self.plan_for(query, &path)?;
        log::debug!("原始查询 {}，执行计划 {}", query, plan);

        let result = self.execute(&plan)?;
        let stats = compute_stats(&result);
        self.stat_cache.insert(signature, stats);

        log::debug!("查询 {} 完成: {}，耗时 {:?}", path, stats, started.elapsed());
        Ok(stats)
    }

    /// 返回将要执行的计划树
    pub fn explain(&self, query: &QueryTree) -> RpqResult<QueryTree> {
        let path = query.flatten();
        self.validate(&path)?;
        self.plan_for(query, &path)
    }

    /// 按给定计划树原样执行，不经过优化器与统计缓存
    pub fn evaluate_plan(&self, plan: &QueryTree) -> RpqResult<Arc<Intermediate>> {
        self.validate(&plan.flatten())?;
        self.execute(plan)
    }

    pub fn cache_stats(&self) -> EvaluatorCacheStats {
        EvaluatorCacheStats {
            results: self.result_cache.snapshot(),
            stats: self.stat_cache.snapshot(),
        }
    }

    pub fn clear_caches(&self) {
        self.result_cache.clear();
        self.stat_cache.clear();
    }

    fn validate(&self, path: &[Step]) -> Result<(), QueryError> {
        if path.is_empty() {
            return Err(QueryError::EmptyPath);
        }
        match path.iter().find(|step| !self.graph.contains_label(step.label)) {
            Some(step) => Err(QueryError::UnknownLabel {
                label: step.label,
                labels: self.graph.label_count(),
            }),
            None => Ok(()),
        }
    }

    fn plan_for(&self, query: &QueryTree, path: &[Step]) -> RpqResult<QueryTree> {
        match &self.estimator {
            Some(estimator) if self.config.use_estimator => {
                Ok(PlanOptimizer::new(estimator).optimize(path)?)
            }
            _ => Ok(query.clone()),
        }
    }

    fn execute(&self, plan: &QueryTree) -> RpqResult<Arc<Intermediate>> {
        let cache = self.config.cache_intermediates.then_some(&self.result_cache);
        match &self.dispatcher {
            Some(dispatcher) => Ok(dispatcher.evaluate(plan, &self.graph, cache)?),
            None => Ok(self.evaluate_sync(plan, cache)),
        }
    }

    /// 自底向上递归求值，每个节点先查缓存
    fn evaluate_sync(&self, plan: &QueryTree, cache: Option<&Arc<ResultCache>>) -> Arc<Intermediate> {
        let signature = plan.signature();
        if let Some(hit) = cache.and_then(|cache| cache.get(&signature)) {
            return hit;
        }

        let result = match plan {
            QueryTree::Leaf(step) => Arc::new(project(&self.graph, *step)),
            QueryTree::Concat(left, right) => {
                let left = self.evaluate_sync(left, cache);
                let right = self.evaluate_sync(right, cache);
                Arc::new(join(&left, &right))
            }
        };

        if let Some(cache) = cache {
            cache.insert(signature, Arc::clone(&result));
        }
        result
    }
}
