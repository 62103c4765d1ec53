//! 并发调度器
//!
//! 在固定大小的线程池上执行计划树：
//! - 叶子节点作为一个投影任务入队
//! - 内部节点先异步调度两个子节点，再入队一个连接任务，
//!   该任务阻塞等待两个子结果后执行连接
//! - 恰有一个子节点为叶子时先调度非叶子子树，让其扇出尽早开始
//!
//! 连接任务总是在两个子任务都入队之后才入队。队列先进先出，
//! 因此任何被阻塞的任务所等待的任务都已被某个工作线程取走，不会死锁。
//! 每个节点调度前先查询中间结果缓存，任务产生的结果写回缓存。

use std::sync::Arc;

use crate::common::thread::{JobHandle, ThreadPool};
use crate::core::error::ExecutionError;
use crate::graph::Graph;
use crate::query::ast::QueryTree;
use crate::query::executor::cache::PathCache;
use crate::query::executor::intermediate::{join, project, Intermediate};

/// 计划节点结果的共享句柄
pub type PlanHandle = JobHandle<Result<Arc<Intermediate>, ExecutionError>>;

/// 中间结果缓存
pub type ResultCache = PathCache<Arc<Intermediate>>;

pub struct Dispatcher {
    pool: ThreadPool,
}

impl Dispatcher {
    /// 启动工作线程；任一线程启动失败时返回错误
    pub fn new(workers: usize, stack_size: Option<usize>) -> Result<Self, ExecutionError> {
        Ok(Self {
            pool: ThreadPool::with_stack_size(workers.max(1), stack_size)?,
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.len()
    }

    /// 执行计划树并等待根结果
    pub fn evaluate(
        &self,
        plan: &QueryTree,
        graph: &Arc<Graph>,
        cache: Option<&Arc<ResultCache>>,
    ) -> Result<Arc<Intermediate>, ExecutionError> {
        let handle = self.schedule(plan, graph, cache);
        flatten(handle.wait())
    }

    /// 异步调度计划树，返回根节点句柄
    pub fn schedule(&self, plan: &QueryTree, graph: &Arc<Graph>, cache: Option<&Arc<ResultCache>>) -> PlanHandle {
        let signature = plan.signature();
        if let Some(hit) = cache.and_then(|cache| cache.get(&signature)) {
            return JobHandle::ready(Ok(hit));
        }
        let cache = cache.cloned();

        match plan {
            QueryTree::Leaf(step) => {
                let step = *step;
                let graph = Arc::clone(graph);
                self.pool.submit(move || {
                    let result = Arc::new(project(&graph, step));
                    if let Some(cache) = cache {
                        cache.insert(signature, Arc::clone(&result));
                    }
                    Ok(result)
                })
            }
            QueryTree::Concat(left, right) => {
                let (left_handle, right_handle) = if schedules_right_first(left, right) {
                    let right_handle = self.schedule(right, graph, cache.as_ref());
                    let left_handle = self.schedule(left, graph, cache.as_ref());
                    (left_handle, right_handle)
                } else {
                    let left_handle = self.schedule(left, graph, cache.as_ref());
                    let right_handle = self.schedule(right, graph, cache.as_ref());
                    (left_handle, right_handle)
                };

                // 两个子任务此时均已入队
                self.pool.submit(move || {
                    let left = flatten(left_handle.wait())?;
                    let right = flatten(right_handle.wait())?;
                    let result = Arc::new(join(&left, &right));
                    if let Some(cache) = cache {
                        cache.insert(signature, Arc::clone(&result));
                    }
                    Ok(result)
                })
            }
        }
    }
}

/// 恰有一个子节点为叶子时先调度非叶子子树；其余情况按左右顺序
fn schedules_right_first(left: &QueryTree, right: &QueryTree) -> bool {
    left.is_leaf() && !right.is_leaf()
}

fn flatten<T>(outcome: Result<Result<T, ExecutionError>, ExecutionError>) -> Result<T, ExecutionError> {
    outcome.and_then(|inner| inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Step;
    use crate::query::parser::parse_query;

    fn chain_graph() -> Arc<Graph> {
        let mut graph = Graph::new(6, 2);
        for v in 0..5u32 {
            graph.add_edge(v, v + 1, 0).expect("edge in range");
        }
        graph.add_edge(3, 0, 1).expect("edge in range");
        Arc::new(graph)
    }

    #[test]
    fn test_dispatch_matches_sequential_algebra() {
        let graph = chain_graph();
        let dispatcher = Dispatcher::new(4, None).expect("workers start");
        let plan = parse_query("0+/(0+/(0+/1+))").expect("valid query");

        let parallel = dispatcher.evaluate(&plan, &graph, None).expect("jobs complete");

        let zero = project(&graph, Step::forward(0));
        let one = project(&graph, Step::forward(1));
        let expected = join(&zero, &join(&zero, &join(&zero, &one)));
        assert_eq!(parallel.normalized(), expected.normalized());
        // 0 -> 3 -> 0
        assert_eq!(parallel.normalized()[&0], vec![0]);
    }

    #[test]
    fn test_non_leaf_child_is_scheduled_first() {
        let leaf = parse_query("0+").expect("valid query");
        let subtree = parse_query("0+/1+").expect("valid query");

        assert!(schedules_right_first(&leaf, &subtree));
        assert!(!schedules_right_first(&subtree, &leaf));
        assert!(!schedules_right_first(&leaf, &leaf));
        assert!(!schedules_right_first(&subtree, &subtree));
    }

    #[test]
    fn test_leaf_left_child_with_subtree_right() {
        let graph = chain_graph();
        let dispatcher = Dispatcher::new(1, None).expect("workers start");
        let cache = Arc::new(ResultCache::new("test"));
        let plan = parse_query("0+/(0+/(0+/0+))").expect("valid query");

        let result = dispatcher.evaluate(&plan, &graph, Some(&cache)).expect("jobs complete");
        assert_eq!(result.normalized()[&0], vec![4]);
        assert_eq!(result.normalized()[&1], vec![5]);
        // 0+、0+0+、0+0+0+、0+0+0+0+
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_single_worker_does_not_deadlock() {
        let graph = chain_graph();
        let dispatcher = Dispatcher::new(1, None).expect("workers start");
        let plan = parse_query("((0+/0+)/(0+/0+))/0+").expect("valid query");

        let result = dispatcher.evaluate(&plan, &graph, None).expect("jobs complete");
        assert_eq!(result.normalized()[&0], vec![5]);
    }

    #[test]
    fn test_results_are_memoised_and_reused() {
        let graph = chain_graph();
        let dispatcher = Dispatcher::new(2, None).expect("workers start");
        let cache = Arc::new(ResultCache::new("test"));
        let plan = parse_query("0+/0+").expect("valid query");

        dispatcher.evaluate(&plan, &graph, Some(&cache)).expect("jobs complete");
        assert!(cache.contains(&plan.signature()));
        // leaf 0+ 与整条路径 0+0+
        assert_eq!(cache.len(), 2);

        let before = cache.snapshot().hits;
        dispatcher.evaluate(&plan, &graph, Some(&cache)).expect("jobs complete");
        assert_eq!(cache.snapshot().hits, before + 1);
    }
}
