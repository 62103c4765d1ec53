//! 基数估算器
//!
//! 在不物化结果的前提下估算步骤序列的结果基数，为计划优化器提供依据。
//!
//! ## 估算方式
//!
//! - **单步**：直接返回该标签/方向的精确统计
//! - **组合公式**：`left ; right` 的路径数按
//!   `left.no_out * (left.no_paths / left.no_in) * (right.no_paths / right.no_out)` 估算，
//!   任一操作数字段为零时结果为零
//! - **采样**：从首步的起点集合中蓄水池采样初始前沿，逐步经索引扩展，
//!   前沿超过预算时在展平后的扩展结果上按下标均匀采样，并累乘欠采样修正因子
//!
//! 索引在首次使用时构建一次，之后只读，估算器可在多线程之间共享。

use rand::rngs::StdRng;
use rand::SeedableRng;
use roaring::RoaringBitmap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::core::types::{CardStat, Step, VertexId};
use crate::graph::Graph;
use crate::query::optimizer::config::{EstimationMode, EstimatorConfig};
use crate::query::optimizer::label_index::LabelIndexSet;
use crate::query::optimizer::sampling::{sample_indices, ReservoirSampling};

/// 基数估算器
#[derive(Debug)]
pub struct CardinalityEstimator {
    graph: Arc<Graph>,
    config: EstimatorConfig,
    index: OnceLock<LabelIndexSet>,
}

impl CardinalityEstimator {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self::with_config(graph, EstimatorConfig::default())
    }

    pub fn with_config(graph: Arc<Graph>, config: EstimatorConfig) -> Self {
        Self {
            graph,
            config,
            index: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// 构建标签索引；重复调用不会重建
    pub fn prepare(&self) -> &LabelIndexSet {
        self.index.get_or_init(|| {
            let started = Instant::now();
            let index = LabelIndexSet::build(&self.graph);
            log::info!(
                "估算器索引构建完成: {} 个标签，耗时 {:?}",
                index.label_count(),
                started.elapsed()
            );
            index
        })
    }

    pub fn is_prepared(&self) -> bool {
        self.index.get().is_some()
    }

    /// 标签索引，未准备时先构建
    pub fn index(&self) -> &LabelIndexSet {
        self.prepare()
    }

    /// 按配置的估算方式估算步骤序列的基数
    pub fn estimate(&self, path: &[Step]) -> CardStat {
        match path {
            [] => CardStat::zero(),
            [step] => self.index().step_stat(*step),
            _ => match self.config.mode {
                EstimationMode::Formula => self.estimate_formula(path),
                EstimationMode::Sampling => self.estimate_sampled(path),
                EstimationMode::Auto if path.len() >= self.config.sampling_min_length => {
                    self.estimate_sampled(path)
                }
                EstimationMode::Auto => self.estimate_formula(path),
            },
        }
    }

    /// 单步统计从左到右逐步组合
    pub fn estimate_formula(&self, path: &[Step]) -> CardStat {
        let index = self.index();
        let Some((first, rest)) = path.split_first() else {
            return CardStat::zero();
        };

        rest.iter().fold(index.step_stat(*first), |left, step| {
            Self::combine(left, index.step_stat(*step))
        })
    }

    /// 组合 `left ; right` 两个子估算
    ///
    /// 六个字段中任一为零时直接返回零统计。
    pub fn combine(left: CardStat, right: CardStat) -> CardStat {
        if left.has_zero_field() || right.has_zero_field() {
            return CardStat::zero();
        }

        let left_fanout = left.no_paths as f64 / left.no_in as f64;
        let right_fanout = right.no_paths as f64 / right.no_out as f64;
        let no_paths = left.no_out as f64 * left_fanout * right_fanout;

        CardStat::new(left.no_in, no_paths as u64, right.no_out)
    }

    /// 基于索引采样的估算
    ///
    /// 预算覆盖每一步的全部前沿时结果与精确求值一致。
    /// 每次截断前沿时，`no_paths` 与 `no_in` 按截断前后的规模比修正，
    /// `no_out` 按截断前后不同源点数之比修正。
    pub fn estimate_sampled(&self, path: &[Step]) -> CardStat {
        let index = self.index();
        let Some(first) = path.first() else {
            return CardStat::zero();
        };
        let Some(start) = index.adjacency(*first) else {
            return CardStat::zero();
        };
        if start.sources().is_empty() {
            return CardStat::zero();
        }

        let budget = self.config.sample_budget.max(1);
        let mut rng = self.rng_for(path);

        let mut reservoir = ReservoirSampling::new(budget);
        reservoir.sample_iter(start.sources().iter().copied(), &mut rng);
        let mut origin_correction = reservoir.under_sampling_factor();
        let mut under_sampling = origin_correction;

        let mut frontier: Vec<(VertexId, VertexId)> = reservoir
            .into_samples()
            .into_iter()
            .map(|v| (v, v))
            .collect();

        for step in path {
            let Some(adjacency) = index.adjacency(*step) else {
                return CardStat::zero();
            };

            let mut image: Vec<(VertexId, VertexId)> = Vec::new();
            for &(origin, current) in &frontier {
                image.extend(adjacency.neighbors(current).iter().map(|&next| (origin, next)));
            }
            image.sort_unstable();
            image.dedup();

            if image.is_empty() {
                return CardStat::zero();
            }

            if image.len() > budget {
                under_sampling *= image.len() as f64 / budget as f64;
                let origins_before = distinct_origins(&image);
                frontier = sample_indices(&mut rng, image.len(), budget)
                    .into_iter()
                    .map(|i| image[i])
                    .collect();
                origin_correction *= origins_before as f64 / distinct_origins(&frontier) as f64;
            } else {
                frontier = image;
            }
        }

        let destinations: RoaringBitmap = frontier.iter().map(|&(_, dest)| dest).collect();

        let vertex_cap = u64::from(index.vertex_count());
        let no_paths = (frontier.len() as f64 * under_sampling).round() as u64;
        let no_out = ((distinct_origins(&frontier) as f64 * origin_correction).round() as u64)
            .min(vertex_cap)
            .min(no_paths);
        let no_in = ((destinations.len() as f64 * under_sampling).round() as u64)
            .min(vertex_cap)
            .min(no_paths);

        CardStat::new(no_out, no_paths, no_in)
    }

    fn rng_for(&self, path: &[Step]) -> StdRng {
        match self.config.seed {
            Some(seed) => {
                let mut hasher = DefaultHasher::new();
                path.hash(&mut hasher);
                StdRng::seed_from_u64(seed ^ hasher.finish())
            }
            None => StdRng::from_entropy(),
        }
    }
}

fn distinct_origins(pairs: &[(VertexId, VertexId)]) -> u64 {
    pairs
        .iter()
        .map(|&(origin, _)| origin)
        .collect::<RoaringBitmap>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_graph() -> Arc<Graph> {
        // label 0: 0->1, 1->2, 2->3；label 1: 0->3, 3->0
        let mut graph = Graph::new(4, 2);
        for (from, to, label) in [(0, 1, 0), (1, 2, 0), (2, 3, 0), (0, 3, 1), (3, 0, 1)] {
            graph.add_edge(from, to, label).expect("edge in range");
        }
        Arc::new(graph)
    }

    #[test]
    fn test_prepare_is_lazy_and_idempotent() {
        let estimator = CardinalityEstimator::new(chain_graph());
        assert!(!estimator.is_prepared());
        estimator.prepare();
        estimator.prepare();
        assert!(estimator.is_prepared());
    }

    #[test]
    fn test_single_step_is_exact() {
        let estimator = CardinalityEstimator::new(chain_graph());
        assert_eq!(estimator.estimate(&[Step::forward(0)]), CardStat::new(3, 3, 3));
        assert_eq!(estimator.estimate(&[Step::reverse(1)]), CardStat::new(2, 2, 2));
        assert_eq!(estimator.estimate(&[]), CardStat::zero());
    }

    #[test]
    fn test_combine_formula() {
        let left = CardStat::new(4, 8, 2);
        let right = CardStat::new(5, 10, 3);
        // 4 * (8 / 2) * (10 / 5) = 32
        assert_eq!(CardinalityEstimator::combine(left, right), CardStat::new(2, 32, 5));
    }

    #[test]
    fn test_combine_zero_propagation() {
        let full = CardStat::new(4, 8, 2);
        for zero in [CardStat::new(0, 8, 2), CardStat::new(4, 0, 2), CardStat::new(4, 8, 0)] {
            assert_eq!(CardinalityEstimator::combine(zero, full), CardStat::zero());
            assert_eq!(CardinalityEstimator::combine(full, zero), CardStat::zero());
        }
    }

    #[test]
    fn test_formula_with_missing_label_is_zero() {
        let estimator = CardinalityEstimator::with_config(chain_graph(), EstimatorConfig::formula_only());
        assert_eq!(
            estimator.estimate(&[Step::forward(0), Step::forward(7)]),
            CardStat::zero()
        );
    }

    #[test]
    fn test_sampled_estimate_is_exact_within_budget() {
        let estimator = CardinalityEstimator::with_config(chain_graph(), EstimatorConfig::sampling(256, Some(1)));

        // 0+/0+: (0,2), (1,3)
        assert_eq!(
            estimator.estimate(&[Step::forward(0), Step::forward(0)]),
            CardStat::new(2, 2, 2)
        );
        // 0+/1+: 2->3->0
        assert_eq!(
            estimator.estimate(&[Step::forward(0), Step::forward(1)]),
            CardStat::new(1, 1, 1)
        );
        // 0+/0+/0+/0+: nothing
        assert_eq!(estimator.estimate(&[Step::forward(0); 4]), CardStat::zero());
    }

    #[test]
    fn test_sampled_estimate_scales_truncated_frontier() {
        // 64 sources, each with 8 distinct targets
        let mut graph = Graph::new(600, 1);
        for source in 0..64u32 {
            for k in 0..8u32 {
                graph.add_edge(source, 64 + source * 8 + k, 0).expect("edge in range");
            }
        }
        let estimator = CardinalityEstimator::with_config(Arc::new(graph), EstimatorConfig::sampling(16, Some(5)));

        let stat = estimator.estimate_sampled(&[Step::forward(0)]);
        // 16 sampled sources (factor 4), 128 pairs cut to 16 (factor 8): 16 * 32 = 512
        assert_eq!(stat.no_paths, 512);
        // 截断丢弃的源点按截断前后不同源点数之比补回
        assert_eq!(stat.no_out, 64);
    }

    #[test]
    fn test_sampled_no_out_survives_truncation_and_later_steps() {
        // label 0: 100 sources, 10 distinct targets each; label 1: every target -> sink
        let sink = 1100u32;
        let mut graph = Graph::new(1101, 2);
        for source in 0..100u32 {
            for k in 0..10u32 {
                let target = 100 + source * 10 + k;
                graph.add_edge(source, target, 0).expect("edge in range");
                graph.add_edge(target, sink, 1).expect("edge in range");
            }
        }
        let graph = Arc::new(graph);

        for seed in [1, 2, 3] {
            let estimator =
                CardinalityEstimator::with_config(graph.clone(), EstimatorConfig::sampling(50, Some(seed)));
            let stat = estimator.estimate_sampled(&[Step::forward(0), Step::forward(1)]);
            assert_eq!(stat.no_out, 100, "seed {}", seed);
        }
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let mut graph = Graph::new(200, 1);
        for v in 0..199u32 {
            graph.add_edge(v, v + 1, 0).expect("edge in range");
            graph.add_edge(v, (v * 7) % 200, 0).expect("edge in range");
        }
        let graph = Arc::new(graph);
        let path = [Step::forward(0); 3];

        let a = CardinalityEstimator::with_config(graph.clone(), EstimatorConfig::sampling(8, Some(42)));
        let b = CardinalityEstimator::with_config(graph, EstimatorConfig::sampling(8, Some(42)));
        assert_eq!(a.estimate(&path), b.estimate(&path));
    }
}
