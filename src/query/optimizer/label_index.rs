//! 标签索引
//!
//! 估算器在准备阶段为每个标签构建正向与反向邻接索引，
//! 之后只读，可在并发读者之间无锁共享。
//!
//! 邻接索引采用稀疏 CSR 布局：只记录至少有一条边的顶点，
//! 内存占用与边数成正比而与顶点数无关。

use rayon::prelude::*;

use crate::core::types::{CardStat, LabelId, Step, VertexId};
use crate::graph::Graph;

/// 单个标签、单个方向上的邻接索引
///
/// `sources` 升序排列；`targets[offsets[i]..offsets[i + 1]]` 为 `sources[i]`
/// 的邻居，同样升序，重复边保留。
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    sources: Vec<VertexId>,
    offsets: Vec<usize>,
    targets: Vec<VertexId>,
}

impl AdjacencyIndex {
    /// 由 (key, value) 对构建索引
    pub fn build(mut pairs: Vec<(VertexId, VertexId)>) -> Self {
        pairs.sort_unstable();

        let mut sources = Vec::new();
        let mut offsets = Vec::new();
        let mut targets = Vec::with_capacity(pairs.len());

        for (key, value) in pairs {
            if sources.last() != Some(&key) {
                sources.push(key);
                offsets.push(targets.len());
            }
            targets.push(value);
        }
        offsets.push(targets.len());

        Self {
            sources,
            offsets,
            targets,
        }
    }

    /// 至少有一条边的顶点（升序）
    pub fn sources(&self) -> &[VertexId] {
        &self.sources
    }

    /// 指定顶点的邻居；无边时为空
    pub fn neighbors(&self, vertex: VertexId) -> &[VertexId] {
        match self.sources.binary_search(&vertex) {
            Ok(i) => &self.targets[self.offsets[i]..self.offsets[i + 1]],
            Err(_) => &[],
        }
    }

    /// 索引中的边数（含重复边）
    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    /// 不同 (key, value) 对的数量
    pub fn distinct_pairs(&self) -> u64 {
        self.offsets
            .windows(2)
            .map(|bounds| {
                let neighbors = &self.targets[bounds[0]..bounds[1]];
                let mut distinct = 0u64;
                let mut previous = None;
                for &n in neighbors {
                    if previous != Some(n) {
                        distinct += 1;
                        previous = Some(n);
                    }
                }
                distinct
            })
            .sum()
    }
}

/// 单个标签的索引与精确统计
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    pub forward: AdjacencyIndex,
    pub reverse: AdjacencyIndex,
    /// 不同 (source, destination) 对的数量
    pub distinct_pairs: u64,
}

impl LabelIndex {
    pub fn build(edges: &[(VertexId, VertexId)]) -> Self {
        let forward = AdjacencyIndex::build(edges.to_vec());
        let reverse = AdjacencyIndex::build(edges.iter().map(|&(s, d)| (d, s)).collect());
        let distinct_pairs = forward.distinct_pairs();

        Self {
            forward,
            reverse,
            distinct_pairs,
        }
    }

    /// 出现在边起点的不同顶点数
    pub fn out_vertex_count(&self) -> u64 {
        self.forward.sources().len() as u64
    }

    /// 出现在边终点的不同顶点数
    pub fn in_vertex_count(&self) -> u64 {
        self.reverse.sources().len() as u64
    }

    /// 按方向选择邻接索引
    pub fn adjacency(&self, forward: bool) -> &AdjacencyIndex {
        if forward {
            &self.forward
        } else {
            &self.reverse
        }
    }

    /// 单步的精确统计；反向时交换 no_out 与 no_in
    pub fn step_stat(&self, forward: bool) -> CardStat {
        let stat = CardStat::new(self.out_vertex_count(), self.distinct_pairs, self.in_vertex_count());
        if forward {
            stat
        } else {
            stat.swapped()
        }
    }
}

/// 全部标签的索引集合
#[derive(Debug, Clone, Default)]
pub struct LabelIndexSet {
    labels: Vec<LabelIndex>,
    vertex_count: u32,
}

impl LabelIndexSet {
    /// 为图中每个标签构建索引，标签之间并行
    pub fn build(graph: &Graph) -> Self {
        let labels = (0..graph.label_count())
            .into_par_iter()
            .map(|label| LabelIndex::build(graph.edges(label)))
            .collect();

        Self {
            labels,
            vertex_count: graph.vertex_count(),
        }
    }

    pub fn label(&self, label: LabelId) -> Option<&LabelIndex> {
        self.labels.get(label as usize)
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// 步骤对应方向的邻接索引；标签不存在时为空
    pub fn adjacency(&self, step: Step) -> Option<&AdjacencyIndex> {
        self.label(step.label).map(|index| index.adjacency(step.forward))
    }

    /// 单步精确统计；标签不存在时为零
    pub fn step_stat(&self, step: Step) -> CardStat {
        self.label(step.label)
            .map(|index| index.step_stat(step.forward))
            .unwrap_or_default()
    }
}
