//! 中间结果代数
//!
//! 中间结果是 `源点 -> [终点]` 的映射，重复终点表示不同的路径，不做去重。
//! 投影与连接总是分配新的输出，从不原地修改输入。

use roaring::RoaringBitmap;
use std::collections::{BTreeMap, HashMap};

use crate::core::types::{CardStat, Step, VertexId};
use crate::graph::Graph;

/// 子路径求值的中间结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intermediate {
    adjacency: HashMap<VertexId, Vec<VertexId>>,
}

impl Intermediate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: VertexId, destination: VertexId) {
        self.adjacency.entry(source).or_default().push(destination);
    }

    /// 指定源点的终点列表；无结果时为空
    pub fn destinations(&self, source: VertexId) -> &[VertexId] {
        self.adjacency.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &[VertexId])> {
        self.adjacency.iter().map(|(source, dests)| (*source, dests.as_slice()))
    }

    /// 至少有一个终点的源点数
    pub fn source_count(&self) -> usize {
        self.adjacency.len()
    }

    /// 路径总数（含重复）
    pub fn path_count(&self) -> u64 {
        self.adjacency.values().map(|dests| dests.len() as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// 每个源点的终点多重集（排序后），用于比较两个结果是否等价
    pub fn normalized(&self) -> BTreeMap<VertexId, Vec<VertexId>> {
        self.adjacency
            .iter()
            .map(|(source, dests)| {
                let mut sorted = dests.clone();
                sorted.sort_unstable();
                (*source, sorted)
            })
            .collect()
    }
}

impl FromIterator<(VertexId, VertexId)> for Intermediate {
    fn from_iter<I: IntoIterator<Item = (VertexId, VertexId)>>(iter: I) -> Self {
        let mut result = Intermediate::new();
        for (source, destination) in iter {
            result.push(source, destination);
        }
        result
    }
}

/// 投影单个步骤
///
/// 扫描一次该标签的边表；反向步骤交换源点与终点角色。
pub fn project(graph: &Graph, step: Step) -> Intermediate {
    let edges = graph.edges(step.label);
    if step.forward {
        edges.iter().copied().collect()
    } else {
        edges.iter().map(|&(source, dest)| (dest, source)).collect()
    }
}

/// 连接两个中间结果
///
/// 对 `left` 中每个 `(src, dests)`、每个 `dest`，把 `right[dest]` 的全部元素
/// 追加到 `out[src]`，不去重。
pub fn join(left: &Intermediate, right: &Intermediate) -> Intermediate {
    let mut adjacency = HashMap::with_capacity(left.adjacency.len());

    for (source, dests) in &left.adjacency {
        let mut joined = Vec::new();
        for dest in dests {
            if let Some(next) = right.adjacency.get(dest) {
                joined.extend_from_slice(next);
            }
        }
        if !joined.is_empty() {
            adjacency.insert(*source, joined);
        }
    }

    Intermediate { adjacency }
}

/// 计算中间结果的基数统计
///
/// - `no_out`: 源点数
/// - `no_paths`: 每个源点排序后相邻不同的终点数之和
///   （同一源点经多条路径到达同一终点只计一次，不跨源点去重）
/// - `no_in`: 位图标记所有终点后的置位数
pub fn compute_stats(result: &Intermediate) -> CardStat {
    let mut destinations = RoaringBitmap::new();
    let mut no_paths = 0u64;
    let mut scratch: Vec<VertexId> = Vec::new();

    for dests in result.adjacency.values() {
        scratch.clear();
        scratch.extend_from_slice(dests);
        scratch.sort_unstable();

        let mut previous = None;
        for &dest in &scratch {
            if previous != Some(dest) {
                no_paths += 1;
                previous = Some(dest);
            }
        }
        destinations.extend(scratch.iter().copied());
    }

    CardStat::new(result.source_count() as u64, no_paths, destinations.len())
}
