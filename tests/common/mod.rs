//! 集成测试共享工具模块
//!
//! 提供测试图的构造、查询树枚举以及逐点展开的参照求值，
//! 供所有集成测试使用

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rpqdb::core::{CardStat, Step};
use rpqdb::graph::Graph;
use rpqdb::query::QueryTree;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

/// 四个顶点、两个标签的小图
///
/// label 0 构成链 0->1->2->3，label 1 只有 0->3。
pub fn chain_graph() -> Graph {
    let mut graph = Graph::new(4, 2);
    for (from, to, label) in [(0, 1, 0), (1, 2, 0), (2, 3, 0), (0, 3, 1)] {
        graph.add_edge(from, to, label).expect("边应在范围内");
    }
    graph
}

/// 可复现的随机图
pub fn random_graph(vertices: u32, labels: u32, edges: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new(vertices, labels);
    for _ in 0..edges {
        let from = rng.gen_range(0..vertices);
        let to = rng.gen_range(0..vertices);
        let label = rng.gen_range(0..labels);
        graph.add_edge(from, to, label).expect("边应在范围内");
    }
    graph
}

pub fn shared(graph: Graph) -> Arc<Graph> {
    Arc::new(graph)
}

/// 逐源点展开的参照求值，返回去重后的 (源点 -> 终点集合)
pub fn reference_pairs(graph: &Graph, path: &[Step]) -> BTreeMap<u32, BTreeSet<u32>> {
    let mut result = BTreeMap::new();
    for source in 0..graph.vertex_count() {
        let mut frontier: BTreeSet<u32> = BTreeSet::from([source]);
        for step in path {
            let mut next = BTreeSet::new();
            for &(from, to) in graph.edges(step.label) {
                let (tail, head) = if step.forward { (from, to) } else { (to, from) };
                if frontier.contains(&tail) {
                    next.insert(head);
                }
            }
            frontier = next;
        }
        if !frontier.is_empty() {
            result.insert(source, frontier);
        }
    }
    result
}

/// 逐条路径展开的参照求值，保留重复：每条不同的边序列贡献一个终点
pub fn reference_walks(graph: &Graph, path: &[Step]) -> BTreeMap<u32, Vec<u32>> {
    let mut result = BTreeMap::new();
    for source in 0..graph.vertex_count() {
        let mut frontier = vec![source];
        for step in path {
            let mut next = Vec::new();
            for &vertex in &frontier {
                for &(from, to) in graph.edges(step.label) {
                    let (tail, head) = if step.forward { (from, to) } else { (to, from) };
                    if tail == vertex {
                        next.push(head);
                    }
                }
            }
            frontier = next;
        }
        if !frontier.is_empty() {
            frontier.sort_unstable();
            result.insert(source, frontier);
        }
    }
    result
}

/// 在随机图基础上把每个标签的前若干条边再各加一遍，形成平行边
pub fn random_multigraph(vertices: u32, labels: u32, edges: usize, seed: u64) -> Graph {
    let mut graph = random_graph(vertices, labels, edges, seed);
    for label in 0..labels {
        let parallel: Vec<(u32, u32)> = graph.edges(label).iter().take(edges / 4).copied().collect();
        for (from, to) in parallel {
            graph.add_edge(from, to, label).expect("边应在范围内");
        }
    }
    graph
}

/// 参照统计
pub fn reference_stats(graph: &Graph, path: &[Step]) -> CardStat {
    let pairs = reference_pairs(graph, path);
    let no_out = pairs.len() as u64;
    let no_paths = pairs.values().map(|dests| dests.len() as u64).sum();
    let destinations: BTreeSet<u32> = pairs.values().flatten().copied().collect();
    CardStat::new(no_out, no_paths, destinations.len() as u64)
}

/// 枚举同一步骤序列的全部括号结构
pub fn all_bracketings(steps: &[Step]) -> Vec<QueryTree> {
    if steps.len() == 1 {
        return vec![QueryTree::leaf(steps[0])];
    }
    let mut trees = Vec::new();
    for split in 1..steps.len() {
        for left in all_bracketings(&steps[..split]) {
            for right in all_bracketings(&steps[split..]) {
                trees.push(QueryTree::concat(left.clone(), right));
            }
        }
    }
    trees
}

/// 把图文件内容写入临时目录
pub fn write_graph_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("写入图文件失败");
    path
}
