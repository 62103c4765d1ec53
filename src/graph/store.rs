//! 图存储
//!
//! 不可变的有向多重图，边按标签分组存储，只支持正向迭代。
//! 反向邻接由使用方（估算器的标签索引、投影算子）按需推导。

use crate::core::error::GraphError;
use crate::core::types::{LabelId, VertexId};

/// 按标签分组的有向多重图
///
/// 相同 `(from, to, label)` 的重复边允许存在且语义上互不相同，
/// 它们会放大路径计数。
#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: u32,
    labels: u32,
    /// edge_lists[label] = [(source, destination)]
    edge_lists: Vec<Vec<(VertexId, VertexId)>>,
}

impl Graph {
    /// 创建空图
    ///
    /// # 参数
    /// - `vertices`: 顶点数 V，合法顶点为 `[0, V)`
    /// - `labels`: 标签数 L，合法标签为 `[0, L)`
    pub fn new(vertices: u32, labels: u32) -> Self {
        Self {
            vertices,
            labels,
            edge_lists: vec![Vec::new(); labels as usize],
        }
    }

    /// 添加一条边
    ///
    /// 任一分量越界时返回 `GraphError::EdgeOutOfBounds`，图保持不变。
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, label: LabelId) -> Result<(), GraphError> {
        if from >= self.vertices || to >= self.vertices || label >= self.labels {
            return Err(GraphError::EdgeOutOfBounds {
                from,
                to,
                label,
                vertices: self.vertices,
                labels: self.labels,
            });
        }

        self.edge_lists[label as usize].push((from, to));
        Ok(())
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices
    }

    pub fn label_count(&self) -> u32 {
        self.labels
    }

    pub fn contains_label(&self, label: LabelId) -> bool {
        label < self.labels
    }

    /// 边总数（各标签边表长度之和，重复边分别计数）
    pub fn edge_count(&self) -> u64 {
        self.edge_lists.iter().map(|edges| edges.len() as u64).sum()
    }

    /// 去重后的边数
    ///
    /// 对每个标签的边表排序后统计相邻不同的 (source, destination) 对。
    /// 复杂度 O(E log E)，仅用于诊断输出。
    pub fn distinct_edge_count(&self) -> u64 {
        self.edge_lists
            .iter()
            .map(|edges| {
                let mut sorted = edges.clone();
                sorted.sort_unstable();
                sorted.dedup();
                sorted.len() as u64
            })
            .sum()
    }

    /// 指定标签的边表；标签越界时为空
    pub fn edges(&self, label: LabelId) -> &[(VertexId, VertexId)] {
        self.edge_lists
            .get(label as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_and_counts() {
        let mut graph = Graph::new(4, 2);
        graph.add_edge(0, 1, 0).expect("edge in range");
        graph.add_edge(1, 2, 0).expect("edge in range");
        graph.add_edge(0, 3, 1).expect("edge in range");

        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.label_count(), 2);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.edges(0), &[(0, 1), (1, 2)]);
        assert!(graph.edges(7).is_empty());
    }

    #[test]
    fn test_out_of_bounds_leaves_graph_unchanged() {
        let mut graph = Graph::new(4, 2);
        graph.add_edge(0, 1, 0).expect("edge in range");

        for (from, to, label) in [(4, 0, 0), (0, 4, 0), (0, 1, 2)] {
            let err = graph.add_edge(from, to, label).expect_err("edge out of range");
            match err {
                GraphError::EdgeOutOfBounds {
                    from: f,
                    to: t,
                    label: l,
                    ..
                } => assert_eq!((f, t, l), (from, to, label)),
                other => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_duplicate_edges_are_kept() {
        let mut graph = Graph::new(3, 1);
        graph.add_edge(0, 1, 0).expect("edge in range");
        graph.add_edge(0, 1, 0).expect("edge in range");
        graph.add_edge(1, 2, 0).expect("edge in range");

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.distinct_edge_count(), 2);
    }
}
