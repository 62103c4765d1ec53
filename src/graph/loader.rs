//! 图文件加载
//!
//! 文件格式：
//! - 首行文件头 `"<V>,<E>,<L>"`
//! - 之后每行一条边 `"<from> <label> <to> ."`
//!
//! 任何一行格式错误或越界都会使整个加载失败，不暴露部分构建的图。
//! 文件头中的 E 只作为容量提示。

use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;

use crate::core::error::GraphError;
use crate::graph::store::Graph;

static EDGE_LINE: OnceLock<Regex> = OnceLock::new();

fn edge_line_pattern() -> &'static Regex {
    EDGE_LINE.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s+(\d+)\s+(\d+)\s*\.?\s*$").expect("edge line pattern is valid")
    })
}

/// 图文件头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphHeader {
    pub vertices: u32,
    pub edges: u64,
    pub labels: u32,
}

impl GraphHeader {
    /// 解析 `"<V>,<E>,<L>"`
    pub fn parse(line: &str) -> Result<Self, GraphError> {
        let invalid = || GraphError::InvalidHeader(line.trim().to_string());

        let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(invalid());
        }

        Ok(Self {
            vertices: fields[0].parse().map_err(|_| invalid())?,
            edges: fields[1].parse().map_err(|_| invalid())?,
            labels: fields[2].parse().map_err(|_| invalid())?,
        })
    }
}

/// 从文件加载图
pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<Graph, GraphError> {
    let path = path.as_ref();
    let started = Instant::now();
    let file = File::open(path)?;
    let graph = read_graph(BufReader::new(file))?;

    log::info!(
        "图加载完成: {}，{} 个顶点，{} 条边，{} 个标签，耗时 {:?}",
        path.display(),
        graph.vertex_count(),
        graph.edge_count(),
        graph.label_count(),
        started.elapsed()
    );
    Ok(graph)
}

/// 从任意按行读取的输入构建图
pub fn read_graph<R: BufRead>(reader: R) -> Result<Graph, GraphError> {
    let mut lines = reader.lines();

    let header_line = match lines.next() {
        Some(line) => line?,
        None => return Err(GraphError::InvalidHeader(String::new())),
    };
    let header = GraphHeader::parse(&header_line)?;
    log::debug!("图文件头: {:?}", header);

    let mut graph = Graph::new(header.vertices, header.labels);

    for (index, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        // 文件头占第 1 行
        let line_no = index + 2;
        let (from, label, to) = parse_edge_line(&line).ok_or_else(|| GraphError::InvalidEdgeLine {
            line: line_no,
            content: line.clone(),
        })?;
        graph.add_edge(from, to, label)?;
    }

    if graph.edge_count() != header.edges {
        log::warn!(
            "文件头声明 {} 条边，实际读取 {} 条",
            header.edges,
            graph.edge_count()
        );
    }

    Ok(graph)
}

/// 解析一行边数据，返回 (from, label, to)
fn parse_edge_line(line: &str) -> Option<(u32, u32, u32)> {
    let captures = edge_line_pattern().captures(line)?;
    let from = captures.get(1)?.as_str().parse().ok()?;
    let label = captures.get(2)?.as_str().parse().ok()?;
    let to = captures.get(3)?.as_str().parse().ok()?;
    Some((from, label, to))
}
