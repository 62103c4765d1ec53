//! 统一错误处理系统
//!
//! ## 设计理念
//!
//! 1. **分层定义**：图加载、查询、执行、配置各自一个错误枚举
//! 2. **自动转换**：`RpqError` 通过 `#[from]` 聚合各层错误，调用方用 `?` 传播
//! 3. **作用域**：加载错误使整个加载失败；查询与执行错误只影响单个查询，
//!    出错的查询不会写入任何缓存

use thiserror::Error;

use crate::core::types::{LabelId, VertexId};

/// 统一的引擎错误类型
#[derive(Error, Debug)]
pub enum RpqError {
    #[error("图错误: {0}")]
    Graph(#[from] GraphError),

    #[error("查询错误: {0}")]
    Query(#[from] QueryError),

    #[error("执行错误: {0}")]
    Execution(#[from] ExecutionError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 统一的结果类型
pub type RpqResult<T> = Result<T, RpqError>;

/// 图存储与加载错误
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("边数据越界: ({from},{to},{label})，顶点数 {vertices}，标签数 {labels}")]
    EdgeOutOfBounds {
        from: VertexId,
        to: VertexId,
        label: LabelId,
        vertices: u32,
        labels: u32,
    },

    #[error("无效的图文件头: {0}")]
    InvalidHeader(String),

    #[error("第 {line} 行边数据无效: {content:?}")]
    InvalidEdgeLine { line: usize, content: String },

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 查询层错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("解析错误 (位置 {position}): {message}")]
    Parse { position: usize, message: String },

    #[error("未知标签 {label}，图中标签数为 {labels}")]
    UnknownLabel { label: LabelId, labels: u32 },

    #[error("空的步骤序列")]
    EmptyPath,
}

/// 执行层错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("任务在产生结果前被取消")]
    JobCancelled,

    #[error("线程池已关闭")]
    PoolShutDown,

    #[error("工作线程 {id} 启动失败: {message}")]
    WorkerSpawn { id: usize, message: String },
}

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML 解析错误: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("TOML 序列化错误: {0}")]
    Encode(#[from] toml::ser::Error),
}
