//! 核心模块
//!
//! 基础类型与统一错误定义

pub mod error;
pub mod types;

pub use error::{ConfigError, ExecutionError, GraphError, QueryError, RpqError, RpqResult};
pub use types::{CardStat, LabelId, PathSignature, Step, StepPath, VertexId};
