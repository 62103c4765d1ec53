//! 图存储模块
//!
//! - `store`: 按标签分组的不可变多重图
//! - `loader`: 文本格式图文件加载

pub mod loader;
pub mod store;

pub use loader::{load_graph, read_graph, GraphHeader};
pub use store::Graph;
