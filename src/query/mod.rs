//! 查询模块
//!
//! 完整的查询处理流程：
//! - 将查询字符串解析为查询树
//! - 估算基数并生成执行计划
//! - 执行计划并计算结果统计

pub mod ast;
pub mod executor;
pub mod optimizer;
pub mod parser;

pub use ast::QueryTree;
pub use executor::{Evaluator, EvaluatorConfig, Intermediate};
pub use optimizer::{CardinalityEstimator, EstimatorConfig, PlanOptimizer};
pub use parser::parse_query;
