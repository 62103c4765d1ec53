//! RPQDB - Regular path query engine over edge-labeled graphs
//!
//! Given a query written as a concatenation of labeled, directed edge steps,
//! this crate estimates the result cardinality, chooses a low-cost join plan
//! from that estimate and evaluates the plan to exact result statistics.
//!
//! ```
//! use std::sync::Arc;
//! use rpqdb::graph::Graph;
//! use rpqdb::query::{parse_query, CardinalityEstimator, Evaluator};
//!
//! let mut graph = Graph::new(4, 2);
//! graph.add_edge(0, 1, 0).unwrap();
//! graph.add_edge(1, 2, 0).unwrap();
//! graph.add_edge(2, 3, 0).unwrap();
//! graph.add_edge(0, 3, 1).unwrap();
//! let graph = Arc::new(graph);
//!
//! let mut evaluator = Evaluator::new(graph.clone()).unwrap();
//! evaluator.attach_estimator(Arc::new(CardinalityEstimator::new(graph)));
//! evaluator.prepare();
//!
//! let stats = evaluator.evaluate(&parse_query("0+").unwrap()).unwrap();
//! assert_eq!((stats.no_out, stats.no_paths, stats.no_in), (3, 3, 3));
//! ```

pub mod common;
pub mod config;
pub mod core;
pub mod graph;
pub mod query;
pub mod utils;

pub use crate::core::{CardStat, RpqError, RpqResult, Step, StepPath};
pub use crate::graph::Graph;
pub use crate::query::{parse_query, CardinalityEstimator, Evaluator, QueryTree};
