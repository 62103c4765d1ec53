use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rpqdb::config::Config;
use rpqdb::core::CardStat;
use rpqdb::graph::load_graph;
use rpqdb::query::{parse_query, CardinalityEstimator, Evaluator};
use rpqdb::utils::logging;

#[derive(Parser)]
#[clap(version = "0.1.0", author = "RPQDB Contributors")]
enum Cli {
    /// Print statistics of a graph file
    Stats {
        #[clap(short, long)]
        graph: PathBuf,
    },
    /// Estimate, plan and evaluate path queries
    Query {
        #[clap(short, long)]
        graph: PathBuf,
        #[clap(short, long)]
        config: Option<PathBuf>,
        /// File with one query per line
        #[clap(long)]
        queries: Option<PathBuf>,
        /// Execute queries as written without re-planning
        #[clap(long)]
        no_estimator: bool,
        /// Evaluate on the calling thread only
        #[clap(long)]
        sequential: bool,
        /// Emit one JSON object per query
        #[clap(long)]
        json: bool,
        query: Vec<String>,
    },
}

#[derive(Serialize)]
struct QueryReport {
    query: String,
    plan: String,
    estimate: Option<CardStat>,
    actual: CardStat,
    estimate_ms: f64,
    evaluate_ms: f64,
}

#[derive(Serialize)]
struct GraphReport {
    vertices: u32,
    labels: u32,
    edges: u64,
    distinct_edges: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli {
        Cli::Stats { graph } => {
            let config = Config::default();
            init_logging(&config)?;
            let result = run_stats(&graph);
            logging::shutdown();
            result
        }
        Cli::Query {
            graph,
            config,
            queries,
            no_estimator,
            sequential,
            json,
            query,
        } => {
            let mut config = match config {
                Some(path) => Config::load(&path)
                    .with_context(|| format!("无法加载配置文件 {}", path.display()))?,
                None => Config::default(),
            };
            if no_estimator {
                config.evaluator.use_estimator = false;
            }
            if sequential {
                config.evaluator.parallel = false;
            }
            init_logging(&config)?;

            let mut texts = query;
            if let Some(path) = queries {
                texts.extend(read_queries(&path)?);
            }
            let result = run_queries(&graph, &config, &texts, json);
            logging::shutdown();
            result
        }
    }
}

fn init_logging(config: &Config) -> Result<()> {
    logging::init(config).map_err(|e| anyhow::anyhow!("日志初始化失败: {}", e))
}

fn run_stats(path: &Path) -> Result<()> {
    let graph = load_graph(path)?;
    let report = GraphReport {
        vertices: graph.vertex_count(),
        labels: graph.label_count(),
        edges: graph.edge_count(),
        distinct_edges: graph.distinct_edge_count(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_queries(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("无法读取查询文件 {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

fn run_queries(path: &Path, config: &Config, texts: &[String], json: bool) -> Result<()> {
    let graph = Arc::new(load_graph(path)?);
    let mut evaluator = Evaluator::with_config(graph.clone(), config.evaluator.clone())?;

    let estimator = if config.evaluator.use_estimator {
        let estimator = Arc::new(CardinalityEstimator::with_config(graph, config.estimator.clone()));
        let started = Instant::now();
        estimator.prepare();
        log::info!("估算器准备完成，耗时 {:?}", started.elapsed());
        evaluator.attach_estimator(estimator.clone());
        Some(estimator)
    } else {
        None
    };

    for text in texts {
        let tree = parse_query(text).with_context(|| format!("无法解析查询 {}", text))?;
        let path = tree.flatten();

        let started = Instant::now();
        let estimate = estimator.as_ref().map(|e| e.estimate(&path));
        let estimate_ms = started.elapsed().as_secs_f64() * 1000.0;

        let plan = evaluator.explain(&tree)?;
        let started = Instant::now();
        let actual = evaluator.evaluate(&tree)?;
        let evaluate_ms = started.elapsed().as_secs_f64() * 1000.0;

        let report = QueryReport {
            query: tree.to_string(),
            plan: plan.to_string(),
            estimate,
            actual,
            estimate_ms,
            evaluate_ms,
        };

        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("query:    {}", report.query);
            println!("plan:     {}", report.plan);
            if let Some(estimate) = report.estimate {
                println!("estimate: {} ({:.3} ms)", estimate, report.estimate_ms);
            }
            println!("actual:   {} ({:.3} ms)", report.actual, report.evaluate_ms);
        }
    }

    let cache = evaluator.cache_stats();
    log::info!(
        "缓存统计: 结果 {} 条 命中率 {:.2}，统计 {} 条 命中率 {:.2}",
        cache.results.entries,
        cache.results.hit_rate,
        cache.stats.entries,
        cache.stats.hit_rate
    );
    Ok(())
}
