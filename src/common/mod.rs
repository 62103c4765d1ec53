//! 通用基础设施模块
//!
//! 目前包含固定大小的工作线程池及其任务句柄

pub mod thread;

pub use thread::{JobHandle, ThreadPool};
