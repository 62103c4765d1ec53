// 日志工具模块
//
// 封装 flexi_logger 的初始化和关闭操作，确保异步日志正确 flush

use crate::config::Config;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::sync::Mutex;

/// 全局日志句柄，用于程序退出时 flush
static LOGGER_HANDLE: Mutex<Option<LoggerHandle>> = Mutex::new(None);

/// 初始化日志系统
///
/// `to_file` 为 false 时只输出到标准错误；否则写入按大小轮转的日志文件，
/// `console` 为 true 时同时复制到标准错误。
///
/// # Examples
/// ```no_run
/// use rpqdb::config::Config;
/// use rpqdb::utils::logging;
///
/// let config = Config::default();
/// logging::init(&config).expect("日志初始化失败");
/// ```
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let log = &config.log;
    let logger = Logger::try_with_str(&log.level)?;

    let handle = if log.to_file {
        let duplicate = if log.console { Duplicate::All } else { Duplicate::None };
        logger
            .log_to_file(FileSpec::default().basename(&log.file).directory(&log.dir))
            .rotate(
                Criterion::Size(log.max_file_size),
                Naming::Numbers,
                Cleanup::KeepLogFiles(log.max_files),
            )
            .write_mode(WriteMode::Async)
            .duplicate_to_stderr(duplicate)
            .append()
            .start()?
    } else {
        logger.log_to_stderr().start()?
    };

    // 保存句柄供后续 flush 使用
    if let Ok(mut guard) = LOGGER_HANDLE.lock() {
        *guard = Some(handle);
    }

    if log.to_file {
        log::info!("日志系统初始化完成: {}/{}", log.dir, log.file);
    } else {
        log::info!("日志系统初始化完成: stderr");
    }
    Ok(())
}

/// 刷新并关闭日志系统
///
/// 在程序退出前调用，确保所有异步日志都已写入文件
pub fn shutdown() {
    if let Ok(mut guard) = LOGGER_HANDLE.lock() {
        if let Some(handle) = guard.take() {
            handle.flush();
        }
    }
}

/// 检查日志系统是否已初始化
pub fn is_initialized() -> bool {
    LOGGER_HANDLE
        .lock()
        .map(|guard| guard.is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_logging_init_and_shutdown() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let mut config = Config::default();
        config.log.to_file = true;
        config.log.dir = dir.path().to_string_lossy().into_owned();

        let result = init(&config);
        assert!(result.is_ok(), "日志初始化失败: {:?}", result.err());
        assert!(is_initialized());

        log::info!("测试日志消息");

        shutdown();
        assert!(!is_initialized());
    }
}
