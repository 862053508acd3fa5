use crate::config::LoggingConfig;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Route tracing output to a file in `dir`; the terminal belongs to the UI.
///
/// The returned guard flushes buffered lines on drop and must outlive the app.
pub fn init(config: &LoggingConfig, dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, &config.file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // a second init in the same process keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(guard)
}

pub fn log_file_path(config: &LoggingConfig, dir: &Path) -> PathBuf {
    dir.join(&config.file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_init_creates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("logs");
        let config = LoggingConfig::default();
        let guard = init(&config, &dir).unwrap();
        tracing::info!("Test log message");
        drop(guard);
        assert!(dir.is_dir());
        assert_eq!(log_file_path(&config, &dir), dir.join("exam-prep.log"));
    }

    #[test]
    fn test_logger_init_twice() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig::default();
        let _first = init(&config, temp_dir.path()).unwrap();
        let _second = init(&config, temp_dir.path()).unwrap();
    }
}
