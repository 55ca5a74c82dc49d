use crate::errors::{Error, Result};
use log::{debug, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::{Config, Handle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

const LOG_FORMAT_CONSOLE: &str = "\x1B[37m{d(%Y-%m-%d %H:%M:%S%.3f)}\x1B[0m {h({l:>5.5})} \x1B[37m---\x1B[0m \x1B[37m[{T:>15.15}]\x1B[0m \x1B[36m{t:<40.40}\x1B[0m \x1B[37m:\x1B[0m {m}{n}";
const LOG_FORMAT_FILE: &str =
    "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:>5.5} --- [{T:>15.15}] {t:<40.40} : {m}{n}";
const CONSOLE_APPENDER: &str = "stdout";
const FILE_APPENDER: &str = "file";
const LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;
const LOG_FILE_WINDOW: u32 = 3;
/// The dependencies which are too verbose below the info level.
const QUIET_LOGGERS: &[&str] = &["fx_callback", "hyper", "hyper_util", "mio", "tower"];

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// The `log4rs` logger of the stream application.
#[derive(Debug)]
pub struct StreamLogger {
    handle: Handle,
}

impl StreamLogger {
    pub fn builder() -> StreamLoggerBuilder {
        StreamLoggerBuilder::default()
    }

    fn new(root_level: LevelFilter, log_path: Option<PathBuf>) -> Result<Self> {
        if INITIALIZED.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyInitialized);
        }

        let config = Self::create_config(root_level, log_path.as_deref())?;
        let handle =
            log4rs::init_config(config).map_err(|e| Error::InvalidLogConfig(e.to_string()))?;
        debug!("Stream logger has been initialized at level {}", root_level);
        Ok(Self { handle })
    }

    /// Returns the root logging level of the logger.
    pub fn root_log_level(&self) -> LevelFilter {
        self.handle.max_log_level()
    }

    fn create_config(root_level: LevelFilter, log_path: Option<&Path>) -> Result<Config> {
        let mut root = Root::builder().appender(CONSOLE_APPENDER);
        let mut config_builder = Config::builder().appender(Appender::builder().build(
            CONSOLE_APPENDER,
            Box::new(
                ConsoleAppender::builder()
                    .encoder(Box::new(PatternEncoder::new(LOG_FORMAT_CONSOLE)))
                    .build(),
            ),
        ));

        if let Some(path) = log_path {
            config_builder = config_builder.appender(Self::create_file_appender(path)?);
            root = root.appender(FILE_APPENDER);
        }

        for logger in QUIET_LOGGERS {
            config_builder = config_builder.logger(
                Logger::builder().build(*logger, root_level.min(LevelFilter::Info)),
            );
        }

        config_builder
            .build(root.build(root_level))
            .map_err(|e| Error::InvalidLogConfig(e.to_string()))
    }

    fn create_file_appender(path: &Path) -> Result<Appender> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let roller_pattern = format!("{}.{{}}", path.display());
        let roller = FixedWindowRoller::builder()
            .base(1)
            .build(roller_pattern.as_str(), LOG_FILE_WINDOW)
            .map_err(|e| Error::InvalidLogConfig(e.to_string()))?;
        let policy = CompoundPolicy::new(
            Box::new(SizeTrigger::new(LOG_FILE_SIZE)),
            Box::new(roller),
        );

        Ok(Appender::builder().build(
            FILE_APPENDER,
            Box::new(
                RollingFileAppender::builder()
                    .encoder(Box::new(PatternEncoder::new(LOG_FORMAT_FILE)))
                    .append(true)
                    .build(path, Box::new(policy))
                    .map_err(|e| Error::InvalidLogConfig(e.to_string()))?,
            ),
        ))
    }
}

#[derive(Debug, Default)]
pub struct StreamLoggerBuilder {
    root_level: Option<LevelFilter>,
    log_path: Option<PathBuf>,
}

impl StreamLoggerBuilder {
    /// Set the root level of the logger.
    pub fn root_level(&mut self, level: LevelFilter) -> &mut Self {
        self.root_level = Some(level);
        self
    }

    /// Set the rolling log file of the logger.
    /// Only the console is logged to when no file has been set.
    pub fn log_path<P: AsRef<Path>>(&mut self, path: Option<P>) -> &mut Self {
        self.log_path = path.map(|e| e.as_ref().to_path_buf());
        self
    }

    pub fn build(&mut self) -> Result<StreamLogger> {
        let root_level = self.root_level.take().unwrap_or(LevelFilter::Info);

        StreamLogger::new(root_level, self.log_path.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_config_without_file() {
        let result = StreamLogger::create_config(LevelFilter::Debug, None).unwrap();

        assert_eq!(1, result.appenders().len());
        assert_eq!(LevelFilter::Debug, result.root().level());
    }

    #[test]
    fn test_create_config_quiets_dependencies() {
        let result = StreamLogger::create_config(LevelFilter::Trace, None).unwrap();

        let hyper = result
            .loggers()
            .iter()
            .find(|e| e.name() == "hyper")
            .expect("expected the hyper logger to be configured");
        assert_eq!(LevelFilter::Info, hyper.level());
    }

    #[test]
    fn test_build() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("logs").join("stream.log");

        let logger = StreamLogger::builder()
            .root_level(LevelFilter::Trace)
            .log_path(Some(&log_path))
            .build()
            .expect("expected a logger");

        assert_eq!(LevelFilter::Trace, logger.root_log_level());
        assert!(log_path.exists(), "expected the log file to have been created");

        let result = StreamLogger::builder()
            .build()
            .err()
            .expect("expected an error to have been returned");
        assert_eq!(Error::AlreadyInitialized, result);
    }
}
