use std::env;
use std::path::PathBuf;

/// Configuration for the campus-pay CLI tool
///
/// Single-process config: one data directory holding the operation log
/// and the latest ledger snapshot.
#[derive(Debug, Clone)]
pub struct Config {
    /// Data directory path (default: `.campus-pay/` in current directory)
    pub data_dir: PathBuf,

    /// Output format: "human" (default) or "json"
    pub output_format: String,

    /// Log level: "info", "debug", "warn", "error" (default: "info")
    pub log_level: String,
}

impl Config {
    /// Create a new config with defaults
    pub fn new() -> Self {
        let data_dir = env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".campus-pay");

        Config {
            data_dir,
            output_format: "human".to_string(),
            log_level: "info".to_string(),
        }
    }

    /// Create config with custom data directory
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Config {
            data_dir,
            ..Config::new()
        }
    }

    pub fn get_data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn set_data_dir(&mut self, dir: PathBuf) {
        self.data_dir = dir;
    }

    pub fn get_output_format(&self) -> &str {
        &self.output_format
    }

    /// Set output format ("human" or "json")
    pub fn set_output_format(&mut self, format: String) {
        self.output_format = format;
    }

    pub fn get_log_level(&self) -> &str {
        &self.log_level
    }

    pub fn set_log_level(&mut self, level: String) {
        self.log_level = level;
    }

    /// Get operation log path
    pub fn get_op_log_path(&self) -> PathBuf {
        self.data_dir.join("ops.log")
    }

    /// Get ledger snapshot path
    pub fn get_ledger_path(&self) -> PathBuf {
        self.data_dir.join("ledger.bin")
    }

    /// Load config from environment variables
    ///
    /// Environment variables:
    /// - `CAMPUS_PAY_DATA_DIR`: override data directory
    /// - `CAMPUS_PAY_OUTPUT_FORMAT`: "human" or "json"
    /// - `CAMPUS_PAY_LOG_LEVEL`: log level
    pub fn from_env() -> Self {
        let mut config = Config::new();

        if let Ok(dir) = env::var("CAMPUS_PAY_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(format) = env::var("CAMPUS_PAY_OUTPUT_FORMAT") {
            config.output_format = format;
        }

        if let Ok(level) = env::var("CAMPUS_PAY_LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}
