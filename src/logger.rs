use std::sync::atomic::{AtomicU8, Ordering};

const LEVEL_ERROR: u8 = 0;
const LEVEL_WARN: u8 = 1;
const LEVEL_INFO: u8 = 2;
const LEVEL_DEBUG: u8 = 3;

/// Process-wide log threshold; messages above it are dropped
static LEVEL: AtomicU8 = AtomicU8::new(LEVEL_INFO);

/// Simple logger for campus-pay
pub struct Logger;

impl Logger {
    /// Set the threshold from a config log level ("error", "warn", "info",
    /// "debug"); unknown values fall back to "info"
    pub fn set_level(level: &str) {
        LEVEL.store(Self::threshold(level), Ordering::Relaxed);
    }

    fn threshold(level: &str) -> u8 {
        match level {
            "error" => LEVEL_ERROR,
            "warn" => LEVEL_WARN,
            "debug" => LEVEL_DEBUG,
            _ => LEVEL_INFO,
        }
    }

    fn enabled(level: u8) -> bool {
        LEVEL.load(Ordering::Relaxed) >= level
    }

    pub fn info(msg: &str) {
        if Self::enabled(LEVEL_INFO) {
            println!("[INFO] {}", msg);
        }
    }

    pub fn debug(msg: &str) {
        if Self::enabled(LEVEL_DEBUG) {
            println!("[DEBUG] {}", msg);
        }
    }

    pub fn warn(msg: &str) {
        if Self::enabled(LEVEL_WARN) {
            eprintln!("[WARN] {}", msg);
        }
    }

    pub fn error(msg: &str) {
        if Self::enabled(LEVEL_ERROR) {
            eprintln!("[ERROR] {}", msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_parsing() {
        assert_eq!(Logger::threshold("error"), LEVEL_ERROR);
        assert_eq!(Logger::threshold("warn"), LEVEL_WARN);
        assert_eq!(Logger::threshold("info"), LEVEL_INFO);
        assert_eq!(Logger::threshold("debug"), LEVEL_DEBUG);
        // Unknown values fall back to info
        assert_eq!(Logger::threshold("verbose"), LEVEL_INFO);
    }

    #[test]
    fn test_level_ordering() {
        assert!(LEVEL_ERROR < LEVEL_WARN);
        assert!(LEVEL_WARN < LEVEL_INFO);
        assert!(LEVEL_INFO < LEVEL_DEBUG);
    }
}
