//! Logging configuration from environment variables

use std::path::PathBuf;

use lib_utils::get_env_or;

pub const DEFAULT_LOG_FILTER: &str = "explorer=info,warn";
pub const LOG_FILE_NAME: &str = "explorer.log";

#[derive(Debug, Clone, PartialEq)]
pub struct DebugConfig {
    /// Directory for rotated log files
    pub log_dir: PathBuf,
    /// Filter directives (e.g. "explorer=debug,info")
    pub log_level: String,
    /// Echo log lines to stderr as well
    pub log_to_stderr: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            log_level: DEFAULT_LOG_FILTER.to_string(),
            log_to_stderr: false,
        }
    }
}

impl DebugConfig {
    pub fn from_env() -> Self {
        Self {
            log_dir: PathBuf::from(get_env_or("EXPLORER_LOG_DIR", "logs")),
            log_level: get_env_or("RUST_LOG", DEFAULT_LOG_FILTER),
            log_to_stderr: get_env_or("EXPLORER_LOG_STDERR", "0") == "1",
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.log_level.contains("debug") || self.log_level.contains("trace")
    }
}
