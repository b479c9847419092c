#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutodevError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config key '{0}'")]
    InvalidConfigKey(String),

    #[error("invalid config value for '{key}': {msg}")]
    InvalidConfigValue { key: String, msg: String },

    #[error("invalid task status '{0}' (use todo|in-progress|completed)")]
    InvalidStatus(String),

    #[error("invalid task priority '{0}' (use low|medium|high)")]
    InvalidPriority(String),

    #[error("no task with id '{0}'")]
    TaskNotFound(String),

    #[error("io error at {path}: {source}")]
    IoPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
