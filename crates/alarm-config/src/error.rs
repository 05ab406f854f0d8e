//! Configuration Error Types

use thiserror::Error;

/// Errors while loading or interpreting the alarm config file.
///
/// All of these are fatal: the run aborts before any gateway call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config source unreadable or not parseable as INI
    #[error("failed to read alarm config: {0}")]
    Read(#[from] config::ConfigError),

    /// A key with no default was absent
    #[error("section [{section}] is missing required key '{key}'")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },

    /// A present value failed to parse
    #[error("invalid value {value:?} for key '{key}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
