//! Configuration error types.

use thiserror::Error;

/// Result type alias for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Precondition violations detected before a simulation starts.
///
/// These are the only failures the system models: once a configuration
/// validates, every simulation operation is total.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("initial server count must be at least 1, got {0}")]
    NoServers(i64),

    #[error("total clients must not be negative, got {0}")]
    NegativeClients(i64),

    #[error("max load threshold must not be negative, got {0}")]
    NegativeThreshold(i64),

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },
}
