//! Error types for Ember

use thiserror::Error;

/// The main error type for Ember operations
#[derive(Debug, Error)]
pub enum EmberError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Capacity growth from {current} to {requested} failed: {reason}")]
    CapacityGrowth {
        current: usize,
        requested: usize,
        reason: String,
    },

    #[error("Requested capacity {requested} exceeds the maximum of {max}")]
    CapacityLimit { requested: usize, max: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Serialization error: {0}")]
    SerializeError(String),
}

/// Result type alias for Ember operations
pub type Result<T> = std::result::Result<T, EmberError>;

impl From<toml::de::Error> for EmberError {
    fn from(err: toml::de::Error) -> Self {
        EmberError::TomlParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_growth_message_names_both_sizes() {
        let err = EmberError::CapacityGrowth {
            current: 64,
            requested: 128,
            reason: "out of memory".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("64"));
        assert!(msg.contains("128"));
        assert!(msg.contains("out of memory"));
    }

    #[test]
    fn toml_error_converts() {
        let parsed: std::result::Result<toml::Table, _> = toml::from_str("rate = ");
        let err: EmberError = parsed.unwrap_err().into();
        assert!(matches!(err, EmberError::TomlParseError(_)));
    }
}
