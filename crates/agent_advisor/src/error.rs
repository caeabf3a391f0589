use thiserror::Error;

/// Failure of a single environment query. Never fatal for a tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("agent not found: {agent_id}")]
    AgentNotFound { agent_id: String },

    #[error("{what} is not supported by this environment")]
    Unsupported { what: &'static str },

    #[error("{what} unavailable: {message}")]
    Unavailable { what: &'static str, message: String },

    #[error("query failed: {0}")]
    Query(String),
}

impl EnvError {
    /// Unsupported queries degrade silently and are not counted as errors.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, EnvError::Unsupported { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("read config file failed ({path}): {message}")]
    ReadConfigFile { path: String, message: String },

    #[error("parse config file failed ({path}): {message}")]
    ParseConfigFile { path: String, message: String },

    #[error("invalid value for {key}: {value}")]
    InvalidEnvValue { key: &'static str, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}
