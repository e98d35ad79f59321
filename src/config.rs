// Invoker configuration, loadable from RON

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Options for an invoker
///
/// ```text
/// (
///     max_history: Some(100),
///     log_commands: true,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokerConfig {
    /// Maximum number of commands kept on the undo stack (None = unbounded)
    pub max_history: Option<usize>,
    /// Log every executed, undone and redone command at debug level
    pub log_commands: bool,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            max_history: None,
            log_commands: true,
        }
    }
}

impl InvokerConfig {
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = Some(max_history);
        self
    }

    pub fn with_log_commands(mut self, log_commands: bool) -> Self {
        self.log_commands = log_commands;
        self
    }

    /// Parse a configuration from RON text; missing fields take defaults
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: InvokerConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history == Some(0) {
            return Err(ConfigError::Invalid(
                "max_history must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
