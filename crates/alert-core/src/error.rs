//! Error types for alert-core

use thiserror::Error;

/// Errors raised while preparing or delivering an alert
#[derive(Debug, Error)]
pub enum AlertError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Message template could not be rendered
    #[error("Render error: {0}")]
    Render(String),

    /// A phone number that cannot be stored
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// A delivery plugin failed
    #[error("Plugin '{plugin}' failed: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl AlertError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a render error
    pub fn render<S: Into<String>>(msg: S) -> Self {
        Self::Render(msg.into())
    }

    /// Wrap a plugin-specific failure
    pub fn plugin<S, E>(plugin: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Plugin {
            plugin: plugin.into(),
            source: Box::new(source),
        }
    }
}

/// Result type for alert-core operations
pub type Result<T> = std::result::Result<T, AlertError>;
