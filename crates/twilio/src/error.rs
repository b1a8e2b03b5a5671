//! Error types for Twilio delivery

use dutycall_alert_core::AlertError;
use thiserror::Error;

/// Errors raised while talking to Twilio or driving an escalation
#[derive(Debug, Error)]
pub enum TwilioError {
    /// Missing or malformed credentials and settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure reaching the API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Twilio API error (HTTP {status}, code {code:?}): {message}")]
    Api {
        status: u16,
        code: Option<u32>,
        message: String,
    },

    /// The API answered with a body we could not understand
    #[error("Failed to decode Twilio response: {0}")]
    Decode(String),

    /// A freshly placed call was not queued
    #[error("Call {sid} started in unexpected state '{status}'")]
    UnexpectedCallState { sid: String, status: String },

    /// TwiML document could not be built
    #[error("TwiML error: {0}")]
    Twiml(String),

    /// Errors from the shared alert model
    #[error(transparent)]
    Core(#[from] AlertError),
}

impl TwilioError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Whether the failure came from the provider rather than local setup
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            TwilioError::Http(_)
                | TwilioError::Api { .. }
                | TwilioError::Decode(_)
                | TwilioError::UnexpectedCallState { .. }
        )
    }

    /// Convert into the error type shared by all alert plugins
    pub fn into_alert_error(self, plugin: &str) -> AlertError {
        match self {
            TwilioError::Core(inner) => inner,
            other => AlertError::plugin(plugin, other),
        }
    }
}

/// Result type for Twilio operations
pub type Result<T> = std::result::Result<T, TwilioError>;
