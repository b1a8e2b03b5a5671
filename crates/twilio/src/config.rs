//! Configuration for Twilio delivery
//!
//! Credentials are read from the `TWILIO_*` environment once per alert run and then
//! passed explicitly to the client and the delivery components, so a rotated token is
//! picked up by the next run without a restart.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `TWILIO_ACCOUNT_SID` | yes | |
//! | `TWILIO_AUTH_TOKEN` | yes | |
//! | `TWILIO_OUTGOING_NUMBER` | yes | |
//! | `TWILIO_API_BASE_URL` | no | `https://api.twilio.com` |
//! | `TWILIO_TWIMLET_ECHO_URL` | no | `http://twimlets.com/echo` |
//! | `TWILIO_REQUEST_TIMEOUT_SECS` | no | `30` |

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::{Result, TwilioError};

pub const ENV_PREFIX: &str = "TWILIO";
pub const DEFAULT_API_BASE_URL: &str = "https://api.twilio.com";
pub const DEFAULT_TWIMLET_ECHO_URL: &str = "http://twimlets.com/echo";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Number of status polls after placing a call
pub const DEFAULT_MAX_POLLS: u32 = 5;
/// Wait before each status poll
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Account settings for one alert run
#[derive(Clone, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Twilio-registered number alerts are sent from
    pub outgoing_number: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_twimlet_echo_url")]
    pub twimlet_echo_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_twimlet_echo_url() -> String {
    DEFAULT_TWIMLET_ECHO_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl TwilioConfig {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        outgoing_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            outgoing_number: outgoing_number.into(),
            api_base_url: default_api_base_url(),
            twimlet_echo_url: default_twimlet_echo_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from an explicit set of `TWILIO_*` variables
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX).source(Some(vars.into_iter().collect())))
    }

    fn load(source: config::Environment) -> Result<Self> {
        let loaded: TwilioConfig = config::Config::builder()
            .add_source(source)
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| TwilioError::config(format!("Failed to load Twilio settings: {}", e)))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that cannot reach the API
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("TWILIO_ACCOUNT_SID", &self.account_sid),
            ("TWILIO_AUTH_TOKEN", &self.auth_token),
            ("TWILIO_OUTGOING_NUMBER", &self.outgoing_number),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(TwilioError::config(format!("{} must not be empty", name)));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(TwilioError::config("TWILIO_REQUEST_TIMEOUT_SECS must be positive"));
        }
        url::Url::parse(&self.api_base_url)
            .map_err(|e| TwilioError::config(format!("Invalid API base URL {}: {}", self.api_base_url, e)))?;
        url::Url::parse(&self.twimlet_echo_url)
            .map_err(|e| TwilioError::config(format!("Invalid twimlet URL {}: {}", self.twimlet_echo_url, e)))?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("outgoing_number", &self.outgoing_number)
            .field("api_base_url", &self.api_base_url)
            .field("twimlet_echo_url", &self.twimlet_echo_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// How long to wait for a placed call to complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_polls: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_polls: DEFAULT_MAX_POLLS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
