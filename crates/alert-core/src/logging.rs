//! Log output for processes running the alert plugins
//!
//! Settings are read from the `DUTYCALL_LOG_*` environment, the same way provider
//! crates read their credentials.
//!
//! | Variable | Default | |
//! |---|---|---|
//! | `DUTYCALL_LOG_LEVEL` | `info` | any `EnvFilter` directive, e.g. `info,dutycall_twilio=debug` |
//! | `DUTYCALL_LOG_FORMAT` | `text` | `text` or `json` |
//! | `DUTYCALL_LOG_FILE_INFO` | `false` | include source file and line |

use serde::Deserialize;
use std::collections::HashMap;
use tracing::Dispatch;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::EnvFilter;

use crate::error::{AlertError, Result};

pub const LOG_ENV_PREFIX: &str = "DUTYCALL_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Line format of emitted events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogSettings {
    /// Filter directives
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub file_info: bool,
}

fn default_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            file_info: false,
        }
    }
}

impl LogSettings {
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::with_prefix(LOG_ENV_PREFIX))
    }

    /// Load settings from an explicit set of `DUTYCALL_LOG_*` variables
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::load(config::Environment::with_prefix(LOG_ENV_PREFIX).source(Some(vars.into_iter().collect())))
    }

    fn load(source: config::Environment) -> Result<Self> {
        let settings: LogSettings = config::Config::builder()
            .add_source(source)
            .build()
            .and_then(|loaded| loaded.try_deserialize())
            .map_err(|e| AlertError::config(format!("Failed to load log settings: {}", e)))?;
        settings.filter()?;
        Ok(settings)
    }

    pub fn filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.level)
            .map_err(|e| AlertError::config(format!("Invalid DUTYCALL_LOG_LEVEL '{}': {}", self.level, e)))
    }

    /// Build a subscriber writing to `writer`, without installing it
    pub fn dispatch<W>(&self, writer: W) -> Result<Dispatch>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let builder = fmt::Subscriber::builder()
            .with_env_filter(self.filter()?)
            .with_writer(writer)
            .with_file(self.file_info)
            .with_line_number(self.file_info);

        Ok(match self.format {
            LogFormat::Json => Dispatch::new(builder.json().finish()),
            LogFormat::Text => Dispatch::new(builder.finish()),
        })
    }
}

/// Install the process-wide subscriber, writing to stderr.
///
/// Fails if one is already installed.
pub fn init_logging(settings: &LogSettings) -> Result<()> {
    let dispatch = settings.dispatch(std::io::stderr)?;
    tracing::dispatcher::set_global_default(dispatch)
        .map_err(|e| AlertError::config(format!("Failed to install logger: {}", e)))?;

    tracing::info!(level = %settings.level, format = ?settings.format, "Logging initialized");
    Ok(())
}
