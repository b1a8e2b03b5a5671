//! # dutycall-twilio
//!
//! Twilio delivery for dutycall alerts.
//!
//! - [`SmsDispatcher`] texts everyone interested in a service on every status change.
//! - [`EscalationController`] calls the on-call contacts one by one when a service goes
//!   CRITICAL, until a human answers. Each call is watched by [`CallPoller`].
//! - [`TwilioClient`] talks to the Twilio REST API; everything else only depends on
//!   the [`TelephonyProvider`] trait.
//! - [`TwilioPhoneCall`] and [`TwilioSms`] wire the above into the dashboard's
//!   [`AlertPlugin`](dutycall_alert_core::AlertPlugin) interface.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dutycall_alert_core::{AlertPlugin, Service, ServiceStatus, SiteUrl, StatusChange, UserDataStore, UserId};
//! use dutycall_twilio::TwilioPhoneCall;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(UserDataStore::new());
//! store.save(UserId::new("primary"), Some("+15551112345"))?;
//! store.save(UserId::new("fallback"), Some("15559994242"))?;
//!
//! let event = StatusChange::new(
//!     Service::new(2194, "checkout", ServiceStatus::Critical),
//!     ServiceStatus::Passing,
//!     SiteUrl::new("https", "status.example.com"),
//! );
//!
//! // Reads TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_OUTGOING_NUMBER
//! let plugin = TwilioPhoneCall::new(store);
//! plugin
//!     .send_alert(&event, &[], &[UserId::new("primary"), UserId::new("fallback")])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod config;
pub mod provider;
pub mod client;
pub mod twiml;
pub mod timer;
pub mod poller;
pub mod escalation;
pub mod dispatch;
pub mod plugin;

pub use error::{Result, TwilioError};
pub use config::{PollPolicy, TwilioConfig};
pub use provider::{
    AnsweredBy, CallAttempt, CallRequest, CallStatus, HttpMethod, MachineDetection,
    MessageReceipt, MessageRequest, TelephonyProvider,
};
pub use client::TwilioClient;
pub use timer::{Timer, TokioTimer};
pub use poller::{CallPoller, CallResolution, PollOutcome};
pub use escalation::{AttemptRecord, EscalationController, EscalationReport};
pub use dispatch::{DispatchReport, SmsDispatcher};
pub use plugin::{ProviderConnector, RestConnector, TwilioPhoneCall, TwilioSms};
