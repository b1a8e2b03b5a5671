//! # Alert-Core
//!
//! Shared building blocks for dutycall alert plugins.
//!
//! This crate provides:
//! - The service status model and the status-change event plugins react to
//! - Contacts with normalized phone numbers and the per-user plugin data store
//! - Message rendering for the voice script and the SMS body
//! - The [`AlertPlugin`] trait every delivery channel implements
//! - Log settings from `DUTYCALL_LOG_*` and the subscriber built from them
//!
//! ## Architecture
//!
//! Alert-Core knows nothing about any telephony provider. Provider crates such as
//! `dutycall-twilio` depend on it and plug into the dashboard through [`AlertPlugin`].

pub mod error;
pub mod types;
pub mod contact;
pub mod render;
pub mod plugin;
pub mod logging;

pub use error::{AlertError, Result};
pub use types::{Service, ServiceId, ServiceStatus, SiteUrl, StatusChange, UserId};
pub use contact::{Contact, PhoneNumber, UserData, UserDataStore};
pub use render::{render, MessageContext, MessageKind};
pub use plugin::AlertPlugin;
pub use logging::{init_logging, LogFormat, LogSettings};
