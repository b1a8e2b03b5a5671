//! Alert plugin interface
//!
//! The dashboard hands every status transition of a service to each plugin attached to
//! it, together with the users subscribed to the service and the people currently on
//! duty. Duty officers are ordered by priority: primary first, then fallbacks.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{StatusChange, UserId};

#[async_trait]
pub trait AlertPlugin: Send + Sync {
    /// Display name, unique among plugins
    fn name(&self) -> &'static str;

    fn author(&self) -> &'static str;

    /// Deliver the alert for one status transition
    async fn send_alert(
        &self,
        event: &StatusChange,
        users: &[UserId],
        duty_officers: &[UserId],
    ) -> Result<()>;
}
