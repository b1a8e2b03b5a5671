//! Twilio alert plugins
//!
//! [`TwilioPhoneCall`] escalates CRITICAL services to the duty officers by voice call;
//! [`TwilioSms`] texts subscribers and duty officers about every status change. Both
//! read their credentials from the environment at the start of each run.

use async_trait::async_trait;
use dutycall_alert_core::{AlertPlugin, StatusChange, UserDataStore, UserId};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::client::TwilioClient;
use crate::config::{PollPolicy, TwilioConfig};
use crate::dispatch::SmsDispatcher;
use crate::error::Result;
use crate::escalation::EscalationController;
use crate::provider::TelephonyProvider;
use crate::timer::{Timer, TokioTimer};

pub const PHONE_CALL_PLUGIN_NAME: &str = "Twilio Phone Call";
pub const SMS_PLUGIN_NAME: &str = "Twilio SMS";
const PLUGIN_AUTHOR: &str = "DUTYCALL AUTHORS";

/// Builds the provider client for one run
pub trait ProviderConnector: Send + Sync {
    fn connect(&self, config: &TwilioConfig) -> Result<Box<dyn TelephonyProvider>>;
}

/// Connects to the Twilio REST API
#[derive(Debug, Clone, Copy, Default)]
pub struct RestConnector;

impl ProviderConnector for RestConnector {
    fn connect(&self, config: &TwilioConfig) -> Result<Box<dyn TelephonyProvider>> {
        Ok(Box::new(TwilioClient::new(config.clone())?))
    }
}

/// Read this run's settings and open the provider
fn open_provider(
    connector: &dyn ProviderConnector,
    plugin: &'static str,
) -> Result<(TwilioConfig, Box<dyn TelephonyProvider>)> {
    let opened = TwilioConfig::from_env().and_then(|config| {
        let provider = connector.connect(&config)?;
        Ok((config, provider))
    });
    if let Err(e) = &opened {
        error!(plugin, error = %e, "Failed to set up twilio client");
    }
    opened
}

/// Calls duty officers in order when a service goes CRITICAL
pub struct TwilioPhoneCall {
    user_data: Arc<UserDataStore>,
    connector: Arc<dyn ProviderConnector>,
    timer: Arc<dyn Timer>,
    policy: PollPolicy,
}

impl TwilioPhoneCall {
    pub fn new(user_data: Arc<UserDataStore>) -> Self {
        Self {
            user_data,
            connector: Arc::new(RestConnector),
            timer: Arc::new(TokioTimer),
            policy: PollPolicy::default(),
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn ProviderConnector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn run(&self, event: &StatusChange, duty_officers: &[UserId]) -> Result<()> {
        let (config, provider) = open_provider(self.connector.as_ref(), PHONE_CALL_PLUGIN_NAME)?;
        let contacts = self.user_data.contacts_for(duty_officers);

        let report = EscalationController::new(provider.as_ref(), self.timer.as_ref(), &config)
            .with_poll_policy(self.policy)
            .escalate(event, &contacts)
            .await?;

        info!(
            service_id = event.service.id,
            calls = report.calls_placed(),
            answered = report.answered.is_some(),
            "Phone escalation finished"
        );
        Ok(())
    }
}

#[async_trait]
impl AlertPlugin for TwilioPhoneCall {
    fn name(&self) -> &'static str {
        PHONE_CALL_PLUGIN_NAME
    }

    fn author(&self) -> &'static str {
        PLUGIN_AUTHOR
    }

    async fn send_alert(
        &self,
        event: &StatusChange,
        _users: &[UserId],
        duty_officers: &[UserId],
    ) -> dutycall_alert_core::Result<()> {
        // Gate before reading credentials
        if !event.current_status().is_most_severe() {
            debug!(
                service_id = event.service.id,
                status = %event.current_status(),
                "Skipping phone escalation"
            );
            return Ok(());
        }

        self.run(event, duty_officers)
            .await
            .map_err(|e| e.into_alert_error(PHONE_CALL_PLUGIN_NAME))
    }
}

/// Texts subscribers and duty officers on every status change
pub struct TwilioSms {
    user_data: Arc<UserDataStore>,
    connector: Arc<dyn ProviderConnector>,
}

impl TwilioSms {
    pub fn new(user_data: Arc<UserDataStore>) -> Self {
        Self {
            user_data,
            connector: Arc::new(RestConnector),
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn ProviderConnector>) -> Self {
        self.connector = connector;
        self
    }

    async fn run(&self, event: &StatusChange, users: &[UserId], duty_officers: &[UserId]) -> Result<()> {
        let (config, provider) = open_provider(self.connector.as_ref(), SMS_PLUGIN_NAME)?;

        let all_users: Vec<UserId> = users.iter().chain(duty_officers).cloned().collect();
        let recipients = self.user_data.contacts_for(&all_users);

        let report = SmsDispatcher::new(provider.as_ref(), &config)
            .dispatch(event, &recipients)
            .await?;

        info!(
            service_id = event.service.id,
            sent = report.receipts.len(),
            skipped = report.skipped,
            "SMS notification finished"
        );
        Ok(())
    }
}

#[async_trait]
impl AlertPlugin for TwilioSms {
    fn name(&self) -> &'static str {
        SMS_PLUGIN_NAME
    }

    fn author(&self) -> &'static str {
        PLUGIN_AUTHOR
    }

    async fn send_alert(
        &self,
        event: &StatusChange,
        users: &[UserId],
        duty_officers: &[UserId],
    ) -> dutycall_alert_core::Result<()> {
        self.run(event, users, duty_officers)
            .await
            .map_err(|e| e.into_alert_error(SMS_PLUGIN_NAME))
    }
}
