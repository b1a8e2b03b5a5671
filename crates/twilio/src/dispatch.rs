//! SMS notification of status changes

use dutycall_alert_core::{render, Contact, MessageContext, MessageKind, StatusChange};
use tracing::{debug, error, info};

use crate::config::TwilioConfig;
use crate::error::Result;
use crate::provider::{MessageReceipt, MessageRequest, TelephonyProvider};

/// What an SMS run delivered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Rendered body sent to every recipient
    pub body: String,
    pub receipts: Vec<MessageReceipt>,
    /// Recipients left out for lack of a phone number
    pub skipped: usize,
}

/// Texts every recipient with a phone number about a status change.
///
/// Recipients are not de-duplicated. The first provider failure ends the run.
pub struct SmsDispatcher<'a> {
    provider: &'a dyn TelephonyProvider,
    config: &'a TwilioConfig,
}

impl<'a> SmsDispatcher<'a> {
    pub fn new(provider: &'a dyn TelephonyProvider, config: &'a TwilioConfig) -> Self {
        Self { provider, config }
    }

    pub async fn dispatch(&self, event: &StatusChange, recipients: &[Contact]) -> Result<DispatchReport> {
        let ctx = MessageContext::new(&event.service).with_site(&event.site);
        let body = render(MessageKind::Sms, &ctx)?;

        let mut report = DispatchReport {
            body,
            ..Default::default()
        };

        for contact in recipients {
            let Some(to) = contact.prefixed_phone_number() else {
                debug!(user = %contact.user, "Recipient has no phone number, skipping");
                report.skipped += 1;
                continue;
            };

            let request = MessageRequest {
                to,
                from: self.config.outgoing_number.clone(),
                body: report.body.clone(),
            };

            match self.provider.send_message(&request).await {
                Ok(receipt) => {
                    info!(
                        user = %contact.user,
                        message_sid = %receipt.sid,
                        "Sent status SMS"
                    );
                    report.receipts.push(receipt);
                }
                Err(e) => {
                    error!(
                        service_id = event.service.id,
                        user = %contact.user,
                        to = %request.to,
                        "Error sending twilio sms: {}", e
                    );
                    return Err(e);
                }
            }
        }

        Ok(report)
    }
}
