//! Voice-call escalation through the on-call list
//!
//! When a service goes CRITICAL the on-call contacts are called one at a time, in
//! priority order, until somebody picks up. Each call is polled through
//! [`CallPoller`]; a call that ends unanswered, busy, still ringing, or on an answering
//! machine moves the escalation to the next contact.
//!
//! Provider failures are different: they are logged and returned immediately and the
//! remaining contacts are not tried. A call that does not start out `queued` is treated
//! the same way.

use dutycall_alert_core::{render, Contact, MessageContext, MessageKind, StatusChange};
use tracing::{debug, error, info, warn};

use crate::config::{PollPolicy, TwilioConfig};
use crate::error::{Result, TwilioError};
use crate::poller::{CallPoller, CallResolution, PollOutcome};
use crate::provider::{CallRequest, CallStatus, HttpMethod, MachineDetection, TelephonyProvider};
use crate::timer::Timer;
use crate::twiml;

/// One contact dialed during an escalation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub contact: Contact,
    pub outcome: PollOutcome,
}

/// What an escalation run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscalationReport {
    /// False when the status did not warrant calling anyone
    pub triggered: bool,
    /// Calls placed, in dialing order
    pub attempts: Vec<AttemptRecord>,
    /// Contact who picked up, if anyone did
    pub answered: Option<Contact>,
}

impl EscalationReport {
    pub fn not_triggered() -> Self {
        Self::default()
    }

    pub fn calls_placed(&self) -> usize {
        self.attempts.len()
    }
}

/// Calls on-call contacts in order until one answers
pub struct EscalationController<'a> {
    provider: &'a dyn TelephonyProvider,
    timer: &'a dyn Timer,
    config: &'a TwilioConfig,
    policy: PollPolicy,
}

impl<'a> EscalationController<'a> {
    pub fn new(provider: &'a dyn TelephonyProvider, timer: &'a dyn Timer, config: &'a TwilioConfig) -> Self {
        Self {
            provider,
            timer,
            config,
            policy: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the escalation for one status change
    pub async fn escalate(&self, event: &StatusChange, contacts: &[Contact]) -> Result<EscalationReport> {
        let service = &event.service;

        if !event.current_status().is_most_severe() {
            debug!(
                service_id = service.id,
                status = %service.overall_status,
                "Status does not warrant a phone call"
            );
            return Ok(EscalationReport::not_triggered());
        }

        let text = render(MessageKind::Voice, &MessageContext::new(service))?;
        let callback_url = twiml::spoken_message_url(&self.config.twimlet_echo_url, &text)?;

        let mut report = EscalationReport {
            triggered: true,
            ..Default::default()
        };

        for contact in contacts {
            let Some(to) = contact.prefixed_phone_number() else {
                debug!(user = %contact.user, "Contact has no phone number, skipping");
                continue;
            };

            let request = CallRequest {
                to,
                from: self.config.outgoing_number.clone(),
                url: callback_url.clone(),
                method: HttpMethod::Get,
                machine_detection: MachineDetection::Hangup,
            };

            let outcome = match self.call_contact(&request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        service_id = service.id,
                        user = %contact.user,
                        to = %request.to,
                        "Error making twilio phone call: {}", e
                    );
                    return Err(e);
                }
            };

            let answered = outcome.resolution.is_human_answer();
            match &outcome.resolution {
                CallResolution::Completed(answered_by) if answered_by.is_machine() => {
                    warn!(
                        user = %contact.user,
                        call_sid = %outcome.call.sid,
                        "Call reached answering machine, trying next contact"
                    );
                }
                CallResolution::Completed(_) => {
                    info!(
                        user = %contact.user,
                        call_sid = %outcome.call.sid,
                        "Call answered, escalation complete"
                    );
                }
                other => {
                    info!(
                        user = %contact.user,
                        call_sid = %outcome.call.sid,
                        resolution = ?other,
                        "Call not answered, trying next contact"
                    );
                }
            }

            report.attempts.push(AttemptRecord {
                contact: contact.clone(),
                outcome,
            });

            if answered {
                report.answered = Some(contact.clone());
                return Ok(report);
            }
        }

        warn!(
            service_id = service.id,
            calls = report.attempts.len(),
            "Nobody on call answered"
        );
        Ok(report)
    }

    async fn call_contact(&self, request: &CallRequest) -> Result<PollOutcome> {
        let call = self.provider.place_call(request).await?;
        info!(call_sid = %call.sid, to = %request.to, "Placed alert call");

        if call.status != CallStatus::Queued {
            return Err(TwilioError::UnexpectedCallState {
                sid: call.sid,
                status: call.status.to_string(),
            });
        }

        CallPoller::new(self.provider, self.timer, self.policy)
            .wait_for_completion(call)
            .await
    }
}
