//! Waiting for a placed call to reach its final state

use tracing::debug;

use crate::config::PollPolicy;
use crate::error::Result;
use crate::provider::{AnsweredBy, CallAttempt, CallStatus, TelephonyProvider};
use crate::timer::Timer;

/// How a call ended up once polling stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResolution {
    /// The call connected; machine detection tells who picked up
    Completed(AnsweredBy),
    NoAnswer,
    /// Busy, failed or canceled
    Failed(CallStatus),
    /// Still not final when the poll budget ran out
    Pending(CallStatus),
}

impl CallResolution {
    pub fn from_call(call: &CallAttempt) -> Self {
        match &call.status {
            CallStatus::Completed => {
                CallResolution::Completed(call.answered_by.unwrap_or(AnsweredBy::Unknown))
            }
            CallStatus::NoAnswer => CallResolution::NoAnswer,
            status @ (CallStatus::Busy | CallStatus::Failed | CallStatus::Canceled) => {
                CallResolution::Failed(status.clone())
            }
            status => CallResolution::Pending(status.clone()),
        }
    }

    /// A completed call that machine detection did not flag as a machine
    pub fn is_human_answer(&self) -> bool {
        matches!(self, CallResolution::Completed(answered_by) if !answered_by.is_machine())
    }
}

/// Result of polling one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Last state fetched from the provider
    pub call: CallAttempt,
    pub resolution: CallResolution,
    /// Number of status refreshes made
    pub polls: u32,
}

/// Polls a call until it completes or the budget is spent
pub struct CallPoller<'a> {
    provider: &'a dyn TelephonyProvider,
    timer: &'a dyn Timer,
    policy: PollPolicy,
}

impl<'a> CallPoller<'a> {
    pub fn new(provider: &'a dyn TelephonyProvider, timer: &'a dyn Timer, policy: PollPolicy) -> Self {
        Self {
            provider,
            timer,
            policy,
        }
    }

    /// Wait, refresh, repeat; stops early once the call is completed.
    ///
    /// Provider failures are returned as-is and end the wait.
    pub async fn wait_for_completion(&self, call: CallAttempt) -> Result<PollOutcome> {
        let mut call = call;
        let mut polls = 0;

        while polls < self.policy.max_polls {
            self.timer.sleep(self.policy.interval).await;
            call = self.provider.refresh_call(&call).await?;
            polls += 1;

            debug!(
                call_sid = %call.sid,
                status = %call.status,
                poll = polls,
                "Call status is {}", call.status
            );

            if call.status == CallStatus::Completed {
                break;
            }
        }

        let resolution = CallResolution::from_call(&call);
        Ok(PollOutcome {
            call,
            resolution,
            polls,
        })
    }
}
