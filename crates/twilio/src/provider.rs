//! Telephony provider interface and call/message types
//!
//! The escalation and SMS paths only see [`TelephonyProvider`]; the Twilio REST client
//! is one implementation and tests substitute scripted ones.

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;

/// Status of an outbound call as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallStatus {
    Queued,
    Initiated,
    Ringing,
    InProgress,
    Completed,
    Busy,
    NoAnswer,
    Failed,
    Canceled,
    /// A status this client does not know about
    Other(String),
}

impl CallStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => CallStatus::Queued,
            "initiated" => CallStatus::Initiated,
            "ringing" => CallStatus::Ringing,
            "in-progress" => CallStatus::InProgress,
            "completed" => CallStatus::Completed,
            "busy" => CallStatus::Busy,
            "no-answer" => CallStatus::NoAnswer,
            "failed" => CallStatus::Failed,
            "canceled" => CallStatus::Canceled,
            other => CallStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CallStatus::Queued => "queued",
            CallStatus::Initiated => "initiated",
            CallStatus::Ringing => "ringing",
            CallStatus::InProgress => "in-progress",
            CallStatus::Completed => "completed",
            CallStatus::Busy => "busy",
            CallStatus::NoAnswer => "no-answer",
            CallStatus::Failed => "failed",
            CallStatus::Canceled => "canceled",
            CallStatus::Other(raw) => raw,
        }
    }

    /// No further change is expected from the provider
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallStatus::Completed
                | CallStatus::Busy
                | CallStatus::NoAnswer
                | CallStatus::Failed
                | CallStatus::Canceled
        )
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who picked up a call, per the provider's machine detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnsweredBy {
    Human,
    Machine,
    Unknown,
}

impl AnsweredBy {
    /// Parse the provider's `answered_by` field.
    ///
    /// Answering machines come back as `machine` or one of the `machine_end_*`
    /// variants; fax lines count as machines too.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "human" => AnsweredBy::Human,
            "fax" => AnsweredBy::Machine,
            other if other.starts_with("machine") => AnsweredBy::Machine,
            _ => AnsweredBy::Unknown,
        }
    }

    pub fn is_machine(&self) -> bool {
        matches!(self, AnsweredBy::Machine)
    }
}

/// One outbound call to one contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallAttempt {
    /// Provider call identifier
    pub sid: String,
    pub to: String,
    pub status: CallStatus,
    pub answered_by: Option<AnsweredBy>,
}

/// HTTP method the provider uses to fetch call instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// What the provider does when an answering machine picks up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineDetection {
    /// Detect machines and hang up on them
    Hangup,
    /// Detect machines and keep playing the message
    Continue,
}

impl MachineDetection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineDetection::Hangup => "Hangup",
            MachineDetection::Continue => "Continue",
        }
    }
}

/// Parameters for placing a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: String,
    pub from: String,
    /// Where the provider fetches the call instructions
    pub url: String,
    pub method: HttpMethod,
    pub machine_detection: MachineDetection,
}

/// Parameters for sending a text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRequest {
    pub to: String,
    pub from: String,
    pub body: String,
}

/// Provider acknowledgement of an accepted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReceipt {
    pub sid: String,
    pub status: String,
}

#[async_trait]
pub trait TelephonyProvider: Send + Sync {
    /// Place an outbound call
    async fn place_call(&self, request: &CallRequest) -> Result<CallAttempt>;

    /// Fetch the current state of a previously placed call
    async fn refresh_call(&self, call: &CallAttempt) -> Result<CallAttempt>;

    /// Send a text message
    async fn send_message(&self, request: &MessageRequest) -> Result<MessageReceipt>;
}
