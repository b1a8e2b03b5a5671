//! Scripted provider and timer shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use dutycall_alert_core::{
    Contact, LogFormat, LogSettings, PhoneNumber, Service, ServiceStatus, SiteUrl, StatusChange,
    UserId,
};
use dutycall_twilio::{
    AnsweredBy, CallAttempt, CallRequest, CallStatus, MessageReceipt, MessageRequest,
    ProviderConnector, Result, TelephonyProvider, Timer, TwilioConfig, TwilioError,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

pub const FROM_NUMBER: &str = "+15550001111";

/// How one placed call behaves
#[derive(Debug, Clone)]
pub enum CallPlan {
    /// Refreshes return `polls` in order, repeating the last one
    Script {
        initial: CallStatus,
        polls: Vec<CallStatus>,
        answered_by: Option<AnsweredBy>,
    },
    PlaceFails,
    RefreshFails,
}

impl CallPlan {
    pub fn answered() -> Self {
        CallPlan::Script {
            initial: CallStatus::Queued,
            polls: vec![CallStatus::Completed],
            answered_by: Some(AnsweredBy::Human),
        }
    }

    pub fn machine() -> Self {
        CallPlan::Script {
            initial: CallStatus::Queued,
            polls: vec![CallStatus::Completed],
            answered_by: Some(AnsweredBy::Machine),
        }
    }

    pub fn no_answer() -> Self {
        CallPlan::Script {
            initial: CallStatus::Queued,
            polls: vec![CallStatus::NoAnswer],
            answered_by: None,
        }
    }

    pub fn ringing_forever() -> Self {
        CallPlan::Script {
            initial: CallStatus::Queued,
            polls: vec![CallStatus::Ringing],
            answered_by: None,
        }
    }

    pub fn starts_as(initial: CallStatus) -> Self {
        CallPlan::Script {
            initial,
            polls: vec![CallStatus::Completed],
            answered_by: Some(AnsweredBy::Human),
        }
    }
}

#[derive(Default)]
pub struct ScriptedProvider {
    plans: Mutex<VecDeque<CallPlan>>,
    active: Mutex<HashMap<String, CallPlan>>,
    refreshes: Mutex<HashMap<String, usize>>,
    placed: Mutex<Vec<CallRequest>>,
    sent: Mutex<Vec<MessageRequest>>,
    failing_recipient: Mutex<Option<String>>,
}

impl ScriptedProvider {
    pub fn with_calls(plans: Vec<CallPlan>) -> Arc<Self> {
        let provider = Self::default();
        *provider.plans.lock() = plans.into();
        Arc::new(provider)
    }

    pub fn failing_sms_to(to: &str) -> Arc<Self> {
        let provider = Self::default();
        *provider.failing_recipient.lock() = Some(to.to_string());
        Arc::new(provider)
    }

    pub fn placed_calls(&self) -> Vec<CallRequest> {
        self.placed.lock().clone()
    }

    pub fn dialed_numbers(&self) -> Vec<String> {
        self.placed.lock().iter().map(|r| r.to.clone()).collect()
    }

    pub fn refresh_count(&self, sid: &str) -> usize {
        self.refreshes.lock().get(sid).copied().unwrap_or(0)
    }

    pub fn sent_messages(&self) -> Vec<MessageRequest> {
        self.sent.lock().clone()
    }

    fn provider_failure(what: &str) -> TwilioError {
        TwilioError::Api {
            status: 500,
            code: Some(20500),
            message: format!("{} failed", what),
        }
    }
}

#[async_trait]
impl TelephonyProvider for ScriptedProvider {
    async fn place_call(&self, request: &CallRequest) -> Result<CallAttempt> {
        let sid = {
            let mut placed = self.placed.lock();
            placed.push(request.clone());
            format!("CA{:03}", placed.len())
        };

        let plan = self
            .plans
            .lock()
            .pop_front()
            .ok_or_else(|| TwilioError::decode("no call scripted"))?;

        let initial = match &plan {
            CallPlan::PlaceFails => return Err(Self::provider_failure("place call")),
            CallPlan::RefreshFails => CallStatus::Queued,
            CallPlan::Script { initial, .. } => initial.clone(),
        };
        self.active.lock().insert(sid.clone(), plan);

        Ok(CallAttempt {
            sid,
            to: request.to.clone(),
            status: initial,
            answered_by: None,
        })
    }

    async fn refresh_call(&self, call: &CallAttempt) -> Result<CallAttempt> {
        let index = {
            let mut refreshes = self.refreshes.lock();
            let count = refreshes.entry(call.sid.clone()).or_insert(0);
            *count += 1;
            *count - 1
        };

        let plan = self
            .active
            .lock()
            .get(&call.sid)
            .cloned()
            .ok_or_else(|| TwilioError::decode("unknown call"))?;

        match plan {
            CallPlan::Script {
                polls, answered_by, ..
            } => {
                let status = polls[index.min(polls.len() - 1)].clone();
                let answered_by = if status == CallStatus::Completed {
                    answered_by
                } else {
                    None
                };
                Ok(CallAttempt {
                    status,
                    answered_by,
                    ..call.clone()
                })
            }
            _ => Err(Self::provider_failure("refresh call")),
        }
    }

    async fn send_message(&self, request: &MessageRequest) -> Result<MessageReceipt> {
        let count = {
            let mut sent = self.sent.lock();
            sent.push(request.clone());
            sent.len()
        };

        if self.failing_recipient.lock().as_deref() == Some(request.to.as_str()) {
            return Err(Self::provider_failure("send message"));
        }

        Ok(MessageReceipt {
            sid: format!("SM{:03}", count),
            status: "queued".to_string(),
        })
    }
}

/// Hands the same scripted provider to every run
pub struct SharedConnector {
    pub provider: Arc<ScriptedProvider>,
    pub configs: Mutex<Vec<TwilioConfig>>,
}

impl SharedConnector {
    pub fn new(provider: Arc<ScriptedProvider>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            configs: Mutex::new(Vec::new()),
        })
    }

    pub fn connections(&self) -> usize {
        self.configs.lock().len()
    }
}

struct ProviderHandle(Arc<ScriptedProvider>);

#[async_trait]
impl TelephonyProvider for ProviderHandle {
    async fn place_call(&self, request: &CallRequest) -> Result<CallAttempt> {
        self.0.place_call(request).await
    }

    async fn refresh_call(&self, call: &CallAttempt) -> Result<CallAttempt> {
        self.0.refresh_call(call).await
    }

    async fn send_message(&self, request: &MessageRequest) -> Result<MessageReceipt> {
        self.0.send_message(request).await
    }
}

impl ProviderConnector for SharedConnector {
    fn connect(&self, config: &TwilioConfig) -> Result<Box<dyn TelephonyProvider>> {
        self.configs.lock().push(config.clone());
        Ok(Box::new(ProviderHandle(self.provider.clone())))
    }
}

/// In-memory sink for JSON log lines
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Subscriber at `level` writing JSON lines into this buffer
    pub fn dispatch(&self, level: &str) -> tracing::Dispatch {
        let settings = LogSettings {
            level: level.to_string(),
            format: LogFormat::Json,
            file_info: false,
        };
        let sink = self.clone();
        settings
            .dispatch(move || sink.clone())
            .expect("valid log settings")
    }

    pub fn events(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Messages of events logged at `level`
    pub fn messages_at(&self, level: &str) -> Vec<String> {
        self.events()
            .iter()
            .filter(|event| event["level"] == level)
            .filter_map(|event| event["fields"]["message"].as_str().map(str::to_string))
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Records sleeps instead of waiting
#[derive(Default)]
pub struct RecordingTimer {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingTimer {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }

    pub fn total(&self) -> Duration {
        self.sleeps.lock().iter().sum()
    }
}

#[async_trait]
impl Timer for RecordingTimer {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}

pub fn test_config() -> TwilioConfig {
    TwilioConfig::new("AC00000000000000000000000000000000", "token", FROM_NUMBER)
}

pub fn contact(user: &str, number: Option<&str>) -> Contact {
    let phone_number = number.and_then(|n| PhoneNumber::parse(n).expect("valid test number"));
    Contact::new(UserId::new(user), phone_number)
}

pub fn transition(from: ServiceStatus, to: ServiceStatus) -> StatusChange {
    StatusChange::new(
        Service::new(2194, "Service", to),
        from,
        SiteUrl::new("http", "localhost"),
    )
}
