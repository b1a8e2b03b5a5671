//! Twilio REST API client
//!
//! Implements [`TelephonyProvider`] on top of the 2010-04-01 API:
//! `Calls.json` to place a call, `Calls/{sid}.json` to refresh it and
//! `Messages.json` to send a text. Requests are form encoded and authenticated with
//! the account SID and auth token.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::TwilioConfig;
use crate::error::{Result, TwilioError};
use crate::provider::{
    AnsweredBy, CallAttempt, CallRequest, CallStatus, MessageReceipt, MessageRequest,
    TelephonyProvider,
};

const API_VERSION: &str = "2010-04-01";

/// Call resource as returned by the API
#[derive(Debug, Deserialize)]
struct CallResource {
    sid: String,
    #[serde(default)]
    to: Option<String>,
    status: String,
    #[serde(default)]
    answered_by: Option<String>,
}

impl CallResource {
    fn into_attempt(self, fallback_to: &str) -> CallAttempt {
        CallAttempt {
            sid: self.sid,
            to: self.to.unwrap_or_else(|| fallback_to.to_string()),
            status: CallStatus::parse(&self.status),
            answered_by: self.answered_by.as_deref().map(AnsweredBy::parse),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    status: String,
}

/// Error body of a failed request
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client bound to one Twilio account
pub struct TwilioClient {
    http: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &TwilioConfig {
        &self.config
    }

    fn account_url(&self, resource: &str) -> String {
        format!(
            "{}/{}/Accounts/{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            API_VERSION,
            self.config.account_sid,
            resource
        )
    }

    async fn post_form<T: DeserializeOwned>(&self, url: &str, form: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http
            .post(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let parsed: Option<ApiErrorBody> = serde_json::from_str(&body).ok();
            let (code, message) = match parsed {
                Some(ApiErrorBody { code, message }) => {
                    (code, message.unwrap_or_else(|| body.clone()))
                }
                None => (None, body),
            };
            return Err(TwilioError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| TwilioError::decode(e.to_string()))
    }
}

#[async_trait]
impl TelephonyProvider for TwilioClient {
    async fn place_call(&self, request: &CallRequest) -> Result<CallAttempt> {
        let url = self.account_url("Calls.json");
        let form = [
            ("To", request.to.as_str()),
            ("From", request.from.as_str()),
            ("Url", request.url.as_str()),
            ("Method", request.method.as_str()),
            ("IfMachine", request.machine_detection.as_str()),
        ];
        let call: CallResource = self.post_form(&url, &form).await?;
        debug!(call_sid = %call.sid, status = %call.status, "Call created");
        Ok(call.into_attempt(&request.to))
    }

    async fn refresh_call(&self, call: &CallAttempt) -> Result<CallAttempt> {
        let url = self.account_url(&format!("Calls/{}.json", call.sid));
        let refreshed: CallResource = self.get(&url).await?;
        Ok(refreshed.into_attempt(&call.to))
    }

    async fn send_message(&self, request: &MessageRequest) -> Result<MessageReceipt> {
        let url = self.account_url("Messages.json");
        let form = [
            ("To", request.to.as_str()),
            ("From", request.from.as_str()),
            ("Body", request.body.as_str()),
        ];
        let message: MessageResource = self.post_form(&url, &form).await?;
        Ok(MessageReceipt {
            sid: message.sid,
            status: message.status,
        })
    }
}
