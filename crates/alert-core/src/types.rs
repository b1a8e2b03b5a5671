//! Core types for alert-core

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dashboard identifier of a monitored service
pub type ServiceId = u64;

/// Overall status of a monitored service, from healthy to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceStatus {
    Passing,
    Acked,
    Warning,
    Error,
    Critical,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Passing => "PASSING",
            ServiceStatus::Acked => "ACKED",
            ServiceStatus::Warning => "WARNING",
            ServiceStatus::Error => "ERROR",
            ServiceStatus::Critical => "CRITICAL",
        }
    }

    /// Only the most severe failure escalates to phone calls
    pub fn is_most_severe(&self) -> bool {
        matches!(self, ServiceStatus::Critical)
    }

    pub fn is_passing(&self) -> bool {
        matches!(self, ServiceStatus::Passing)
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A monitored service as seen by alert plugins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub overall_status: ServiceStatus,
}

impl Service {
    pub fn new(id: ServiceId, name: impl Into<String>, overall_status: ServiceStatus) -> Self {
        Self {
            id,
            name: name.into(),
            overall_status,
        }
    }
}

/// Scheme and host the dashboard is served from, used to build links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteUrl {
    pub scheme: String,
    pub host: String,
}

impl SiteUrl {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// Absolute URL of a service's detail page
    pub fn service_url(&self, id: ServiceId) -> String {
        format!("{}://{}/service/{}/", self.scheme, self.host, id)
    }
}

/// A service status transition delivered to alert plugins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// The service, carrying its new status
    pub service: Service,
    pub previous_status: ServiceStatus,
    pub site: SiteUrl,
}

impl StatusChange {
    pub fn new(service: Service, previous_status: ServiceStatus, site: SiteUrl) -> Self {
        Self {
            service,
            previous_status,
            site,
        }
    }

    pub fn current_status(&self) -> ServiceStatus {
        self.service.overall_status
    }
}
