//! Message rendering for voice and SMS alerts
//!
//! Rendering is a pure function of the service state, so the exact wording can be
//! checked without a provider.

use crate::error::{AlertError, Result};
use crate::types::{Service, SiteUrl};

/// Which template to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Script read out on an escalation call
    Voice,
    /// Body of a text message
    Sms,
}

/// Inputs of a template
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    pub service: &'a Service,
    /// Required for SMS, which links back to the service page
    pub site: Option<&'a SiteUrl>,
}

impl<'a> MessageContext<'a> {
    pub fn new(service: &'a Service) -> Self {
        Self { service, site: None }
    }

    pub fn with_site(mut self, site: &'a SiteUrl) -> Self {
        self.site = Some(site);
        self
    }
}

/// Render a message of the given kind
pub fn render(kind: MessageKind, ctx: &MessageContext<'_>) -> Result<String> {
    match kind {
        MessageKind::Voice => Ok(voice_message(ctx.service)),
        MessageKind::Sms => {
            let site = ctx
                .site
                .ok_or_else(|| AlertError::render("SMS message needs the site URL to link the service"))?;
            Ok(sms_message(ctx.service, site))
        }
    }
}

fn voice_message(service: &Service) -> String {
    format!(
        "This is an urgent message from Affirm monitoring. \
         Service \"{}\" is facing an issue. \
         Please check Cabot urgently.",
        service.name
    )
}

fn sms_message(service: &Service, site: &SiteUrl) -> String {
    let summary = if service.overall_status.is_passing() {
        "is back to normal".to_string()
    } else {
        format!("reporting {} status", service.overall_status)
    };
    format!(
        "Service {} {} : {}",
        service.name,
        summary,
        site.service_url(service.id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceStatus;
    use pretty_assertions::assert_eq;

    fn site() -> SiteUrl {
        SiteUrl::new("http", "localhost")
    }

    #[test]
    fn test_sms_reports_failure_status() {
        let service = Service::new(2194, "Service", ServiceStatus::Error);
        let site = site();
        let text = render(MessageKind::Sms, &MessageContext::new(&service).with_site(&site)).unwrap();
        assert_eq!(
            text,
            "Service Service reporting ERROR status : http://localhost/service/2194/"
        );
    }

    #[test]
    fn test_sms_back_to_normal() {
        let service = Service::new(2194, "Service", ServiceStatus::Passing);
        let site = site();
        let text = render(MessageKind::Sms, &MessageContext::new(&service).with_site(&site)).unwrap();
        assert_eq!(text, "Service Service is back to normal : http://localhost/service/2194/");
    }

    #[test]
    fn test_sms_acked_is_reported() {
        let service = Service::new(7, "billing", ServiceStatus::Acked);
        let site = SiteUrl::new("https", "cabot.internal");
        let text = render(MessageKind::Sms, &MessageContext::new(&service).with_site(&site)).unwrap();
        assert_eq!(
            text,
            "Service billing reporting ACKED status : https://cabot.internal/service/7/"
        );
    }

    #[test]
    fn test_sms_without_site_is_an_error() {
        let service = Service::new(1, "api", ServiceStatus::Critical);
        let err = render(MessageKind::Sms, &MessageContext::new(&service)).unwrap_err();
        assert!(matches!(err, AlertError::Render(_)));
    }

    #[test]
    fn test_voice_names_the_service() {
        let service = Service::new(2194, "Service", ServiceStatus::Critical);
        let text = render(MessageKind::Voice, &MessageContext::new(&service)).unwrap();
        assert_eq!(
            text,
            "This is an urgent message from Affirm monitoring. Service \"Service\" is facing an issue. \
             Please check Cabot urgently."
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let service = Service::new(3, "db", ServiceStatus::Warning);
        let site = site();
        let ctx = MessageContext::new(&service).with_site(&site);
        assert_eq!(
            render(MessageKind::Sms, &ctx).unwrap(),
            render(MessageKind::Sms, &ctx).unwrap()
        );
    }
}
