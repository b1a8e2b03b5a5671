//! TwiML voice responses delivered through the twimlet echo service
//!
//! The call instructions travel inside the callback URL itself, so the dashboard never
//! has to be reachable from the internet.

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Result, TwilioError};

/// Voice used to read out alerts
pub const ALERT_VOICE: &str = "woman";

/// Build `<Response><Say voice="..">text</Say></Response>`
pub fn say_response(text: &str, voice: &str) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Start(BytesStart::new("Response")))
        .map_err(|e| TwilioError::Twiml(e.to_string()))?;

    let mut say = BytesStart::new("Say");
    say.push_attribute(("voice", voice));
    writer
        .write_event(Event::Start(say))
        .map_err(|e| TwilioError::Twiml(e.to_string()))?;
    writer
        .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
        .map_err(|e| TwilioError::Twiml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesStart::new("Say").to_end()))
        .map_err(|e| TwilioError::Twiml(e.to_string()))?;

    writer
        .write_event(Event::End(BytesStart::new("Response").to_end()))
        .map_err(|e| TwilioError::Twiml(e.to_string()))?;

    String::from_utf8(writer.into_inner()).map_err(|e| TwilioError::Twiml(e.to_string()))
}

/// Callback URL that makes the echo service return `twiml` verbatim.
///
/// Any query the endpoint already carries is kept.
pub fn echo_url(echo_endpoint: &str, twiml: &str) -> Result<String> {
    let mut url = url::Url::parse(echo_endpoint)
        .map_err(|e| TwilioError::config(format!("Invalid twimlet URL {}: {}", echo_endpoint, e)))?;
    url.query_pairs_mut().append_pair("Twiml", twiml);
    Ok(url.into())
}

/// Callback URL reading `text` out loud in the alert voice
pub fn spoken_message_url(echo_endpoint: &str, text: &str) -> Result<String> {
    let twiml = say_response(text, ALERT_VOICE)?;
    echo_url(echo_endpoint, &twiml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_say_response_keeps_quotes() {
        let xml = say_response("Service \"api\" is down", "woman").unwrap();
        assert_eq!(
            xml,
            "<Response><Say voice=\"woman\">Service \"api\" is down</Say></Response>"
        );
    }

    #[test]
    fn test_say_response_escapes_markup() {
        let xml = say_response("a < b & c", "man").unwrap();
        assert_eq!(
            xml,
            "<Response><Say voice=\"man\">a &lt; b &amp; c</Say></Response>"
        );
    }

    #[test]
    fn test_echo_url_round_trips_twiml() {
        let twiml = "<Response><Say voice=\"woman\">Hi there</Say></Response>";
        let url = echo_url("http://twimlets.com/echo", twiml).unwrap();
        assert!(url.starts_with("http://twimlets.com/echo?Twiml="));

        let parsed = url::Url::parse(&url).unwrap();
        let (key, value) = parsed.query_pairs().next().unwrap();
        assert_eq!(key, "Twiml");
        assert_eq!(value, twiml);
    }

    #[test]
    fn test_echo_url_encodes_spaces_as_plus() {
        let url = echo_url("http://twimlets.com/echo", "a b").unwrap();
        assert_eq!(url, "http://twimlets.com/echo?Twiml=a+b");
    }

    #[test]
    fn test_echo_url_appends_to_existing_query() {
        let url = echo_url("http://twimlets.com/echo?x=1", "<R/>").unwrap();
        assert_eq!(url, "http://twimlets.com/echo?x=1&Twiml=%3CR%2F%3E");

        let parsed = url::Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("x".to_string(), "1".to_string()),
                ("Twiml".to_string(), "<R/>".to_string()),
            ]
        );
    }

    #[test]
    fn test_echo_url_rejects_relative_endpoint() {
        assert!(matches!(
            echo_url("not a url", "<R/>"),
            Err(TwilioError::Config(_))
        ));
    }
}
