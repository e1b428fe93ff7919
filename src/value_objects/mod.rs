//! Value objects for the dialog engine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::aggregate::SessionState;

/// One inbound exchange from the gateway
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayRequest {
    /// Subscriber identifier (e.g. MSISDN)
    pub subscriber_id: String,
    /// Gateway session identifier
    pub session_id: String,
    /// The line of text typed by the subscriber
    pub text: String,
    /// Locale requested by the gateway, if any
    pub locale: Option<String>,
    /// Extra gateway parameters copied into a new session
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl GatewayRequest {
    pub fn new(
        subscriber_id: impl Into<String>,
        session_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            subscriber_id: subscriber_id.into(),
            session_id: session_id.into(),
            text: text.into(),
            locale: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// One outbound exchange to the gateway
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayReply {
    pub text: String,
    pub continue_session: bool,
}

impl fmt::Display for GatewayReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The request a handler sees for one turn.
///
/// The session state travels with the request. Handlers mutate it in place
/// and hand it back through their response or forwarded request.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogRequest {
    pub subscriber_id: String,
    pub session_id: String,
    pub input: String,
    pub locale: String,
    pub session: SessionState,
}

impl DialogRequest {
    pub fn new(
        subscriber_id: impl Into<String>,
        session_id: impl Into<String>,
        input: impl Into<String>,
        session: SessionState,
    ) -> Self {
        let locale = session.locale.clone();
        Self {
            subscriber_id: subscriber_id.into(),
            session_id: session_id.into(),
            input: input.into(),
            locale,
            session,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// The input with surrounding whitespace removed
    pub fn trimmed_input(&self) -> &str {
        self.input.trim()
    }

    /// Whether this request carries no user input (first visit or forwarded)
    pub fn is_empty_input(&self) -> bool {
        self.input.is_empty()
    }

    /// A copy of this request addressed to `handler`, with the input cleared.
    ///
    /// The input belonged to the current handler; anything the next handler
    /// needs must be passed through the session.
    pub fn forward(&self, handler: impl Into<String>) -> (DialogRequest, String) {
        let mut forwarded = self.clone();
        forwarded.input.clear();
        (forwarded, handler.into())
    }

    /// Like [`DialogRequest::forward`] but consumes the request
    pub fn into_forward(mut self, handler: impl Into<String>) -> (DialogRequest, String) {
        self.input.clear();
        (self, handler.into())
    }
}

/// The screen produced by a handler
#[derive(Debug, Clone, PartialEq)]
pub struct DialogResponse {
    pub text: String,
    pub continue_session: bool,
    pub session: SessionState,
}

impl DialogResponse {
    /// A screen that expects another turn
    pub fn proceed(text: impl Into<String>, session: SessionState) -> Self {
        Self {
            text: text.into(),
            continue_session: true,
            session,
        }
    }

    /// A final screen; the gateway closes the session
    pub fn stop(text: impl Into<String>, session: SessionState) -> Self {
        Self {
            text: text.into(),
            continue_session: false,
            session,
        }
    }

    pub fn to_reply(&self) -> GatewayReply {
        GatewayReply {
            text: self.text.clone(),
            continue_session: self.continue_session,
        }
    }
}

impl fmt::Display for DialogResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A recorded visit to a handler
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    /// Handler name
    pub name: String,
    /// Text displayed when the visit started
    pub screen_text: String,
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Input that completed the visit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,
}

impl StepRecord {
    pub fn open(name: impl Into<String>, screen_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            screen_text: screen_text.into(),
            start: Utc::now(),
            end: None,
            selection: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Time spent on the screen, once closed
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }
}

/// A menu entry pointing at another handler.
///
/// Without a `symbol` the option is numbered by position. With one, the symbol
/// is displayed verbatim and the subscriber selects it by typing `value`, or
/// the trimmed symbol when no value is given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub target: String,
    pub symbol: Option<String>,
    pub value: Option<String>,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
            symbol: None,
            value: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// An entry of a List screen and the payload stored when it is chosen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListItem {
    pub label: String,
    pub value: serde_json::Value,
}

impl ListItem {
    pub fn new(label: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(input: &str) -> DialogRequest {
        let session = SessionState::new("314159", "12345", "en", "enter_name");
        DialogRequest::new("12345", "314159", input, session)
    }

    #[test]
    fn test_forward_clears_input_and_leaves_original() {
        let req = request("foo");
        let (forwarded, handler) = req.forward("enter_age");

        assert_eq!(handler, "enter_age");
        assert_eq!(forwarded.input, "");
        assert_eq!(req.input, "foo");
        assert_eq!(forwarded.session_id, req.session_id);
        assert_eq!(forwarded.subscriber_id, req.subscriber_id);
        assert_eq!(forwarded.session, req.session);
    }

    #[test]
    fn test_response_renders_text_only() {
        let req = request("");
        let res = DialogResponse::proceed("message", req.session);
        assert_eq!(res.to_string(), "message");
        assert!(res.continue_session);
        assert_eq!(
            res.to_reply(),
            GatewayReply {
                text: "message".to_string(),
                continue_session: true
            }
        );
    }

    #[test]
    fn test_step_duration_only_when_closed() {
        let mut step = StepRecord::open("enter_name", "Enter name:");
        assert!(step.is_open());
        assert!(step.duration().is_none());

        step.end = Some(step.start + Duration::milliseconds(250));
        assert_eq!(step.duration(), Some(Duration::milliseconds(250)));
    }
}
