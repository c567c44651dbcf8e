use std::collections::BTreeMap;
use std::future::Future;

/// Values substituted into a relay-hosted template, keyed by placeholder name.
pub type TemplateParams = BTreeMap<String, String>;

/// A hosted email relay that renders keyed templates on its side.
pub trait Relay {
    /// Hands the relay the public key that authorises subsequent sends.
    fn initialize(&mut self, public_key: &str);

    fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &TemplateParams,
    ) -> impl Future<Output = Result<(), RelayError>> + Send;
}

/// A failed relay call.
///
/// Mirrors what hosted relays report: an HTTP status and response text when
/// the relay answered, or only a message when it could not be reached.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", describe(.status, .text, .message))]
pub struct RelayError {
    pub status: Option<u16>,
    pub text: Option<String>,
    pub message: Option<String>,
}

impl RelayError {
    pub fn with_status(status: u16, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            status: Some(status),
            text: (!text.is_empty()).then_some(text),
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

fn describe(status: &Option<u16>, text: &Option<String>, message: &Option<String>) -> String {
    let detail = text
        .as_deref()
        .or(message.as_deref())
        .unwrap_or("no details");
    match status {
        Some(status) => format!("Relay responded with {status}: {detail}"),
        None => format!("Relay call failed: {detail}"),
    }
}
