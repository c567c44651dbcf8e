use unicode_segmentation::UnicodeSegmentation;

use super::SubscriberEmail;

/// Greeting name derived from the local part of a subscriber's address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberName(String);

impl SubscriberName {
    pub fn from_email(email: &SubscriberEmail) -> Self {
        let local = email.local_part();
        let mut graphemes = local.graphemes(true);
        let name = match graphemes.next() {
            Some(first) => format!("{}{}", first.to_uppercase(), graphemes.as_str()),
            None => String::new(),
        };
        Self(name)
    }
}

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
