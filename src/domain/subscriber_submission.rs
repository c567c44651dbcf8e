use chrono::{DateTime, Local};

pub const UNKNOWN_USER_AGENT: &str = "Unknown";

/// One signup attempt as it arrives from the landing page form.
///
/// Nothing about it is validated yet; the workflow parses the address.
#[derive(Debug, Clone)]
pub struct SubscriberSubmission {
    pub email: String,
    pub user_agent: String,
    pub submitted_at: DateTime<Local>,
}

impl SubscriberSubmission {
    pub fn new(email: impl Into<String>, user_agent: Option<String>) -> Self {
        Self {
            email: email.into(),
            user_agent: user_agent.unwrap_or_else(|| UNKNOWN_USER_AGENT.to_string()),
            submitted_at: Local::now(),
        }
    }

    /// e.g. `7/4/2025, 3:05:09 PM`
    pub fn timestamp(&self) -> String {
        self.submitted_at
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string()
    }

    /// e.g. `7/4/2025`
    pub fn join_date(&self) -> String {
        self.submitted_at.format("%-m/%-d/%Y").to_string()
    }
}
