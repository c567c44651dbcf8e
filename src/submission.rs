//! One signup attempt from form submission to the two relay sends.
//!
//! A [`SubmissionWorkflow`] validates the address, checks the relay
//! configuration, sends the operator notification and then the subscriber
//! auto-response, strictly in that order. Every failure ends up in the
//! workflow's [`SubmissionState`]; nothing is returned to the caller as an
//! error.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::configuration::{DeliveryConfiguration, is_configuration_complete};
use crate::domain::{DeviceClass, SubscriberEmail, SubscriberName, SubscriberSubmission};
use crate::relay::{Relay, RelayError, TemplateParams};

/// How long a success stays visible before the workflow clears it.
pub const AUTO_CLEAR_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SubmissionState {
    pub is_loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum SubmissionError {
    #[error("Invalid email address provided.")]
    ValidationError(String),
    #[error("Email service not configured properly")]
    ConfigurationError(Vec<&'static str>),
    #[error("{}", delivery_error_message(.0))]
    DeliveryError(#[source] RelayError),
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Both the operator notification and the auto-response went out.
    Delivered,
    /// The operator was notified but the subscriber's auto-response failed.
    PartiallyDelivered { warning: String },
    Failed(SubmissionError),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SubmissionOutcome::Failed(_))
    }
}

pub struct SubmissionWorkflow<R> {
    relay: R,
    config: DeliveryConfiguration,
    operator: SubscriberEmail,
    state: Arc<Mutex<SubmissionState>>,
    auto_clear: Option<JoinHandle<()>>,
}

impl<R: Relay> SubmissionWorkflow<R> {
    pub fn new(relay: R, config: DeliveryConfiguration, operator: SubscriberEmail) -> Self {
        Self {
            relay,
            config,
            operator,
            state: Arc::new(Mutex::new(SubmissionState::default())),
            auto_clear: None,
        }
    }

    /// Swaps the relay identifiers; picked up by the next submission.
    pub fn reconfigure(&mut self, config: DeliveryConfiguration) {
        self.config = config;
    }

    pub fn state(&self) -> SubmissionState {
        lock(&self.state).clone()
    }

    pub fn reset_state(&mut self) {
        self.cancel_auto_clear();
        *lock(&self.state) = SubmissionState::default();
    }

    /// Returns `true` when the operator notification was delivered.
    pub async fn submit(&mut self, submission: SubscriberSubmission) -> bool {
        self.run(submission).await.is_success()
    }

    #[tracing::instrument(
        name = "Processing a waitlist signup",
        skip(self, submission),
        fields(
            attempt_id = %Uuid::new_v4(),
            subscriber_email = %submission.email
        )
    )]
    pub async fn run(&mut self, submission: SubscriberSubmission) -> SubmissionOutcome {
        self.cancel_auto_clear();
        {
            let mut state = lock(&self.state);
            state.is_loading = true;
            state.error = None;
            state.success = false;
        }
        let _loading = LoadingGuard(Arc::clone(&self.state));

        let outcome = match self.deliver(&submission).await {
            Ok(None) => SubmissionOutcome::Delivered,
            Ok(Some(warning)) => SubmissionOutcome::PartiallyDelivered { warning },
            Err(e) => SubmissionOutcome::Failed(e),
        };

        match &outcome {
            SubmissionOutcome::Delivered => {
                tracing::info!("Signup delivered to operator and subscriber");
                self.finish_successfully(None);
            }
            SubmissionOutcome::PartiallyDelivered { warning } => {
                tracing::warn!("Signup delivered to operator only");
                self.finish_successfully(Some(warning.clone()));
            }
            SubmissionOutcome::Failed(e) => {
                tracing::warn!(error.message = %e, error.cause_chain = ?e, "Signup failed");
                let mut state = lock(&self.state);
                state.error = Some(e.to_string());
                state.success = false;
            }
        }

        outcome
    }

    /// `Ok(Some(warning))` when only the auto-response failed.
    async fn deliver(
        &mut self,
        submission: &SubscriberSubmission,
    ) -> Result<Option<String>, SubmissionError> {
        let email = SubscriberEmail::parse(submission.email.clone())
            .map_err(SubmissionError::ValidationError)?;

        if !is_configuration_complete(&self.config) {
            return Err(SubmissionError::ConfigurationError(
                self.config.missing_identifiers(),
            ));
        }
        self.relay.initialize(&self.config.public_key);

        let name = SubscriberName::from_email(&email);
        let timestamp = submission.timestamp();

        let notification =
            notification_params(&email, &name, submission, &timestamp, &self.operator);
        self.relay
            .send(
                &self.config.service_id,
                &self.config.notify_template_id,
                &notification,
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    status = ?e.status,
                    text = ?e.text,
                    message = ?e.message,
                    "Failed to send the operator notification"
                );
                SubmissionError::DeliveryError(e)
            })?;

        let auto_response = auto_response_params(&email, &name, &timestamp);
        if let Err(e) = self
            .relay
            .send(
                &self.config.service_id,
                &self.config.auto_response_template_id,
                &auto_response,
            )
            .await
        {
            tracing::error!(
                status = ?e.status,
                text = ?e.text,
                message = ?e.message,
                "Failed to send the subscriber auto-response"
            );
            return Ok(Some(auto_response_warning(
                &self.config.auto_response_template_id,
            )));
        }

        Ok(None)
    }

    fn finish_successfully(&mut self, warning: Option<String>) {
        {
            let mut state = lock(&self.state);
            state.success = true;
            state.error = warning;
        }
        self.schedule_auto_clear();
    }

    fn schedule_auto_clear(&mut self) {
        self.cancel_auto_clear();
        let state = Arc::clone(&self.state);
        self.auto_clear = Some(tokio::spawn(async move {
            tokio::time::sleep(AUTO_CLEAR_AFTER).await;
            lock(&state).success = false;
        }));
    }

    fn cancel_auto_clear(&mut self) {
        if let Some(handle) = self.auto_clear.take() {
            handle.abort();
        }
    }
}

impl<R> Drop for SubmissionWorkflow<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.auto_clear.take() {
            handle.abort();
        }
    }
}

/// Clears `is_loading` however the attempt ends.
struct LoadingGuard(Arc<Mutex<SubmissionState>>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        lock(&self.0).is_loading = false;
    }
}

fn lock(state: &Mutex<SubmissionState>) -> MutexGuard<'_, SubmissionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn notification_params(
    email: &SubscriberEmail,
    name: &SubscriberName,
    submission: &SubscriberSubmission,
    timestamp: &str,
    operator: &SubscriberEmail,
) -> TemplateParams {
    TemplateParams::from([
        ("user_email".to_string(), email.as_ref().to_string()),
        ("timestamp".to_string(), timestamp.to_string()),
        (
            "user_device".to_string(),
            DeviceClass::from_user_agent(&submission.user_agent).to_string(),
        ),
        ("user_agent".to_string(), submission.user_agent.clone()),
        ("user_name".to_string(), name.as_ref().to_string()),
        ("join_date".to_string(), submission.join_date()),
        ("to_email".to_string(), operator.as_ref().to_string()),
    ])
}

fn auto_response_params(
    email: &SubscriberEmail,
    name: &SubscriberName,
    timestamp: &str,
) -> TemplateParams {
    // Templates in the wild address the subscriber under any of these names.
    TemplateParams::from([
        ("user_name".to_string(), name.as_ref().to_string()),
        ("user_email".to_string(), email.as_ref().to_string()),
        ("recipient_email".to_string(), email.as_ref().to_string()),
        ("to_email".to_string(), email.as_ref().to_string()),
        ("timestamp".to_string(), timestamp.to_string()),
    ])
}

/// User-facing text for a failed operator notification.
pub fn delivery_error_message(e: &RelayError) -> String {
    match e.status {
        Some(400) | Some(422) => "Invalid email configuration. Please ensure the EmailJS template \
            'To' field is set to {{to_email}} in the dashboard."
            .to_string(),
        Some(401) => "Email service authentication failed.".to_string(),
        Some(402) => "Email service quota exceeded.".to_string(),
        _ => match (e.text.as_deref(), e.message.as_deref()) {
            (Some(text), _) => format!("Email error: {text}"),
            (None, Some(message)) => format!("Email error: {message}"),
            (None, None) => "Failed to send email. Please try again.".to_string(),
        },
    }
}

fn auto_response_warning(template_id: &str) -> String {
    format!(
        "Failed to send auto-response email to subscriber. Please check the EmailJS template \
        ({template_id}) 'To' field is set to {{{{to_email}}}}. Collection email sent successfully."
    )
}
