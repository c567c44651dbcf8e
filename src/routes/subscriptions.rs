use actix_web::{
    HttpRequest, HttpResponse, ResponseError,
    http::{StatusCode, header::USER_AGENT},
    web,
};

use crate::{
    configuration::DeliveryConfiguration,
    domain::SubscriberSubmission,
    email_client::EmailClient,
    startup::OperatorEmail,
    submission::{SubmissionError, SubmissionOutcome, SubmissionState, SubmissionWorkflow},
};

use super::helpers::error_chain_fmt;

#[derive(serde::Deserialize)]
pub struct FormData {
    pub email: String,
}

#[derive(thiserror::Error)]
#[error("{source}")]
pub struct SubscribeError {
    #[source]
    source: SubmissionError,
    state: SubmissionState,
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self.source {
            SubmissionError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SubmissionError::ConfigurationError(_) => StatusCode::SERVICE_UNAVAILABLE,
            SubmissionError::DeliveryError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.state)
    }
}

#[tracing::instrument(
    name = "Adding a new waitlist subscriber.",
    skip(req, form, email_client, delivery, operator),
    fields(subscriber_email = %form.email)
)]
pub async fn subscribe(
    req: HttpRequest,
    form: web::Form<FormData>,
    email_client: web::Data<EmailClient>,
    delivery: web::Data<DeliveryConfiguration>,
    operator: web::Data<OperatorEmail>,
) -> Result<HttpResponse, SubscribeError> {
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let submission = SubscriberSubmission::new(form.0.email.trim(), user_agent);

    let mut workflow = SubmissionWorkflow::new(
        email_client.get_ref().clone(),
        delivery.get_ref().clone(),
        operator.0.clone(),
    );

    match workflow.run(submission).await {
        SubmissionOutcome::Failed(source) => Err(SubscribeError {
            source,
            state: workflow.state(),
        }),
        SubmissionOutcome::Delivered | SubmissionOutcome::PartiallyDelivered { .. } => {
            Ok(HttpResponse::Ok().json(workflow.state()))
        }
    }
}
