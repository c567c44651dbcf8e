use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::relay::{Relay, RelayError, TemplateParams};

/// EmailJS REST client.
#[derive(Clone)]
pub struct EmailClient {
    http_client: Client,
    base_url: Url,
    public_key: Option<String>,
    access_token: Option<SecretString>,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a TemplateParams,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        access_token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        Ok(Self {
            http_client: Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed building the relay http client.")?,
            base_url: Url::parse(&base_url).context("Failed parsing base email api url.")?,
            public_key: None,
            access_token,
        })
    }
}

impl Relay for EmailClient {
    fn initialize(&mut self, public_key: &str) {
        self.public_key = Some(public_key.to_owned());
    }

    #[tracing::instrument(name = "Sending an email through the relay", skip(self, params))]
    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        params: &TemplateParams,
    ) -> Result<(), RelayError> {
        let Some(public_key) = self.public_key.as_deref() else {
            return Err(RelayError::with_message(
                "The public key is required. Initialize the relay before sending.",
            ));
        };

        let url = self
            .base_url
            .join("api/v1.0/email/send")
            .map_err(|e| RelayError::with_message(e.to_string()))?;

        let body = SendEmailRequest {
            service_id,
            template_id,
            user_id: public_key,
            template_params: params,
            access_token: self.access_token.as_ref().map(|t| t.expose_secret()),
        };

        let response = self
            .http_client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::with_message(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RelayError::with_status(status.as_u16(), text));
        }

        Ok(())
    }
}
