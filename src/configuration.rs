use std::time::Duration;

use secrecy::SecretString;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings {
    pub app: ApplicationSettings,
    pub relay: RelaySettings,
    #[serde(default)]
    pub delivery: DeliveryConfiguration,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct RelaySettings {
    pub base_url: String,
    pub operator_email: String,
    pub access_token: Option<SecretString>,
    pub timeout_ms: u64,
}

impl RelaySettings {
    pub fn client(self) -> Result<EmailClient, anyhow::Error> {
        let timeout = self.timeout();
        EmailClient::new(self.base_url, self.access_token, timeout)
    }

    pub fn operator(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.operator_email.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// The four relay identifiers every send needs.
///
/// Each field defaults to an empty string so a missing environment variable
/// surfaces as an incomplete configuration at submission time rather than as
/// a startup failure.
#[derive(serde::Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryConfiguration {
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub notify_template_id: String,
    #[serde(default)]
    pub auto_response_template_id: String,
}

impl DeliveryConfiguration {
    /// Names of the identifiers that are empty or still hold their placeholder.
    pub fn missing_identifiers(&self) -> Vec<&'static str> {
        [
            ("PUBLIC_KEY", self.public_key.as_str(), "YOUR_PUBLIC_KEY"),
            ("SERVICE_ID", self.service_id.as_str(), "YOUR_SERVICE_ID"),
            (
                "TEMPLATE_ID",
                self.notify_template_id.as_str(),
                "YOUR_TEMPLATE_ID",
            ),
            (
                "AUTORESPONSE_TEMPLATE_ID",
                self.auto_response_template_id.as_str(),
                "YOUR_AUTORESPONSE_TEMPLATE_ID",
            ),
        ]
        .into_iter()
        .filter(|(_, value, placeholder)| is_unset(value, placeholder))
        .map(|(name, _, _)| name)
        .collect()
    }
}

fn is_unset(value: &str, placeholder: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == placeholder
}

/// Reports whether every relay identifier is present.
///
/// Never fails: missing identifiers are logged and the boolean is the only
/// result callers may rely on.
pub fn is_configuration_complete(config: &DeliveryConfiguration) -> bool {
    let missing = config.missing_identifiers();
    if !missing.is_empty() {
        tracing::error!(?missing, "Missing email relay configuration");
        return false;
    }

    tracing::debug!("Email relay configuration validated successfully");
    true
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "{other} is not supported environment. Try to use `local` or `production`",
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, anyhow::Error> {
    let base_path = std::env::current_dir()?;
    let conf_dir = base_path.join("configuration");
    let env: Environment = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(anyhow::Error::msg)?;

    let settings = config::Config::builder()
        .add_source(config::File::from(conf_dir.join("base")).required(true))
        .add_source(config::File::from(conf_dir.join(env.as_str())).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .prefix_separator("_"),
        )
        .build()?;

    Ok(settings.try_deserialize::<Settings>()?)
}
