pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod relay;
pub mod routes;
pub mod startup;
pub mod submission;
pub mod telemetry;
