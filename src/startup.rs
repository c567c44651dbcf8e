use crate::configuration::{DeliveryConfiguration, Settings};
use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::routes::{health_check, home, subscribe};
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use std::net::TcpListener;
use tera::Tera;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

/// Inbox that receives the new-subscriber notifications.
pub struct OperatorEmail(pub SubscriberEmail);

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let operator = config
            .relay
            .operator()
            .map_err(anyhow::Error::msg)
            .context("Invalid operator email address.")?;
        let email_client = config.relay.client()?;
        let templates = Tera::new("views/**/*").context("Failed to load page templates.")?;

        let address = format!("{}:{}", config.app.host, config.app.port);
        let listener =
            TcpListener::bind(&address).with_context(|| format!("Failed to bind {address}"))?;
        let port = listener.local_addr()?.port();
        tracing::info!("Listening on {}", listener.local_addr()?);

        let server = run(
            listener,
            email_client,
            config.delivery,
            OperatorEmail(operator),
            templates,
        )?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    delivery: DeliveryConfiguration,
    operator: OperatorEmail,
    templates: Tera,
) -> Result<Server, anyhow::Error> {
    let email_client = web::Data::new(email_client);
    let delivery = web::Data::new(delivery);
    let operator = web::Data::new(operator);
    let templates = web::Data::new(templates);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/", web::get().to(home))
            .route("/health_check", web::get().to(health_check))
            .route("/subscriptions", web::post().to(subscribe))
            .app_data(email_client.clone())
            .app_data(delivery.clone())
            .app_data(operator.clone())
            .app_data(templates.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
