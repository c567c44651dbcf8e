use playsync::{
    configuration::{get_configuration, is_configuration_complete},
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("playsync".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = get_configuration()?;
    if !is_configuration_complete(&config.delivery) {
        tracing::warn!(
            "Email relay is not fully configured. Check your APP_DELIVERY__* environment variables."
        );
    }

    let app = Application::build(config).await?;
    if let Err(e) = app.run_until_stopped().await {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "API failed"
        );
        return Err(e.into());
    }
    tracing::info!("API has exited");

    Ok(())
}
