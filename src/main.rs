use profile_ingestion::{config::{Settings, CONFIG_PATH_VAR}, harvest_service::HarvestService};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("profile_ingestion=debug".parse()?)
            .add_directive("reqwest=warn".parse()?)
            .add_directive("hyper=warn".parse()?))
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting profile ingestion");
    debug!("Environment variables: {}={}", CONFIG_PATH_VAR,
        std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "not set".to_string()));

    let settings = Settings::from_env()?;
    let service = HarvestService::new(settings)?;
    info!("Harvest service initialized successfully");

    let report = service.run().await?;
    for user in report.users.iter().filter(|u| !u.is_complete()) {
        warn!("{} incomplete: {}", user.username, user.errors.join("; "));
    }
    Ok(())
}
