//! TripBuddy core
//!
//! Operational entry point: `tripbuddy migrate` applies the embedded
//! migrations, `tripbuddy check` (the default) boots every service and
//! reports collaborator health.

use anyhow::Context;
use tracing::{info, warn, error};

use tripbuddy::{
    config::Settings,
    utils::logging,
    database::{create_pool, run_migrations},
    services::ServiceFactory,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Check,
    Migrate,
}

fn parse_command(arg: Option<&str>) -> anyhow::Result<Command> {
    match arg {
        None | Some("check") => Ok(Command::Check),
        Some("migrate") => Ok(Command::Migrate),
        Some(other) => anyhow::bail!("unknown command '{}', expected 'check' or 'migrate'", other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let command = parse_command(std::env::args().nth(1).as_deref())?;

    // Load configuration
    let settings = Settings::new().context("failed to load settings")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {} ({:?})", tripbuddy::info(), command);

    info!("Connecting to database...");
    let pool = create_pool(&settings.database).await?;
    run_migrations(&pool).await?;

    if command == Command::Migrate {
        info!("Migrations applied, exiting");
        return Ok(());
    }

    let services = ServiceFactory::new(settings.clone(), pool)?;
    let health = services.health_check().await;

    for issue in health.get_issues() {
        warn!(issue = %issue, "Health issue detected");
    }

    if !health.is_healthy() {
        error!("TripBuddy core is not healthy");
        anyhow::bail!("health check failed");
    }

    info!(redis_healthy = health.redis_healthy, "TripBuddy core is ready");
    Ok(())
}
