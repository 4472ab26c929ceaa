use anyhow::{Context, Result};
use budget_tracker_backend::config::ClientConfig;
use budget_tracker_backend::{initialize_services, logging};
use serde::Serialize;
use tracing::info;

fn print_collection<T: Serialize>(label: &str, records: &[T]) -> Result<()> {
    println!("{}: {} record(s)", label, records.len());
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::load().context("Failed to load record store configuration")?;
    logging::init(&config.log_level);
    info!("Loaded configuration: {:?}", config);

    let services = initialize_services(&config).context("Failed to initialize record services")?;

    print_collection("budgets", &services.budgets.list().await)?;
    print_collection("categories", &services.categories.list().await)?;
    print_collection("savings goals", &services.savings_goals.list().await)?;
    print_collection("transactions", &services.transactions.list().await)?;

    Ok(())
}
