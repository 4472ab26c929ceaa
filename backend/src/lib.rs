//! # Budget Tracker Backend
//!
//! Typed record services for the budget tracker. The hosted record store is
//! reached through a [`storage::RecordClient`]; the [`domain`] layer puts one
//! repository per collection on top of it.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use budget_tracker_backend::{config::ClientConfig, initialize_services};
//!
//! let config = ClientConfig::load()?;
//! let services = initialize_services(&config)?;
//! for budget in services.budgets.get_by_month("2024-01").await {
//!     println!("{}: {}", budget.category, budget.monthly_limit);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tracing::info;

pub mod config;
pub mod domain;
pub mod logging;
pub mod storage;

#[cfg(test)]
pub mod test_utils;

use config::ClientConfig;
use domain::{BudgetRepository, CategoryRepository, SavingsGoalRepository, TransactionRepository};
use storage::{HttpRecordClient, RecordClient, RecordError};

/// The four repositories, sharing one client
pub struct RecordServices<C> {
    pub budgets: BudgetRepository<C>,
    pub categories: CategoryRepository<C>,
    pub savings_goals: SavingsGoalRepository<C>,
    pub transactions: TransactionRepository<C>,
}

impl<C: RecordClient> RecordServices<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            budgets: BudgetRepository::new(Arc::clone(&client)),
            categories: CategoryRepository::new(Arc::clone(&client)),
            savings_goals: SavingsGoalRepository::new(Arc::clone(&client)),
            transactions: TransactionRepository::new(client),
        }
    }
}

impl<C> Clone for RecordServices<C> {
    fn clone(&self) -> Self {
        Self {
            budgets: self.budgets.clone(),
            categories: self.categories.clone(),
            savings_goals: self.savings_goals.clone(),
            transactions: self.transactions.clone(),
        }
    }
}

/// Build the HTTP client from `config` and wire every repository to it
pub fn initialize_services(config: &ClientConfig) -> Result<RecordServices<HttpRecordClient>, RecordError> {
    info!("Connecting to record store at {} (project {})", config.api_url, config.project_id);
    let client = Arc::new(HttpRecordClient::new(config)?);
    Ok(RecordServices::new(client))
}
