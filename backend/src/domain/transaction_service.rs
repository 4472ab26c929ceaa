//! # Transaction Service
//!
//! Income and expense entries. The full listing is newest first; the month
//! and category queries come back in store order.

use shared::Transaction;

use super::outcome::Outcome;
use super::record_repository::RecordRepository;
use crate::storage::{Condition, RecordClient};

pub type TransactionRepository<C> = RecordRepository<Transaction, C>;

impl<C: RecordClient> RecordRepository<Transaction, C> {
    pub async fn get_by_month_outcome(&self, month: &str) -> Outcome<Vec<Transaction>> {
        self.query_outcome("get by month", vec![Condition::starts_with("date_c", month)])
            .await
    }

    /// Transactions dated within `month` ("2024-01" matches "2024-01-15")
    pub async fn get_by_month(&self, month: &str) -> Vec<Transaction> {
        self.get_by_month_outcome(month).await.ok().unwrap_or_default()
    }

    pub async fn get_by_category_outcome(&self, category: &str) -> Outcome<Vec<Transaction>> {
        self.query_outcome("get by category", vec![Condition::equal_to("category_c", category)])
            .await
    }

    pub async fn get_by_category(&self, category: &str) -> Vec<Transaction> {
        self.get_by_category_outcome(category).await.ok().unwrap_or_default()
    }
}
