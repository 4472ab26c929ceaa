//! # Budget Service
//!
//! Budget-specific queries on top of the generic [`RecordRepository`]:
//! month lookups and the category/month upsert used when a limit is edited.

use serde_json::Value;
use shared::Budget;
use tracing::{info, warn};

use super::outcome::Outcome;
use super::record_repository::RecordRepository;
use crate::storage::{record_id_of, Condition, RecordClient, RecordData, RecordError};

pub type BudgetRepository<C> = RecordRepository<Budget, C>;

impl<C: RecordClient> RecordRepository<Budget, C> {
    pub async fn get_by_month_outcome(&self, month: &str) -> Outcome<Vec<Budget>> {
        self.query_outcome("get by month", vec![Condition::equal_to("month_c", month)])
            .await
    }

    /// Budgets whose month token equals `month`, e.g. "2024-01"
    pub async fn get_by_month(&self, month: &str) -> Vec<Budget> {
        self.get_by_month_outcome(month).await.ok().unwrap_or_default()
    }

    /// Set the limit for a category in a month, creating the budget if it
    /// does not exist yet.
    ///
    /// This is a lookup followed by a write with no guard in between, so two
    /// concurrent calls for the same key can both create a record. A lookup the
    /// store answers with `success: false` is treated like a miss; a faulted
    /// lookup writes nothing.
    pub async fn upsert_budget_outcome(&self, category: &str, monthly_limit: f64, month: &str, year: i32) -> Outcome<Budget> {
        let conditions = vec![
            Condition::equal_to("category_c", category),
            Condition::equal_to("month_c", month),
            Condition::equal_to("year_c", year),
        ];

        match self.fetch_raw(conditions, false).await {
            Ok(records) => {
                if let Some(mut existing) = records.into_iter().next() {
                    let id = match record_id_of(self.schema().collection, &existing) {
                        Ok(id) => id,
                        Err(e) => return self.report("upsert", Outcome::Failure(e)),
                    };
                    info!("Updating {} budget for {} to {}", category, month, monthly_limit);
                    existing.insert("monthly_limit_c".to_string(), Value::from(monthly_limit));
                    return self.update_from_outcome(id, &existing).await;
                }
            }
            Err(RecordError::Unsuccessful(message)) => {
                warn!("Budget lookup for {} in {} was unsuccessful, creating instead: {}", category, month, message)
            }
            Err(e) => return self.report("upsert", Outcome::Failure(e)),
        }

        let mut data = RecordData::new();
        data.insert("Name".to_string(), Value::from(category));
        data.insert("category_c".to_string(), Value::from(category));
        data.insert("monthly_limit_c".to_string(), Value::from(monthly_limit));
        data.insert("month_c".to_string(), Value::from(month));
        data.insert("year_c".to_string(), Value::from(year));

        self.create_from_outcome(&data).await
    }

    pub async fn upsert_budget(&self, category: &str, monthly_limit: f64, month: &str, year: i32) -> Option<Budget> {
        self.upsert_budget_outcome(category, monthly_limit, month, year)
            .await
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{
        BatchResponse, DeleteParams, FetchParams, FetchResponse, GetParams, GetResponse, InjectedFailure,
        MemoryRecordClient, RecordedRequest, WriteParams,
    };
    use crate::test_utils::{budget_draft, TestEnvironment};
    use async_trait::async_trait;
    use shared::RecordId;
    use std::sync::Arc;

    /// Store whose listing requests fault while every other call succeeds
    struct FetchFaults {
        inner: MemoryRecordClient,
    }

    #[async_trait]
    impl RecordClient for FetchFaults {
        async fn fetch_records(&self, _collection: &str, _params: &FetchParams) -> Result<FetchResponse, RecordError> {
            Err(RecordError::Fault("connection reset".to_string()))
        }

        async fn get_record_by_id(&self, collection: &str, id: RecordId, params: &GetParams) -> Result<GetResponse, RecordError> {
            self.inner.get_record_by_id(collection, id, params).await
        }

        async fn create_record(&self, collection: &str, params: &WriteParams) -> Result<BatchResponse, RecordError> {
            self.inner.create_record(collection, params).await
        }

        async fn update_record(&self, collection: &str, params: &WriteParams) -> Result<BatchResponse, RecordError> {
            self.inner.update_record(collection, params).await
        }

        async fn delete_record(&self, collection: &str, params: &DeleteParams) -> Result<BatchResponse, RecordError> {
            self.inner.delete_record(collection, params).await
        }
    }

    #[tokio::test]
    async fn test_get_by_month_filters_on_month_token() {
        let env = TestEnvironment::new();
        let budgets = &env.services.budgets;
        budgets.create(&budget_draft("Food", 500.0, "2024-01", 2024)).await.unwrap();
        budgets.create(&budget_draft("Rent", 1200.0, "2024-01", 2024)).await.unwrap();
        budgets.create(&budget_draft("Food", 450.0, "2024-02", 2024)).await.unwrap();

        let january = budgets.get_by_month("2024-01").await;
        assert_eq!(january.len(), 2);
        assert!(january.iter().all(|b| b.month == "2024-01"));
        assert!(budgets.get_by_month("2023-12").await.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_twice_keeps_one_record() {
        let env = TestEnvironment::new();
        let budgets = &env.services.budgets;

        let first = budgets.upsert_budget("Food", 500.0, "2024-01", 2024).await.unwrap();
        let second = budgets.upsert_budget("Food", 650.0, "2024-01", 2024).await.unwrap();

        assert_eq!(first.id, second.id);
        let all = budgets.list().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].monthly_limit, 650.0);
        assert_eq!(all[0].name, "Food");
        assert_eq!(all[0].year, 2024);
    }

    #[tokio::test]
    async fn test_upsert_keys_on_category_month_and_year() {
        let env = TestEnvironment::new();
        let budgets = &env.services.budgets;

        budgets.upsert_budget("Food", 500.0, "2024-01", 2024).await.unwrap();
        budgets.upsert_budget("Food", 500.0, "2024-01", 2025).await.unwrap();
        budgets.upsert_budget("Rent", 900.0, "2024-01", 2024).await.unwrap();

        assert_eq!(budgets.list().await.len(), 3);
    }

    #[tokio::test]
    async fn test_upsert_sends_three_conditions_then_creates() {
        let env = TestEnvironment::new();
        env.services.budgets.upsert_budget("Food", 500.0, "2024-01", 2024).await.unwrap();

        let requests = env.client.requests().await;
        assert_eq!(requests.len(), 2);
        match &requests[0] {
            RecordedRequest::Fetch { params, .. } => assert_eq!(params.conditions.len(), 3),
            other => panic!("unexpected request: {:?}", other),
        }
        assert!(matches!(requests[1], RecordedRequest::Create { .. }));
    }

    #[tokio::test]
    async fn test_upsert_failure_is_none() {
        let env = TestEnvironment::new();
        env.client
            .inject_failure(InjectedFailure::Unsuccessful("Access denied".to_string()))
            .await;

        assert_eq!(env.services.budgets.upsert_budget("Food", 500.0, "2024-01", 2024).await, None);
        assert!(env.services.budgets.get_by_month("2024-01").await.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_writes_nothing_when_lookup_faults() {
        let inner = MemoryRecordClient::new();
        let client = Arc::new(FetchFaults { inner: inner.clone() });
        let budgets: BudgetRepository<FetchFaults> = RecordRepository::new(client);

        let outcome = budgets.upsert_budget_outcome("Food", 500.0, "2024-01", 2024).await;
        assert!(matches!(outcome.error(), Some(RecordError::Fault(_))));
        assert_eq!(budgets.upsert_budget("Food", 500.0, "2024-01", 2024).await, None);

        assert!(inner.records("budget_c").await.is_empty());
        assert!(inner.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_creates_after_unsuccessful_lookup() {
        let env = TestEnvironment::new();
        env.client
            .inject_failure(InjectedFailure::Unsuccessful("Index not ready".to_string()))
            .await;
        assert_eq!(env.services.budgets.upsert_budget("Food", 500.0, "2024-01", 2024).await, None);

        let requests = env.client.requests().await;
        assert_eq!(requests.len(), 2);
        assert!(matches!(requests[1], RecordedRequest::Create { .. }));
    }
}
