//! Shared fixtures for repository tests.

use shared::{BudgetDraft, CategoryDraft, EntryKind, SavingsGoalDraft, TransactionDraft};
use std::sync::Arc;

use crate::storage::MemoryRecordClient;
use crate::RecordServices;

/// An in-memory record store with all four repositories wired to it
pub struct TestEnvironment {
    pub client: Arc<MemoryRecordClient>,
    pub services: RecordServices<MemoryRecordClient>,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let client = Arc::new(MemoryRecordClient::new());
        let services = RecordServices::new(Arc::clone(&client));
        Self { client, services }
    }
}

pub fn budget_draft(category: &str, monthly_limit: f64, month: &str, year: i32) -> BudgetDraft {
    BudgetDraft {
        name: None,
        category: category.to_string(),
        monthly_limit,
        month: month.to_string(),
        year,
    }
}

pub fn category_draft(name: &str, kind: EntryKind) -> CategoryDraft {
    CategoryDraft {
        name: None,
        display_name: name.to_string(),
        kind,
        color: "#22c55e".to_string(),
        is_custom: true,
    }
}

pub fn savings_goal_draft(title: &str, target_amount: f64, deadline: &str) -> SavingsGoalDraft {
    SavingsGoalDraft {
        title: title.to_string(),
        target_amount,
        current_amount: None,
        deadline: deadline.to_string(),
    }
}

/// An expense entry
pub fn transaction_draft(amount: f64, category: &str, description: &str, date: &str) -> TransactionDraft {
    TransactionDraft {
        amount,
        category: category.to_string(),
        kind: EntryKind::Expense,
        description: description.to_string(),
        date: date.to_string(),
    }
}
