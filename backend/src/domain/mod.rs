//! # Domain Module
//!
//! Typed access to the budget tracker's four record collections. One generic
//! [`RecordRepository`] does the work; each entity contributes a schema and a
//! few queries of its own.
//!
//! ## Repositories
//!
//! - **BudgetRepository**: monthly limits per category, with month lookup and upsert
//! - **CategoryRepository**: income and expense categories, filterable by type
//! - **SavingsGoalRepository**: goals ordered by deadline, with amount adjustment
//! - **TransactionRepository**: entries newest first, filterable by month and category

pub mod budget_service;
pub mod category_service;
pub mod entities;
pub mod outcome;
pub mod record_repository;
pub mod savings_goal_service;
pub mod schema;
pub mod transaction_service;

pub use budget_service::BudgetRepository;
pub use category_service::CategoryRepository;
pub use entities::Entity;
pub use outcome::Outcome;
pub use record_repository::RecordRepository;
pub use savings_goal_service::SavingsGoalRepository;
pub use schema::{FieldKind, FieldSpec, Fill, Literal, RecordSchema, SortKey, WriteMode};
pub use transaction_service::TransactionRepository;
