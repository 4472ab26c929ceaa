//! Schemas of the four record collections and their binding to the shared
//! record types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{Budget, BudgetDraft, Category, CategoryDraft, SavingsGoal, SavingsGoalDraft, Transaction, TransactionDraft};

use super::schema::{FieldSpec, Fill, Literal, RecordSchema, SortKey};
use crate::storage::SortDirection;

/// A record type stored in one collection of the record store
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    /// Typed input for create and update
    type Draft: Serialize + Send + Sync;

    const SCHEMA: &'static RecordSchema;
}

const EMPTY: Fill = Fill::DraftOr(Literal::Text(""));

const BUDGET_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("Name").sources(&["Name", "category_c"]).fill(EMPTY),
    FieldSpec::text("category_c"),
    FieldSpec::decimal("monthly_limit_c"),
    FieldSpec::text("month_c"),
    FieldSpec::integer("year_c"),
];

pub const BUDGET_SCHEMA: RecordSchema = RecordSchema {
    collection: "budget_c",
    label: "budget",
    fields: BUDGET_FIELDS,
    order: None,
};

const CATEGORY_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("Name").sources(&["Name", "name_c"]).fill(EMPTY),
    FieldSpec::text("name_c").sources(&["name_c", "Name"]).fill(EMPTY),
    FieldSpec::text("type_c"),
    FieldSpec::text("color_c"),
    FieldSpec::boolean("is_custom_c").on_create(Fill::Literal(Literal::Bool(true))),
];

pub const CATEGORY_SCHEMA: RecordSchema = RecordSchema {
    collection: "category_c",
    label: "category",
    fields: CATEGORY_FIELDS,
    order: None,
};

const SAVINGS_GOAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("Name").sources(&["title_c", "Name"]).fill(EMPTY),
    FieldSpec::text("title_c"),
    FieldSpec::decimal("target_amount_c"),
    FieldSpec::decimal("current_amount_c").on_create(Fill::DraftOr(Literal::Number(0.0))),
    FieldSpec::text("deadline_c"),
    FieldSpec::timestamp("created_at_c").on_create(Fill::Now).on_update(Fill::Skip),
];

pub const SAVINGS_GOAL_SCHEMA: RecordSchema = RecordSchema {
    collection: "savings_goal_c",
    label: "savings goal",
    fields: SAVINGS_GOAL_FIELDS,
    order: Some(SortKey {
        field: "deadline_c",
        direction: SortDirection::Ascending,
    }),
};

const TRANSACTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("Name").sources(&["description_c", "Name"]).fill(EMPTY),
    FieldSpec::decimal("amount_c"),
    FieldSpec::text("category_c"),
    FieldSpec::text("type_c"),
    FieldSpec::text("description_c"),
    FieldSpec::text("date_c"),
    FieldSpec::timestamp("created_at_c").on_create(Fill::Now).on_update(Fill::Skip),
];

pub const TRANSACTION_SCHEMA: RecordSchema = RecordSchema {
    collection: "transaction_c",
    label: "transaction",
    fields: TRANSACTION_FIELDS,
    order: Some(SortKey {
        field: "date_c",
        direction: SortDirection::Descending,
    }),
};

impl Entity for Budget {
    type Draft = BudgetDraft;
    const SCHEMA: &'static RecordSchema = &BUDGET_SCHEMA;
}

impl Entity for Category {
    type Draft = CategoryDraft;
    const SCHEMA: &'static RecordSchema = &CATEGORY_SCHEMA;
}

impl Entity for SavingsGoal {
    type Draft = SavingsGoalDraft;
    const SCHEMA: &'static RecordSchema = &SAVINGS_GOAL_SCHEMA;
}

impl Entity for Transaction {
    type Draft = TransactionDraft;
    const SCHEMA: &'static RecordSchema = &TRANSACTION_SCHEMA;
}
