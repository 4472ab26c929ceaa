//! # Category Service
//!
//! Category lookups on top of the generic [`RecordRepository`]. Categories
//! carry an income or expense kind; records stored with any other kind are
//! still listed, with `kind` left empty.

use shared::{Category, EntryKind};

use super::outcome::Outcome;
use super::record_repository::RecordRepository;
use crate::storage::{Condition, RecordClient};

pub type CategoryRepository<C> = RecordRepository<Category, C>;

impl<C: RecordClient> RecordRepository<Category, C> {
    pub async fn get_by_type_outcome(&self, kind: EntryKind) -> Outcome<Vec<Category>> {
        self.query_outcome("get by type", vec![Condition::equal_to("type_c", kind.as_str())])
            .await
    }

    /// Income or expense categories
    pub async fn get_by_type(&self, kind: EntryKind) -> Vec<Category> {
        self.get_by_type_outcome(kind).await.ok().unwrap_or_default()
    }
}
