//! Hosted expense table.
//!
//! The hosted variant keeps expenses as rows of a shared table scoped by user
//! instead of a per-period document. [`ExpenseTable`] is the one contract the
//! rest of the code talks to; [`MemoryTable`] backs tests and
//! [`DatabaseTable`] backs production. Every successful write is broadcast as
//! a [`TableChange`], and [`ExpenseFeed`] folds those changes into a local
//! mirror by id.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{ExpenseEntry, ExpensePatch, NewExpense, PeriodKey, ResultEngine};

pub use database::DatabaseTable;
pub use feed::ExpenseFeed;
pub use memory::MemoryTable;

mod database;
mod feed;
mod memory;

/// Capacity of the change channel of each table.
pub(crate) const CHANGE_CAPACITY: usize = 256;

/// Category given to rows inserted without one.
pub const DEFAULT_CATEGORY: &str = "general";

/// An expense as stored in the hosted table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub entry: ExpenseEntry,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl ExpenseRow {
    pub fn id(&self) -> &str {
        &self.entry.id
    }

    /// Day the expense belongs to; rows without a date fall back to their
    /// creation day.
    pub fn date(&self) -> NaiveDate {
        self.entry
            .date
            .unwrap_or_else(|| self.created_at.date_naive())
    }

    pub fn period(&self) -> PeriodKey {
        PeriodKey::from_date(self.date())
    }
}

/// A write observed on the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TableChange {
    Inserted(ExpenseRow),
    Updated(ExpenseRow),
    Deleted { id: String, user_id: String },
}

impl TableChange {
    pub fn user_id(&self) -> &str {
        match self {
            Self::Inserted(row) | Self::Updated(row) => &row.user_id,
            Self::Deleted { user_id, .. } => user_id,
        }
    }
}

/// List, write and watch one table of expenses.
///
/// Every operation is scoped to `user_id`; rows of another user behave as if
/// they did not exist.
pub trait ExpenseTable: Send + Sync {
    /// Rows of `user_id`, newest date first.
    fn list(&self, user_id: &str) -> impl Future<Output = ResultEngine<Vec<ExpenseRow>>> + Send;

    /// Validates and stores a new row. Missing date and category are filled
    /// with today and [`DEFAULT_CATEGORY`].
    fn insert(
        &self,
        user_id: &str,
        draft: NewExpense,
    ) -> impl Future<Output = ResultEngine<ExpenseRow>> + Send;

    fn update(
        &self,
        user_id: &str,
        id: &str,
        patch: ExpensePatch,
    ) -> impl Future<Output = ResultEngine<ExpenseRow>> + Send;

    fn delete(&self, user_id: &str, id: &str) -> impl Future<Output = ResultEngine<()>> + Send;

    /// Receives every change made after this call.
    fn subscribe(&self) -> broadcast::Receiver<TableChange>;
}

/// Builds the row stored by `insert`.
pub(crate) fn new_row(user_id: &str, mut draft: NewExpense) -> ResultEngine<ExpenseRow> {
    let created_at = Utc::now();
    draft.date.get_or_insert_with(|| created_at.date_naive());
    draft
        .category
        .get_or_insert_with(|| DEFAULT_CATEGORY.to_string());
    Ok(ExpenseRow {
        entry: ExpenseEntry::new(draft)?,
        user_id: user_id.to_string(),
        created_at,
    })
}

/// Orders rows newest date first, then newest creation first.
pub(crate) fn sort_newest_first(rows: &mut [ExpenseRow]) {
    rows.sort_by(|a, b| {
        b.date()
            .cmp(&a.date())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}
