use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::{ExpenseEntry, ExpensesByPeriod, ResultEngine};

use super::{ExpenseRow, ExpenseTable, TableChange};

/// Local mirror of one user's rows, kept current by applying [`TableChange`]s.
///
/// Changes are reconciled by id. Inserting an id already present replaces
/// it, updating an unknown id inserts it, deleting an unknown id is a no-op.
#[derive(Clone, Debug, Default)]
pub struct ExpenseFeed {
    user_id: String,
    rows: Vec<ExpenseRow>,
}

impl ExpenseFeed {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            rows: Vec::new(),
        }
    }

    /// Initial fetch.
    pub async fn load<T: ExpenseTable>(
        table: &T,
        user_id: impl Into<String>,
    ) -> ResultEngine<Self> {
        let mut feed = Self::new(user_id);
        feed.reload(table).await?;
        Ok(feed)
    }

    pub async fn reload<T: ExpenseTable>(&mut self, table: &T) -> ResultEngine<()> {
        self.rows = table.list(&self.user_id).await?;
        Ok(())
    }

    pub fn rows(&self) -> &[ExpenseRow] {
        &self.rows
    }

    /// Applies one change. Changes for other users are ignored.
    pub fn apply(&mut self, change: TableChange) {
        if change.user_id() != self.user_id {
            return;
        }

        match change {
            TableChange::Inserted(row) => match self.position(row.id()) {
                Some(index) => self.rows[index] = row,
                None => self.rows.insert(0, row),
            },
            TableChange::Updated(row) => match self.position(row.id()) {
                Some(index) => self.rows[index] = row,
                None => self.rows.insert(0, row),
            },
            TableChange::Deleted { id, .. } => {
                self.rows.retain(|row| row.id() != id);
            }
        }
    }

    /// Applies every change waiting on `changes` and returns how many were
    /// received, ignored ones included. If the receiver fell behind, the
    /// mirror is reloaded from `table` before continuing.
    pub async fn catch_up<T: ExpenseTable>(
        &mut self,
        table: &T,
        changes: &mut broadcast::Receiver<TableChange>,
    ) -> ResultEngine<usize> {
        let mut applied = 0;
        loop {
            match changes.try_recv() {
                Ok(change) => {
                    self.apply(change);
                    applied += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("expense feed missed {skipped} change(s), reloading");
                    self.reload(table).await?;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        Ok(applied)
    }

    /// Rows grouped by the period of their date, ready for aggregation.
    pub fn by_period(&self) -> ExpensesByPeriod {
        let mut periods = ExpensesByPeriod::new();
        for row in &self.rows {
            periods
                .entry(row.period())
                .or_default()
                .push(row.entry.clone());
        }
        periods
    }

    pub fn entries(&self) -> impl Iterator<Item = &ExpenseEntry> {
        self.rows.iter().map(|row| &row.entry)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }
}
