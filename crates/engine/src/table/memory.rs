use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;

use crate::{EngineError, ExpensePatch, NewExpense, ResultEngine};

use super::{CHANGE_CAPACITY, ExpenseRow, ExpenseTable, TableChange, new_row, sort_newest_first};

/// Table kept in process memory. Clones share rows and change channel.
#[derive(Clone, Debug)]
pub struct MemoryTable {
    rows: Arc<Mutex<Vec<ExpenseRow>>>,
    changes: broadcast::Sender<TableChange>,
}

impl Default for MemoryTable {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            changes,
        }
    }
}

impl MemoryTable {
    fn rows(&self) -> ResultEngine<MutexGuard<'_, Vec<ExpenseRow>>> {
        self.rows
            .lock()
            .map_err(|_| EngineError::Storage("memory table poisoned".to_string()))
    }

    fn publish(&self, change: TableChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

fn not_found(id: &str) -> EngineError {
    EngineError::KeyNotFound(format!("expense {id}"))
}

impl ExpenseTable for MemoryTable {
    async fn list(&self, user_id: &str) -> ResultEngine<Vec<ExpenseRow>> {
        let mut rows: Vec<ExpenseRow> = self
            .rows()?
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, user_id: &str, draft: NewExpense) -> ResultEngine<ExpenseRow> {
        let row = new_row(user_id, draft)?;
        self.rows()?.push(row.clone());
        self.publish(TableChange::Inserted(row.clone()));
        Ok(row)
    }

    async fn update(
        &self,
        user_id: &str,
        id: &str,
        patch: ExpensePatch,
    ) -> ResultEngine<ExpenseRow> {
        let updated = {
            let mut rows = self.rows()?;
            let row = rows
                .iter_mut()
                .find(|row| row.user_id == user_id && row.entry.id == id)
                .ok_or_else(|| not_found(id))?;
            row.entry.apply(patch)?;
            row.clone()
        };
        self.publish(TableChange::Updated(updated.clone()));
        Ok(updated)
    }

    async fn delete(&self, user_id: &str, id: &str) -> ResultEngine<()> {
        {
            let mut rows = self.rows()?;
            let index = rows
                .iter()
                .position(|row| row.user_id == user_id && row.entry.id == id)
                .ok_or_else(|| not_found(id))?;
            rows.remove(index);
        }
        self.publish(TableChange::Deleted {
            id: id.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.changes.subscribe()
    }
}
