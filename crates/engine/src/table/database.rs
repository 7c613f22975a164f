use sea_orm::{ActiveValue, DatabaseConnection, QueryFilter, QueryOrder, prelude::*};
use tokio::sync::broadcast;

use crate::{EngineError, ExpenseEntry, ExpensePatch, MoneyCents, NewExpense, ResultEngine};

use super::{CHANGE_CAPACITY, ExpenseRow, ExpenseTable, TableChange, new_row};

mod expenses {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "expenses")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub user_id: String,
        pub name: String,
        pub amount_minor: i64,
        pub is_savings: Option<bool>,
        pub category: Option<String>,
        #[sea_orm(column_type = "Text", nullable)]
        pub notes: Option<String>,
        pub date: Date,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<expenses::Model> for ExpenseRow {
    fn from(model: expenses::Model) -> Self {
        Self {
            entry: ExpenseEntry {
                id: model.id,
                name: model.name,
                amount: MoneyCents::new(model.amount_minor),
                is_savings: model.is_savings,
                category: model.category,
                notes: model.notes,
                date: Some(model.date),
            },
            user_id: model.user_id,
            created_at: model.created_at,
        }
    }
}

impl From<&ExpenseRow> for expenses::ActiveModel {
    fn from(row: &ExpenseRow) -> Self {
        Self {
            id: ActiveValue::Set(row.entry.id.clone()),
            user_id: ActiveValue::Set(row.user_id.clone()),
            name: ActiveValue::Set(row.entry.name.clone()),
            amount_minor: ActiveValue::Set(row.entry.amount.cents()),
            is_savings: ActiveValue::Set(row.entry.is_savings),
            category: ActiveValue::Set(row.entry.category.clone()),
            notes: ActiveValue::Set(row.entry.notes.clone()),
            date: ActiveValue::Set(row.date()),
            created_at: ActiveValue::Set(row.created_at),
        }
    }
}

/// Table stored in the `expenses` table of a sea-orm database.
///
/// Changes are broadcast to subscribers of this handle and its clones.
#[derive(Clone, Debug)]
pub struct DatabaseTable {
    database: DatabaseConnection,
    changes: broadcast::Sender<TableChange>,
}

impl DatabaseTable {
    pub fn new(database: DatabaseConnection) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self { database, changes }
    }

    async fn find(&self, user_id: &str, id: &str) -> ResultEngine<expenses::Model> {
        expenses::Entity::find_by_id(id.to_string())
            .filter(expenses::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("expense {id}")))
    }
}

impl ExpenseTable for DatabaseTable {
    async fn list(&self, user_id: &str) -> ResultEngine<Vec<ExpenseRow>> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(ExpenseRow::from).collect())
    }

    async fn insert(&self, user_id: &str, draft: NewExpense) -> ResultEngine<ExpenseRow> {
        let row = new_row(user_id, draft)?;
        expenses::Entity::insert(expenses::ActiveModel::from(&row))
            .exec_without_returning(&self.database)
            .await?;
        let _ = self.changes.send(TableChange::Inserted(row.clone()));
        Ok(row)
    }

    async fn update(
        &self,
        user_id: &str,
        id: &str,
        patch: ExpensePatch,
    ) -> ResultEngine<ExpenseRow> {
        let mut row = ExpenseRow::from(self.find(user_id, id).await?);
        row.entry.apply(patch)?;

        let model = expenses::ActiveModel::from(&row);
        let row = ExpenseRow::from(model.update(&self.database).await?);
        let _ = self.changes.send(TableChange::Updated(row.clone()));
        Ok(row)
    }

    async fn delete(&self, user_id: &str, id: &str) -> ResultEngine<()> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.eq(id))
            .filter(expenses::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!("expense {id}")));
        }
        let _ = self.changes.send(TableChange::Deleted {
            id: id.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.changes.subscribe()
    }
}
