use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseConnection, prelude::*, sea_query::OnConflict};

use crate::ResultEngine;

use super::SnapshotProvider;

mod snapshots {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "snapshots")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub name: String,
        #[sea_orm(column_type = "Text")]
        pub document: String,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Keeps the snapshot documents in the `snapshots` table.
///
/// The schema is created by the `migration` crate.
#[derive(Clone, Debug)]
pub struct DatabaseProvider {
    database: DatabaseConnection,
}

impl DatabaseProvider {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

impl SnapshotProvider for DatabaseProvider {
    async fn load(&self, key: &str) -> ResultEngine<Option<String>> {
        let model = snapshots::Entity::find_by_id(key.to_string())
            .one(&self.database)
            .await?;
        Ok(model.map(|model| model.document))
    }

    async fn save(&self, key: &str, value: &str) -> ResultEngine<()> {
        let model = snapshots::ActiveModel {
            name: ActiveValue::Set(key.to_string()),
            document: ActiveValue::Set(value.to_string()),
            updated_at: ActiveValue::Set(Utc::now()),
        };
        snapshots::Entity::insert(model)
            .on_conflict(
                OnConflict::column(snapshots::Column::Name)
                    .update_columns([snapshots::Column::Document, snapshots::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> ResultEngine<()> {
        snapshots::Entity::delete_by_id(key.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
