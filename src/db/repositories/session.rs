use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::sessions;

/// A session discovered at the external source, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub id: i32,
    pub name: String,
    pub session_type: String,
    pub country: Option<String>,
    pub date_start: String,
}

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<sessions::Model>> {
        let session = sessions::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query session by id")?;

        Ok(session)
    }

    pub async fn list_all(&self) -> Result<Vec<sessions::Model>> {
        let rows = sessions::Entity::find()
            .all(&self.conn)
            .await
            .context("Failed to list sessions")?;

        Ok(rows)
    }

    /// Sessions newest-first, optionally capped.
    pub async fn list_recent(&self, limit: Option<u64>) -> Result<Vec<sessions::Model>> {
        let mut query =
            sessions::Entity::find().order_by_desc(sessions::Column::DateStart);

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let rows = query
            .all(&self.conn)
            .await
            .context("Failed to list recent sessions")?;

        Ok(rows)
    }

    /// Inserts the batch in a single transaction. Rows whose id already
    /// exists are left untouched; session identity is immutable once stored.
    /// Returns the number of rows actually inserted.
    pub async fn insert_many(&self, rows: &[NewSession]) -> Result<u32> {
        if rows.is_empty() {
            return Ok(0);
        }

        let txn = self.conn.begin().await?;

        let mut inserted = 0u32;
        for row in rows {
            let model = sessions::ActiveModel {
                id: Set(row.id),
                name: Set(row.name.clone()),
                session_type: Set(row.session_type.clone()),
                country: Set(row.country.clone()),
                date_start: Set(row.date_start.clone()),
            };

            let affected = sessions::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(sessions::Column::Id)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .context("Failed to insert session")?;

            inserted += u32::try_from(affected).unwrap_or(0);
        }

        txn.commit().await?;

        Ok(inserted)
    }
}
