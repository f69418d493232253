use std::collections::HashSet;

use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    DatabaseConnection, EntityTrait, QuerySelect, Set, TransactionTrait,
};

use crate::entities::session_results;

/// A complete official top 3 for one session.
#[derive(Debug, Clone, Copy)]
pub struct ResultRow {
    pub session_id: i32,
    pub position_1_driver_number: i32,
    pub position_2_driver_number: i32,
    pub position_3_driver_number: i32,
}

pub struct SessionResultRepository {
    conn: DatabaseConnection,
}

impl SessionResultRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, session_id: i32) -> Result<Option<session_results::Model>> {
        let row = session_results::Entity::find_by_id(session_id)
            .one(&self.conn)
            .await
            .context("Failed to query session result")?;

        Ok(row)
    }

    pub async fn session_ids_with_results(&self) -> Result<HashSet<i32>> {
        let ids: Vec<i32> = session_results::Entity::find()
            .select_only()
            .column(session_results::Column::SessionId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query sessions with results")?;

        Ok(ids.into_iter().collect())
    }

    /// Upserts the batch in a single transaction: inserts where absent,
    /// overwrites all three position fields where present (post-race
    /// corrections re-sync). Returns the number of rows touched.
    pub async fn upsert_many(&self, rows: &[ResultRow]) -> Result<u32> {
        if rows.is_empty() {
            return Ok(0);
        }

        let txn = self.conn.begin().await?;

        let mut touched = 0u32;
        for row in rows {
            let model = session_results::ActiveModel {
                session_id: Set(row.session_id),
                position_1_driver_number: Set(row.position_1_driver_number),
                position_2_driver_number: Set(row.position_2_driver_number),
                position_3_driver_number: Set(row.position_3_driver_number),
            };

            session_results::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(session_results::Column::SessionId)
                        .update_columns([
                            session_results::Column::Position1DriverNumber,
                            session_results::Column::Position2DriverNumber,
                            session_results::Column::Position3DriverNumber,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .context("Failed to upsert session result")?;

            touched += 1;
        }

        txn.commit().await?;

        Ok(touched)
    }
}
