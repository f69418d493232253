use std::collections::HashSet;

use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};

use crate::entities::session_drivers;

/// A driver's participation row, keyed by (session_id, driver_number).
#[derive(Debug, Clone)]
pub struct NewSessionDriver {
    pub session_id: i32,
    pub driver_number: i32,
    pub driver_name: String,
    pub nationality: Option<String>,
    pub team: Option<String>,
}

pub struct SessionDriverRepository {
    conn: DatabaseConnection,
}

impl SessionDriverRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_session(
        &self,
        session_id: i32,
    ) -> Result<Vec<session_drivers::Model>> {
        let rows = session_drivers::Entity::find()
            .filter(session_drivers::Column::SessionId.eq(session_id))
            .all(&self.conn)
            .await
            .context("Failed to list session drivers")?;

        Ok(rows)
    }

    pub async fn find_by_number(
        &self,
        session_id: i32,
        driver_number: i32,
    ) -> Result<Option<session_drivers::Model>> {
        let row = session_drivers::Entity::find()
            .filter(session_drivers::Column::SessionId.eq(session_id))
            .filter(session_drivers::Column::DriverNumber.eq(driver_number))
            .one(&self.conn)
            .await
            .context("Failed to query session driver by number")?;

        Ok(row)
    }

    /// Session ids that already have at least one driver row. The "needs
    /// drivers" test is at session granularity.
    pub async fn session_ids_with_drivers(&self) -> Result<HashSet<i32>> {
        let ids: Vec<i32> = session_drivers::Entity::find()
            .select_only()
            .column(session_drivers::Column::SessionId)
            .distinct()
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query sessions with drivers")?;

        Ok(ids.into_iter().collect())
    }

    /// Inserts the batch in a single transaction, skipping any
    /// (session_id, driver_number) pair that already exists.
    /// Returns the number of rows actually inserted.
    pub async fn insert_many(&self, rows: &[NewSessionDriver]) -> Result<u32> {
        if rows.is_empty() {
            return Ok(0);
        }

        let txn = self.conn.begin().await?;

        let mut inserted = 0u32;
        for row in rows {
            let model = session_drivers::ActiveModel {
                session_id: Set(row.session_id),
                driver_number: Set(row.driver_number),
                driver_name: Set(row.driver_name.clone()),
                nationality: Set(row.nationality.clone()),
                team: Set(row.team.clone()),
                ..Default::default()
            };

            let affected = session_drivers::Entity::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        session_drivers::Column::SessionId,
                        session_drivers::Column::DriverNumber,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .context("Failed to insert session driver")?;

            inserted += u32::try_from(affected).unwrap_or(0);
        }

        txn.commit().await?;

        Ok(inserted)
    }
}
