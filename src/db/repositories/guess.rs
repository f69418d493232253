use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::entities::guesses;

pub struct GuessRepository {
    conn: DatabaseConnection,
}

impl GuessRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_for_user_session(
        &self,
        user_email: &str,
        session_id: i32,
    ) -> Result<Option<guesses::Model>> {
        let row = guesses::Entity::find()
            .filter(guesses::Column::UserEmail.eq(user_email))
            .filter(guesses::Column::SessionId.eq(session_id))
            .one(&self.conn)
            .await
            .context("Failed to query guess for user and session")?;

        Ok(row)
    }

    pub async fn list_for_session(&self, session_id: i32) -> Result<Vec<guesses::Model>> {
        let rows = guesses::Entity::find()
            .filter(guesses::Column::SessionId.eq(session_id))
            .all(&self.conn)
            .await
            .context("Failed to list guesses for session")?;

        Ok(rows)
    }

    /// Insert-or-update inside one transaction: a second submission for the
    /// same (user, session) overwrites the three position fields in place.
    /// The three fields change together or not at all.
    pub async fn upsert(
        &self,
        user_email: &str,
        session_id: i32,
        positions: (i32, i32, i32),
    ) -> Result<guesses::Model> {
        let txn = self.conn.begin().await?;

        let existing = guesses::Entity::find()
            .filter(guesses::Column::UserEmail.eq(user_email))
            .filter(guesses::Column::SessionId.eq(session_id))
            .one(&txn)
            .await
            .context("Failed to query existing guess")?;

        let saved = if let Some(existing) = existing {
            let mut active: guesses::ActiveModel = existing.into();
            active.position_1_driver_number = Set(positions.0);
            active.position_2_driver_number = Set(positions.1);
            active.position_3_driver_number = Set(positions.2);
            active
                .update(&txn)
                .await
                .context("Failed to update guess")?
        } else {
            let active = guesses::ActiveModel {
                user_email: Set(user_email.to_string()),
                session_id: Set(session_id),
                position_1_driver_number: Set(positions.0),
                position_2_driver_number: Set(positions.1),
                position_3_driver_number: Set(positions.2),
                ..Default::default()
            };
            active
                .insert(&txn)
                .await
                .context("Failed to insert guess")?
        };

        txn.commit().await?;

        Ok(saved)
    }
}
