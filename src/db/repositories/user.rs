use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::entities::users;

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, email: &str) -> Result<Option<users::Model>> {
        let user = users::Entity::find_by_id(email)
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user)
    }

    /// Idempotent sign-in persistence: inserts the user on first sight,
    /// leaves an existing row untouched (the stored username wins).
    pub async fn add_if_absent(&self, email: &str, username: &str) -> Result<users::Model> {
        let model = users::ActiveModel {
            email: Set(email.to_string()),
            username: Set(username.to_string()),
        };

        users::Entity::insert(model)
            .on_conflict(
                OnConflict::column(users::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to insert user")?;

        let user = users::Entity::find_by_id(email)
            .one(&self.conn)
            .await
            .context("Failed to re-query user after insert")?
            .ok_or_else(|| anyhow::anyhow!("User vanished after insert: {email}"))?;

        Ok(user)
    }
}
