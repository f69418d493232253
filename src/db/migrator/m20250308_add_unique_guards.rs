use sea_orm_migration::prelude::*;

/// Uniqueness must hold at the storage layer: concurrent sync runs rely on
/// these constraints rather than application-level mutual exclusion.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_session_drivers_session_number \
             ON session_drivers(session_id, driver_number)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_guesses_user_session \
             ON guesses(user_email, session_id)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_guesses_user_session")
            .await?;

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_session_drivers_session_number")
            .await?;

        Ok(())
    }
}
