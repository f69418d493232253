use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::entities::{guesses, session_drivers, session_results, sessions, users};

pub mod migrator;
pub mod repositories;

pub use repositories::driver::NewSessionDriver;
pub use repositories::result::ResultRow;
pub use repositories::session::NewSession;

/// Explicitly constructed storage handle, passed to each service at
/// construction time. Connections are pooled; every logical operation checks
/// one out and commits or rolls back before releasing it.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    fn driver_repo(&self) -> repositories::driver::SessionDriverRepository {
        repositories::driver::SessionDriverRepository::new(self.conn.clone())
    }

    fn result_repo(&self) -> repositories::result::SessionResultRepository {
        repositories::result::SessionResultRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn guess_repo(&self) -> repositories::guess::GuessRepository {
        repositories::guess::GuessRepository::new(self.conn.clone())
    }

    // Sessions

    pub async fn get_session(&self, id: i32) -> Result<Option<sessions::Model>> {
        self.session_repo().get(id).await
    }

    pub async fn list_sessions(&self) -> Result<Vec<sessions::Model>> {
        self.session_repo().list_all().await
    }

    pub async fn list_recent_sessions(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<sessions::Model>> {
        self.session_repo().list_recent(limit).await
    }

    pub async fn insert_sessions(&self, rows: &[NewSession]) -> Result<u32> {
        self.session_repo().insert_many(rows).await
    }

    // Session drivers

    pub async fn list_session_drivers(
        &self,
        session_id: i32,
    ) -> Result<Vec<session_drivers::Model>> {
        self.driver_repo().list_for_session(session_id).await
    }

    pub async fn find_session_driver(
        &self,
        session_id: i32,
        driver_number: i32,
    ) -> Result<Option<session_drivers::Model>> {
        self.driver_repo()
            .find_by_number(session_id, driver_number)
            .await
    }

    pub async fn session_ids_with_drivers(&self) -> Result<HashSet<i32>> {
        self.driver_repo().session_ids_with_drivers().await
    }

    pub async fn insert_session_drivers(&self, rows: &[NewSessionDriver]) -> Result<u32> {
        self.driver_repo().insert_many(rows).await
    }

    // Session results

    pub async fn get_session_result(
        &self,
        session_id: i32,
    ) -> Result<Option<session_results::Model>> {
        self.result_repo().get(session_id).await
    }

    pub async fn session_ids_with_results(&self) -> Result<HashSet<i32>> {
        self.result_repo().session_ids_with_results().await
    }

    pub async fn upsert_session_results(&self, rows: &[ResultRow]) -> Result<u32> {
        self.result_repo().upsert_many(rows).await
    }

    // Users

    pub async fn get_user(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().get(email).await
    }

    pub async fn add_user_if_absent(
        &self,
        email: &str,
        username: &str,
    ) -> Result<users::Model> {
        self.user_repo().add_if_absent(email, username).await
    }

    // Guesses

    pub async fn find_guess(
        &self,
        user_email: &str,
        session_id: i32,
    ) -> Result<Option<guesses::Model>> {
        self.guess_repo()
            .find_for_user_session(user_email, session_id)
            .await
    }

    pub async fn list_guesses_for_session(
        &self,
        session_id: i32,
    ) -> Result<Vec<guesses::Model>> {
        self.guess_repo().list_for_session(session_id).await
    }

    pub async fn upsert_guess(
        &self,
        user_email: &str,
        session_id: i32,
        positions: (i32, i32, i32),
    ) -> Result<guesses::Model> {
        self.guess_repo()
            .upsert(user_email, session_id, positions)
            .await
    }
}
