//! `SeaORM` implementation of the [`GuessService`] trait.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::db::Store;
use crate::entities::guesses;
use crate::services::guess_service::{GuessError, GuessService, submission_open};

pub struct SeaOrmGuessService {
    store: Arc<Store>,
}

impl SeaOrmGuessService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl GuessService for SeaOrmGuessService {
    async fn submit_guess(
        &self,
        user_email: &str,
        session_id: i32,
        positions: (i32, i32, i32),
    ) -> Result<guesses::Model, GuessError> {
        // Referential check first: every pick must be a driver entered in
        // this session. Duplicate picks across slots are deliberately not
        // rejected here.
        for driver_number in [positions.0, positions.1, positions.2] {
            let driver = self
                .store
                .find_session_driver(session_id, driver_number)
                .await
                .map_err(|e| GuessError::Database(e.to_string()))?;

            if driver.is_none() {
                return Err(GuessError::Invalid(
                    "driver/session mismatch".to_string(),
                ));
            }
        }

        let session = self
            .store
            .get_session(session_id)
            .await
            .map_err(|e| GuessError::Database(e.to_string()))?
            .ok_or_else(|| GuessError::Invalid("session unknown".to_string()))?;

        if !submission_open(&session.date_start, Utc::now()) {
            return Err(GuessError::Invalid(
                "session already started or finished".to_string(),
            ));
        }

        let saved = self
            .store
            .upsert_guess(user_email, session_id, positions)
            .await
            .map_err(|e| GuessError::Database(e.to_string()))?;

        info!(
            "Stored guess {} for {} on session {}",
            saved.id, user_email, session_id
        );

        Ok(saved)
    }

    async fn guess_for(
        &self,
        user_email: &str,
        session_id: i32,
    ) -> Result<Option<guesses::Model>, GuessError> {
        self.store
            .find_guess(user_email, session_id)
            .await
            .map_err(|e| GuessError::Database(e.to_string()))
    }
}
