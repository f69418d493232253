//! Domain service for prediction submission.
//!
//! A guess is accepted only while its session is still in the future and all
//! three picks are drivers actually entered in that session. One guess per
//! (user, session); resubmission overwrites.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entities::guesses;

#[derive(Debug, Error)]
pub enum GuessError {
    /// The submission itself is wrong; the user can correct and resubmit.
    #[error("Invalid guess: {0}")]
    Invalid(String),

    /// Storage failed; nothing was written.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for GuessError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait GuessService: Send + Sync {
    /// Validates and inserts-or-updates the caller's prediction. Exactly one
    /// commit on success; on failure nothing observable changes.
    async fn submit_guess(
        &self,
        user_email: &str,
        session_id: i32,
        positions: (i32, i32, i32),
    ) -> Result<guesses::Model, GuessError>;

    async fn guess_for(
        &self,
        user_email: &str,
        session_id: i32,
    ) -> Result<Option<guesses::Model>, GuessError>;
}

/// Whether submissions are still open: the session start must be strictly
/// after `now`. An unparseable start time closes the session rather than
/// leaving it open forever.
#[must_use]
pub fn submission_open(date_start: &str, now: DateTime<Utc>) -> bool {
    DateTime::parse_from_rfc3339(date_start)
        .map(|start| start.with_timezone(&Utc) > now)
        .unwrap_or(false)
}
