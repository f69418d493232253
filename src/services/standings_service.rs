//! Domain service for official standings and winner resolution.

use serde::Serialize;
use thiserror::Error;

use crate::entities::{guesses, session_results};

#[derive(Debug, Error)]
pub enum StandingsError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for StandingsError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// One row of a display-ready ranked list.
#[derive(Debug, Clone, Serialize)]
pub struct DriverStanding {
    pub position: i32,
    pub driver_number: i32,
    pub driver_name: String,
}

#[async_trait::async_trait]
pub trait StandingsService: Send + Sync {
    /// The session's official top 3 enriched with driver names, empty when no
    /// result is stored yet. A position whose driver row is missing is
    /// omitted rather than failing the whole call.
    async fn get_standing(
        &self,
        session_id: i32,
    ) -> Result<Vec<DriverStanding>, StandingsError>;

    /// The first stored guess matching the official result exactly, position
    /// by position. `None` when no result exists or nobody got it right.
    async fn get_winning_guess(
        &self,
        session_id: i32,
    ) -> Result<Option<guesses::Model>, StandingsError>;
}

/// Position-by-position equality. A correct driver in the wrong slot earns
/// nothing; partial credit is not supported.
#[must_use]
pub fn is_exact_match(guess: &guesses::Model, result: &session_results::Model) -> bool {
    guess.position_1_driver_number == result.position_1_driver_number
        && guess.position_2_driver_number == result.position_2_driver_number
        && guess.position_3_driver_number == result.position_3_driver_number
}
