//! `SeaORM` implementation of the [`StandingsService`] trait.

use std::sync::Arc;

use tracing::warn;

use crate::db::Store;
use crate::entities::guesses;
use crate::services::standings_service::{
    DriverStanding, StandingsError, StandingsService, is_exact_match,
};

pub struct SeaOrmStandingsService {
    store: Arc<Store>,
}

impl SeaOrmStandingsService {
    #[must_use]
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl StandingsService for SeaOrmStandingsService {
    async fn get_standing(
        &self,
        session_id: i32,
    ) -> Result<Vec<DriverStanding>, StandingsError> {
        let Some(result) = self
            .store
            .get_session_result(session_id)
            .await
            .map_err(|e| StandingsError::Database(e.to_string()))?
        else {
            return Ok(Vec::new());
        };

        let podium = [
            (1, result.position_1_driver_number),
            (2, result.position_2_driver_number),
            (3, result.position_3_driver_number),
        ];

        let mut standing = Vec::with_capacity(3);
        for (position, driver_number) in podium {
            let driver = self
                .store
                .find_session_driver(session_id, driver_number)
                .await
                .map_err(|e| StandingsError::Database(e.to_string()))?;

            match driver {
                Some(driver) => standing.push(DriverStanding {
                    position,
                    driver_number,
                    driver_name: driver.driver_name,
                }),
                None => warn!(
                    "Session {} result names driver {} at P{}, but no such entry exists",
                    session_id, driver_number, position
                ),
            }
        }

        Ok(standing)
    }

    async fn get_winning_guess(
        &self,
        session_id: i32,
    ) -> Result<Option<guesses::Model>, StandingsError> {
        let Some(result) = self
            .store
            .get_session_result(session_id)
            .await
            .map_err(|e| StandingsError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let guesses = self
            .store
            .list_guesses_for_session(session_id)
            .await
            .map_err(|e| StandingsError::Database(e.to_string()))?;

        Ok(guesses.into_iter().find(|g| is_exact_match(g, &result)))
    }
}
