//! `SeaORM` implementation of the [`SyncService`] trait.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::RaceDataGateway;
use crate::db::{NewSession, NewSessionDriver, ResultRow, Store};
use crate::services::sync_service::{
    SyncError, SyncService, SyncSummary, missing_session_keys,
};

pub struct SeaOrmSyncService {
    store: Arc<Store>,
    gateway: Arc<dyn RaceDataGateway>,
    session_types: Vec<String>,
}

impl SeaOrmSyncService {
    #[must_use]
    pub fn new(
        store: Arc<Store>,
        gateway: Arc<dyn RaceDataGateway>,
        session_types: Vec<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            session_types,
        }
    }

    async fn stored_session_ids(&self) -> Result<HashSet<i32>, SyncError> {
        let sessions = self
            .store
            .list_sessions()
            .await
            .map_err(|e| SyncError::Database(e.to_string()))?;

        Ok(sessions.into_iter().map(|s| s.id).collect())
    }
}

#[async_trait::async_trait]
impl SyncService for SeaOrmSyncService {
    async fn reconcile_sessions(&self, year: i32) -> Result<u32, SyncError> {
        let Some(external) = self
            .gateway
            .sessions_in_year(year)
            .await
            .map_err(|e| SyncError::Fetch(e.to_string()))?
        else {
            info!("Source has no session data for {}", year);
            return Ok(0);
        };

        let stored = self.stored_session_ids().await?;
        let missing = missing_session_keys(&external, &stored, &self.session_types);

        if missing.is_empty() {
            info!("No missing sessions for {}", year);
            return Ok(0);
        }

        // Re-fetch each key by id before inserting; the year listing can be
        // stale, and re-filtering guards against type changes at the source.
        let mut rows = Vec::with_capacity(missing.len());
        for key in missing {
            let fetched = match self.gateway.session_by_key(key).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!("Skipping session {}: {}", key, e);
                    continue;
                }
            };

            let Some(payloads) = fetched else {
                warn!("Session {} vanished at the source, skipping", key);
                continue;
            };

            for payload in payloads {
                if !self.session_types.contains(&payload.session_type) {
                    continue;
                }
                rows.push(NewSession {
                    id: payload.session_key,
                    name: payload.session_name,
                    session_type: payload.session_type,
                    country: payload.country_name,
                    date_start: payload.date_start,
                });
            }
        }

        let inserted = self
            .store
            .insert_sessions(&rows)
            .await
            .map_err(|e| SyncError::Database(e.to_string()))?;

        info!("Added {} missing sessions for {}", inserted, year);
        Ok(inserted)
    }

    async fn reconcile_drivers(&self) -> Result<u32, SyncError> {
        let stored = self.stored_session_ids().await?;
        let with_drivers = self
            .store
            .session_ids_with_drivers()
            .await
            .map_err(|e| SyncError::Database(e.to_string()))?;

        let mut rows = Vec::new();
        for session_id in stored.difference(&with_drivers) {
            let fetched = match self.gateway.session_drivers(*session_id).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!("Skipping drivers for session {}: {}", session_id, e);
                    continue;
                }
            };

            let Some(drivers) = fetched else {
                warn!("No driver data yet for session {}", session_id);
                continue;
            };

            for driver in drivers {
                rows.push(NewSessionDriver {
                    session_id: *session_id,
                    driver_number: driver.driver_number,
                    driver_name: driver.full_name,
                    nationality: driver.country_code,
                    team: driver.team_name,
                });
            }
        }

        let inserted = self
            .store
            .insert_session_drivers(&rows)
            .await
            .map_err(|e| SyncError::Database(e.to_string()))?;

        if inserted > 0 {
            info!("Added {} session drivers", inserted);
        }
        Ok(inserted)
    }

    async fn reconcile_results(&self) -> Result<u32, SyncError> {
        let stored = self.stored_session_ids().await?;
        let with_results = self
            .store
            .session_ids_with_results()
            .await
            .map_err(|e| SyncError::Database(e.to_string()))?;

        let mut rows = Vec::new();
        'sessions: for session_id in stored.difference(&with_results) {
            let mut top = [0i32; 3];
            for position in 1..=3i32 {
                let fetched = match self
                    .gateway
                    .driver_at_position(*session_id, position)
                    .await
                {
                    Ok(fetched) => fetched,
                    Err(e) => {
                        warn!("Skipping result for session {}: {}", session_id, e);
                        continue 'sessions;
                    }
                };

                // A partial classification is never stored; the session is
                // retried on the next pass.
                let Some(sample) = fetched else {
                    warn!(
                        "Session {} has no classification for position {} yet",
                        session_id, position
                    );
                    continue 'sessions;
                };

                top[(position - 1) as usize] = sample.driver_number;
            }

            rows.push(ResultRow {
                session_id: *session_id,
                position_1_driver_number: top[0],
                position_2_driver_number: top[1],
                position_3_driver_number: top[2],
            });
        }

        let touched = self
            .store
            .upsert_session_results(&rows)
            .await
            .map_err(|e| SyncError::Database(e.to_string()))?;

        if touched > 0 {
            info!("Recorded results for {} sessions", touched);
        }
        Ok(touched)
    }

    async fn sync_year(&self, year: i32) -> SyncSummary {
        let mut summary = SyncSummary::default();

        match self.reconcile_sessions(year).await {
            Ok(count) => summary.added_sessions = count,
            Err(e) => summary.errors.push(format!("sessions: {e}")),
        }

        match self.reconcile_drivers().await {
            Ok(count) => summary.added_drivers = count,
            Err(e) => summary.errors.push(format!("drivers: {e}")),
        }

        match self.reconcile_results().await {
            Ok(count) => summary.added_results = count,
            Err(e) => summary.errors.push(format!("results: {e}")),
        }

        metrics::counter!("podium_sync_sessions_added_total")
            .increment(u64::from(summary.added_sessions));
        metrics::counter!("podium_sync_drivers_added_total")
            .increment(u64::from(summary.added_drivers));
        metrics::counter!("podium_sync_results_added_total")
            .increment(u64::from(summary.added_results));
        metrics::counter!("podium_sync_errors_total")
            .increment(summary.errors.len() as u64);

        info!(
            "Sync for {} complete: +{} sessions, +{} drivers, +{} results, {} errors",
            year,
            summary.added_sessions,
            summary.added_drivers,
            summary.added_results,
            summary.errors.len()
        );

        summary
    }
}
