//! Domain service for external-source reconciliation.
//!
//! Brings local storage to parity with the race-data provider for a season
//! without duplicating or overwriting session identity.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::clients::SessionPayload;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for SyncError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Outcome of one full sync run. A failed step is recorded here instead of
/// aborting the run; counts reflect what actually committed.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SyncSummary {
    pub added_sessions: u32,
    pub added_drivers: u32,
    pub added_results: u32,
    pub errors: Vec<String>,
}

impl SyncSummary {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Reconciliation engine seam. One SeaORM-backed implementation; substitute
/// a fake for handler tests.
#[async_trait::async_trait]
pub trait SyncService: Send + Sync {
    /// Inserts sessions present at the source but absent locally.
    /// Returns the number inserted. Stored sessions are never modified.
    async fn reconcile_sessions(&self, year: i32) -> Result<u32, SyncError>;

    /// Fills the driver list of every stored session that has none yet.
    async fn reconcile_drivers(&self) -> Result<u32, SyncError>;

    /// Upserts the official top 3 for stored sessions lacking one. Sessions
    /// whose classification is incomplete at the source are skipped until a
    /// later pass.
    async fn reconcile_results(&self) -> Result<u32, SyncError>;

    /// Sessions, then drivers, then results; later steps key off rows the
    /// earlier ones inserted. Step failures are collected, not fatal.
    async fn sync_year(&self, year: i32) -> SyncSummary;
}

/// Session keys the source reports (within the allow-listed types) that are
/// not stored locally yet.
#[must_use]
pub fn missing_session_keys(
    external: &[SessionPayload],
    stored: &HashSet<i32>,
    allowed_types: &[String],
) -> Vec<i32> {
    external
        .iter()
        .filter(|s| allowed_types.iter().any(|t| t == &s.session_type))
        .map(|s| s.session_key)
        .filter(|key| !stored.contains(key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(key: i32, session_type: &str) -> SessionPayload {
        SessionPayload {
            session_key: key,
            session_name: "Race".to_string(),
            session_type: session_type.to_string(),
            country_name: Some("Mexico".to_string()),
            date_start: "2024-10-27T20:00:00+00:00".to_string(),
        }
    }

    fn allowed() -> Vec<String> {
        vec!["Qualifying".to_string(), "Race".to_string()]
    }

    #[test]
    fn missing_keys_ignores_stored_sessions() {
        let external = vec![payload(1, "Race"), payload(2, "Race"), payload(3, "Race")];
        let stored: HashSet<i32> = [1, 3].into_iter().collect();

        assert_eq!(missing_session_keys(&external, &stored, &allowed()), vec![2]);
    }

    #[test]
    fn missing_keys_filters_disallowed_types() {
        let external = vec![
            payload(1, "Race"),
            payload(2, "Practice"),
            payload(3, "Qualifying"),
        ];
        let stored = HashSet::new();

        assert_eq!(
            missing_session_keys(&external, &stored, &allowed()),
            vec![1, 3]
        );
    }

    #[test]
    fn missing_keys_empty_when_source_has_nothing_new() {
        let external = vec![payload(7, "Race")];
        let stored: HashSet<i32> = [7].into_iter().collect();

        assert!(missing_session_keys(&external, &stored, &allowed()).is_empty());
    }

    #[test]
    fn sync_error_display() {
        let err = SyncError::Fetch("timeout".to_string());
        assert_eq!(err.to_string(), "Fetch error: timeout");
    }
}
