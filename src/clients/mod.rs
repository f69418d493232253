use anyhow::Result;
use serde::Deserialize;

pub mod google;
pub mod openf1;

pub use google::{GoogleVerifier, IdentityVerifier, VerifiedIdentity};
pub use openf1::OpenF1Client;

/// One session row as the external provider reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionPayload {
    pub session_key: i32,
    pub session_name: String,
    pub session_type: String,
    pub country_name: Option<String>,
    pub date_start: String,
}

/// One driver's entry for a session.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverPayload {
    pub driver_number: i32,
    pub full_name: String,
    pub country_code: Option<String>,
    pub team_name: Option<String>,
}

/// One position-change sample. The provider reports every change over the
/// session; the last sample for a position is the finishing order.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionPayload {
    pub driver_number: i32,
    pub position: i32,
}

/// Typed access to the external race-data API. The reconciliation engine can
/// assume either a clean result list or an explicit absence (`None`) —
/// network flakiness never leaks past this seam.
#[async_trait::async_trait]
pub trait RaceDataGateway: Send + Sync {
    async fn sessions_in_year(&self, year: i32) -> Result<Option<Vec<SessionPayload>>>;

    async fn session_by_key(&self, session_key: i32)
    -> Result<Option<Vec<SessionPayload>>>;

    async fn session_drivers(&self, session_key: i32)
    -> Result<Option<Vec<DriverPayload>>>;

    /// Final classification for one position, or `None` when the provider has
    /// no data yet (e.g. the session has not finished).
    async fn driver_at_position(
        &self,
        session_key: i32,
        position: i32,
    ) -> Result<Option<PositionPayload>>;
}
