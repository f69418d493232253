use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::clients::{GoogleVerifier, IdentityVerifier, OpenF1Client, RaceDataGateway};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, GuessService, SeaOrmAuthService, SeaOrmGuessService, SeaOrmStandingsService,
    SeaOrmSyncService, StandingsService, SyncService,
};

/// Everything the API, scheduler and CLI share. Built once; services receive
/// the storage handle and collaborators at construction time.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Arc<Store>,

    pub sync: Arc<dyn SyncService>,

    pub guesses: Arc<dyn GuessService>,

    pub standings: Arc<dyn StandingsService>,

    pub auth: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let store = Arc::new(
            Store::with_pool_options(
                &config.general.database_path,
                config.general.max_db_connections,
                config.general.min_db_connections,
            )
            .await?,
        );
        let gateway: Arc<dyn RaceDataGateway> = Arc::new(OpenF1Client::new(&config.openf1));
        let verifier: Arc<dyn IdentityVerifier> =
            Arc::new(GoogleVerifier::new(config.auth.google_client_id.clone()));

        Ok(Self::with_collaborators(config, store, gateway, verifier))
    }

    /// Wires the service layer around explicit collaborators. Tests pass an
    /// in-memory store, a fake gateway and a fake verifier here.
    #[must_use]
    pub fn with_collaborators(
        config: Config,
        store: Arc<Store>,
        gateway: Arc<dyn RaceDataGateway>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Arc<Self> {
        let secret = config.auth.jwt_secret.clone().map_or_else(
            || {
                warn!("No JWT secret configured; tokens will not survive a restart");
                generate_secret().into_bytes()
            },
            String::into_bytes,
        );

        let sync = Arc::new(SeaOrmSyncService::new(
            Arc::clone(&store),
            gateway,
            config.sync.session_types.clone(),
        ));

        let guesses = Arc::new(SeaOrmGuessService::new(Arc::clone(&store)));

        let standings = Arc::new(SeaOrmStandingsService::new(Arc::clone(&store)));

        let auth = Arc::new(SeaOrmAuthService::new(
            Arc::clone(&store),
            verifier,
            secret,
            config.auth.token_ttl_hours * 60 * 60,
        ));

        Arc::new(Self {
            config,
            store,
            sync,
            guesses,
            standings,
            auth,
        })
    }
}

/// Random 64-character hex secret for single-run deployments.
#[must_use]
fn generate_secret() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
