pub mod sync_service;
pub use sync_service::{SyncError, SyncService, SyncSummary};

pub mod sync_service_impl;
pub use sync_service_impl::SeaOrmSyncService;

pub mod guess_service;
pub use guess_service::{GuessError, GuessService};

pub mod guess_service_impl;
pub use guess_service_impl::SeaOrmGuessService;

pub mod standings_service;
pub use standings_service::{DriverStanding, StandingsError, StandingsService};

pub mod standings_service_impl;
pub use standings_service_impl::SeaOrmStandingsService;

pub mod auth_service;
pub use auth_service::{AuthError, AuthService, Claims, SignIn};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;
