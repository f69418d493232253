//! Sign-in flow: an externally verified identity becomes a stored user and
//! an access token. Token issuance is the only state this service owns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::users;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity provider rejected the token or was unreachable.
    #[error("Identity verification failed: {0}")]
    Verification(String),

    #[error("Invalid or expired access token")]
    InvalidToken,

    #[error("Database error: {0}")]
    Database(String),
}

/// HS256 claims carried by an issued access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,
    /// Expiration (Unix timestamp).
    pub exp: usize,
    /// Issued at (Unix timestamp).
    pub iat: usize,
}

#[derive(Debug, Clone)]
pub struct SignIn {
    pub user: users::Model,
    pub access_token: String,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies the provider token, persists the user on first sight
    /// (add-if-absent, never updated afterward) and issues an access token.
    async fn sign_in(&self, provider_token: &str) -> Result<SignIn, AuthError>;

    /// Checks an access token and returns the caller's email.
    fn verify_access_token(&self, token: &str) -> Result<String, AuthError>;
}
