use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use tracing::info;

use crate::clients::IdentityVerifier;
use crate::db::Store;
use crate::services::auth_service::{AuthError, AuthService, Claims, SignIn};

pub struct SeaOrmAuthService {
    store: Arc<Store>,
    verifier: Arc<dyn IdentityVerifier>,
    secret: Vec<u8>,
    token_ttl_secs: u64,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Arc<Store>,
        verifier: Arc<dyn IdentityVerifier>,
        secret: Vec<u8>,
        token_ttl_secs: u64,
    ) -> Self {
        Self {
            store,
            verifier,
            secret,
            token_ttl_secs,
        }
    }

    fn issue_token(&self, email: &str) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as usize)
            .unwrap_or(0);

        let claims = Claims {
            sub: email.to_string(),
            iat: now,
            exp: now + self.token_ttl_secs as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|_| AuthError::InvalidToken)
    }
}

#[async_trait::async_trait]
impl AuthService for SeaOrmAuthService {
    async fn sign_in(&self, provider_token: &str) -> Result<SignIn, AuthError> {
        let identity = self
            .verifier
            .verify(provider_token)
            .await
            .map_err(|e| AuthError::Verification(e.to_string()))?;

        let user = self
            .store
            .add_user_if_absent(&identity.email, &identity.name)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        info!("Signed in {}", user.email);

        let access_token = self.issue_token(&user.email)?;

        Ok(SignIn { user, access_token })
    }

    fn verify_access_token(&self, token: &str) -> Result<String, AuthError> {
        let key = DecodingKey::from_secret(&self.secret);
        let validation = Validation::new(Algorithm::HS256);

        let data =
            decode::<Claims>(token, &key, &validation).map_err(|_| AuthError::InvalidToken)?;

        Ok(data.claims.sub)
    }
}
