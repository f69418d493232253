use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Identity tuple the rest of the system depends on. How the token was
/// issued and transported is the provider's concern, not ours.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: String,
}

/// External identity-provider seam. Faked in tests.
#[async_trait::async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity>;
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    email: String,
    name: Option<String>,
    aud: String,
}

#[derive(Clone)]
pub struct GoogleVerifier {
    client: Client,
    client_id: Option<String>,
}

impl GoogleVerifier {
    #[must_use]
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            client: Client::new(),
            client_id,
        }
    }
}

#[async_trait::async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
        let response = self
            .client
            .get(TOKENINFO_URL)
            .query(&[("id_token", token)])
            .send()
            .await
            .context("Tokeninfo request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Token rejected by identity provider ({})", response.status());
        }

        let info: TokenInfo = response
            .json()
            .await
            .context("Unparseable tokeninfo response")?;

        if let Some(expected) = &self.client_id {
            if &info.aud != expected {
                anyhow::bail!("Token audience mismatch");
            }
        }

        let name = info.name.unwrap_or_else(|| info.email.clone());

        Ok(VerifiedIdentity {
            email: info.email,
            name,
        })
    }
}
