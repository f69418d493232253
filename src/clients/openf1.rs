use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::warn;

use super::{DriverPayload, PositionPayload, RaceDataGateway, SessionPayload};
use crate::config::OpenF1Config;

#[derive(Clone)]
pub struct OpenF1Client {
    client: Client,
    base_url: String,
    max_attempts: u32,
    backoff_base: Duration,
    max_total_wait: Duration,
}

impl OpenF1Client {
    pub fn new(config: &OpenF1Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("Podium/1.0")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_attempts: config.max_attempts.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            max_total_wait: Duration::from_secs(config.max_total_wait_seconds),
        }
    }

    /// GET with bounded retry. 5xx and network failures back off
    /// exponentially (base x 2^attempt) up to `max_attempts`; a rate-limit
    /// response honors its Retry-After hint with a single extra retry that is
    /// not counted against the backoff budget. Total sleep across all retries
    /// is capped by `max_total_wait`.
    ///
    /// Empty-body and non-JSON 200 responses mean "no data" (`Ok(None)`),
    /// never an error. Any other 4xx is a fetch failure.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Option<Vec<T>>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let started = Instant::now();
        let mut attempt = 0u32;
        let mut rate_limit_retry_spent = false;

        loop {
            let response = match self.client.get(&url).query(params).send().await {
                Ok(response) => response,
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(e)
                            .with_context(|| format!("Request to {endpoint} failed"));
                    }
                    self.backoff(endpoint, attempt, started).await?;
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if rate_limit_retry_spent {
                    anyhow::bail!("{endpoint} rate limited twice, giving up");
                }
                let wait = retry_after_hint(&response).unwrap_or(Duration::from_secs(60));
                warn!(
                    "Rate limited on {}, retrying after {}s",
                    endpoint,
                    wait.as_secs()
                );
                self.bounded_sleep(wait, started).await?;
                rate_limit_retry_spent = true;
                continue;
            }

            if status.is_server_error() {
                attempt += 1;
                if attempt >= self.max_attempts {
                    anyhow::bail!(
                        "{endpoint} returned {status} after {attempt} attempts"
                    );
                }
                self.backoff(endpoint, attempt, started).await?;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("API error {status} from {endpoint}: {body}");
            }

            let body = response.text().await.unwrap_or_default();
            if body.trim().is_empty() {
                warn!("Empty response body from {}", endpoint);
                return Ok(None);
            }

            return match serde_json::from_str::<Vec<T>>(&body) {
                Ok(rows) => Ok(Some(rows)),
                Err(_) => {
                    warn!("Unparseable 200 response from {}", endpoint);
                    Ok(None)
                }
            };
        }
    }

    async fn backoff(&self, endpoint: &str, attempt: u32, started: Instant) -> Result<()> {
        let wait = self.backoff_base * 2u32.pow(attempt.min(16));
        warn!(
            "Transient failure on {}, retry {} in {}ms",
            endpoint,
            attempt,
            wait.as_millis()
        );
        self.bounded_sleep(wait, started).await?;
        Ok(())
    }

    async fn bounded_sleep(&self, wait: Duration, started: Instant) -> Result<()> {
        if started.elapsed() + wait > self.max_total_wait {
            anyhow::bail!(
                "Retry budget exhausted after {}s of waiting",
                started.elapsed().as_secs()
            );
        }
        tokio::time::sleep(wait).await;
        Ok(())
    }
}

fn retry_after_hint(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait::async_trait]
impl RaceDataGateway for OpenF1Client {
    async fn sessions_in_year(&self, year: i32) -> Result<Option<Vec<SessionPayload>>> {
        self.get_json("sessions", &[("year", year.to_string())])
            .await
    }

    async fn session_by_key(
        &self,
        session_key: i32,
    ) -> Result<Option<Vec<SessionPayload>>> {
        self.get_json("sessions", &[("session_key", session_key.to_string())])
            .await
    }

    async fn session_drivers(
        &self,
        session_key: i32,
    ) -> Result<Option<Vec<DriverPayload>>> {
        self.get_json("drivers", &[("session_key", session_key.to_string())])
            .await
    }

    async fn driver_at_position(
        &self,
        session_key: i32,
        position: i32,
    ) -> Result<Option<PositionPayload>> {
        let samples: Option<Vec<PositionPayload>> = self
            .get_json(
                "position",
                &[
                    ("session_key", session_key.to_string()),
                    ("position", position.to_string()),
                ],
            )
            .await?;

        // The provider reports every car that held this position during the
        // session; the last sample is the final classification.
        Ok(samples.and_then(|rows| rows.into_iter().next_back()))
    }
}
