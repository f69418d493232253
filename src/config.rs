use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub openf1: OpenF1Config,

    pub sync: SyncConfig,

    pub auth: AuthConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// 0 means the tokio default.
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/podium.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 0,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8790,
            cors_allowed_origins: vec![
                "http://localhost:8790".to_string(),
                "http://127.0.0.1:8790".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenF1Config {
    pub base_url: String,

    pub timeout_seconds: u64,

    /// Bounded retry budget for 5xx/network failures.
    pub max_attempts: u32,

    pub backoff_base_ms: u64,

    /// Cap on total sleep across one call's retries, so a periodic sync
    /// invocation cannot stack indefinitely behind a flaky provider.
    pub max_total_wait_seconds: u64,
}

impl Default for OpenF1Config {
    fn default() -> Self {
        Self {
            base_url: "https://api.openf1.org/v1".to_string(),
            timeout_seconds: 30,
            max_attempts: 3,
            backoff_base_ms: 1000,
            max_total_wait_seconds: 110,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub enabled: bool,

    pub interval_minutes: u32,

    /// Optional 6-field cron expression; takes precedence over the interval.
    pub cron_expression: Option<String>,

    /// Season to reconcile. Defaults to the current calendar year when unset.
    pub year: Option<i32>,

    /// Session types worth persisting; everything else from the provider is
    /// ignored.
    pub session_types: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: 5,
            cron_expression: None,
            year: None,
            session_types: vec!["Qualifying".to_string(), "Race".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Overridden by PODIUM_JWT_SECRET; when neither is
    /// set a random secret is generated at startup and tokens do not survive
    /// a restart.
    pub jwt_secret: Option<String>,

    pub token_ttl_hours: u64,

    /// Google OAuth client id the token audience must match. Overridden by
    /// PODIUM_GOOGLE_CLIENT_ID. Unset skips the audience check.
    pub google_client_id: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: 24,
            google_client_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "podium".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                let mut config = Self::load_from_path(path)?;
                config.apply_env_overrides();
                return Ok(config);
            }
        }

        info!("No config file found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("PODIUM_JWT_SECRET") {
            if !secret.is_empty() {
                self.auth.jwt_secret = Some(secret);
            }
        }
        if let Ok(client_id) = std::env::var("PODIUM_GOOGLE_CLIENT_ID") {
            if !client_id.is_empty() {
                self.auth.google_client_id = Some(client_id);
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("podium").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".podium").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync.enabled
            && self.sync.interval_minutes == 0
            && self.sync.cron_expression.is_none()
        {
            anyhow::bail!("Sync interval cannot be 0 without a cron expression");
        }

        if self.sync.session_types.is_empty() {
            anyhow::bail!("At least one session type must be allow-listed");
        }

        if self.openf1.base_url.is_empty() {
            anyhow::bail!("OpenF1 base URL cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sync.session_types, vec!["Qualifying", "Race"]);
    }

    #[test]
    fn rejects_zero_interval_without_cron() {
        let mut config = Config::default();
        config.sync.interval_minutes = 0;
        assert!(config.validate().is_err());

        config.sync.cron_expression = Some("0 */5 * * * *".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [sync]
            interval_minutes = 10
            session_types = ["Race"]
            "#,
        )
        .unwrap();

        assert_eq!(config.sync.interval_minutes, 10);
        assert_eq!(config.sync.session_types, vec!["Race"]);
        assert_eq!(config.server.port, 8790);
    }
}
