use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_cookie: Option<String>,
    pub database_path: String,
    pub poll_interval_ms: u64,
    pub team_settle_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Reads the environment, with `api_url` taking precedence over
    /// `REPO_ANALYSER_API_URL` when given.
    pub fn load(api_url: Option<&str>) -> Result<Self> {
        let api_url = match api_url {
            Some(url) => url.to_string(),
            None => env::var("REPO_ANALYSER_API_URL").map_err(|_| {
                Error::Config("REPO_ANALYSER_API_URL environment variable not set".to_string())
            })?,
        };

        let session_cookie = env::var("REPO_ANALYSER_SESSION")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let database_path = env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "repoanalyser.db".to_string());

        let poll_interval_ms = env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        let team_settle_secs = env::var("TEAM_SETTLE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            session_cookie,
            database_path,
            poll_interval_ms,
            team_settle_secs,
        })
    }
}

/// Timing knobs shared by the dashboard and teams views.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub poll_interval: Duration,
    /// Fixed wait between creating a team and reading it back. The backend
    /// exposes no completion signal for team creation.
    pub team_settle_delay: Duration,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(300),
            team_settle_delay: Duration::from_secs(5),
        }
    }
}

impl From<&Config> for ViewConfig {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            team_settle_delay: Duration::from_secs(config.team_settle_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_override_skips_env() -> Result<()> {
        let config = Config::load(Some("http://localhost:8000/"))?;
        assert_eq!(config.api_url, "http://localhost:8000");

        let view = ViewConfig::from(&Config {
            poll_interval_ms: 50,
            team_settle_secs: 1,
            ..config
        });
        assert_eq!(view.poll_interval, Duration::from_millis(50));
        assert_eq!(view.team_settle_delay, Duration::from_secs(1));
        Ok(())
    }
}
