use serde::Deserialize;
use tracing::instrument;

use crate::api::client::ApiClient;
use crate::error::{Error, Result};
use crate::models::{AnalysisStatus, Repository, UserProfile, UserStats};

#[derive(Deserialize)]
struct SessionResponse {
    login: String,
    #[serde(default)]
    user_data: Option<UserProfile>,
}

#[derive(Deserialize)]
struct StatsResponse {
    user_data: UserStats,
}

#[derive(Deserialize)]
struct ProgressResponse {
    progress: f64,
}

#[derive(Deserialize)]
struct RepositoriesResponse {
    github_repositories: Vec<Repository>,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: AnalysisStatus,
}

impl ApiClient {
    /// Validates the session cookie against the backend.
    #[instrument(skip(self), level = "debug")]
    pub async fn check_session(&self) -> Result<Option<UserProfile>> {
        let response: SessionResponse = self.get_json("/").await?;
        if response.login != "Authenticated" {
            tracing::info!("Backend reports session as {}", response.login);
            return Ok(None);
        }
        Ok(response.user_data.filter(|p| !p.is_empty()))
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn user_stats(&self) -> Result<UserStats> {
        let response: StatsResponse = self.get_json("/users").await?;
        Ok(response.user_data)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn trigger_analysis(&self) -> Result<()> {
        let request = self
            .client
            .post(self.url("/users/trigger"))
            .json(&serde_json::json!({}));
        self.send(request).await?;
        tracing::info!("Analysis triggered");
        Ok(())
    }

    pub async fn analysis_progress(&self) -> Result<f64> {
        let response: ProgressResponse = self.get_json("/users/progress").await?;
        Ok(response.progress)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn account_repositories(&self) -> Result<Vec<Repository>> {
        let response: RepositoriesResponse = self.get_json("/users/github/repositories").await?;
        Ok(response.github_repositories)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn set_repositories(&self, ids: &[u64]) -> Result<()> {
        let request = self.client.post(self.url("/users/repositories")).json(ids);
        self.send(request).await?;
        tracing::info!("Submitted {} repositories for analysis", ids.len());
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn reset_repositories(&self) -> Result<()> {
        let request = self
            .client
            .patch(self.url("/users/reset"))
            .json(&serde_json::json!({}));
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn user_completed(&self) -> Result<bool> {
        let response: StatusResponse = self.get_json("/users/status").await?;
        Ok(response.status.is_completed())
    }

    /// Ends the backend session. The backend answers with a redirect to the
    /// frontend, which is not followed.
    #[instrument(skip(self), level = "debug")]
    pub async fn logout(&self) -> Result<()> {
        let response = self
            .no_redirect
            .get(self.url("/github/logout"))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Http { status, body });
        }
        Ok(())
    }
}
