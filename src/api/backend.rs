use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Repository, Team, UserProfile, UserStats};

/// The Repo Analyser backend, as seen by the views.
///
/// Every operation is a single request with the session cookie attached.
/// Failures come back as [`crate::Error`] and are never retried here.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `Some(profile)` when the session cookie is authenticated.
    async fn check_session(&self) -> Result<Option<UserProfile>>;
    async fn user_stats(&self) -> Result<UserStats>;
    async fn trigger_analysis(&self) -> Result<()>;
    /// Fraction in `[0, 1]`, or `-1` when no analysis is running.
    async fn analysis_progress(&self) -> Result<f64>;
    async fn account_repositories(&self) -> Result<Vec<Repository>>;
    async fn set_repositories(&self, ids: &[u64]) -> Result<()>;
    async fn reset_repositories(&self) -> Result<()>;
    async fn user_completed(&self) -> Result<bool>;
    async fn logout(&self) -> Result<()>;

    async fn list_teams(&self) -> Result<Vec<String>>;
    async fn team_info(&self, team_name: &str) -> Result<Team>;
    async fn create_team(&self, team_name: &str, members: &[String]) -> Result<()>;
    async fn trigger_team_analysis(&self, team_name: &str) -> Result<()>;
    async fn delete_team(&self, team_name: &str) -> Result<()>;
}
