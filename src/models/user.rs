use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::metrics::MetricReport;

/// The signed-in GitHub account, as cached between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub public_repos: u32,
}

impl UserProfile {
    /// An empty profile stands for "not authenticated".
    pub fn is_empty(&self) -> bool {
        self.login.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub owner: RepositoryOwner,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    #[serde(default)]
    pub avatar_url: String,
}

/// Analysis lifecycle as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnalysisStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Other(String),
}

impl AnalysisStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, AnalysisStatus::Completed)
    }
}

impl From<&str> for AnalysisStatus {
    fn from(s: &str) -> Self {
        match s {
            "Completed" => AnalysisStatus::Completed,
            "In Progress" => AnalysisStatus::InProgress,
            "Not Started" => AnalysisStatus::NotStarted,
            other => AnalysisStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisStatus::NotStarted => write!(f, "Not Started"),
            AnalysisStatus::InProgress => write!(f, "In Progress"),
            AnalysisStatus::Completed => write!(f, "Completed"),
            AnalysisStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for AnalysisStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AnalysisStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().map(AnalysisStatus::from).unwrap_or_default())
    }
}

/// Everything the backend knows about the user's analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub github_repos: Vec<Repository>,
    /// Repository ids confirmed for analysis.
    #[serde(default)]
    pub repositories: Vec<u64>,
    /// Per-repository reports keyed by the decimal repository id.
    #[serde(default)]
    pub metrics: HashMap<String, MetricReport>,
    #[serde(default)]
    pub metrics_summary: MetricReport,
    #[serde(default)]
    pub status: AnalysisStatus,
}

impl UserStats {
    pub fn repository(&self, id: u64) -> Option<&Repository> {
        self.github_repos.iter().find(|r| r.id == id)
    }

    pub fn has_selection(&self) -> bool {
        !self.repositories.is_empty()
    }

    /// Confirmed repositories that still exist in the account listing.
    pub fn selected_repositories(&self) -> Vec<&Repository> {
        self.repositories
            .iter()
            .filter_map(|id| self.repository(*id))
            .collect()
    }

    /// Per-repository reports joined with their repository, ordered by name.
    /// Keys that do not resolve to a known repository are skipped.
    pub fn repository_metrics(&self) -> Vec<(&Repository, &MetricReport)> {
        let mut joined: Vec<_> = self
            .metrics
            .iter()
            .filter_map(|(key, report)| {
                let repo = key.parse::<u64>().ok().and_then(|id| self.repository(id));
                if repo.is_none() {
                    tracing::warn!("Repository with id {} not found", key);
                }
                repo.map(|r| (r, report))
            })
            .collect();
        joined.sort_by(|a, b| a.0.name.cmp(&b.0.name));
        joined
    }

    /// The summary card is shown once the whole analysis has completed, even
    /// if the summary itself is still a placeholder.
    pub fn summary_ready(&self) -> bool {
        self.status.is_completed()
    }
}
