//! In-memory [`Backend`] used by the view and session tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::api::Backend;
use crate::error::{Error, Result};
use crate::models::{Repository, RepositoryOwner, Team, UserProfile, UserStats};

#[derive(Default)]
pub(crate) struct FakeState {
    pub session: Option<UserProfile>,
    pub stats: UserStats,
    pub completed: bool,
    /// Scripted progress answers; `None` is a failed call. `-1` once drained.
    pub progress: VecDeque<Option<f64>>,
    pub teams: Vec<String>,
    pub team_infos: HashMap<String, Team>,
    /// Operation names that fail with a 500.
    pub fail: HashSet<&'static str>,
    /// Team names whose info lookup fails.
    pub fail_team_info: HashSet<String>,
    pub submitted: Vec<Vec<u64>>,
    pub created: Vec<(String, Vec<String>)>,
    calls: HashMap<&'static str, usize>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self, op: &str) -> usize {
        self.state().calls.get(op).copied().unwrap_or(0)
    }

    pub fn queue_progress(&self, values: impl IntoIterator<Item = Option<f64>>) {
        self.state().progress.extend(values);
    }

    pub fn add_team(&self, team: Team) {
        let mut state = self.state();
        state.teams.push(team.team_name.clone());
        state.team_infos.insert(team.team_name.clone(), team);
    }

    fn record(&self, op: &'static str) -> Result<()> {
        let mut state = self.state();
        *state.calls.entry(op).or_default() += 1;
        if state.fail.contains(op) {
            return Err(injected());
        }
        Ok(())
    }
}

fn injected() -> Error {
    Error::Http {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "injected failure".to_string(),
    }
}

pub(crate) fn repo(id: u64, name: &str) -> Repository {
    Repository {
        id,
        name: name.to_string(),
        owner: RepositoryOwner {
            avatar_url: format!("https://avatars.example/{}", id),
        },
        html_url: format!("https://github.com/alice/{}", name),
    }
}

pub(crate) fn team(name: &str, members: &[&str]) -> Team {
    Team {
        team_name: name.to_string(),
        team_members: members.iter().map(|m| m.to_string()).collect(),
        ..Default::default()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn check_session(&self) -> Result<Option<UserProfile>> {
        self.record("check_session")?;
        Ok(self.state().session.clone())
    }

    async fn user_stats(&self) -> Result<UserStats> {
        self.record("user_stats")?;
        Ok(self.state().stats.clone())
    }

    async fn trigger_analysis(&self) -> Result<()> {
        self.record("trigger_analysis")
    }

    async fn analysis_progress(&self) -> Result<f64> {
        self.record("analysis_progress")?;
        match self.state().progress.pop_front() {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(injected()),
            None => Ok(-1.0),
        }
    }

    async fn account_repositories(&self) -> Result<Vec<Repository>> {
        self.record("account_repositories")?;
        Ok(self.state().stats.github_repos.clone())
    }

    async fn set_repositories(&self, ids: &[u64]) -> Result<()> {
        self.record("set_repositories")?;
        let mut state = self.state();
        state.submitted.push(ids.to_vec());
        state.stats.repositories = ids.to_vec();
        Ok(())
    }

    async fn reset_repositories(&self) -> Result<()> {
        self.record("reset_repositories")?;
        self.state().stats.repositories.clear();
        Ok(())
    }

    async fn user_completed(&self) -> Result<bool> {
        self.record("user_completed")?;
        Ok(self.state().completed)
    }

    async fn logout(&self) -> Result<()> {
        self.record("logout")
    }

    async fn list_teams(&self) -> Result<Vec<String>> {
        self.record("list_teams")?;
        Ok(self.state().teams.clone())
    }

    async fn team_info(&self, team_name: &str) -> Result<Team> {
        self.record("team_info")?;
        let state = self.state();
        if state.fail_team_info.contains(team_name) {
            return Err(injected());
        }
        state.team_infos.get(team_name).cloned().ok_or(Error::Http {
            status: StatusCode::NOT_FOUND,
            body: "Team not found".to_string(),
        })
    }

    async fn create_team(&self, team_name: &str, members: &[String]) -> Result<()> {
        self.record("create_team")?;
        let mut state = self.state();
        state.created.push((team_name.to_string(), members.to_vec()));
        state.teams.push(team_name.to_string());
        state.team_infos.insert(
            team_name.to_string(),
            Team {
                team_name: team_name.to_string(),
                team_members: members.to_vec(),
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn trigger_team_analysis(&self, _team_name: &str) -> Result<()> {
        self.record("trigger_team_analysis")
    }

    async fn delete_team(&self, team_name: &str) -> Result<()> {
        self.record("delete_team")?;
        let mut state = self.state();
        state.teams.retain(|t| t != team_name);
        state.team_infos.remove(team_name);
        Ok(())
    }
}
