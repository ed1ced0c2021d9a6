use std::sync::Arc;

use futures::future::join_all;

use crate::api::Backend;
use crate::config::ViewConfig;
use crate::error::Result;
use crate::models::Team;
use crate::views::notice::Notice;

/// A team being put together before it is submitted.
///
/// Members are kept exactly as entered: no trimming, no de-duplication.
/// The backend is the one that rejects bad member lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamDraft {
    pub name: String,
    members: Vec<String>,
}

impl TeamDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn add_member(&mut self, member: impl Into<String>) {
        self.members.push(member.into());
    }

    pub fn remove_member(&mut self, index: usize) -> Option<String> {
        (index < self.members.len()).then(|| self.members.remove(index))
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn is_submittable(&self) -> bool {
        !self.name.is_empty() && !self.members.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub struct TeamsView {
    backend: Arc<dyn Backend>,
    config: ViewConfig,
    names: Vec<String>,
    teams: Vec<Team>,
    expanded: Option<String>,
    pub draft: TeamDraft,
}

impl TeamsView {
    pub fn new(backend: Arc<dyn Backend>, config: ViewConfig) -> Self {
        Self {
            backend,
            config,
            names: Vec::new(),
            teams: Vec::new(),
            expanded: None,
            draft: TeamDraft::default(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.team_name == name)
    }

    /// Fetches the user's team list, then every team's details.
    pub async fn load(&mut self) -> Result<()> {
        self.names = self.backend.list_teams().await?;
        self.teams = self.fetch_infos(&self.names).await;
        tracing::info!("Loaded {} of {} teams", self.teams.len(), self.names.len());
        Ok(())
    }

    /// Fetches details for every name concurrently. A team whose lookup fails
    /// is logged and left out.
    async fn fetch_infos(&self, names: &[String]) -> Vec<Team> {
        let lookups = names.iter().map(|name| async move {
            match self.backend.team_info(name).await {
                Ok(team) => Some(team),
                Err(e) => {
                    tracing::warn!("Failed to fetch team {}: {}", name, e);
                    None
                }
            }
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }

    pub fn toggle_expanded(&mut self, name: &str) {
        if self.expanded.as_deref() == Some(name) {
            self.expanded = None;
        } else {
            self.expanded = Some(name.to_string());
        }
    }

    pub fn is_expanded(&self, name: &str) -> bool {
        self.expanded.as_deref() == Some(name)
    }

    /// Submits the draft. On success the team's analysis is triggered and,
    /// after the settle delay, its details are fetched and appended.
    pub async fn create(&mut self) -> Notice {
        if !self.draft.is_submittable() {
            return Notice::error("Please provide a team name and at least one user.");
        }

        let draft = std::mem::take(&mut self.draft);
        if let Err(e) = self.backend.create_team(&draft.name, draft.members()).await {
            tracing::warn!("Failed to create team {}: {}", draft.name, e);
            return Notice::error("Team creation failed!");
        }

        if let Err(e) = self.backend.trigger_team_analysis(&draft.name).await {
            tracing::warn!("Failed to trigger analysis for team {}: {}", draft.name, e);
        }

        // TODO: replace the fixed wait once the backend reports when a new
        // team is ready.
        tokio::time::sleep(self.config.team_settle_delay).await;

        match self.backend.team_info(&draft.name).await {
            Ok(team) => {
                if !self.names.contains(&draft.name) {
                    self.names.push(draft.name.clone());
                }
                self.teams.push(team);
            }
            Err(e) => tracing::warn!("Failed to fetch new team {}: {}", draft.name, e),
        }

        Notice::success("Team created successfully!")
    }

    /// Deletes a team. If the delete fails nothing changes locally.
    /// Otherwise the remaining teams are re-fetched.
    pub async fn delete(&mut self, name: &str) -> Notice {
        if let Err(e) = self.backend.delete_team(name).await {
            tracing::warn!("Failed to delete team {}: {}", name, e);
            return Notice::error(format!("Failed to delete team \"{}\"", name));
        }

        self.names.retain(|n| n != name);
        if self.expanded.as_deref() == Some(name) {
            self.expanded = None;
        }
        self.teams = self.fetch_infos(&self.names).await;

        Notice::success(format!("Team \"{}\" deleted successfully!", name))
    }

    pub async fn analyze(&self, name: &str) -> Notice {
        match self.backend.trigger_team_analysis(name).await {
            Ok(()) => Notice::success(format!("Analysis started for team \"{}\"", name)),
            Err(e) => {
                tracing::warn!("Failed to trigger analysis for team {}: {}", name, e);
                Notice::error(format!("Failed to start analysis for team \"{}\"", name))
            }
        }
    }
}
