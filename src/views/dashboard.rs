use std::sync::Arc;

use crate::api::Backend;
use crate::config::ViewConfig;
use crate::error::Result;
use crate::models::{MetricReport, Repository, UserProfile, UserStats};
use crate::progress::{PollHandle, ProgressPoller, ProgressState};
use crate::session::{Session, SessionState};
use crate::views::notice::Notice;
use crate::views::selection::RepoSelection;

/// What the dashboard shows right now.
#[derive(Debug)]
pub enum DashboardView<'a> {
    Login {
        login_url: &'a str,
    },
    /// Signed in, but the stats could not be fetched.
    Unavailable {
        profile: &'a UserProfile,
    },
    SelectRepos {
        profile: &'a UserProfile,
        available: Vec<&'a Repository>,
        selected: Vec<&'a Repository>,
    },
    Overview(Overview<'a>),
}

#[derive(Debug)]
pub struct Overview<'a> {
    pub profile: &'a UserProfile,
    /// Confirmed repositories waiting for an analysis run. Empty once the
    /// analysis has completed.
    pub pending: Vec<&'a Repository>,
    pub summary: Option<&'a MetricReport>,
    pub repositories: Vec<(&'a Repository, &'a MetricReport)>,
    pub expanded: Option<u64>,
}

/// The index page: session, stats and the selection/analysis flow.
pub struct Dashboard {
    backend: Arc<dyn Backend>,
    session: Session,
    config: ViewConfig,
    login_url: String,
    state: SessionState,
    stats: Option<UserStats>,
    completed: bool,
    selection: RepoSelection,
    expanded: Option<u64>,
}

impl Dashboard {
    pub fn new(
        backend: Arc<dyn Backend>,
        session: Session,
        login_url: String,
        config: ViewConfig,
    ) -> Self {
        Self {
            backend,
            session,
            config,
            login_url,
            state: SessionState::Anonymous,
            stats: None,
            completed: false,
            selection: RepoSelection::new(),
            expanded: None,
        }
    }

    /// Full (re)load: session bootstrap, then stats and completion status.
    pub async fn load(&mut self) -> Result<()> {
        self.state = self.session.bootstrap(self.backend.as_ref()).await?;
        if self.state == SessionState::Anonymous {
            self.stats = None;
            self.completed = false;
            return Ok(());
        }

        self.refresh_stats().await;
        self.completed = match self.backend.user_completed().await {
            Ok(done) => done,
            Err(e) => {
                tracing::warn!("Failed to fetch analysis status: {}", e);
                false
            }
        };
        Ok(())
    }

    /// Re-fetches stats. On failure the previous stats stay in place.
    pub async fn refresh_stats(&mut self) {
        match self.backend.user_stats().await {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => tracing::warn!("Failed to fetch user stats: {}", e),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_state(&self) -> &SessionState {
        &self.state
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.state.profile()
    }

    pub fn stats(&self) -> Option<&UserStats> {
        self.stats.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn selection(&self) -> &RepoSelection {
        &self.selection
    }

    pub fn toggle_repository(&mut self, id: u64) {
        self.selection.toggle(id);
    }

    pub fn select_repository(&mut self, id: u64) {
        self.selection.select(id);
    }

    /// Expands one repository's metrics, collapsing any other.
    pub fn toggle_expanded(&mut self, id: u64) {
        self.expanded = if self.expanded == Some(id) { None } else { Some(id) };
    }

    pub fn view(&self) -> DashboardView<'_> {
        let Some(profile) = self.state.profile() else {
            return DashboardView::Login {
                login_url: &self.login_url,
            };
        };
        let Some(stats) = self.stats.as_ref() else {
            return DashboardView::Unavailable { profile };
        };

        if !stats.has_selection() {
            let (available, selected) = self.selection.partition(&stats.github_repos);
            return DashboardView::SelectRepos {
                profile,
                available,
                selected,
            };
        }

        DashboardView::Overview(Overview {
            profile,
            pending: if self.completed {
                Vec::new()
            } else {
                stats.selected_repositories()
            },
            summary: stats.summary_ready().then_some(&stats.metrics_summary),
            repositories: stats.repository_metrics(),
            expanded: self.expanded,
        })
    }

    /// Submits the current selection and reloads. Rejected selections never
    /// reach the backend. The reload happens whether or not the submit worked.
    pub async fn confirm_selection(&mut self) -> Result<Notice> {
        if let Err(e) = self.selection.validate() {
            return Ok(Notice::error(e.to_string()));
        }

        let count = self.selection.len();
        let notice = match self.selection.confirm(self.backend.as_ref()).await {
            Ok(()) => Notice::success(format!("Selected {} repos for analysis", count)),
            Err(e) => {
                tracing::warn!("Failed to save repository selection: {}", e);
                Notice::error("Failed to save the repository selection")
            }
        };

        self.selection = RepoSelection::new();
        self.load().await?;
        Ok(notice)
    }

    pub async fn reset_selection(&mut self) -> Notice {
        match self.backend.reset_repositories().await {
            Ok(()) => {
                self.refresh_stats().await;
                self.completed = false;
                Notice::success("Repository selection reset")
            }
            Err(e) => {
                tracing::warn!("Failed to reset repositories: {}", e);
                Notice::error(format!("Failed to reset repositories: {}", e))
            }
        }
    }

    fn poller(&self) -> ProgressPoller {
        ProgressPoller::new(self.backend.clone(), self.config.poll_interval)
    }

    /// Triggers an analysis and follows it to the end, reporting every
    /// progress update. On completion stats are re-fetched and the page is
    /// reloaded.
    pub async fn analyze<F>(&mut self, on_update: F) -> Result<ProgressState>
    where
        F: FnMut(&ProgressState),
    {
        let handle = self.poller().start().await?;
        self.follow(handle, on_update).await
    }

    /// Follows an analysis that was triggered elsewhere.
    pub async fn watch_analysis<F>(&mut self, on_update: F) -> Result<ProgressState>
    where
        F: FnMut(&ProgressState),
    {
        let handle = self.poller().watch();
        self.follow(handle, on_update).await
    }

    async fn follow<F>(&mut self, mut handle: PollHandle, mut on_update: F) -> Result<ProgressState>
    where
        F: FnMut(&ProgressState),
    {
        let last = loop {
            match handle.next().await {
                Some(state) => {
                    on_update(&state);
                    if state.is_terminal() {
                        break state;
                    }
                }
                None => break handle.state(),
            }
        };
        drop(handle);

        if last == ProgressState::Completed {
            self.refresh_stats().await;
            self.load().await?;
        }
        Ok(last)
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.session.logout(self.backend.as_ref()).await?;
        self.state = SessionState::Anonymous;
        self.stats = None;
        self.completed = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisStatus, MetricFields};
    use crate::render::{self, Expand, OutputFormat};
    use crate::storage::Storage;
    use crate::testing::{repo, FakeBackend};
    use std::time::Duration;

    fn alice() -> UserProfile {
        UserProfile {
            login: "alice".to_string(),
            avatar_url: String::new(),
            followers: 5,
            public_repos: 3,
        }
    }

    fn report(text: &str) -> MetricReport {
        MetricReport::Present(MetricFields {
            project_descriptions: text.to_string(),
            ..Default::default()
        })
    }

    fn dashboard(backend: &Arc<FakeBackend>) -> Dashboard {
        let config = ViewConfig {
            poll_interval: Duration::from_millis(300),
            team_settle_delay: Duration::from_secs(5),
        };
        Dashboard::new(
            backend.clone(),
            Session::new(Storage::in_memory().unwrap()),
            "http://backend/github/login".to_string(),
            config,
        )
    }

    #[tokio::test]
    async fn test_anonymous_shows_login() -> Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut dash = dashboard(&backend);
        dash.load().await?;

        assert!(matches!(
            dash.view(),
            DashboardView::Login { login_url: "http://backend/github/login" }
        ));
        assert_eq!(backend.calls("user_stats"), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_signed_in_without_selection_shows_picker() -> Result<()> {
        let backend = Arc::new(FakeBackend::default());
        {
            let mut state = backend.state();
            state.session = Some(alice());
            state.stats.github_repos = vec![repo(1, "one"), repo(2, "two")];
        }
        let mut dash = dashboard(&backend);
        dash.load().await?;
        dash.toggle_repository(2);

        match dash.view() {
            DashboardView::SelectRepos {
                profile,
                available,
                selected,
            } => {
                assert_eq!(profile.login, "alice");
                assert_eq!(profile.followers, 5);
                assert_eq!(profile.public_repos, 3);
                assert_eq!(available[0].id, 1);
                assert_eq!(selected[0].id, 2);
            }
            other => panic!("unexpected view {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_rejects_and_submits() -> Result<()> {
        let backend = Arc::new(FakeBackend::default());
        {
            let mut state = backend.state();
            state.session = Some(alice());
            state.stats.github_repos = (101..=105).map(|id| repo(id, "r")).collect();
        }
        let mut dash = dashboard(&backend);
        dash.load().await?;

        let notice = dash.confirm_selection().await?;
        assert_eq!(notice, Notice::error("Please select at least one repo to start analysis!"));

        for id in 101..=105 {
            dash.toggle_repository(id);
        }
        let notice = dash.confirm_selection().await?;
        assert_eq!(notice, Notice::error("You can select up to 4 repos for analysis!"));
        assert_eq!(backend.calls("set_repositories"), 0);

        dash.toggle_repository(105);
        let stats_calls = backend.calls("user_stats");
        let notice = dash.confirm_selection().await?;
        assert!(!notice.is_error());
        assert_eq!(backend.calls("set_repositories"), 1);
        assert!(backend.calls("user_stats") > stats_calls);
        assert!(dash.selection().is_empty());
        assert!(matches!(dash.view(), DashboardView::Overview(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_submit_still_reloads() -> Result<()> {
        let backend = Arc::new(FakeBackend::default());
        {
            let mut state = backend.state();
            state.session = Some(alice());
            state.fail.insert("set_repositories");
        }
        let mut dash = dashboard(&backend);
        dash.load().await?;
        dash.toggle_repository(1);

        let before = backend.calls("user_stats");
        let notice = dash.confirm_selection().await?;
        assert!(notice.is_error());
        assert_eq!(backend.calls("user_stats"), before + 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_analysis_progress_then_refresh() -> Result<()> {
        let backend = Arc::new(FakeBackend::default());
        {
            let mut state = backend.state();
            state.session = Some(alice());
            state.stats.github_repos = vec![repo(1, "one")];
            state.stats.repositories = vec![1];
        }
        backend.queue_progress([Some(0.1), Some(0.4), Some(0.9), Some(-1.0)]);

        let mut dash = dashboard(&backend);
        dash.load().await?;
        {
            let mut state = backend.state();
            state.completed = true;
            state.stats.status = AnalysisStatus::Completed;
            state.stats.metrics_summary = report("summary");
            state.stats.metrics.insert("1".to_string(), report("one"));
        }
        let stats_calls = backend.calls("user_stats");

        let mut shown = Vec::new();
        let last = dash
            .analyze(|state| {
                if let Some(p) = state.percent() {
                    shown.push(format!("{:.0}%", p));
                }
            })
            .await?;

        assert_eq!(last, ProgressState::Completed);
        assert_eq!(shown, vec!["10%", "40%", "90%"]);
        assert!(backend.calls("user_stats") > stats_calls);

        match dash.view() {
            DashboardView::Overview(overview) => {
                assert!(overview.pending.is_empty());
                assert!(overview.summary.is_some());
                assert_eq!(overview.repositories.len(), 1);
            }
            other => panic!("unexpected view {:?}", other),
        }
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_poll_does_not_refresh() -> Result<()> {
        let backend = Arc::new(FakeBackend::default());
        backend.state().session = Some(alice());
        backend.queue_progress([Some(0.3), None]);

        let mut dash = dashboard(&backend);
        dash.load().await?;
        let stats_calls = backend.calls("user_stats");

        let last = dash.analyze(|_| {}).await?;
        assert!(matches!(last, ProgressState::Failed { .. }));
        assert_eq!(backend.calls("user_stats"), stats_calls);
        Ok(())
    }

    #[tokio::test]
    async fn test_completed_placeholder_summary_still_shown() -> Result<()> {
        let backend = Arc::new(FakeBackend::default());
        {
            let mut state = backend.state();
            state.session = Some(alice());
            state.completed = true;
            state.stats.github_repos = vec![repo(1, "one")];
            state.stats.repositories = vec![1];
            state.stats.status = AnalysisStatus::Completed;
        }
        let mut dash = dashboard(&backend);
        dash.load().await?;

        match dash.view() {
            DashboardView::Overview(ref overview) => {
                assert_eq!(overview.summary, Some(&MetricReport::Missing));
            }
            other => panic!("unexpected view {:?}", other),
        }

        let out = render::render_dashboard(&dash.view(), OutputFormat::Text, &Expand::Collapsed);
        assert!(out.contains("=== Summarised Metrics ===\n\nNo metrics available\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_expand_is_exclusive() {
        let backend = Arc::new(FakeBackend::default());
        let mut dash = dashboard(&backend);
        dash.toggle_expanded(1);
        dash.toggle_expanded(2);
        assert_eq!(dash.expanded, Some(2));
        dash.toggle_expanded(2);
        assert_eq!(dash.expanded, None);
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() -> Result<()> {
        let backend = Arc::new(FakeBackend::default());
        backend.state().session = Some(alice());
        let mut dash = dashboard(&backend);
        dash.load().await?;
        assert!(dash.profile().is_some());

        dash.logout().await?;
        assert!(matches!(dash.view(), DashboardView::Login { .. }));
        Ok(())
    }
}
