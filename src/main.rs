use std::sync::Arc;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use repoanalyser::render::{self, Expand, OutputFormat};
use repoanalyser::views::{Notice, TeamDraft};
use repoanalyser::{
    ApiClient, Backend, Config, Dashboard, ProgressState, Session, Storage, TeamsView, ViewConfig,
};

#[derive(Parser, Debug)]
#[command(name = "repo-analyser")]
#[command(version = "0.1.0")]
#[command(about = "Select repositories, run analyses and read quality metrics from the Repo Analyser backend")]
struct Args {
    /// Output format (json, text, markdown)
    #[arg(short, long, default_value = "text", global = true)]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Backend base URL (overrides REPO_ANALYSER_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session cookie value (overrides REPO_ANALYSER_SESSION and the stored cookie)
    #[arg(long, global = true)]
    session: Option<String>,

    /// Database path for the session cache
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the dashboard (default)
    Show(MetricsArgs),
    /// Print the GitHub login URL, or store the session cookie obtained from it
    Login {
        /// Value of the backend's `session` cookie after logging in
        #[arg(long)]
        cookie: Option<String>,
    },
    /// Forget the cached profile and log out of the backend
    Logout,
    /// List the repositories of the signed-in account
    Repos,
    /// Select repositories for analysis (at most 4)
    Select {
        /// Repository ids; giving an id twice deselects it
        ids: Vec<u64>,
    },
    /// Clear the repository selection
    Reset,
    /// Trigger an analysis and follow its progress
    Analyze {
        /// Follow an analysis that is already running instead of starting one
        #[arg(long)]
        watch: bool,
    },
    /// Print whether the analysis has completed
    Status,
    /// Manage teams
    Teams {
        #[command(subcommand)]
        command: Option<TeamsCommand>,
    },
}

#[derive(clap::Args, Debug, Default)]
struct MetricsArgs {
    /// Expand the metrics of one repository (by id)
    #[arg(long)]
    expand: Option<u64>,

    /// Open one clipped description in full (e.g. "Readme File")
    #[arg(long)]
    more: Option<String>,

    /// Open every clipped description in full
    #[arg(long)]
    full: bool,
}

impl MetricsArgs {
    fn expansion(&self) -> Expand {
        match (&self.more, self.full) {
            (_, true) => Expand::All,
            (Some(title), false) => Expand::Field(title.clone()),
            (None, false) => Expand::Collapsed,
        }
    }
}

#[derive(Subcommand, Debug)]
enum TeamsCommand {
    /// List teams (default)
    List,
    /// Show one team with its metrics
    Show {
        name: String,
        #[command(flatten)]
        metrics: MetricsArgs,
    },
    /// Create a team and start its analysis
    Create {
        name: String,
        /// Member GitHub handle; repeat for each member
        #[arg(short, long = "member")]
        members: Vec<String>,
    },
    /// Delete a team
    Delete { name: String },
    /// Start the analysis of an existing team
    Analyze { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("repoanalyser=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = Config::load(args.api_url.as_deref())?;
    let database = args.database.clone().unwrap_or_else(|| config.database_path.clone());
    let storage = Storage::new(&database)?;

    if let Some(Command::Login { cookie: Some(ref cookie) }) = args.command {
        storage.save_session_cookie(cookie)?;
        storage.clear_profile()?;
        tracing::info!("Session cookie stored in {}", database);
    }

    let cookie = match args.session.clone().or_else(|| config.session_cookie.clone()) {
        Some(cookie) => Some(cookie),
        None => storage.session_cookie()?,
    };

    let client = ApiClient::new(&config.api_url, cookie.as_deref())?;
    let login_url = client.login_url();
    let backend: Arc<dyn Backend> = Arc::new(client);
    let view_config = ViewConfig::from(&config);
    let format = OutputFormat::parse(&args.format);

    let mut dashboard = Dashboard::new(
        backend.clone(),
        Session::new(storage),
        login_url.clone(),
        view_config.clone(),
    );

    let output = match args.command {
        None => show(&mut dashboard, &MetricsArgs::default(), format).await?,
        Some(Command::Show(ref metrics)) => show(&mut dashboard, metrics, format).await?,
        Some(Command::Login { cookie: None }) => {
            format!(
                "Open {} in a browser, then run `repo-analyser login --cookie <session>` with the `session` cookie it sets.\n",
                login_url
            )
        }
        Some(Command::Login { cookie: Some(_) }) => {
            show(&mut dashboard, &MetricsArgs::default(), format).await?
        }
        Some(Command::Logout) => {
            dashboard.logout().await?;
            dashboard.session().storage().clear_session_cookie()?;
            "Logged out.\n".to_string()
        }
        Some(Command::Repos) => {
            let repos = backend.account_repositories().await?;
            if format == OutputFormat::Json {
                serde_json::to_string_pretty(&repos)?
            } else {
                repos
                    .iter()
                    .map(|r| format!("{:>12}  {}  {}\n", r.id, r.name, r.html_url))
                    .collect()
            }
        }
        Some(Command::Select { ref ids }) => {
            dashboard.load().await?;
            for id in ids {
                dashboard.toggle_repository(*id);
            }
            let notice = dashboard.confirm_selection().await?;
            with_notice(&notice, show_loaded(&dashboard, &MetricsArgs::default(), format)?)
        }
        Some(Command::Reset) => {
            dashboard.load().await?;
            let notice = dashboard.reset_selection().await;
            with_notice(&notice, String::new())
        }
        Some(Command::Analyze { watch }) => analyze(&mut dashboard, watch, format).await?,
        Some(Command::Status) => {
            if backend.user_completed().await? {
                "Completed\n".to_string()
            } else {
                "Not completed\n".to_string()
            }
        }
        Some(Command::Teams { ref command }) => {
            let mut teams = TeamsView::new(backend.clone(), view_config);
            teams_command(&mut teams, command.as_ref(), format).await?
        }
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output)?;
        tracing::info!("Output written to: {}", path);
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn with_notice(notice: &Notice, body: String) -> String {
    format!("{}\n{}", notice, body)
}

async fn show(dashboard: &mut Dashboard, metrics: &MetricsArgs, format: OutputFormat) -> anyhow::Result<String> {
    dashboard.load().await?;
    show_loaded(dashboard, metrics, format)
}

fn show_loaded(dashboard: &Dashboard, metrics: &MetricsArgs, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        let json = serde_json::json!({
            "profile": dashboard.profile(),
            "completed": dashboard.is_completed(),
            "stats": dashboard.stats(),
        });
        return Ok(serde_json::to_string_pretty(&json)?);
    }

    let mut dashboard_view = dashboard.view();
    if let repoanalyser::views::DashboardView::Overview(ref mut overview) = dashboard_view {
        overview.expanded = metrics.expand;
    }
    Ok(render::render_dashboard(&dashboard_view, format, &metrics.expansion()))
}

async fn analyze(dashboard: &mut Dashboard, watch: bool, format: OutputFormat) -> anyhow::Result<String> {
    dashboard.load().await?;
    if dashboard.profile().is_none() {
        return Ok(format!("Not signed in. Login with GitHub: {}\n", dashboard.login_url()));
    }

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")?
            .progress_chars("#>-"),
    );

    let on_update = |state: &ProgressState| match state {
        ProgressState::Running(_) => {
            let percent = state.percent().unwrap_or_default().clamp(0.0, 100.0);
            pb.set_position(percent.round() as u64);
        }
        ProgressState::Completed => pb.finish_with_message("Analysis complete"),
        ProgressState::Failed { message, .. } => {
            pb.abandon_with_message(format!("Progress unavailable: {}", message))
        }
        ProgressState::Idle => {}
    };

    let last = if watch {
        dashboard.watch_analysis(on_update).await?
    } else {
        dashboard.analyze(on_update).await?
    };

    match last {
        ProgressState::Completed => show_loaded(dashboard, &MetricsArgs::default(), format),
        ProgressState::Failed { message, retryable } => {
            let hint = if retryable { " Try again shortly." } else { "" };
            Ok(format!("{}\n", Notice::error(format!("Analysis progress failed: {}.{}", message, hint))))
        }
        other => Ok(format!("Analysis {}\n", other)),
    }
}

async fn teams_command(
    teams: &mut TeamsView,
    command: Option<&TeamsCommand>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match command {
        None | Some(TeamsCommand::List) => {
            teams.load().await?;
            render_teams(teams, format, &Expand::Collapsed)
        }
        Some(TeamsCommand::Show { name, metrics }) => {
            teams.load().await?;
            if teams.team(name).is_none() {
                return Ok(format!("{}\n", Notice::error(format!("Team \"{}\" not found", name))));
            }
            teams.toggle_expanded(name);
            render_teams(teams, format, &metrics.expansion())
        }
        Some(TeamsCommand::Create { name, members }) => {
            teams.load().await?;
            let mut draft = TeamDraft::new(name.clone());
            for member in members {
                draft.add_member(member.clone());
            }
            teams.draft = draft;
            let notice = teams.create().await;
            Ok(with_notice(&notice, render_teams(teams, format, &Expand::Collapsed)?))
        }
        Some(TeamsCommand::Delete { name }) => {
            teams.load().await?;
            let notice = teams.delete(name).await;
            Ok(with_notice(&notice, render_teams(teams, format, &Expand::Collapsed)?))
        }
        Some(TeamsCommand::Analyze { name }) => {
            let notice = teams.analyze(name).await;
            Ok(format!("{}\n", notice))
        }
    }
}

fn render_teams(teams: &TeamsView, format: OutputFormat, expand: &Expand) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(teams.teams())?);
    }
    Ok(render::render_teams(teams, format, expand))
}
