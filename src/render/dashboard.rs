use crate::models::{Team, UserProfile};
use crate::models::team::member_profile_url;
use crate::render::metrics::{render_markdown, render_text, Expand};
use crate::render::OutputFormat;
use crate::views::dashboard::{DashboardView, Overview};
use crate::views::teams::TeamsView;

/// The navigation bar: signed-in user and their GitHub counters.
pub fn header(profile: &UserProfile) -> String {
    format!(
        "Repo Analyser | {} | Github Followers: {} | Public Repositories: {}\n",
        profile.login, profile.followers, profile.public_repos
    )
}

pub fn render_dashboard(view: &DashboardView<'_>, format: OutputFormat, expand: &Expand) -> String {
    match format {
        OutputFormat::Markdown => dashboard_markdown(view, expand),
        _ => dashboard_text(view, expand),
    }
}

fn dashboard_text(view: &DashboardView<'_>, expand: &Expand) -> String {
    let mut output = String::new();

    match view {
        DashboardView::Login { login_url } => {
            output.push_str("\n=== Repo Analyser ===\n\n");
            output.push_str("You are not signed in.\n");
            output.push_str(&format!("Login with GitHub: {}\n", login_url));
        }
        DashboardView::Unavailable { profile } => {
            output.push_str(&header(profile));
            output.push_str("\nYour stats could not be loaded. Try again later.\n");
        }
        DashboardView::SelectRepos {
            profile,
            available,
            selected,
        } => {
            output.push_str(&header(profile));
            output.push_str("\nSelect Repos:\n");
            for repo in available {
                output.push_str(&format!("  [ ] {} ({})\n", repo.name, repo.id));
            }
            output.push_str("\nSelected Repos:\n");
            if selected.is_empty() {
                output.push_str("  (none)\n");
            }
            for repo in selected {
                output.push_str(&format!("  [x] {} ({})\n", repo.name, repo.id));
            }
        }
        DashboardView::Overview(overview) => overview_text(&mut output, overview, expand),
    }

    output
}

fn overview_text(output: &mut String, overview: &Overview<'_>, expand: &Expand) {
    output.push_str(&header(overview.profile));

    if !overview.pending.is_empty() {
        output.push_str("\nSelected Repos:\n");
        for repo in &overview.pending {
            output.push_str(&format!("  - {} <{}>\n", repo.name, repo.html_url));
        }
        output.push_str("Run `repo-analyser analyze` to start the analysis.\n");
    }

    if let Some(summary) = overview.summary {
        output.push_str("\n=== Summarised Metrics ===\n\n");
        output.push_str(&render_text(summary, expand));
    }

    for (repo, report) in &overview.repositories {
        if overview.expanded == Some(repo.id) {
            output.push_str(&format!("\n--- {} ---\n", repo.name));
            output.push_str(&render_text(report, expand));
        } else {
            output.push_str(&format!("\n+ {} ({})\n", repo.name, repo.id));
        }
    }
}

fn dashboard_markdown(view: &DashboardView<'_>, expand: &Expand) -> String {
    let mut output = String::new();

    match view {
        DashboardView::Login { login_url } => {
            output.push_str("# Repo Analyser\n\n");
            output.push_str(&format!("[Login with GitHub]({})\n", login_url));
        }
        DashboardView::Unavailable { profile } => {
            output.push_str(&format!("# {}\n\n", profile.login));
            output.push_str("_Stats unavailable._\n");
        }
        DashboardView::SelectRepos {
            profile,
            available,
            selected,
        } => {
            output.push_str(&format!("# {}\n\n## Select Repos\n\n", profile.login));
            for repo in available {
                output.push_str(&format!("- [ ] {} (`{}`)\n", repo.name, repo.id));
            }
            for repo in selected {
                output.push_str(&format!("- [x] {} (`{}`)\n", repo.name, repo.id));
            }
        }
        DashboardView::Overview(overview) => {
            output.push_str(&format!("# {}\n\n", overview.profile.login));
            output.push_str(&format!(
                "| Followers | Public Repositories |\n|-----------|---------------------|\n| {} | {} |\n",
                overview.profile.followers, overview.profile.public_repos
            ));

            if !overview.pending.is_empty() {
                output.push_str("\n## Selected Repos\n\n");
                for repo in &overview.pending {
                    output.push_str(&format!("- [{}]({})\n", repo.name, repo.html_url));
                }
            }
            if let Some(summary) = overview.summary {
                output.push_str("\n## Summarised Metrics\n\n");
                output.push_str(&render_markdown(summary, expand));
            }
            for (repo, report) in &overview.repositories {
                output.push_str(&format!("\n## [{}]({})\n\n", repo.name, repo.html_url));
                output.push_str(&render_markdown(report, expand));
            }
        }
    }

    output
}

pub fn render_teams(view: &TeamsView, format: OutputFormat, expand: &Expand) -> String {
    let mut output = String::new();
    let markdown = format == OutputFormat::Markdown;

    output.push_str(if markdown { "# Teams\n" } else { "\n=== Teams ===\n" });
    if view.teams().is_empty() {
        output.push_str("\nNo teams yet.\n");
    }

    for team in view.teams() {
        let open = view.is_expanded(&team.team_name);
        if markdown {
            output.push_str(&format!("\n## {} ({})\n\n", team.team_name, team.status));
        } else {
            let marker = if open { "-" } else { "+" };
            output.push_str(&format!("\n{} {} [{}]\n", marker, team.team_name, team.status));
        }
        output.push_str(&members_line(team, markdown));

        if open {
            if let Some(report) = team.visible_metrics() {
                let body = if markdown {
                    render_markdown(report, expand)
                } else {
                    render_text(report, expand)
                };
                output.push('\n');
                output.push_str(&body);
            }
        }
    }

    output
}

fn members_line(team: &Team, markdown: bool) -> String {
    if team.team_members.is_empty() {
        return "Team Members: No members\n".to_string();
    }
    let members: Vec<_> = team
        .team_members
        .iter()
        .map(|m| {
            if markdown {
                format!("[{}]({})", m, member_profile_url(m))
            } else {
                m.clone()
            }
        })
        .collect();
    format!("Team Members: {}\n", members.join(", "))
}
