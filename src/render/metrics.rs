use crate::models::{MetricFields, MetricReport};
use crate::render::description::Description;

pub const NO_METRICS: &str = "No metrics available";

/// Which description boxes are opened in full.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Expand {
    #[default]
    Collapsed,
    All,
    /// A single box, by title (case-insensitive).
    Field(String),
}

impl Expand {
    fn opens(&self, title: &str) -> bool {
        match self {
            Expand::Collapsed => false,
            Expand::All => true,
            Expand::Field(name) => name.eq_ignore_ascii_case(title),
        }
    }
}

/// The description boxes in display order, with their titles.
pub fn descriptions(fields: &MetricFields) -> Vec<(&'static str, &str)> {
    let mut boxes = vec![
        ("Project Description", fields.project_descriptions.as_str()),
        ("Readme File", fields.readme_file_quality.as_str()),
        ("Coding Style", fields.code_quality_style.as_str()),
        ("Directory Structure", fields.directory_structure.as_str()),
        ("Commit Names", fields.commit_names.as_str()),
    ];
    if let Some(ref branches) = fields.branches {
        boxes.push(("Branches", branches.as_str()));
    }
    boxes
}

fn languages(fields: &MetricFields) -> String {
    fields
        .languages_used
        .keys()
        .map(|l| format!("[{}]", l))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_text(report: &MetricReport, expand: &Expand) -> String {
    let Some(fields) = report.fields() else {
        return format!("{}\n", NO_METRICS);
    };

    let mut output = String::new();

    if !fields.languages_used.is_empty() {
        output.push_str(&format!("Languages: {}\n", languages(fields)));
    }
    output.push_str(&format!(
        "Stars: {}    Forks: {}\n",
        fields.stars, fields.forks
    ));
    output.push_str(&format!(
        "Code Rate: {:.2} bytes/week    Commit Rate: {:.2} commits/week\n",
        fields.code_rate, fields.commit_rate
    ));
    output.push_str(&format!(
        "Code Quality Score: {:.0}%    Percent Contribution: {:.0}%\n",
        fields.code_quality_score, fields.percent_contribution
    ));

    let boxes = descriptions(fields);
    for (title, text) in &boxes {
        output.push_str(&format!("\n{}:\n", title));
        for line in Description::new(text).collapsed().lines() {
            output.push_str(&format!("  {}\n", line));
        }
    }

    for (title, text) in &boxes {
        let desc = Description::new(text);
        if desc.has_more() && expand.opens(title) {
            output.push_str(&format!("\n── {} ──\n{}\n", title, desc.full()));
        }
    }

    output
}

pub fn render_markdown(report: &MetricReport, expand: &Expand) -> String {
    let Some(fields) = report.fields() else {
        return format!("*{}*\n", NO_METRICS);
    };

    let mut output = String::new();

    if !fields.languages_used.is_empty() {
        let langs: Vec<_> = fields.languages_used.keys().map(|l| format!("`{}`", l)).collect();
        output.push_str(&format!("**Languages:** {}\n\n", langs.join(" ")));
    }

    output.push_str("| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!("| Stars | {} |\n", fields.stars));
    output.push_str(&format!("| Forks | {} |\n", fields.forks));
    output.push_str(&format!("| Code Rate | {:.2} bytes/week |\n", fields.code_rate));
    output.push_str(&format!("| Commit Rate | {:.2} commits/week |\n", fields.commit_rate));
    output.push_str(&format!(
        "| Code Quality Score | {:.0}% |\n",
        fields.code_quality_score
    ));
    output.push_str(&format!(
        "| Percent Contribution | {:.0}% |\n",
        fields.percent_contribution
    ));

    for (title, text) in descriptions(fields) {
        let desc = Description::new(text);
        let body = if expand.opens(title) {
            desc.full().to_string()
        } else {
            desc.collapsed()
        };
        output.push_str(&format!("\n**{}**\n\n{}\n", title, body));
    }

    output
}
