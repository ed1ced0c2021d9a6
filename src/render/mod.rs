pub mod dashboard;
pub mod description;
pub mod metrics;

pub use dashboard::{header, render_dashboard, render_teams};
pub use description::{Description, DESCRIPTION_LIMIT};
pub use metrics::{render_markdown, render_text, Expand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Markdown,
    Json,
}

impl OutputFormat {
    /// Unknown names fall back to text.
    pub fn parse(name: &str) -> Self {
        match name {
            "json" => OutputFormat::Json,
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Text,
        }
    }
}
