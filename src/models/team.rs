use serde::{Deserialize, Serialize};

use super::metrics::MetricReport;
use super::user::AnalysisStatus;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default)]
    pub status: AnalysisStatus,
    #[serde(default)]
    pub metrics: MetricReport,
}

impl Team {
    /// Metrics are only shown for teams whose analysis has completed.
    pub fn visible_metrics(&self) -> Option<&MetricReport> {
        self.status.is_completed().then_some(&self.metrics)
    }
}

pub fn member_profile_url(member: &str) -> String {
    format!("https://github.com/{}", member)
}
