use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A computed metrics report for a repository, a user summary or a team.
///
/// Whether a report exists is decided once, when it is decoded: a report is
/// present only if it carries a non-empty `project_descriptions`. The backend
/// stores placeholder reports with every field set to `null` before any
/// analysis has run, and those decode as [`MetricReport::Missing`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MetricReport {
    #[default]
    Missing,
    Present(MetricFields),
}

impl MetricReport {
    pub fn is_present(&self) -> bool {
        matches!(self, MetricReport::Present(_))
    }

    pub fn fields(&self) -> Option<&MetricFields> {
        match self {
            MetricReport::Present(fields) => Some(fields),
            MetricReport::Missing => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricFields {
    /// Language name to byte count.
    pub languages_used: BTreeMap<String, u64>,
    pub stars: u64,
    pub forks: u64,
    /// Bytes per week.
    pub code_rate: f64,
    /// Commits per week.
    pub commit_rate: f64,
    /// 0 to 100.
    pub code_quality_score: f64,
    /// 0 to 100.
    pub percent_contribution: f64,
    pub project_descriptions: String,
    pub readme_file_quality: String,
    pub code_quality_style: String,
    pub directory_structure: String,
    pub commit_names: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_repos: Option<u64>,
}

/// Wire shape. Every field may be `null` on placeholder reports.
#[derive(Deserialize, Default)]
struct RawMetrics {
    #[serde(default)]
    languages_used: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    stars: Option<u64>,
    #[serde(default)]
    forks: Option<u64>,
    #[serde(default)]
    code_rate: Option<f64>,
    #[serde(default)]
    commit_rate: Option<f64>,
    #[serde(default)]
    code_quality_score: Option<f64>,
    #[serde(default)]
    percent_contribution: Option<f64>,
    #[serde(default)]
    project_descriptions: Option<String>,
    #[serde(default)]
    readme_file_quality: Option<String>,
    #[serde(default)]
    code_quality_style: Option<String>,
    #[serde(default)]
    directory_structure: Option<String>,
    #[serde(default)]
    commit_names: Option<String>,
    #[serde(default)]
    branches: Option<String>,
    #[serde(default)]
    followers: Option<u64>,
    #[serde(default)]
    number_of_repos: Option<u64>,
}

impl RawMetrics {
    fn into_report(self) -> MetricReport {
        let project_descriptions = match self.project_descriptions {
            Some(text) if !text.is_empty() => text,
            _ => return MetricReport::Missing,
        };

        MetricReport::Present(MetricFields {
            languages_used: self.languages_used.unwrap_or_default(),
            stars: self.stars.unwrap_or_default(),
            forks: self.forks.unwrap_or_default(),
            code_rate: self.code_rate.unwrap_or_default(),
            commit_rate: self.commit_rate.unwrap_or_default(),
            code_quality_score: self.code_quality_score.unwrap_or_default(),
            percent_contribution: self.percent_contribution.unwrap_or_default(),
            project_descriptions,
            readme_file_quality: self.readme_file_quality.unwrap_or_default(),
            code_quality_style: self.code_quality_style.unwrap_or_default(),
            directory_structure: self.directory_structure.unwrap_or_default(),
            commit_names: self.commit_names.unwrap_or_default(),
            branches: self.branches,
            followers: self.followers,
            number_of_repos: self.number_of_repos,
        })
    }
}

impl<'de> Deserialize<'de> for MetricReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Ok(MetricReport::Missing);
        }

        match serde_json::from_value::<RawMetrics>(value) {
            Ok(raw) => Ok(raw.into_report()),
            Err(e) => {
                tracing::warn!("Discarding malformed metrics report: {}", e);
                Ok(MetricReport::Missing)
            }
        }
    }
}

impl Serialize for MetricReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricReport::Present(fields) => fields.serialize(serializer),
            MetricReport::Missing => serializer.serialize_none(),
        }
    }
}
