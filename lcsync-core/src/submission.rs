use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const ACCEPTED_STATUS: &str = "Accepted";

/// One row of the `submissionList` query.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title_slug: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lang: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_display: String,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub is_pending: Option<String>,
}

impl SubmissionSummary {
    pub fn is_accepted(&self) -> bool {
        self.status_display == ACCEPTED_STATUS
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPage {
    #[serde(default)]
    pub has_next: bool,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub last_key: Option<String>,
    #[serde(default)]
    pub submissions: Vec<SubmissionSummary>,
}

/// Result of the `submissionDetails` query. Every field is optional on the
/// wire; a missing `code` deserializes to an empty string.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub lang: Option<LanguageInfo>,
    #[serde(default)]
    pub question: Option<QuestionInfo>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub verbose_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInfo {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub question_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title_slug: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// Problem difficulty. The API reports it either as a label ("Easy") or as a
/// level number (1..=3); anything else is `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Unknown,
}

impl Difficulty {
    pub fn from_level(level: i64) -> Self {
        match level {
            1 => Difficulty::Easy,
            2 => Difficulty::Medium,
            3 => Difficulty::Hard,
            _ => Difficulty::Unknown,
        }
    }

    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if let Ok(level) = label.parse::<i64>() {
            return Self::from_level(level);
        }
        match label.to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Unknown => "Unknown",
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(number) => number
                .as_i64()
                .map(Difficulty::from_level)
                .unwrap_or(Difficulty::Unknown),
            Value::String(label) => Difficulty::from_label(&label),
            _ => Difficulty::Unknown,
        })
    }
}

// Ids and timestamps come back as strings or numbers depending on the query.
fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value)),
        Value::Number(value) => Ok(Some(value.to_string())),
        Value::Bool(value) => Ok(Some(value.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}
