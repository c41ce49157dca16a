use lcsync_core::{Difficulty, SubmissionDetail, SubmissionSummary};

/// An accepted summary merged with whatever its detail query returned. This
/// is what the reconciler and the writer work on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichedSubmission {
    pub id: String,
    pub title: String,
    pub title_slug: String,
    pub lang: String,
    pub lang_verbose: Option<String>,
    pub difficulty: Difficulty,
    pub question_id: Option<String>,
    pub code: String,
    pub timestamp: Option<String>,
    pub detail_loaded: bool,
}

impl EnrichedSubmission {
    /// Bare summary, used when the detail fetch failed. `code` stays empty so
    /// the writer will refuse it.
    pub fn from_summary(summary: SubmissionSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            title_slug: summary.title_slug,
            lang: summary.lang,
            timestamp: summary.timestamp,
            ..Self::default()
        }
    }

    pub fn merge(summary: SubmissionSummary, detail: SubmissionDetail) -> Self {
        let mut merged = Self::from_summary(summary);
        merged.detail_loaded = true;
        merged.code = detail.code;

        if let Some(question) = detail.question {
            merged.difficulty = question.difficulty;
            merged.question_id = question.question_id;
            if merged.title_slug.is_empty() {
                merged.title_slug = question.title_slug;
            }
            if merged.title.is_empty() {
                merged.title = question.title;
            }
        }
        if let Some(lang) = detail.lang {
            if merged.lang.is_empty() {
                merged.lang = lang.name;
            }
            if !lang.verbose_name.is_empty() {
                merged.lang_verbose = Some(lang.verbose_name);
            }
        }
        if merged.timestamp.is_none() {
            merged.timestamp = detail.timestamp;
        }
        merged
    }

    /// Title for display; falls back to the slug.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.title_slug
        } else {
            &self.title
        }
    }
}
