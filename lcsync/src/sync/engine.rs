use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::fetcher::{FetcherError, PAGE_SIZE, Pacing, SubmissionFetcher, SubmissionSource};
use super::index::{LocalIndex, build_index};
use super::paths::problems_root;
use super::reconcile::{Classified, ConflictPolicy, ConflictResolution, classify};
use super::submission::EnrichedSubmission;
use super::writer::{SkipReason, SolutionWriter, WriteMode, WriteOutcome};
use crate::events::{EventSink, SyncEvent};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetcherError),
    #[error("failed to scan {}: {source}", .path.display())]
    Index {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, SyncError::Fetch(FetcherError::SessionExpired(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSubmission {
    pub id: String,
    pub title_slug: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSubmission {
    pub id: String,
    pub title_slug: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub existing: usize,
    pub fetched: usize,
    pub new: usize,
    pub duplicates: usize,
    pub resolution: Option<ConflictResolution>,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedSubmission>,
    pub failed: Vec<FailedSubmission>,
}

impl SyncReport {
    pub fn saved_count(&self) -> usize {
        self.written.len()
    }

    /// Duplicates dropped because the policy kept the on-disk version.
    pub fn ignored_duplicates(&self) -> usize {
        match self.resolution {
            Some(ConflictResolution::Ignore) => self.duplicates,
            _ => 0,
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &SkippedSubmission> {
        self.skipped
            .iter()
            .filter(|skipped| !skipped.reason.is_informational())
    }
}

/// One sync run: index the target tree, fetch accepted submissions, split
/// new from duplicate, let the policy decide on duplicates, then write.
pub struct SyncEngine<S> {
    source: S,
    target_root: PathBuf,
    pacing: Pacing,
    page_size: u32,
}

impl<S: SubmissionSource> SyncEngine<S> {
    pub fn new(source: S, target_root: impl Into<PathBuf>) -> Self {
        Self {
            source,
            target_root: target_root.into(),
            pacing: Pacing::default(),
            page_size: PAGE_SIZE,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub async fn local_index(&self) -> Result<LocalIndex, SyncError> {
        build_index(&self.target_root)
            .await
            .map_err(|source| SyncError::Index {
                path: problems_root(&self.target_root),
                source,
            })
    }

    pub async fn run(
        &self,
        policy: &mut dyn ConflictPolicy,
        sink: &dyn EventSink,
    ) -> Result<SyncReport, SyncError> {
        let index = self.local_index().await?;
        sink.emit(SyncEvent::info("scanned local solutions").with("existing", index.len()));

        let fetched = SubmissionFetcher::new(&self.source)
            .with_pacing(self.pacing)
            .with_page_size(self.page_size)
            .fetch_all_accepted(sink)
            .await?;

        let mut report = SyncReport {
            existing: index.len(),
            fetched: fetched.len(),
            ..SyncReport::default()
        };

        let Classified { new, duplicates } = classify(fetched, &index);
        report.new = new.len();
        report.duplicates = duplicates.len();
        sink.emit(
            SyncEvent::info("classified submissions")
                .with("new", report.new)
                .with("duplicates", report.duplicates),
        );

        let accepted_duplicates = if duplicates.is_empty() {
            Vec::new()
        } else {
            let resolution = policy.resolve(&duplicates);
            report.resolution = Some(resolution);
            sink.emit(
                SyncEvent::info("conflict policy applied")
                    .with("resolution", format!("{resolution:?}"))
                    .with("duplicates", duplicates.len()),
            );
            resolution.accepted(duplicates)
        };

        // Classification is by slug, so every target path still sees its
        // submissions in the order the remote returned them.
        let mut writer = SolutionWriter::new(&self.target_root);
        for submission in &new {
            self.persist(&mut writer, submission, WriteMode::CreateOnly, &mut report, sink)
                .await;
        }
        for submission in &accepted_duplicates {
            self.persist(&mut writer, submission, WriteMode::Replace, &mut report, sink)
                .await;
        }

        sink.emit(
            SyncEvent::info("sync finished")
                .with("saved", report.saved_count())
                .with("skipped", report.skipped.len())
                .with("failed", report.failed.len()),
        );
        Ok(report)
    }

    async fn persist(
        &self,
        writer: &mut SolutionWriter,
        submission: &EnrichedSubmission,
        mode: WriteMode,
        report: &mut SyncReport,
        sink: &dyn EventSink,
    ) {
        match writer.write(submission, mode).await {
            Ok(WriteOutcome::Written { path, replaced }) => {
                sink.emit(
                    SyncEvent::info(if replaced {
                        "replaced solution"
                    } else {
                        "saved solution"
                    })
                    .with("path", self.relative(&path).display()),
                );
                report.written.push(path);
            }
            Ok(WriteOutcome::Skipped(reason)) => {
                let event = if reason.is_informational() {
                    SyncEvent::info("skipped submission")
                } else {
                    SyncEvent::warn("dropped invalid submission")
                };
                sink.emit(
                    event
                        .with("id", &submission.id)
                        .with("slug", &submission.title_slug)
                        .with("reason", &reason),
                );
                report.skipped.push(SkippedSubmission {
                    id: submission.id.clone(),
                    title_slug: submission.title_slug.clone(),
                    reason,
                });
            }
            Err(err) => {
                sink.emit(
                    SyncEvent::error("failed to write solution")
                        .with("id", &submission.id)
                        .with("slug", &submission.title_slug)
                        .with("error", &err),
                );
                report.failed.push(FailedSubmission {
                    id: submission.id.clone(),
                    title_slug: submission.title_slug.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.target_root).unwrap_or(path)
    }
}
