use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;

use super::language::{HeaderFields, comment_style_for, extension_for, render_header};
use super::paths::{DIFFICULTY_FOLDERS, problems_root, solution_path};
use super::submission::EnrichedSubmission;

#[derive(Debug, Error)]
#[error("I/O error writing {}: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Leave an existing file untouched.
    CreateOnly,
    /// Replace an existing file.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingField(&'static str),
    UnsupportedLanguage(String),
    InvalidSlug(String),
    AlreadyExists(PathBuf),
    SupersededInRun(PathBuf),
}

impl SkipReason {
    /// Skips decided by policy rather than by bad input.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            SkipReason::AlreadyExists(_) | SkipReason::SupersededInRun(_)
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField(field) => write!(f, "missing required field {field}"),
            SkipReason::UnsupportedLanguage(lang) => write!(f, "unsupported language {lang:?}"),
            SkipReason::InvalidSlug(slug) => write!(f, "title slug {slug:?} is not a valid file name"),
            SkipReason::AlreadyExists(path) => write!(f, "{} already exists", path.display()),
            SkipReason::SupersededInRun(path) => {
                write!(f, "{} was already written in this run", path.display())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { path: PathBuf, replaced: bool },
    Skipped(SkipReason),
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }
}

/// Writes solution files under the target tree. Remembers which paths it
/// wrote so a single run produces at most one file per path.
#[derive(Debug)]
pub struct SolutionWriter {
    target_root: PathBuf,
    written: HashSet<PathBuf>,
}

impl SolutionWriter {
    pub fn new(target_root: impl Into<PathBuf>) -> Self {
        Self {
            target_root: target_root.into(),
            written: HashSet::new(),
        }
    }

    pub async fn write(
        &mut self,
        submission: &EnrichedSubmission,
        mode: WriteMode,
    ) -> Result<WriteOutcome, WriteError> {
        let (path, content) = match self.prepare(submission) {
            Ok(prepared) => prepared,
            Err(reason) => return Ok(WriteOutcome::Skipped(reason)),
        };
        if self.written.contains(&path) {
            return Ok(WriteOutcome::Skipped(SkipReason::SupersededInRun(path)));
        }

        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|source| WriteError {
                path: path.clone(),
                source,
            })?;
        if exists && mode == WriteMode::CreateOnly {
            return Ok(WriteOutcome::Skipped(SkipReason::AlreadyExists(path)));
        }

        write_atomically(&path, content.as_bytes())
            .await
            .map_err(|source| WriteError {
                path: path.clone(),
                source,
            })?;
        let moved = if mode == WriteMode::Replace {
            remove_stale_copies(&self.target_root, &path).await?
        } else {
            false
        };
        self.written.insert(path.clone());
        Ok(WriteOutcome::Written {
            path,
            replaced: exists || moved,
        })
    }

    fn prepare(&self, submission: &EnrichedSubmission) -> Result<(PathBuf, String), SkipReason> {
        if submission.title_slug.is_empty() {
            return Err(SkipReason::MissingField("titleSlug"));
        }
        if submission.lang.is_empty() {
            return Err(SkipReason::MissingField("lang"));
        }
        if submission.code.is_empty() {
            return Err(SkipReason::MissingField("code"));
        }

        let (Some(extension), Some(style)) = (
            extension_for(&submission.lang),
            comment_style_for(&submission.lang),
        ) else {
            return Err(SkipReason::UnsupportedLanguage(submission.lang.clone()));
        };

        let path = solution_path(
            &self.target_root,
            submission.difficulty,
            &submission.title_slug,
            extension,
        )
        .map_err(|_| SkipReason::InvalidSlug(submission.title_slug.clone()))?;

        let header = render_header(
            style,
            &HeaderFields {
                title: submission.display_title(),
                title_slug: &submission.title_slug,
                difficulty: submission.difficulty,
                language: &submission.lang,
            },
        );
        Ok((path, format!("{header}\n\n{}", submission.code)))
    }
}

/// Deletes copies of the same file left in the other difficulty folders, e.g.
/// a solution first saved under `medium` while its difficulty was unknown.
/// Returns whether anything was removed.
async fn remove_stale_copies(target_root: &Path, written: &Path) -> Result<bool, WriteError> {
    let Some(file_name) = written.file_name() else {
        return Ok(false);
    };
    let root = problems_root(target_root);
    let mut removed = false;
    for folder in DIFFICULTY_FOLDERS {
        let candidate = root.join(folder).join(file_name);
        if candidate == written {
            continue;
        }
        match tokio::fs::remove_file(&candidate).await {
            Ok(()) => removed = true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(WriteError {
                    path: candidate,
                    source,
                });
            }
        }
    }
    Ok(removed)
}

/// Writes to `<target>.partial` next to the target, syncs, then renames over
/// the target. The partial file is removed if any step fails.
async fn write_atomically(target: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let partial = partial_path(target);
    let result = async {
        let mut file = tokio::fs::File::create(&partial).await?;
        file.write_all(content).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&partial, target).await
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    result
}

fn partial_path(target: &Path) -> PathBuf {
    target.with_extension(format!(
        "{}partial",
        target
            .extension()
            .map(|ext| format!("{}.", ext.to_string_lossy()))
            .unwrap_or_default()
    ))
}
