use std::path::{Component, Path, PathBuf};

use lcsync_core::Difficulty;
use thiserror::Error;

pub const PROBLEMS_DIR: &str = "leetcodeProblems";
pub const DIFFICULTY_FOLDERS: [&str; 3] = ["easy", "medium", "hard"];

#[derive(Debug, Error)]
pub enum PathError {
    #[error("title slug is empty")]
    Empty,
    #[error("title slug {0:?} is not a plain file name")]
    UnsupportedComponent(String),
}

/// Unknown difficulty lands in `medium`.
pub fn difficulty_folder(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Hard => "hard",
        Difficulty::Medium | Difficulty::Unknown => "medium",
    }
}

pub fn problems_root(target_root: &Path) -> PathBuf {
    target_root.join(PROBLEMS_DIR)
}

/// `<target>/leetcodeProblems/<difficulty>/<title_slug>.<extension>`
pub fn solution_path(
    target_root: &Path,
    difficulty: Difficulty,
    title_slug: &str,
    extension: &str,
) -> Result<PathBuf, PathError> {
    if title_slug.is_empty() {
        return Err(PathError::Empty);
    }

    // The slug becomes a file name; it must not be able to climb or nest.
    let mut components = Path::new(title_slug).components();
    let single_normal = matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none();
    if !single_normal || title_slug.contains(['/', '\\']) || title_slug.starts_with('.') {
        return Err(PathError::UnsupportedComponent(title_slug.to_string()));
    }

    Ok(problems_root(target_root)
        .join(difficulty_folder(difficulty))
        .join(format!("{title_slug}.{extension}")))
}
