use std::collections::HashSet;
use std::io;
use std::path::Path;

use super::language::is_known_extension;
use super::paths::{DIFFICULTY_FOLDERS, problems_root};

/// Title slugs already present on disk. Rebuilt on every run from the file
/// tree; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIndex {
    slugs: HashSet<String>,
    per_folder: Vec<(&'static str, usize)>,
}

impl LocalIndex {
    pub fn contains(&self, title_slug: &str) -> bool {
        self.slugs.contains(title_slug)
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    /// Number of solution files found in each difficulty folder.
    pub fn per_folder(&self) -> &[(&'static str, usize)] {
        &self.per_folder
    }
}

impl FromIterator<String> for LocalIndex {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            slugs: iter.into_iter().collect(),
            per_folder: Vec::new(),
        }
    }
}

pub async fn build_index(target_root: &Path) -> io::Result<LocalIndex> {
    let root = problems_root(target_root);
    let mut index = LocalIndex::default();

    for folder in DIFFICULTY_FOLDERS {
        let dir = root.join(folder);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                index.per_folder.push((folder, 0));
                continue;
            }
            Err(err) => return Err(err),
        };

        let mut count = 0usize;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
                continue;
            };
            if !is_known_extension(extension) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                index.slugs.insert(stem.to_string());
                count += 1;
            }
        }
        index.per_folder.push((folder, count));
    }

    Ok(index)
}
