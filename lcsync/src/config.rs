use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://leetcode.com";
const DEFAULT_COMMIT_MESSAGE: &str = "Update LeetCode submissions";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "LeetCode session credential is not set; export LEETCODE_SESSION or set LEETCODE_COOKIE in the profile file"
    )]
    MissingCredential,
    #[error(
        "target directory is not set; export LCSYNC_TARGET_DIR or set GITHUB_REPO_DIR in the profile file"
    )]
    MissingTargetDir,
    #[error("failed to read profile {}: {source}", .path.display())]
    ReadProfile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid profile {}: {source}", .path.display())]
    ParseProfile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Profile file as written by the setup wizard.
#[derive(Debug, Default, Deserialize)]
struct ProfileFile {
    #[serde(rename = "LEETCODE_COOKIE", default)]
    credential: Option<String>,
    #[serde(rename = "GITHUB_REPO_DIR", default)]
    target_dir: Option<String>,
    #[serde(rename = "GITHUB_COMMIT_MESSAGE", default)]
    commit_message: Option<String>,
}

#[derive(Clone)]
pub struct ProfileConfig {
    pub credential: String,
    pub target_dir: PathBuf,
    pub commit_message: String,
    pub base_url: String,
}

impl fmt::Debug for ProfileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileConfig")
            .field("credential", &"<redacted>")
            .field("target_dir", &self.target_dir)
            .field("commit_message", &self.commit_message)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProfileConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), dirs::home_dir())
    }

    /// Profile file first (`LCSYNC_PROFILE`), then environment overrides.
    pub fn from_lookup<F>(lookup: F, home: Option<PathBuf>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sources = Sources::load(lookup, home)?;

        let credential = sources
            .get("LEETCODE_SESSION")
            .or_else(|| sources.profile.credential.clone())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingCredential)?;
        let target_dir = sources.target_dir()?;
        let commit_message = sources
            .get("LCSYNC_COMMIT_MESSAGE")
            .or_else(|| sources.profile.commit_message.clone())
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string());
        let base_url = sources
            .get("LCSYNC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            credential,
            target_dir,
            commit_message,
            base_url,
        })
    }
}

/// Only the target directory. Local commands need nothing else, in
/// particular no session credential.
pub fn target_dir_from_env() -> Result<PathBuf, ConfigError> {
    target_dir_from_lookup(|name| std::env::var(name).ok(), dirs::home_dir())
}

pub fn target_dir_from_lookup<F>(lookup: F, home: Option<PathBuf>) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Sources::load(lookup, home)?.target_dir()
}

struct Sources<F> {
    lookup: F,
    home: Option<PathBuf>,
    profile: ProfileFile,
}

impl<F: Fn(&str) -> Option<String>> Sources<F> {
    fn load(lookup: F, home: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut sources = Self {
            lookup,
            home,
            profile: ProfileFile::default(),
        };
        if let Some(path) = sources.get("LCSYNC_PROFILE") {
            sources.profile = read_profile(&expand_with_home(&path, sources.home.as_deref()))?;
        }
        Ok(sources)
    }

    /// Blank values count as unset.
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn target_dir(&self) -> Result<PathBuf, ConfigError> {
        self.get("LCSYNC_TARGET_DIR")
            .or_else(|| self.profile.target_dir.clone())
            .filter(|value| !value.trim().is_empty())
            .map(|value| expand_with_home(value.trim(), self.home.as_deref()))
            .ok_or(ConfigError::MissingTargetDir)
    }
}

fn read_profile(path: &Path) -> Result<ProfileFile, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadProfile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::ParseProfile {
        path: path.to_path_buf(),
        source,
    })
}

fn expand_with_home(value: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(value);
    };
    if value == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = value.strip_prefix("~/") {
        return home.join(rest);
    }
    PathBuf::from(value)
}
