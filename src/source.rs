//! Source acquisition for claude_tasks content
//!
//! A source is either a git remote (shallow-cloned into a scratch directory)
//! or a local path. Either way the result is a [`ContentRoot`]: the directory
//! the installer copies documents from. The scratch clone lives inside a
//! [`tempfile::TempDir`] owned by the `ContentRoot`, so it is removed when
//! the root is dropped - on success and on failure alike.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use colored::Colorize;
use tempfile::TempDir;

use crate::setup::{Result, SetupError};

/// A parsed `--source` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `http://`, `https://`, or SSH-style `git@` remote.
    Remote(String),
    /// Local filesystem path.
    Local(PathBuf),
}

impl Source {
    /// Classify a raw source string by scheme prefix.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("git@") {
            Source::Remote(raw.to_string())
        } else {
            Source::Local(PathBuf::from(raw))
        }
    }
}

/// A resolved directory to copy claude_tasks documents from.
///
/// The path is not guaranteed to exist: a clone with an unexpected layout
/// yields a root whose `claude_tasks/` subdirectory is missing, and the
/// caller falls back to embedded templates in that case.
#[derive(Debug)]
pub struct ContentRoot {
    path: PathBuf,
    // Held only for its Drop impl; removing the scratch clone.
    _scratch: Option<TempDir>,
}

impl ContentRoot {
    /// The directory documents are read from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolve a source into a [`ContentRoot`].
///
/// Remote sources are shallow-cloned. A failed clone is fatal and propagates;
/// there is no retry and no timeout on the clone itself. Local sources must
/// exist; if they contain a `claude_tasks/` subdirectory the root descends
/// into it, otherwise the path is used as given.
pub fn acquire(source: &Source) -> Result<ContentRoot> {
    match source {
        Source::Remote(url) => {
            let scratch = TempDir::new()
                .map_err(|e| SetupError::io("Could not create scratch directory", e))?;

            println!("   {} {}", "Cloning".green(), url);
            let output = Command::new("git")
                .args(["clone", "--depth", "1", url])
                .arg(scratch.path())
                .output()
                .map_err(|e| SetupError::io("Could not run git", e))?;

            if !output.status.success() {
                return Err(SetupError::CloneFailed {
                    url: url.clone(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }

            // Strip version-control metadata so it cannot be copied along
            let git_dir = scratch.path().join(".git");
            if git_dir.exists() {
                fs::remove_dir_all(&git_dir)
                    .map_err(|e| SetupError::io("Could not remove .git from clone", e))?;
            }

            let path = scratch.path().join("claude_tasks");
            Ok(ContentRoot {
                path,
                _scratch: Some(scratch),
            })
        }
        Source::Local(path) => {
            if !path.exists() {
                return Err(SetupError::SourceNotFound(path.clone()));
            }

            let nested = path.join("claude_tasks");
            let path = if nested.exists() { nested } else { path.clone() };

            Ok(ContentRoot {
                path,
                _scratch: None,
            })
        }
    }
}
