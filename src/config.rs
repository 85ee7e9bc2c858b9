//! Run configuration for claude-init
//!
//! One immutable value built from the CLI flags. Paths derived from it are
//! computed on demand; the installer re-queries the file system rather than
//! caching state, so repeated runs stay idempotent.

use std::path::{Path, PathBuf};

use crate::setup::{Result, SetupError};

/// Immutable configuration for a single setup run.
#[derive(Debug, Clone)]
pub struct SetupConfig {
    /// Source for claude_tasks: git URL, SSH remote, or local path.
    pub source: Option<String>,
    /// Absolute installation root. Must already exist.
    pub target: PathBuf,
    /// Overwrite existing artifacts.
    pub force: bool,
    /// Skip the .gitignore patch.
    pub no_git: bool,
    /// Skip the test dashboard module.
    pub no_dashboard: bool,
}

impl SetupConfig {
    /// Build a config, resolving `target` to an absolute path.
    ///
    /// The target directory must exist - the installer never creates it.
    pub fn new(
        source: Option<String>,
        target: &Path,
        force: bool,
        no_git: bool,
        no_dashboard: bool,
    ) -> Result<Self> {
        let target = target
            .canonicalize()
            .map_err(|_| SetupError::TargetNotFound(target.to_path_buf()))?;

        Ok(Self {
            source,
            target,
            force,
            no_git,
            no_dashboard,
        })
    }

    /// `<target>/claude_tasks`
    pub fn tasks_dir(&self) -> PathBuf {
        self.target.join("claude_tasks")
    }

    /// `<target>/CLAUDE.md`
    pub fn claude_md_path(&self) -> PathBuf {
        self.target.join("CLAUDE.md")
    }

    /// `<target>/test-dashboard-module`
    pub fn dashboard_dir(&self) -> PathBuf {
        self.target.join("test-dashboard-module")
    }

    /// `<target>/.gitignore`
    pub fn gitignore_path(&self) -> PathBuf {
        self.target.join(".gitignore")
    }

    /// Name for the synthesized dashboard package: `<dir-name>-test-dashboard`.
    pub fn dashboard_package_name(&self) -> String {
        let dir_name = self
            .target
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project");
        format!("{}-test-dashboard", dir_name)
    }
}
