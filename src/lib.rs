//! claude-init - install the Claude task management system into any project
//!
//! A one-shot scaffolding tool. It drops a `claude_tasks/` document tree
//! (sourced from a git remote, a local path, or embedded templates), creates
//! or merges a `CLAUDE.md` guidance file, installs a minimal test dashboard,
//! and patches `.gitignore` - all idempotently, by re-inspecting the target
//! file system on every run.
//!
//! # Quick Start
//!
//! ```no_run
//! use claude_init::{Setup, SetupConfig};
//! use std::path::Path;
//!
//! let config = SetupConfig::new(None, Path::new("."), false, false, false).unwrap();
//! Setup::new(config).run().unwrap();
//! ```
//!
//! # Artifacts
//!
//! | Artifact | Behavior when present |
//! |----------|----------------------|
//! | `claude_tasks/` | skipped unless `--force` |
//! | `CLAUDE.md` | merged (marker-guarded), backed up unless `--force` |
//! | `test-dashboard-module/` | skipped unless `--force` |
//! | `.gitignore` | appended once, marker-guarded |

pub mod config;
pub mod dashboard;
pub mod setup;
pub mod source;
pub mod templates;

pub use config::SetupConfig;
pub use dashboard::InstallOutcome;
pub use setup::{Result, Setup, SetupError};
pub use source::{ContentRoot, Source};
