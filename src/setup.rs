//! Installer orchestration for claude-init
//!
//! `claude-init` installs the Claude task management system into a target
//! project: the `claude_tasks/` document tree, a `CLAUDE.md` guidance file,
//! an optional test dashboard module, and `.gitignore` entries.
//!
//! Each artifact is gated on one presence scan taken at the start of the run:
//! absent means install, present plus `--force` means reinstall, present
//! otherwise means a visible skip. Because the gates are captured up front, a
//! partially completed earlier run and a fully completed one are treated the
//! same by later artifacts. Idempotence comes from re-inspecting the file
//! system, never from state carried between invocations.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::config::SetupConfig;
use crate::dashboard;
use crate::source::{self, Source};
use crate::templates;

/// Error type for setup operations
#[derive(Debug)]
pub enum SetupError {
    /// The target directory does not exist; the installer never creates it.
    TargetNotFound(PathBuf),
    /// A local `--source` path does not exist.
    SourceNotFound(PathBuf),
    /// `git clone` failed (non-zero exit).
    CloneFailed { url: String, stderr: String },
    /// File-system operation failed.
    Io { context: String, source: io::Error },
}

impl SetupError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        SetupError::Io {
            context: context.into(),
            source,
        }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::TargetNotFound(path) => {
                write!(f, "Target directory not found: {}", path.display())
            }
            SetupError::SourceNotFound(path) => {
                write!(f, "Source not found: {}", path.display())
            }
            SetupError::CloneFailed { url, stderr } => {
                write!(f, "Failed to clone {}: {}", url, stderr)
            }
            SetupError::Io { context, source } => write!(f, "{}: {}", context, source),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SetupError>;

/// One setup run over a target directory.
pub struct Setup {
    config: SetupConfig,
}

impl Setup {
    pub fn new(config: SetupConfig) -> Self {
        Self { config }
    }

    /// Execute the setup process.
    pub fn run(&self) -> Result<()> {
        println!(
            "\n{}",
            "Claude Task Management System Setup".cyan().bold()
        );
        println!("   Target directory: {}", self.config.target.display());

        // One presence scan drives every artifact gate for this run
        let tasks_exists = self.config.tasks_dir().exists();
        let dashboard_exists = self.config.dashboard_dir().exists();
        let claude_md_exists = self.config.claude_md_path().exists();

        println!("\nCurrent state:");
        print_state("claude_tasks/", tasks_exists);
        print_state("test-dashboard-module/", dashboard_exists);
        print_state("CLAUDE.md", claude_md_exists);

        if !tasks_exists || self.config.force {
            if tasks_exists && self.config.force {
                println!("\n{} claude_tasks (--force)", "Reinstalling".cyan());
            } else {
                println!("\n{} claude_tasks...", "Installing".cyan());
            }
            self.install_tasks()?;
        } else {
            println!(
                "\n   {} claude_tasks (already exists)",
                "Skipping".yellow()
            );
        }

        if !claude_md_exists || self.config.force {
            if claude_md_exists && self.config.force {
                println!("\n{} CLAUDE.md (--force)", "Updating".cyan());
            } else {
                println!("\n{} CLAUDE.md...", "Creating".cyan());
            }
            self.handle_claude_md()?;
        } else {
            println!("\n   {} CLAUDE.md (already exists)", "Skipping".yellow());
        }

        if !self.config.no_dashboard {
            if !dashboard_exists || self.config.force {
                if dashboard_exists && self.config.force {
                    println!("\n{} test-dashboard-module (--force)", "Reinstalling".cyan());
                } else {
                    println!("\n{} test-dashboard-module...", "Installing".cyan());
                }
                dashboard::install(&self.config)?;
            } else {
                println!(
                    "\n   {} test-dashboard-module (already exists)",
                    "Skipping".yellow()
                );
            }
        }

        if !self.config.no_git {
            println!();
            self.update_gitignore()?;
        }

        println!("\n{}", "Setup complete!".green().bold());
        self.print_next_steps();
        Ok(())
    }

    fn create_directory_structure(&self) -> Result<()> {
        let tasks_dir = self.config.tasks_dir();
        let directories = [
            tasks_dir.clone(),
            tasks_dir.join("active"),
            tasks_dir.join("finished"),
        ];

        for directory in &directories {
            if !directory.exists() {
                fs::create_dir_all(directory).map_err(|e| {
                    SetupError::io(format!("Could not create {}", directory.display()), e)
                })?;
                let shown = match directory.strip_prefix(&self.config.target) {
                    Ok(rel) => rel,
                    Err(_) => directory.as_path(),
                };
                println!("   {} {}/", "Created".green(), shown.display());
            }
        }
        Ok(())
    }

    fn install_tasks(&self) -> Result<()> {
        self.create_directory_structure()?;

        match &self.config.source {
            Some(raw) => {
                // The scratch clone (if any) is removed when `root` drops,
                // whether the copy below succeeds or not.
                let root = source::acquire(&Source::parse(raw))?;
                self.copy_files(root.path())
            }
            None => self.create_from_templates(),
        }
    }

    /// Copy the fixed document set from a resolved source directory.
    ///
    /// Missing source files are skipped silently; existing targets are
    /// skipped with a notice unless `--force`. A source directory that turns
    /// out not to exist (unexpected clone layout) falls back to the embedded
    /// templates instead of failing.
    fn copy_files(&self, source_dir: &Path) -> Result<()> {
        if !source_dir.exists() {
            println!(
                "   {} source claude_tasks not found, using embedded templates",
                "Warning:".yellow()
            );
            return self.create_from_templates();
        }

        let tasks_dir = self.config.tasks_dir();
        for name in templates::SOURCE_FILES {
            let source_file = source_dir.join(name);
            if !source_file.exists() {
                continue;
            }

            let target_file = tasks_dir.join(name);
            if target_file.exists() && !self.config.force {
                println!("   {} existing: {}", "Skipping".yellow(), name);
            } else {
                fs::copy(&source_file, &target_file)
                    .map_err(|e| SetupError::io(format!("Could not copy {}", name), e))?;
                println!("   {} {}", "Copied".green(), name);
            }
        }

        // The active task list nests one level down but follows the same rule
        let active_source = source_dir.join("active").join("ACTIVE_TASKS.md");
        if active_source.exists() {
            let active_target = tasks_dir.join("active").join("ACTIVE_TASKS.md");
            if !active_target.exists() || self.config.force {
                fs::copy(&active_source, &active_target)
                    .map_err(|e| SetupError::io("Could not copy active/ACTIVE_TASKS.md", e))?;
                println!("   {} active/ACTIVE_TASKS.md", "Copied".green());
            }
        }

        Ok(())
    }

    /// Write the embedded fallback documents, substituting today's date.
    fn create_from_templates(&self) -> Result<()> {
        println!("   {} from embedded templates...", "Creating".cyan());

        let date = templates::today();
        let tasks_dir = self.config.tasks_dir();

        for (name, content) in templates::EMBEDDED_TEMPLATES {
            let target_file = if name == "ACTIVE_TASKS.md" {
                tasks_dir.join("active").join(name)
            } else {
                tasks_dir.join(name)
            };

            if target_file.exists() && !self.config.force {
                println!("   {} existing: {}", "Skipping".yellow(), name);
            } else {
                fs::write(&target_file, templates::substitute_date(content, &date))
                    .map_err(|e| SetupError::io(format!("Could not write {}", name), e))?;
                println!("   {} {}", "Created".green(), name);
            }
        }

        Ok(())
    }

    fn handle_claude_md(&self) -> Result<()> {
        if self.config.claude_md_path().exists() {
            self.update_existing_claude_md()
        } else {
            self.create_new_claude_md()
        }
    }

    /// Prepend the task-system reference block to an existing CLAUDE.md.
    ///
    /// A file already containing the marker is left byte-for-byte untouched.
    /// Otherwise a duplicate `# CLAUDE.md` first line is dropped, the file is
    /// backed up to `CLAUDE.md.backup` (unless `--force`, which accepts the
    /// data-loss trade-off), and the reference block goes on top.
    fn update_existing_claude_md(&self) -> Result<()> {
        let path = self.config.claude_md_path();

        let existing = fs::read_to_string(&path)
            .map_err(|e| SetupError::io("Could not read CLAUDE.md", e))?;

        if existing.contains(templates::CLAUDE_MD_MARKER) {
            println!(
                "   {} CLAUDE.md (already references task system)",
                "Skipping".yellow()
            );
            return Ok(());
        }

        // Drop a duplicate top header before prepending our own
        let body: &str = if existing.starts_with("# CLAUDE.md") {
            match existing.find('\n') {
                Some(idx) => &existing[idx + 1..],
                None => "",
            }
        } else {
            &existing
        };
        let new_content = format!("{}{}", templates::CLAUDE_MD_REFERENCE, body);

        if !self.config.force {
            let backup_path = self.config.target.join("CLAUDE.md.backup");
            fs::copy(&path, &backup_path)
                .map_err(|e| SetupError::io("Could not back up CLAUDE.md", e))?;
            println!("   {} CLAUDE.md.backup", "Backed up to".green());
        }

        fs::write(&path, new_content)
            .map_err(|e| SetupError::io("Could not update CLAUDE.md", e))?;
        println!(
            "   {} CLAUDE.md with task system reference",
            "Updated".green()
        );
        Ok(())
    }

    /// Create CLAUDE.md: verbatim from a local source when it ships one,
    /// otherwise from the embedded template. Remote sources would need a
    /// second clone, so they fall through to the embedded template.
    fn create_new_claude_md(&self) -> Result<()> {
        let path = self.config.claude_md_path();

        let template_path = self.config.source.as_ref().and_then(|raw| {
            match Source::parse(raw) {
                Source::Remote(_) => None,
                Source::Local(source_path) => {
                    let candidate = source_path.join("CLAUDE.md");
                    candidate.exists().then_some(candidate)
                }
            }
        });

        match template_path {
            Some(template) => {
                fs::copy(&template, &path)
                    .map_err(|e| SetupError::io("Could not copy CLAUDE.md template", e))?;
            }
            None => {
                fs::write(&path, templates::CLAUDE_MD_TEMPLATE)
                    .map_err(|e| SetupError::io("Could not create CLAUDE.md", e))?;
            }
        }

        println!("   {} CLAUDE.md", "Created".green());
        Ok(())
    }

    /// Patch .gitignore idempotently, keyed on the block's comment header.
    fn update_gitignore(&self) -> Result<()> {
        let path = self.config.gitignore_path();

        if path.exists() {
            let mut content = fs::read_to_string(&path)
                .map_err(|e| SetupError::io("Could not read .gitignore", e))?;

            if content.contains(templates::GITIGNORE_MARKER) {
                println!("   {} .gitignore (already configured)", "Skipping".yellow());
                return Ok(());
            }

            if !content.ends_with('\n') {
                content.push('\n');
            }
            content.push_str(templates::GITIGNORE_BLOCK);

            fs::write(&path, content)
                .map_err(|e| SetupError::io("Could not update .gitignore", e))?;
            println!("   {} .gitignore", "Updated".green());
        } else {
            fs::write(&path, templates::GITIGNORE_BLOCK)
                .map_err(|e| SetupError::io("Could not create .gitignore", e))?;
            println!("   {} .gitignore", "Created".green());
        }

        Ok(())
    }

    /// Report suggested actions, numbered, from a fresh look at the target.
    fn print_next_steps(&self) {
        let tasks_exists = self.config.tasks_dir().exists();
        let dashboard_exists = self.config.dashboard_dir().exists();
        let claude_md_exists = self.config.claude_md_path().exists();

        println!("\n{}", "Next steps:".bold());

        let mut step = 1;
        if tasks_exists {
            println!("  {}. Review claude_tasks/QUICK_REFERENCE.md for workflow", step);
            step += 1;
            println!(
                "  {}. Read claude_tasks/PRINCIPLES_QUICK_CARD.md for principles",
                step
            );
            step += 1;
            println!(
                "  {}. Add your first task to claude_tasks/active/ACTIVE_TASKS.md",
                step
            );
            step += 1;
        }

        if claude_md_exists {
            println!(
                "  {}. Customize CLAUDE.md with project-specific information",
                step
            );
            step += 1;
        }

        // Only suggest committing when something is actually there
        if tasks_exists || dashboard_exists || claude_md_exists {
            println!(
                "  {}. Commit the changes: {}",
                step,
                "git add . && git commit -m 'Add Claude components'".cyan()
            );
            step += 1;
        }

        if dashboard_exists {
            println!("\n{}", "Test dashboard:".bold());
            println!(
                "  {}. Start it: {}",
                step,
                "cd test-dashboard-module && npm start".cyan()
            );
            step += 1;
            println!("  {}. Open http://localhost:8085 to manage tests", step);
            step += 1;
            println!(
                "  {}. Add project directories in the dashboard to scan multiple projects",
                step
            );
        }

        if tasks_exists {
            println!(
                "\nStart coding with: {}",
                "cat claude_tasks/SESSION_STARTER.md".cyan()
            );
        } else if dashboard_exists {
            println!(
                "\nManage tests with: {}",
                "cd test-dashboard-module && npm start".cyan()
            );
        }
        println!();
    }
}

fn print_state(name: &str, exists: bool) {
    if exists {
        println!("   {}: {}", name, "exists".green());
    } else {
        println!("   {}: {}", name, "missing".red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_for(target: &Path, source: Option<String>, force: bool) -> Setup {
        let config = SetupConfig::new(source, target, force, false, true).unwrap();
        Setup::new(config)
    }

    #[test]
    fn test_gitignore_created_with_exact_block() {
        let tmp = TempDir::new().unwrap();
        let setup = setup_for(tmp.path(), None, false);

        setup.update_gitignore().unwrap();

        let content = fs::read_to_string(tmp.path().join(".gitignore")).unwrap();
        assert_eq!(content, templates::GITIGNORE_BLOCK);
    }

    #[test]
    fn test_gitignore_appended_preserves_original() {
        let tmp = TempDir::new().unwrap();
        // No trailing newline on purpose
        fs::write(tmp.path().join(".gitignore"), "node_modules/").unwrap();
        let setup = setup_for(tmp.path(), None, false);

        setup.update_gitignore().unwrap();

        let content = fs::read_to_string(tmp.path().join(".gitignore")).unwrap();
        assert_eq!(
            content,
            format!("node_modules/\n{}", templates::GITIGNORE_BLOCK)
        );
    }

    #[test]
    fn test_gitignore_with_marker_is_untouched() {
        let tmp = TempDir::new().unwrap();
        let configured = format!("dist/\n{}", templates::GITIGNORE_BLOCK);
        fs::write(tmp.path().join(".gitignore"), &configured).unwrap();
        let setup = setup_for(tmp.path(), None, false);

        setup.update_gitignore().unwrap();

        let content = fs::read_to_string(tmp.path().join(".gitignore")).unwrap();
        assert_eq!(content, configured);
    }

    #[test]
    fn test_gitignore_patch_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let setup = setup_for(tmp.path(), None, false);

        setup.update_gitignore().unwrap();
        let first = fs::read_to_string(tmp.path().join(".gitignore")).unwrap();
        setup.update_gitignore().unwrap();
        let second = fs::read_to_string(tmp.path().join(".gitignore")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_claude_md_merge_backs_up_and_strips_header() {
        let tmp = TempDir::new().unwrap();
        let original = "# CLAUDE.md\n\nProject notes here.\n";
        fs::write(tmp.path().join("CLAUDE.md"), original).unwrap();
        let setup = setup_for(tmp.path(), None, false);

        setup.update_existing_claude_md().unwrap();

        let backup = fs::read_to_string(tmp.path().join("CLAUDE.md.backup")).unwrap();
        assert_eq!(backup, original);

        let merged = fs::read_to_string(tmp.path().join("CLAUDE.md")).unwrap();
        assert!(merged.starts_with(templates::CLAUDE_MD_REFERENCE));
        assert!(merged.contains("Project notes here."));
        // The duplicate header was removed; only the reference block's remains
        assert_eq!(merged.matches("# CLAUDE.md").count(), 1);
    }

    #[test]
    fn test_claude_md_merge_with_force_skips_backup() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("CLAUDE.md"), "Some instructions\n").unwrap();
        let setup = setup_for(tmp.path(), None, true);

        setup.update_existing_claude_md().unwrap();

        assert!(!tmp.path().join("CLAUDE.md.backup").exists());
        let merged = fs::read_to_string(tmp.path().join("CLAUDE.md")).unwrap();
        assert!(merged.starts_with(templates::CLAUDE_MD_REFERENCE));
        assert!(merged.contains("Some instructions"));
    }

    #[test]
    fn test_claude_md_with_marker_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let configured = "# My file\n\nSee claude_tasks/ for process docs.\n";
        fs::write(tmp.path().join("CLAUDE.md"), configured).unwrap();
        let setup = setup_for(tmp.path(), None, false);

        setup.update_existing_claude_md().unwrap();

        let content = fs::read_to_string(tmp.path().join("CLAUDE.md")).unwrap();
        assert_eq!(content, configured);
        assert!(!tmp.path().join("CLAUDE.md.backup").exists());
    }

    #[test]
    fn test_new_claude_md_prefers_local_source_template() {
        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("source");
        fs::create_dir(&source_dir).unwrap();
        let custom = "# CLAUDE.md\n\nCustom guidance from claude_tasks source.\n";
        fs::write(source_dir.join("CLAUDE.md"), custom).unwrap();

        let target = tmp.path().join("project");
        fs::create_dir(&target).unwrap();
        let setup = setup_for(
            &target,
            Some(source_dir.to_string_lossy().into_owned()),
            false,
        );

        setup.create_new_claude_md().unwrap();

        let content = fs::read_to_string(target.join("CLAUDE.md")).unwrap();
        assert_eq!(content, custom);
    }

    #[test]
    fn test_new_claude_md_falls_back_to_embedded_template() {
        let tmp = TempDir::new().unwrap();
        let setup = setup_for(tmp.path(), None, false);

        setup.create_new_claude_md().unwrap();

        let content = fs::read_to_string(tmp.path().join("CLAUDE.md")).unwrap();
        assert_eq!(content, templates::CLAUDE_MD_TEMPLATE);
    }

    #[test]
    fn test_copy_files_partial_source() {
        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("docs");
        fs::create_dir(&source_dir).unwrap();
        fs::write(source_dir.join("QUICK_REFERENCE.md"), "# Quick\n").unwrap();

        let target = tmp.path().join("project");
        fs::create_dir(&target).unwrap();
        let setup = setup_for(&target, None, false);
        setup.create_directory_structure().unwrap();

        setup.copy_files(&source_dir).unwrap();

        let tasks = target.join("claude_tasks");
        assert!(tasks.join("QUICK_REFERENCE.md").exists());
        // Absent source files are skipped without error or fallback
        assert!(!tasks.join("PRINCIPLES_QUICK_CARD.md").exists());
        assert!(!tasks.join("DEVELOPMENT_PROCESS.md").exists());
        assert!(!tasks.join("active").join("ACTIVE_TASKS.md").exists());
    }

    #[test]
    fn test_copy_files_respects_existing_without_force() {
        let tmp = TempDir::new().unwrap();
        let source_dir = tmp.path().join("docs");
        fs::create_dir(&source_dir).unwrap();
        fs::write(source_dir.join("QUICK_REFERENCE.md"), "new content\n").unwrap();

        let target = tmp.path().join("project");
        fs::create_dir(&target).unwrap();
        let setup = setup_for(&target, None, false);
        setup.create_directory_structure().unwrap();
        let existing = target.join("claude_tasks").join("QUICK_REFERENCE.md");
        fs::write(&existing, "old content\n").unwrap();

        setup.copy_files(&source_dir).unwrap();
        assert_eq!(fs::read_to_string(&existing).unwrap(), "old content\n");

        // Force overwrites
        let setup = setup_for(&target, None, true);
        setup.copy_files(&source_dir).unwrap();
        assert_eq!(fs::read_to_string(&existing).unwrap(), "new content\n");
    }

    #[test]
    fn test_missing_source_dir_falls_back_to_templates() {
        let tmp = TempDir::new().unwrap();
        let setup = setup_for(tmp.path(), None, false);
        setup.create_directory_structure().unwrap();

        setup
            .copy_files(&tmp.path().join("not-a-real-layout"))
            .unwrap();

        let tasks = tmp.path().join("claude_tasks");
        assert!(tasks.join("QUICK_REFERENCE.md").exists());
        assert!(tasks.join("PRINCIPLES_QUICK_CARD.md").exists());
        assert!(tasks.join("active").join("ACTIVE_TASKS.md").exists());
    }

    #[test]
    fn test_templates_substitute_todays_date() {
        let tmp = TempDir::new().unwrap();
        let setup = setup_for(tmp.path(), None, false);
        setup.create_directory_structure().unwrap();
        setup.create_from_templates().unwrap();

        let active = fs::read_to_string(
            tmp.path()
                .join("claude_tasks")
                .join("active")
                .join("ACTIVE_TASKS.md"),
        )
        .unwrap();
        assert!(!active.contains(templates::DATE_TOKEN));
        assert!(active.contains(&templates::today()));
    }

    #[test]
    fn test_run_twice_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let setup = setup_for(tmp.path(), None, false);

        setup.run().unwrap();
        let claude_md = fs::read_to_string(tmp.path().join("CLAUDE.md")).unwrap();
        let gitignore = fs::read_to_string(tmp.path().join(".gitignore")).unwrap();
        let active = fs::read_to_string(
            tmp.path()
                .join("claude_tasks")
                .join("active")
                .join("ACTIVE_TASKS.md"),
        )
        .unwrap();

        setup.run().unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join("CLAUDE.md")).unwrap(),
            claude_md
        );
        assert_eq!(
            fs::read_to_string(tmp.path().join(".gitignore")).unwrap(),
            gitignore
        );
        assert_eq!(
            fs::read_to_string(
                tmp.path()
                    .join("claude_tasks")
                    .join("active")
                    .join("ACTIVE_TASKS.md")
            )
            .unwrap(),
            active
        );
    }

    #[test]
    fn test_error_display() {
        let err = SetupError::SourceNotFound(PathBuf::from("/tmp/missing"));
        assert_eq!(err.to_string(), "Source not found: /tmp/missing");

        let err = SetupError::CloneFailed {
            url: "https://example.com/repo.git".to_string(),
            stderr: "fatal: repository not found".to_string(),
        };
        assert!(err.to_string().contains("https://example.com/repo.git"));
        assert!(err.to_string().contains("repository not found"));
    }
}
