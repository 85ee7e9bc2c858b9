//! Test dashboard module installation
//!
//! Installs `test-dashboard-module/`: either a deep copy of the dashboard
//! shipped by a local source (with dependency caches and lockfiles stripped)
//! or a synthesized minimal module. Dependency installation is delegated to
//! `npm install` as a subprocess with a bounded wait; every way that step can
//! go wrong is downgraded to a warning so the setup run still completes.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use colored::Colorize;
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::SetupConfig;
use crate::setup::{Result, SetupError};
use crate::source::Source;
use crate::templates;

const NPM_INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Synthesized package.json for the minimal dashboard.
#[derive(Serialize)]
struct PackageManifest {
    name: String,
    version: &'static str,
    description: &'static str,
    main: &'static str,
    scripts: PackageScripts,
    dependencies: PackageDependencies,
}

#[derive(Serialize)]
struct PackageScripts {
    start: &'static str,
    discover: &'static str,
}

#[derive(Serialize)]
struct PackageDependencies {
    express: &'static str,
    cors: &'static str,
}

/// Outcome of a bounded dependency install. The caller decides how loud to
/// be; none of these variants abort the run.
#[derive(Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    Failed { stderr: String },
    TimedOut,
    ToolMissing,
}

/// Install the test dashboard module into the target.
pub fn install(config: &SetupConfig) -> Result<()> {
    let dest = config.dashboard_dir();

    // Only a local source can ship a full dashboard; remote sources would
    // need a second clone, so they get the embedded stub.
    let source_dashboard = config.source.as_ref().and_then(|raw| match Source::parse(raw) {
        Source::Remote(_) => None,
        Source::Local(path) => {
            let candidate = path.join("test-dashboard-module");
            candidate.exists().then_some(candidate)
        }
    });

    match source_dashboard {
        Some(src) => copy_dashboard(&src, &dest)?,
        None => create_embedded_dashboard(&dest, config)?,
    }

    install_node_dependencies(&dest);
    Ok(())
}

/// Deep-copy a source dashboard, leaving `node_modules/` and
/// `package-lock.json` behind so the destination starts clean.
fn copy_dashboard(source_dir: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        fs::remove_dir_all(dest)
            .map_err(|e| SetupError::io("Could not remove existing dashboard", e))?;
    }

    let walker = WalkDir::new(source_dir)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "node_modules");

    for entry in walker {
        let entry =
            entry.map_err(|e| SetupError::io("Could not read dashboard source", e.into()))?;
        let rel = match entry.path().strip_prefix(source_dir) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if entry.file_type().is_file() && entry.file_name() == "package-lock.json" {
            continue;
        }

        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| SetupError::io(format!("Could not create {}", target.display()), e))?;
        } else {
            fs::copy(entry.path(), &target)
                .map_err(|e| SetupError::io(format!("Could not copy {}", rel.display()), e))?;
        }
    }

    println!("   {} test dashboard from source", "Copied".green());
    Ok(())
}

/// Synthesize the minimal dashboard: manifest, server stub, discovery stub.
fn create_embedded_dashboard(dest: &Path, config: &SetupConfig) -> Result<()> {
    fs::create_dir_all(dest)
        .map_err(|e| SetupError::io("Could not create test-dashboard-module", e))?;

    let manifest = PackageManifest {
        name: config.dashboard_package_name(),
        version: "1.0.0",
        description: "Test dashboard for project test management",
        main: "server.js",
        scripts: PackageScripts {
            start: "node server.js",
            discover: "node scripts/discover-tests.js",
        },
        dependencies: PackageDependencies {
            express: "^4.18.2",
            cors: "^2.8.5",
        },
    };
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| SetupError::io("Could not serialize package.json", e.into()))?;
    fs::write(dest.join("package.json"), json)
        .map_err(|e| SetupError::io("Could not write package.json", e))?;

    fs::write(dest.join("server.js"), templates::DASHBOARD_SERVER_JS)
        .map_err(|e| SetupError::io("Could not write server.js", e))?;

    let scripts_dir = dest.join("scripts");
    fs::create_dir_all(&scripts_dir)
        .map_err(|e| SetupError::io("Could not create scripts directory", e))?;
    fs::write(
        scripts_dir.join("discover-tests.js"),
        templates::DASHBOARD_DISCOVER_JS,
    )
    .map_err(|e| SetupError::io("Could not write discover-tests.js", e))?;

    println!("   {} basic test dashboard", "Created".green());
    println!("      For full functionality, copy the complete dashboard from claude_init");
    Ok(())
}

/// Run `npm install` in the dashboard directory; every failure mode is a
/// warning, never fatal.
fn install_node_dependencies(dashboard_dir: &Path) {
    if !dashboard_dir.join("package.json").exists() {
        println!(
            "   {} no package.json found, skipping npm install",
            "Warning:".yellow()
        );
        return;
    }

    println!("   {} Node.js dependencies...", "Installing".cyan());
    match run_bounded(
        "npm",
        &["install"],
        dashboard_dir,
        NPM_INSTALL_TIMEOUT,
    ) {
        InstallOutcome::Installed => {
            println!("   {} Node.js dependencies installed", "Done:".green());
        }
        InstallOutcome::Failed { stderr } => {
            println!(
                "   {} npm install completed with warnings",
                "Warning:".yellow()
            );
            let excerpt: String = stderr.chars().take(200).collect();
            if !excerpt.trim().is_empty() {
                println!("      stderr: {}", excerpt.trim_end());
            }
            println!("      You can run 'npm install' manually in test-dashboard-module");
        }
        InstallOutcome::TimedOut => {
            println!(
                "   {} npm install timed out, but the dashboard was created",
                "Warning:".yellow()
            );
        }
        InstallOutcome::ToolMissing => {
            println!(
                "   {} npm not found - install Node.js to use the test dashboard",
                "Warning:".yellow()
            );
        }
    }
}

/// Run a command with a bounded wait, capturing stderr to a scratch file.
///
/// Stderr goes through a temp file rather than a pipe so a chatty child
/// cannot fill the pipe buffer and stall while we poll. The child is killed
/// if the deadline passes.
fn run_bounded(program: &str, args: &[&str], dir: &Path, timeout: Duration) -> InstallOutcome {
    let mut log = match tempfile::tempfile() {
        Ok(file) => file,
        Err(e) => return InstallOutcome::Failed { stderr: e.to_string() },
    };
    let child_stderr = match log.try_clone() {
        Ok(file) => file,
        Err(e) => return InstallOutcome::Failed { stderr: e.to_string() },
    };

    let mut child = match Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(child_stderr))
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return InstallOutcome::ToolMissing,
        Err(e) => return InstallOutcome::Failed { stderr: e.to_string() },
    };

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return InstallOutcome::TimedOut;
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return InstallOutcome::Failed { stderr: e.to_string() },
        }
    };

    if status.success() {
        InstallOutcome::Installed
    } else {
        let mut stderr = String::new();
        let _ = log.seek(SeekFrom::Start(0));
        let _ = log.read_to_string(&mut stderr);
        InstallOutcome::Failed { stderr }
    }
}
