use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use claude_init::{Setup, SetupConfig};

#[derive(Parser, Debug)]
#[command(name = "claude-init")]
#[command(author, version, about = "Install the Claude task management system into a project")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Source for claude_tasks: git repo URL, SSH remote, or local path
    #[arg(long)]
    source: Option<String>,

    /// Target directory for installation
    #[arg(long, default_value = ".")]
    target: PathBuf,

    /// Overwrite existing files
    #[arg(long)]
    force: bool,

    /// Don't add .gitignore entries
    #[arg(long = "no-git")]
    no_git: bool,

    /// Don't install the test dashboard module
    #[arg(long = "no-dashboard")]
    no_dashboard: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Some(Command::Completion { shell }) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "claude-init", &mut std::io::stdout());
        return;
    }

    let result = SetupConfig::new(
        cli.source,
        &cli.target,
        cli.force,
        cli.no_git,
        cli.no_dashboard,
    )
    .and_then(|config| Setup::new(config).run());

    // Single funnel for every fatal error
    if let Err(e) = result {
        eprintln!("\n{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
