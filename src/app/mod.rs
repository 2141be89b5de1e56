//! Command-line front-end. Every command is a thin wrapper over one of the
//! core entry points: `collect`, `render`, `parse` and `materialize`.

pub mod commands;
pub mod fetch;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::HarvestConfig;
use fetch::GitCloneFetcher;

#[derive(Parser, Debug)]
#[command(name = "codeharvest")]
#[command(version, about = "Extract a project into one document, or scaffold one from a path list")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this config file instead of the platform default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the folder tree and file contents of a project as one document
    Extract(ExtractArgs),
    /// Print the folder tree of a project
    Tree(TreeArgs),
    /// Print the prompt that asks an AI assistant for a parsable structure
    Prompt,
    /// Create folders and placeholder files from a structure listing
    Scaffold(ScaffoldArgs),
    /// Inspect or initialize the config file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Local project directory (defaults to the current directory)
    #[arg(conflicts_with = "github")]
    pub path: Option<PathBuf>,

    /// Extract a GitHub repository instead of a local directory
    #[arg(long)]
    pub github: Option<String>,

    /// Skip files larger than this many KB
    #[arg(long)]
    pub max_size_kb: Option<u64>,

    /// Include binary files as a placeholder marker
    #[arg(long)]
    pub include_binary: bool,

    /// Additional comma-separated ignore patterns, e.g. "*.csv,fixtures"
    #[arg(long, default_value = "")]
    pub ignore: String,

    /// Write to this file (or into this directory) instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print only the content of one included file (relative path)
    #[arg(long, conflicts_with = "json")]
    pub show_file: Option<String>,

    /// Print the structured report as JSON
    #[arg(long)]
    pub json: bool,

    /// Give up if the extraction takes longer than this
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    /// Project directory (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Additional comma-separated ignore patterns
    #[arg(long, default_value = "")]
    pub ignore: String,
}

#[derive(Args, Debug, Clone)]
pub struct ScaffoldArgs {
    /// Directory to create the structure in
    #[arg(long)]
    pub base: PathBuf,

    /// File holding the structure listing; stdin when omitted or "-"
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Only show what would be created
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Dispatches a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let load_config = || HarvestConfig::load_or_default(config_path);

    match cli.command {
        Commands::Extract(args) => {
            let config = load_config();
            let fetcher = Arc::new(GitCloneFetcher::default());
            let report = commands::run_extract(args.clone(), config.clone(), fetcher).await?;
            commands::write_extract_output(&report, &args, &config)
        }
        Commands::Tree(args) => commands::print_tree(&args, &load_config()),
        Commands::Prompt => {
            print!("{}", crate::core::PROMPT_TEMPLATE);
            Ok(())
        }
        Commands::Scaffold(args) => commands::scaffold(&args),
        Commands::Config(ConfigCommand::Show) => commands::show_config(&load_config()),
        Commands::Config(ConfigCommand::Init { force }) => commands::init_config(config_path, force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_extract_parsing() {
        let cli = Cli::try_parse_from([
            "codeharvest",
            "-vv",
            "extract",
            "./project",
            "--max-size-kb",
            "64",
            "--include-binary",
            "--ignore",
            "*.csv, fixtures",
            "-o",
            "out.txt",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.path, Some(PathBuf::from("./project")));
                assert_eq!(args.max_size_kb, Some(64));
                assert!(args.include_binary);
                assert_eq!(args.ignore, "*.csv, fixtures");
                assert_eq!(args.output, Some(PathBuf::from("out.txt")));
                assert!(args.github.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_path_and_github_conflict() {
        let result = Cli::try_parse_from([
            "codeharvest",
            "extract",
            "./project",
            "--github",
            "https://github.com/a/b",
        ]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_extract_runs_when_config_cannot_be_written() {
        let dir = tempfile::TempDir::new().unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir(&project).unwrap();
        std::fs::write(project.join("main.rs"), "fn main() {}\n").unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let config = blocker.join("config.json");
        let output = dir.path().join("out.txt");

        let args: Vec<OsString> = vec![
            "codeharvest".into(),
            "--config".into(),
            config.clone().into(),
            "extract".into(),
            project.into(),
            "-o".into(),
            output.clone().into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        run(cli).await.unwrap();

        let document = std::fs::read_to_string(&output).unwrap();
        assert!(document.contains("### main.rs\n```fn main() {}\n```\n"));
        assert!(!config.exists());
    }

    #[test]
    fn test_scaffold_parsing() {
        let cli = Cli::try_parse_from([
            "codeharvest",
            "scaffold",
            "--base",
            "/tmp/out",
            "--dry-run",
            "--config",
            "cfg.json",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        match cli.command {
            Commands::Scaffold(args) => {
                assert_eq!(args.base, PathBuf::from("/tmp/out"));
                assert!(args.dry_run);
                assert!(args.input.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
