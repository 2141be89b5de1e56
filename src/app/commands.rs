//! Handlers behind each subcommand.
//!
//! The handlers resolve user input (paths, config, flags) into calls on the
//! `core` API and turn the results into terminal output. They never decide
//! extraction policy themselves.

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::fetch::RepositoryFetcher;
use super::{ExtractArgs, ScaffoldArgs, TreeArgs};
use crate::config::{self, HarvestConfig};
use crate::core::{
    self, collect, materialize, parse, CoreError, ExtractionReport, IgnoreSet, StructurePath,
};
use crate::utils::format::format_file_size;

/// Entries shown by a dry-run preview before the rest is summarized.
pub const PREVIEW_LIMIT: usize = 15;

/// Created paths echoed after a scaffold run.
const LISTED_CREATIONS: usize = 10;

/// Runs [`extract`], bounded by `--timeout-secs`.
///
/// On timeout the extraction future is dropped: a running clone is killed
/// and its checkout removed. A collect step already on the blocking pool
/// only reads, so it is left to finish or be discarded at shutdown.
pub async fn run_extract(
    args: ExtractArgs,
    config: HarvestConfig,
    fetcher: Arc<dyn RepositoryFetcher>,
) -> Result<ExtractionReport> {
    let work = extract(&args, &config, fetcher.as_ref());
    match args.timeout_secs.map(Duration::from_secs) {
        Some(limit) => tokio::time::timeout(limit, work)
            .await
            .map_err(|_| anyhow!("Extraction timed out after {}s", limit.as_secs()))?,
        None => work.await,
    }
}

/// Resolves the extraction root (local path, current directory, or a
/// fetched repository) and collects it on the blocking pool.
pub async fn extract(
    args: &ExtractArgs,
    config: &HarvestConfig,
    fetcher: &dyn RepositoryFetcher,
) -> Result<ExtractionReport> {
    let options = config.extraction_options(args.max_size_kb, args.include_binary, &args.ignore)?;

    // Held until the report is built, then the checkout is cleaned up.
    let repository = match &args.github {
        Some(url) => Some(
            fetcher
                .fetch_to_local_directory(url)
                .await
                .with_context(|| format!("Failed to fetch {url}"))?,
        ),
        None => None,
    };
    let root = match &repository {
        Some(repository) => repository.root().to_path_buf(),
        None => resolve_root(args.path.as_deref())?,
    };

    let report = tokio::task::spawn_blocking(move || collect(&root, &options))
        .await
        .context("Extraction task failed")??;
    drop(repository);
    Ok(report)
}

/// Picks the text to emit for an extraction, honoring `--show-file` and `--json`.
pub fn render_output(report: &ExtractionReport, args: &ExtractArgs) -> Result<String> {
    if let Some(relative) = &args.show_file {
        let entry = report
            .file(relative)
            .ok_or_else(|| anyhow!("{relative} is not among the included files"))?;
        return Ok(entry.content.to_string());
    }
    if args.json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    Ok(report.aggregate_document.clone())
}

/// Writes the extraction to `--output` or stdout.
///
/// An output path naming an existing directory receives the configured
/// `output_filename` inside it.
pub fn write_extract_output(
    report: &ExtractionReport,
    args: &ExtractArgs,
    config: &HarvestConfig,
) -> Result<()> {
    let content = render_output(report, args)?;

    match &args.output {
        Some(target) => {
            let path = output_path(target, config);
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Wrote {} to {} ({} files, {} skipped)",
                format_file_size(content.len() as u64),
                path.display(),
                report.included_count(),
                report.skipped_count()
            );
        }
        None => write_stdout(&content)?,
    }

    tracing::info!(
        "Extraction output: {} files, {} skipped, {}",
        report.included_count(),
        report.skipped_count(),
        format_file_size(content.len() as u64)
    );
    Ok(())
}

fn output_path(target: &Path, config: &HarvestConfig) -> PathBuf {
    if target.is_dir() {
        target.join(&config.output_filename)
    } else {
        target.to_path_buf()
    }
}

/// Prints the folder tree of a project.
pub fn print_tree(args: &TreeArgs, config: &HarvestConfig) -> Result<()> {
    let root = resolve_root(args.path.as_deref())?;
    if !root.is_dir() {
        return Err(CoreError::NotADirectory(root).into());
    }

    let ignore_set = IgnoreSet::with_custom(&args.ignore).union(&config.custom_ignore_patterns);
    let mut out = String::new();
    for line in core::render(&root, &ignore_set) {
        out.push_str(&line);
        out.push('\n');
    }
    write_stdout(&out)
}

/// Parses a structure listing and creates it below `--base`.
pub fn scaffold(args: &ScaffoldArgs) -> Result<()> {
    let text = read_input(args.input.as_deref())?;
    let paths = parse(&text);
    if paths.is_empty() {
        bail!("No valid project structure found in the input");
    }

    if args.dry_run {
        let mut out = format!("Would create under {}:\n", args.base.display());
        for line in preview_lines(&paths, PREVIEW_LIMIT) {
            out.push_str(&line);
            out.push('\n');
        }
        return write_stdout(&out);
    }

    let result = materialize(&args.base, &paths);
    let mut out = format!(
        "Created {} folders and {} files\n",
        result.created_folders.len(),
        result.created_files.len()
    );
    let created = result
        .created_folders
        .iter()
        .chain(&result.created_files)
        .take(LISTED_CREATIONS);
    for path in created {
        let shown = path.strip_prefix(&args.base).unwrap_or(path);
        out.push_str(&format!("  {}\n", shown.display()));
    }
    if !result.errors.is_empty() {
        out.push_str(&format!("{} errors:\n", result.errors.len()));
        for error in &result.errors {
            out.push_str(&format!("  {error}\n"));
        }
    }
    write_stdout(&out)?;

    if result.is_empty() {
        bail!("Nothing was created below {}", args.base.display());
    }
    Ok(())
}

/// Lines of a dry-run preview: up to `limit` entries, a truncation note when
/// there are more, and the total.
pub fn preview_lines(paths: &[StructurePath], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = paths
        .iter()
        .take(limit)
        .map(|p| {
            let icon = if p.is_file() { "📄" } else { "📁" };
            format!("{icon} {}", p.path)
        })
        .collect();
    if paths.len() > limit {
        lines.push("... (truncated)".to_string());
    }
    lines.push(format!("Total items: {}", paths.len()));
    lines
}

pub fn show_config(config: &HarvestConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    write_stdout(&format!("{json}\n"))
}

/// Writes the default config, refusing to clobber an existing file unless forced.
pub fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => config::settings::get_config_file_path()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?,
    };
    if target.exists() && !force {
        bail!(
            "Config file {} already exists (use --force to overwrite)",
            target.display()
        );
    }
    config::settings::save_config(&HarvestConfig::default(), Some(&target))?;
    eprintln!("Wrote default config to {}", target.display());
    Ok(())
}

fn resolve_root(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read structure from stdin")?;
            Ok(text)
        }
    }
}

fn write_stdout(content: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
