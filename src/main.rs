use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use config_patcher::config::{
    apply_files, check_files, load_from_path, preview, PatchConfig, PatchResult,
};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "config-patcher")]
#[command(about = "Structure-preserving configuration file patcher", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply patch definitions to the files under a root directory
    Apply {
        /// Patch definition file, or a directory of .toml definitions
        #[arg(short, long)]
        config: PathBuf,

        /// Root directory containing the target files (defaults to cwd)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Show what would change without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Check which files would change, without writing
    Check {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// List the replacements a patch definition declares
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            config,
            root,
            dry_run,
            diff,
        } => cmd_apply(config, root, dry_run, diff),

        Commands::Check { config, root } => cmd_check(config, root),

        Commands::List { config } => cmd_list(config),
    }
}

/// A `--config` argument may name one definition file or a directory of
/// them; directories are searched one level deep for `.toml` files.
fn discover_config_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();

    if files.is_empty() {
        anyhow::bail!("no .toml patch definitions found in {}", path.display());
    }
    Ok(files)
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(path) => Ok(path.canonicalize()?),
        None => Ok(env::current_dir()?),
    }
}

/// Show a unified diff between original and patched content.
fn display_diff(file: &Path, original: &str, patched: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, patched);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn show_diffs(config: &PatchConfig, root: &Path) {
    for definition in &config.files {
        match preview(definition, root) {
            Ok((original, patched)) => {
                if original != patched {
                    display_diff(
                        Path::new(&definition.path),
                        &String::from_utf8_lossy(&original),
                        &String::from_utf8_lossy(&patched),
                    );
                }
            }
            Err(e) => eprintln!("{}", format!("diff unavailable: {e}").yellow()),
        }
    }
    println!();
}

fn cmd_apply(
    config_path: PathBuf,
    root: Option<PathBuf>,
    dry_run: bool,
    diff: bool,
) -> Result<()> {
    let root = resolve_root(root)?;
    let config_files = discover_config_files(&config_path)?;

    println!("Root: {}", root.display());
    println!();

    let mut total_patched = 0;
    let mut total_unchanged = 0;
    let mut total_failed = 0;

    for config_file in config_files {
        println!("Loading patch definitions from {}...", config_file.display());
        let config = load_from_path(&config_file)?;

        if dry_run {
            println!("{}", "  [DRY RUN - no files will be modified]".cyan());
        }
        if diff {
            show_diffs(&config, &root);
        }

        for (path, result) in apply_files(&config, &root, dry_run) {
            match result {
                Ok(PatchResult::Patched { file }) => {
                    let verb = if dry_run { "Would patch" } else { "Patched" };
                    println!("{} {}: {}", "✓".green(), verb, file.display());
                    total_patched += 1;
                }
                Ok(PatchResult::Unchanged { file }) => {
                    println!("{} Unchanged: {}", "⊙".yellow(), file.display());
                    total_unchanged += 1;
                }
                Err(e) => {
                    eprintln!("{} {}: {}", "✗".red(), path, e);
                    total_failed += 1;
                }
            }
        }
        println!();
    }

    println!("{}", "Summary:".bold());
    println!("  {} patched", format!("{}", total_patched).green());
    println!("  {} unchanged", format!("{}", total_unchanged).yellow());
    println!("  {} failed", format!("{}", total_failed).red());

    if total_failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_check(config_path: PathBuf, root: Option<PathBuf>) -> Result<()> {
    let root = resolve_root(root)?;
    let config_files = discover_config_files(&config_path)?;

    let mut would_change = 0;

    for config_file in config_files {
        let config = load_from_path(&config_file)?;
        for (path, result) in check_files(&config, &root) {
            match result {
                Ok(PatchResult::Patched { file }) => {
                    println!("{} Would patch: {}", "✓".green(), file.display());
                    would_change += 1;
                }
                Ok(PatchResult::Unchanged { file }) => {
                    println!("{} Up to date: {}", "⊙".yellow(), file.display());
                }
                Err(e) => {
                    eprintln!("{} {}: {}", "✗".red(), path, e);
                }
            }
        }
    }

    if would_change > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_list(config_path: PathBuf) -> Result<()> {
    let config_files = discover_config_files(&config_path)?;

    for config_file in config_files {
        let config = load_from_path(&config_file)?;
        if !config.meta.name.is_empty() {
            println!("{}", config.meta.name.bold());
        }
        if let Some(description) = &config.meta.description {
            println!("{}", description.dimmed());
        }
        for file in &config.files {
            println!("  {} ({})", file.path, file.format);
            for replacement in &file.replacements {
                println!(
                    "    {} -> {} {:?}",
                    replacement.selector, replacement.kind, replacement.value
                );
            }
        }
        println!();
    }
    Ok(())
}
