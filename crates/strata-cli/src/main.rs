//! strata - Annotate binary files with structure definitions
//!
//! This tool drops a built-in structure definition onto a file at an offset
//! and prints the resulting annotation tree.

mod formats;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, ValueEnum};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use strata_core::render::{render_flat, render_tree};
use strata_core::{Catalog, DropConfig, EmptyFieldPolicy, StatsVisitor};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Annotate binary files with structure definitions
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Structure to drop (see --list-structures)
    #[arg(short, long, default_value = "bmp")]
    structure: String,

    /// Offset to drop the structure at (decimal or 0x-prefixed hex)
    #[arg(long, default_value = "0", value_parser = parse_offset)]
    offset: usize,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(long, value_enum, default_value = "tree")]
    format: OutputFormat,

    /// Maximum structure nesting depth
    #[arg(long, default_value = "64")]
    max_depth: usize,

    /// Leave out unknown fields that cover no bytes
    #[arg(long)]
    omit_empty: bool,

    /// List the built-in structures and exit
    #[arg(long)]
    list_structures: bool,

    /// List the available interpreters and exit
    #[arg(long)]
    list_interpreters: bool,
}

#[derive(Args, Debug)]
#[group(required = false, multiple = false)]
struct InputMode {
    /// Path to a single file to annotate
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a directory of files to annotate
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

/// Output format for annotation trees
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Indented tree
    Tree,
    /// One dotted path per decoded value (for scripting)
    Flat,
    /// Counts only
    Summary,
}

/// Tracks file contents already annotated in this run
#[derive(Default)]
struct ContentRegistry {
    /// Maps content hash -> first path seen with it
    seen: HashMap<String, PathBuf>,
    /// Statistics
    stats: RunStats,
}

#[derive(Default)]
struct RunStats {
    files_seen: usize,
    duplicates_skipped: usize,
    annotated: usize,
    failed: usize,
}

impl ContentRegistry {
    fn new() -> Self {
        Self::default()
    }

    /// Compute a short hash of the content (first 16 chars of blake3)
    fn content_hash(data: &[u8]) -> String {
        let hash = blake3::hash(data);
        hash.to_hex()[..16].to_string()
    }

    /// Records `path`, returning the earlier path if the same content was already seen
    fn register(&mut self, path: &Path, data: &[u8]) -> Option<PathBuf> {
        self.stats.files_seen += 1;
        let hash = Self::content_hash(data);

        if let Some(first) = self.seen.get(&hash) {
            debug!(
                "Skipping duplicate: {} (same content as {})",
                path.display(),
                first.display()
            );
            self.stats.duplicates_skipped += 1;
            return Some(first.clone());
        }

        self.seen.insert(hash, path.to_path_buf());
        None
    }

    fn print_summary(&self) {
        info!(
            "Summary: {} files, {} duplicates skipped, {} annotated, {} failed",
            self.stats.files_seen,
            self.stats.duplicates_skipped,
            self.stats.annotated,
            self.stats.failed
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    let empty_fields = if cli.omit_empty {
        EmptyFieldPolicy::Omit
    } else {
        EmptyFieldPolicy::Keep
    };
    let config = DropConfig::new()
        .max_depth(cli.max_depth)
        .empty_fields(empty_fields);
    let catalog = formats::builtin_catalog(config)
        .context("Failed to load built-in structure definitions")?;

    if cli.list_structures {
        for (name, description) in formats::TOP_LEVEL {
            println!("{:<8} {}", name, description);
        }
        return Ok(());
    }

    if cli.list_interpreters {
        for name in catalog.interpreters().names() {
            if let Some(kind) = catalog.interpreters().get(name) {
                println!("{:<10} {}", name, kind.human_name());
            }
        }
        return Ok(());
    }

    if !catalog.structures().contains(&cli.structure) {
        bail!(
            "Unknown structure '{}' (use --list-structures)",
            cli.structure
        );
    }

    // Dispatch based on input mode
    if let Some(ref file) = cli.input.file {
        process_single_file(&cli, &catalog, file)
    } else if let Some(ref directory) = cli.input.directory {
        process_directory(&cli, &catalog, directory)
    } else {
        bail!("Either --file or --directory must be specified")
    }
}

/// Annotate a single file
fn process_single_file(cli: &Cli, catalog: &Catalog, file: &Path) -> Result<()> {
    if !file.exists() {
        bail!("Input file does not exist: {}", file.display());
    }
    if !file.is_file() {
        bail!("Input path is not a file: {}", file.display());
    }

    let data = strata_core::read_file(file)?;
    let output = annotate(cli, catalog, &data)
        .with_context(|| format!("Failed to annotate {}", file.display()))?;
    print!("{}", output);

    Ok(())
}

/// Annotate every file in a directory recursively
fn process_directory(cli: &Cli, catalog: &Catalog, directory: &Path) -> Result<()> {
    if !directory.exists() {
        bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    let mut registry = ContentRegistry::new();

    for path in candidate_files(directory) {
        trace!("Reading {}", path.display());
        let data = match strata_core::read_file(&path) {
            Ok(data) => data,
            Err(e) => {
                warn!("{}", e);
                registry.stats.failed += 1;
                continue;
            }
        };

        if registry.register(&path, &data).is_some() {
            continue;
        }

        match annotate(cli, catalog, &data) {
            Ok(output) => {
                println!("== {} ==", path.display());
                print!("{}", output);
                registry.stats.annotated += 1;
            }
            Err(e) => {
                // Log error but continue with other files
                warn!("Error annotating {}: {}", path.display(), e);
                registry.stats.failed += 1;
            }
        }
    }

    registry.print_summary();

    Ok(())
}

/// Regular, non-hidden files under `directory`, in walk order
fn candidate_files(directory: &Path) -> Vec<PathBuf> {
    WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            !e.file_name()
                .to_str()
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect()
}

/// Drop the selected structure and render it in the selected format
fn annotate(cli: &Cli, catalog: &Catalog, data: &[u8]) -> Result<String> {
    if cli.offset > data.len() {
        bail!(
            "Offset {} is past the end of the input ({} bytes)",
            cli.offset,
            data.len()
        );
    }

    let annotation = catalog.drop(&cli.structure, data, cli.offset)?;

    let output = match cli.format {
        OutputFormat::Tree => render_tree(&annotation),
        OutputFormat::Flat => render_flat(&annotation),
        OutputFormat::Summary => {
            let mut stats = StatsVisitor::default();
            annotation.walk(&mut stats)?;
            format!(
                "{} @{}+{}: {} groups, {} values, depth {}, {} bytes decoded\n",
                annotation.label(),
                annotation.offset,
                annotation.length,
                stats.group_count,
                stats.leaf_count,
                stats.max_depth,
                stats.leaf_bytes
            )
        }
    };

    Ok(output)
}

/// Parse a decimal or `0x`-prefixed hexadecimal offset
fn parse_offset(s: &str) -> std::result::Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid offset '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("strata").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("16"), Ok(16));
        assert_eq!(parse_offset("0x10"), Ok(16));
        assert_eq!(parse_offset("0XfF"), Ok(255));
        assert!(parse_offset("ten").is_err());
    }

    #[test]
    fn test_content_registry_deduplication() {
        let mut registry = ContentRegistry::new();

        assert!(registry.register(Path::new("a.bin"), b"same").is_none());
        assert_eq!(
            registry.register(Path::new("b.bin"), b"same"),
            Some(PathBuf::from("a.bin"))
        );
        assert!(registry.register(Path::new("c.bin"), b"other").is_none());

        assert_eq!(registry.stats.files_seen, 3);
        assert_eq!(registry.stats.duplicates_skipped, 1);
    }

    #[test]
    fn test_content_hash() {
        let hash1 = ContentRegistry::content_hash(b"hello");
        let hash2 = ContentRegistry::content_hash(b"hello");
        let hash3 = ContentRegistry::content_hash(b"world");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 16);
    }

    #[test]
    fn test_candidate_files_skips_hidden() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.bin"), b"a").unwrap();
        fs::write(temp_dir.path().join(".hidden"), b"h").unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("sub").join("b.bin"), b"b").unwrap();

        let names: Vec<_> = candidate_files(temp_dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, ["a.bin", "b.bin"]);
    }

    #[test]
    fn test_annotate_summary() {
        let catalog = formats::builtin_catalog(DropConfig::default()).unwrap();
        let cli = cli(&["--file", "x", "--structure", "bmp", "--format", "summary"]);

        let mut data = vec![0u8; 54];
        data[..2].copy_from_slice(b"BM");
        let output = annotate(&cli, &catalog, &data).unwrap();

        assert_eq!(
            output,
            "bmp @0+54: 3 groups, 16 values, depth 2, 54 bytes decoded\n"
        );
    }

    #[test]
    fn test_annotate_reports_offset_past_end() {
        let catalog = formats::builtin_catalog(DropConfig::default()).unwrap();
        let cli = cli(&["--file", "x", "--offset", "0x100"]);

        assert!(annotate(&cli, &catalog, &[0u8; 16]).is_err());
    }

    #[test]
    fn test_annotate_truncated_input() {
        let catalog = formats::builtin_catalog(DropConfig::default()).unwrap();
        let cli = cli(&["--file", "x", "--structure", "wav"]);

        let err = annotate(&cli, &catalog, b"RIFF").unwrap_err();
        assert!(err.to_string().contains("offset 4"));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
