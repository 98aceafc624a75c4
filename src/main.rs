//! t3doc: generate a reference site from TADS 3 library sources.
//!
//! `t3doc -o doc/libref -i intro.txt --tads-version 3.1.3 lib/adv3 lib/*.h`

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use t3doc::render::{self, SiteInfo};
use t3doc::{intake, ParseOptions};

#[derive(Parser)]
#[command(
    name = "t3doc",
    about = "Generate cross-referenced documentation from TADS 3 library sources"
)]
struct Cli {
    /// Input files, directories (their .t and .h files) or glob patterns
    #[arg(required = true)]
    paths: Vec<String>,

    /// Output directory
    #[arg(short = 'o', long, required = true)]
    output: PathBuf,

    /// Introduction text for the index page; `$$VERSION$$` is substituted
    #[arg(short = 'i', long, required = true)]
    intro: PathBuf,

    /// Directory holding macro-expanded copies of the inputs
    #[arg(short = 'm', long)]
    mirror_dir: Option<PathBuf>,

    /// TADS version shown in the output
    #[arg(long, conflicts_with = "version_file")]
    tads_version: Option<String>,

    /// File whose first line is the TADS version
    #[arg(long)]
    version_file: Option<PathBuf>,

    /// Write a plain-text dump of the symbol graph here
    #[arg(short = 'd', long)]
    dump: Option<PathBuf>,

    /// Output format: markdown (default), json
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    /// Expand #define macros while reading
    #[arg(long)]
    expand_macros: bool,

    /// Report progress for every file
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let renderer = render::create_renderer(&cli.format)?;
    let introduction = fs::read_to_string(&cli.intro)
        .with_context(|| format!("failed to read introduction: {}", cli.intro.display()))?;
    let version = resolve_version(cli.tads_version.as_deref(), cli.version_file.as_deref())?;

    let paths = expand_globs(&cli.paths)?;
    if paths.is_empty() {
        anyhow::bail!("no input files found");
    }

    let files = intake::load(&paths).context("failed to read input files")?;
    let options = ParseOptions {
        mirror_dir: cli.mirror_dir.clone(),
        expand_macros: cli.expand_macros,
    };
    let graph = t3doc::build(files, &options)?;

    if let Some(path) = &cli.dump {
        write_dump(&graph, path)?;
    }

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("failed to create output directory: {}", cli.output.display()))?;
    let site = SiteInfo { version, introduction };
    let written = render::write_site(&graph, &site, renderer.as_ref(), &cli.output)?;
    log::info!("wrote {} pages to {}", written.len(), cli.output.display());

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("T3DOC_LOG", level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// `--tads-version` wins; otherwise the first line of `--version-file`.
fn resolve_version(version: Option<&str>, version_file: Option<&Path>) -> Result<String> {
    if let Some(v) = version {
        return Ok(v.trim().to_string());
    }
    match version_file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read version file: {}", path.display()))?;
            Ok(text.lines().next().unwrap_or_default().trim().to_string())
        }
        None => Ok(String::new()),
    }
}

fn write_dump(graph: &t3doc::graph::SymbolGraph, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create dump file: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    render::dump::dump(graph, &mut out)
        .and_then(|_| out.flush())
        .with_context(|| format!("failed to write {}", path.display()))
}

/// File extensions recognized as source files.
const SUPPORTED_EXTENSIONS: &[&str] = &["t", "h"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for supported file types.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // Directories are scanned non-recursively
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && has_supported_extension(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            log::warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_version_wins() {
        assert_eq!(resolve_version(Some(" 3.1.3 "), None).unwrap(), "3.1.3");
        assert_eq!(resolve_version(None, None).unwrap(), "");
    }

    #[test]
    fn version_file_first_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("version.txt");
        fs::write(&path, "3.0.18\nbuild notes\n").unwrap();
        assert_eq!(resolve_version(None, Some(&path)).unwrap(), "3.0.18");
    }

    #[test]
    fn directories_yield_tads_sources_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.t", "a.h", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let files = expand_globs(&[dir.path().to_string_lossy().to_string()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.h", "b.t"]);
    }
}
