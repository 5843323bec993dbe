use anyhow::{Context, Result};
use clap::Parser;
use mr_client::{CacheMode, CachedDiffSource, PatchDiffSource, ResponseCache};
use mr_diff_core::{DiffDataSource, DiffLine, DiffSession, DiffSnapshot, FileRef};
use mr_review_config::{AppConfig, CacheConfig};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

mod logger;

/// Open one file of a merge request patch the way the review client does:
/// classify it, load it whole or in chunks, and replay scrolling.
#[derive(Parser, Debug)]
#[command(name = "mr-review", version, about)]
struct Cli {
    /// Unified diff of the merge request (`-` reads stdin)
    patch: PathBuf,

    /// File to open; lists the patch's files when omitted
    file: Option<String>,

    /// Merge request IID the patch belongs to
    #[arg(long, default_value_t = 1)]
    iid: u64,

    /// Scroll offset to replay, in renderer units (repeatable)
    #[arg(long = "scroll", allow_negative_numbers = true)]
    scroll: Vec<f64>,

    /// Click a line once loading settled, as HUNK:LINE
    #[arg(long)]
    click: Option<LineClick>,

    /// Response cache mode: none, read-only, write-only, read-write
    #[arg(long, default_value_t = CacheMode::ReadWrite)]
    cache_mode: CacheMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineClick {
    hunk: usize,
    line: usize,
}

impl FromStr for LineClick {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hunk, line) = s
            .split_once(':')
            .ok_or_else(|| format!("expected HUNK:LINE, got '{}'", s))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|e| format!("invalid index '{}': {}", v, e))
        };
        Ok(Self {
            hunk: parse(hunk)?,
            line: parse(line)?,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = logger::init()?;
    log::info!("Starting mr-review, logging to {}", log_file.display());

    let config = AppConfig::load();
    let patch = read_patch(&cli.patch)?;
    let source = PatchDiffSource::from_patch(cli.iid, &patch, &config.diff)
        .with_context(|| format!("Failed to read patch {}", cli.patch.display()))?;

    let Some(path) = cli.file.clone() else {
        list_files(&source, &config);
        return Ok(());
    };

    let cache = open_cache(&config.cache);
    let data_source: Arc<dyn DiffDataSource> = match &cache {
        Some(cache) => Arc::new(CachedDiffSource::new(
            source,
            Arc::clone(cache),
            cli.cache_mode,
        )),
        None => Arc::new(source),
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let session = DiffSession::new(data_source, config.diff.clone(), runtime.handle().clone());

    runtime.block_on(async {
        session.select_file(FileRef::new(cli.iid, path));
        session.settle().await;

        for &offset in &cli.scroll {
            let started = session.on_scroll(offset);
            log::debug!("Scroll to {}: fetch started = {}", offset, started);
            session.settle().await;
        }
    });

    if let Some(click) = cli.click {
        session.on_line_click(click.hunk, click.line);
    }

    let snapshot = session.snapshot();
    print_summary(&snapshot, session.selected_line().as_ref());

    if let Some(cache) = cache {
        let cache = cache.lock().unwrap_or_else(|e| e.into_inner());
        let stats = cache.stats();
        log::info!(
            "Response cache: {} entries, {} hits, {} misses",
            stats.entries,
            stats.hits,
            stats.misses
        );
        if let Some(path) = cache.path() {
            log::debug!("Saving response cache to {}", path.display());
        }
        if let Err(e) = cache.save() {
            log::warn!("Failed to save response cache: {:#}", e);
        }
    }

    match snapshot.error {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

fn read_patch(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut patch = String::new();
        std::io::stdin()
            .read_to_string(&mut patch)
            .context("Failed to read patch from stdin")?;
        return Ok(patch);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Shared response cache, or `None` when caching is disabled
fn open_cache(config: &CacheConfig) -> Option<Arc<Mutex<ResponseCache>>> {
    if !config.enabled {
        return None;
    }

    let cache = if config.persist {
        match mr_review_config::response_cache_path() {
            Ok(path) => ResponseCache::load_or_empty(path),
            Err(e) => {
                log::warn!("Response cache not persisted: {:#}", e);
                ResponseCache::in_memory()
            }
        }
    } else {
        ResponseCache::in_memory()
    };
    Some(Arc::new(Mutex::new(cache)))
}

fn list_files(source: &PatchDiffSource, config: &AppConfig) {
    for path in source.paths() {
        let Some(diff) = source.file(path) else {
            continue;
        };
        let hunk_count = diff.hunks.len();
        let total_lines = diff.total_lines();
        let mode = if config.diff.is_large(hunk_count, total_lines) {
            "chunked"
        } else {
            "whole"
        };
        println!(
            "{} {:<40} +{:<5} -{:<5} {:>4} hunks  {}",
            diff.status.as_char(),
            path,
            diff.additions(),
            diff.deletions(),
            hunk_count,
            mode
        );
    }
}

fn print_summary(snapshot: &DiffSnapshot, selected: Option<&DiffLine>) {
    if let Some(file) = &snapshot.file {
        println!("file:     {}", file);
    }
    if let Some(metadata) = &snapshot.metadata {
        println!(
            "size:     {} hunks, {} lines ({})",
            metadata.hunk_count,
            metadata.total_lines,
            if metadata.is_large { "chunked" } else { "whole" }
        );
    }

    let total = snapshot.effective_hunks.len();
    let loaded = snapshot
        .effective_hunks
        .iter()
        .enumerate()
        .filter(|(_, h)| h.is_some())
        .map(|(i, _)| i);
    println!("loaded:   {}", format_ranges(loaded));
    println!("absent:   {} of {}", snapshot.absent_count(), total);

    if let Some(selection) = snapshot.selection {
        let line = selected
            .map(describe_line)
            .unwrap_or_else(|| "(not loaded)".to_string());
        println!(
            "selected: hunk {} line {}: {}",
            selection.hunk_index, selection.line_index, line
        );
    }
    if let Some(error) = &snapshot.error {
        println!("error:    {}", error);
    }
}

/// Line number and content as the renderer shows them, e.g. `  12 +let x = 1;`
fn describe_line(line: &DiffLine) -> String {
    let number = line
        .display_line_number()
        .map(|n| n.to_string())
        .unwrap_or_default();
    format!("{:>4} {}{}", number, line.kind.prefix(), line.content)
}

/// Render ascending indices as compact ranges, e.g. `0-19, 25-49`
fn format_ranges(indices: impl IntoIterator<Item = usize>) -> String {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for index in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end + 1 == index => *end = index,
            _ => ranges.push((index, index)),
        }
    }

    if ranges.is_empty() {
        return "none".to_string();
    }
    ranges
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{}-{}", start, end)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ranges() {
        assert_eq!(format_ranges(Vec::new()), "none");
        assert_eq!(format_ranges([3]), "3");
        assert_eq!(format_ranges((0..20).chain(25..50)), "0-19, 25-49");
        assert_eq!(format_ranges([1, 2, 4, 6, 7]), "1-2, 4, 6-7");
    }

    #[test]
    fn test_describe_line() {
        assert_eq!(describe_line(&DiffLine::addition("let x = 1;", 12)), "  12 +let x = 1;");
        assert_eq!(describe_line(&DiffLine::deletion("old();", 7)), "   7 -old();");
        assert_eq!(describe_line(&DiffLine::context("same", 3, 5)), "   5  same");
    }

    #[test]
    fn test_line_click_parse() {
        assert_eq!(
            "3:7".parse::<LineClick>(),
            Ok(LineClick { hunk: 3, line: 7 })
        );
        assert!("3".parse::<LineClick>().is_err());
        assert!("a:1".parse::<LineClick>().is_err());
    }

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from([
            "mr-review",
            "change.patch",
            "src/lib.rs",
            "--iid",
            "42",
            "--scroll",
            "0",
            "--scroll",
            "5400.5",
            "--click",
            "2:0",
            "--cache-mode",
            "refresh",
        ])
        .unwrap();

        assert_eq!(cli.patch, PathBuf::from("change.patch"));
        assert_eq!(cli.file.as_deref(), Some("src/lib.rs"));
        assert_eq!(cli.iid, 42);
        assert_eq!(cli.scroll, vec![0.0, 5400.5]);
        assert_eq!(cli.click, Some(LineClick { hunk: 2, line: 0 }));
        assert_eq!(cli.cache_mode, CacheMode::WriteOnly);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["mr-review", "-"]).unwrap();
        assert_eq!(cli.iid, 1);
        assert!(cli.file.is_none());
        assert!(cli.scroll.is_empty());
        assert_eq!(cli.cache_mode, CacheMode::ReadWrite);
    }
}
