//! Parse unified diff format (as produced by `git diff` or a merge request's raw patch).

use crate::model::{DiffLine, FileDiff, FileStatus, Hunk, LineKind};
use thiserror::Error;
use unidiff::{Hunk as UnidiffHunk, Line as UnidiffLine, PatchSet, PatchedFile};

/// Errors that can occur during diff parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse diff: {0}")]
    ParseFailed(String),
}

/// Parse a unified diff string into one `FileDiff` per changed file.
///
/// # Example
/// ```ignore
/// let files = parse_unified_diff(patch_text)?;
/// println!("Changed files: {}", files.len());
/// ```
pub fn parse_unified_diff(diff_text: &str) -> Result<Vec<FileDiff>, ParseError> {
    let mut patch_set = PatchSet::new();
    patch_set
        .parse(diff_text)
        .map_err(|e| ParseError::ParseFailed(e.to_string()))?;

    Ok(patch_set.files().iter().map(parse_patched_file).collect())
}

fn parse_patched_file(file: &PatchedFile) -> FileDiff {
    let target = clean_path(&file.target_file);
    let source = clean_path(&file.source_file);

    // Deleted files keep their old path as the identifying path
    let path = if target == "/dev/null" { &source } else { &target };
    let mut file_diff = FileDiff::new(path.as_str());
    file_diff.status = determine_status(&source, &target);

    if file_diff.status == FileStatus::Renamed {
        file_diff.old_path = Some(source.clone());
    }

    file_diff.hunks = file.hunks().iter().map(parse_hunk).collect();
    file_diff
}

fn parse_hunk(hunk: &UnidiffHunk) -> Hunk {
    let mut parsed = Hunk::with_context(
        hunk.source_start as u32,
        hunk.source_length as u32,
        hunk.target_start as u32,
        hunk.target_length as u32,
        hunk.section_header.trim(),
    );

    parsed.lines = hunk.lines().iter().filter_map(parse_line).collect();
    parsed
}

fn parse_line(line: &UnidiffLine) -> Option<DiffLine> {
    let kind = match line.line_type.as_str() {
        "+" => LineKind::Addition,
        "-" => LineKind::Deletion,
        // "\ No newline at end of file" is a marker, not a line
        "\\" => return None,
        _ => LineKind::Context,
    };

    Some(DiffLine {
        kind,
        content: line.value.to_string(),
        old_line: line.source_line_no.map(|n| n as u32),
        new_line: line.target_line_no.map(|n| n as u32),
    })
}

fn determine_status(source: &str, target: &str) -> FileStatus {
    if source == "/dev/null" || source.is_empty() {
        FileStatus::Added
    } else if target == "/dev/null" || target.is_empty() {
        FileStatus::Deleted
    } else if source != target {
        FileStatus::Renamed
    } else {
        FileStatus::Modified
    }
}

/// Clean the path by removing a/b prefixes from git diff output.
fn clean_path(path: &str) -> String {
    let path = path.trim();

    if let Some(stripped) = path.strip_prefix("a/") {
        return stripped.to_string();
    }
    if let Some(stripped) = path.strip_prefix("b/") {
        return stripped.to_string();
    }

    path.to_string()
}
