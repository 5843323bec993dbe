//! Diff data structures for a single file of a merge request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one file of one merge request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef {
    /// Merge request IID within its project.
    pub merge_request: u64,
    /// File path after the change (new path for renames).
    pub path: String,
}

impl FileRef {
    /// Create a new file reference.
    pub fn new(merge_request: u64, path: impl Into<String>) -> Self {
        Self {
            merge_request,
            path: path.into(),
        }
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}:{}", self.merge_request, self.path)
    }
}

/// Size classification of a file diff, produced once per selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffMetadata {
    pub file_path: String,
    /// Load in chunks instead of in one call.
    pub is_large: bool,
    pub hunk_count: usize,
    pub total_lines: usize,
}

/// A fully resolved diff, used when the file is small enough to load whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffContent {
    pub file_path: String,
    pub old_content: String,
    pub new_content: String,
    pub hunks: Vec<Hunk>,
}

/// A batch of hunks returned by the data source.
///
/// `hunks[i]` belongs at absolute index `start_index + i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HunkRange {
    pub start_index: usize,
    pub hunks: Vec<Hunk>,
}

/// A single file's parsed diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Current file path (after rename if applicable).
    pub path: String,
    /// Previous file path (if renamed).
    pub old_path: Option<String>,
    pub status: FileStatus,
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    /// Create a new, empty file diff.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            old_path: None,
            status: FileStatus::Modified,
            hunks: Vec::new(),
        }
    }

    /// Number of added lines.
    pub fn additions(&self) -> usize {
        self.lines_of(LineKind::Addition)
    }

    /// Number of deleted lines.
    pub fn deletions(&self) -> usize {
        self.lines_of(LineKind::Deletion)
    }

    /// Total number of diff lines across all hunks.
    pub fn total_lines(&self) -> usize {
        self.hunks.iter().map(|h| h.lines.len()).sum()
    }

    /// Text of the old side covered by the hunks (context and deletions).
    pub fn old_content(&self) -> String {
        self.side_content(|l| l.kind != LineKind::Addition)
    }

    /// Text of the new side covered by the hunks (context and additions).
    pub fn new_content(&self) -> String {
        self.side_content(|l| l.kind != LineKind::Deletion)
    }

    fn lines_of(&self, kind: LineKind) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.kind == kind)
            .count()
    }

    fn side_content(&self, keep: impl Fn(&DiffLine) -> bool) -> String {
        let mut out = String::new();
        for line in self.hunks.iter().flat_map(|h| &h.lines).filter(|l| keep(l)) {
            out.push_str(&line.content);
            out.push('\n');
        }
        out
    }
}

/// File status in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileStatus {
    /// Get a single-character representation.
    pub fn as_char(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
        }
    }
}

/// A contiguous region of changes (hunk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// Header line (e.g., "@@ -10,5 +10,7 @@ fn example()").
    pub header: String,
    /// Old file starting line.
    pub old_start: u32,
    /// Number of lines in old version.
    pub old_count: u32,
    /// New file starting line.
    pub new_start: u32,
    /// Number of lines in new version.
    pub new_count: u32,
    /// Lines in this hunk.
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Create a new hunk with the given header info.
    pub fn new(old_start: u32, old_count: u32, new_start: u32, new_count: u32) -> Self {
        Self {
            header: format!(
                "@@ -{},{} +{},{} @@",
                old_start, old_count, new_start, new_count
            ),
            old_start,
            old_count,
            new_start,
            new_count,
            lines: Vec::new(),
        }
    }

    /// Create a hunk with a function context in header.
    pub fn with_context(
        old_start: u32,
        old_count: u32,
        new_start: u32,
        new_count: u32,
        context: &str,
    ) -> Self {
        let mut hunk = Self::new(old_start, old_count, new_start, new_count);
        if !context.is_empty() {
            hunk.header = format!("{} {}", hunk.header, context);
        }
        hunk
    }
}

/// A single line in the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: LineKind,
    /// Line content (without leading +/-/ ).
    pub content: String,
    /// Line number in old file (for Context and Deletion).
    pub old_line: Option<u32>,
    /// Line number in new file (for Context and Addition).
    pub new_line: Option<u32>,
}

impl DiffLine {
    /// Create a new context line.
    pub fn context(content: impl Into<String>, old_line: u32, new_line: u32) -> Self {
        Self {
            kind: LineKind::Context,
            content: content.into(),
            old_line: Some(old_line),
            new_line: Some(new_line),
        }
    }

    /// Create a new addition line.
    pub fn addition(content: impl Into<String>, new_line: u32) -> Self {
        Self {
            kind: LineKind::Addition,
            content: content.into(),
            old_line: None,
            new_line: Some(new_line),
        }
    }

    /// Create a new deletion line.
    pub fn deletion(content: impl Into<String>, old_line: u32) -> Self {
        Self {
            kind: LineKind::Deletion,
            content: content.into(),
            old_line: Some(old_line),
            new_line: None,
        }
    }

    /// Get the line number to display (prefers new_line, falls back to old_line).
    pub fn display_line_number(&self) -> Option<u32> {
        self.new_line.or(self.old_line)
    }
}

/// Line type in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Unchanged line (for context).
    Context,
    /// Added line (+).
    #[serde(rename = "add")]
    Addition,
    /// Removed line (-).
    #[serde(rename = "remove")]
    Deletion,
}

impl LineKind {
    /// Get the prefix character for this line type.
    pub fn prefix(&self) -> char {
        match self {
            LineKind::Context => ' ',
            LineKind::Addition => '+',
            LineKind::Deletion => '-',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> FileDiff {
        let mut file = FileDiff::new("src/main.rs");
        let mut hunk = Hunk::new(1, 3, 1, 3);
        hunk.lines.push(DiffLine::context("fn main() {", 1, 1));
        hunk.lines.push(DiffLine::deletion("    old_line();", 2));
        hunk.lines.push(DiffLine::addition("    new_line();", 2));
        hunk.lines.push(DiffLine::context("}", 3, 3));
        file.hunks.push(hunk);
        file
    }

    #[test]
    fn test_file_stats() {
        let file = sample_file();
        assert_eq!(file.additions(), 1);
        assert_eq!(file.deletions(), 1);
        assert_eq!(file.total_lines(), 4);
    }

    #[test]
    fn test_side_content() {
        let file = sample_file();
        assert_eq!(file.old_content(), "fn main() {\n    old_line();\n}\n");
        assert_eq!(file.new_content(), "fn main() {\n    new_line();\n}\n");
    }

    #[test]
    fn test_hunk_header() {
        assert_eq!(Hunk::new(10, 5, 10, 7).header, "@@ -10,5 +10,7 @@");
        assert_eq!(
            Hunk::with_context(1, 2, 1, 3, "impl Foo").header,
            "@@ -1,2 +1,3 @@ impl Foo"
        );
    }

    #[test]
    fn test_display_line_number() {
        assert_eq!(DiffLine::context("x", 4, 7).display_line_number(), Some(7));
        assert_eq!(DiffLine::deletion("x", 4).display_line_number(), Some(4));
    }

    #[test]
    fn test_file_ref_display() {
        assert_eq!(FileRef::new(42, "src/lib.rs").to_string(), "!42:src/lib.rs");
    }
}
