//! Line selection within the active hunk source.

/// Pointer to a line, valid for whichever hunk source is active
/// (whole content or hunk slots).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineSelection {
    pub hunk_index: usize,
    pub line_index: usize,
}

impl LineSelection {
    pub fn new(hunk_index: usize, line_index: usize) -> Self {
        Self {
            hunk_index,
            line_index,
        }
    }
}
