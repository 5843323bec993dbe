//! State for one diff viewing session.

mod selection;
mod view_state;

pub use selection::LineSelection;
pub use view_state::{DiffBody, DiffSnapshot, DiffViewState};
