//! Extension traits the loader is instrumented with.

mod data_source;

pub use data_source::{DiffDataSource, SourceError};
