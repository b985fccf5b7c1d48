//! Source peer: watches a directory, batches changes, and pushes deltas
//! to a target over an already-open connection.

pub mod batch;
pub mod build;
pub mod engine;
pub mod error;

pub use build::build_initial_cache;
pub use engine::run;
pub use error::SourceError;
