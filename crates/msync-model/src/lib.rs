//! Shared data model for the sync engine.
//!
//! Both peers (source and target) hold one [`TextCache`]: an in-memory
//! mirror of "what this peer last knew to be on disk" at each tracked
//! relative path. Everything else in this crate exists to keep that
//! invariant honest — checksums for reconciliation, and path
//! normalization so both peers agree on what a path even means.

pub mod cache;
pub mod checksum;
pub mod path;

pub use cache::TextCache;
pub use checksum::{checksum, ChecksumIndex};
