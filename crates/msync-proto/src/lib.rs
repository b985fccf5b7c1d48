//! Wire protocol between a source and a target: message bodies, framing,
//! and the client/server halves that speak them over any duplex byte
//! stream.

pub mod client;
pub mod error;
pub mod messages;
pub mod server;
pub mod wire;

pub use client::{Client, ClientError};
pub use error::{ChecksumMismatch, SyncError};
pub use messages::{Request, Response};
pub use wire::{Envelope, FrameError};
