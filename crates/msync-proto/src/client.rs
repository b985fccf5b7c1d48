//! RPC client stub: one call in flight at a time, tagged with a sequence
//! number so a reply can be checked against the call that produced it.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::SyncError;
use crate::messages::{Request, Response};
use crate::wire::{read_frame, write_frame, Envelope, FrameError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("reply seq {got} did not match request seq {expected}")]
    SeqMismatch { expected: u64, got: u64 },
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// A connection to a target, issuing one request at a time.
pub struct Client<S> {
    conn: S,
    next_seq: AtomicU64,
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(conn: S) -> Self {
        Self { conn, next_seq: AtomicU64::new(1) }
    }

    /// Send `request` and wait for its matching response. Returns the
    /// `Ok` response body, or the target's `SyncError` if it sent one.
    pub async fn call(&mut self, request: Request) -> Result<Response, ClientError> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let envelope = Envelope { seq, body: request };
        write_frame(&mut self.conn, &envelope).await?;

        let reply: Envelope<Response> = read_frame(&mut self.conn).await?;
        if reply.seq != seq {
            return Err(ClientError::SeqMismatch { expected: seq, got: reply.seq });
        }

        Ok(reply.body.into_result()?)
    }
}
