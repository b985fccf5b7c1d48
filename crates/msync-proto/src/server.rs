//! Generic request/response dispatch over a framed connection. The target
//! binds its actual command handling in `msync-target`; this module only
//! owns the read-dispatch-write loop, mirroring the daemon's socket
//! handler loop but generalized past Unix sockets to any duplex stream.

use std::future::Future;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::messages::{Request, Response};
use crate::wire::{read_frame, write_frame, Envelope, FrameError};

/// Read one request, hand it to `handler`, write back the response.
/// Returns `Ok(())` after one full request/response cycle; a clean EOF
/// while reading the next request's length prefix is the caller's signal
/// to stop calling this in a loop.
pub async fn serve_one<S, F, Fut>(conn: &mut S, handler: F) -> Result<(), FrameError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: FnOnce(Request) -> Fut,
    Fut: Future<Output = Response>,
{
    let request: Envelope<Request> = read_frame(conn).await?;
    let response = handler(request.body).await;
    write_frame(conn, &Envelope { seq: request.seq, body: response }).await
}

/// Serve `conn` until the peer disconnects, calling `handler` once per
/// request in sequence (the target never needs more than one request in
/// flight on a connection).
pub async fn serve_connection<S, F, Fut>(mut conn: S, mut handler: F) -> Result<(), FrameError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: FnMut(Request) -> Fut,
    Fut: Future<Output = Response>,
{
    loop {
        let request: Envelope<Request> = match read_frame(&mut conn).await {
            Ok(env) => env,
            Err(FrameError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let is_shutdown = matches!(request.body, Request::Shutdown);
        let response = handler(request.body).await;
        write_frame(&mut conn, &Envelope { seq: request.seq, body: response }).await?;

        if is_shutdown {
            return Ok(());
        }
    }
}
