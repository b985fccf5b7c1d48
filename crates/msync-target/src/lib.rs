//! Target peer: serves the four sync operations over a connection handed
//! to it by whatever transport (local process stdio, or a test duplex
//! pipe) established it.

pub mod build;
pub mod handler;

pub use build::build_initial_cache;
pub use handler::TargetHandler;

use msync_proto::wire::{read_frame, write_frame, Envelope, FrameError};
use msync_proto::{Request, Response};
use tokio::io::{AsyncRead, AsyncWrite};

/// Serve `conn` with `handler` until the peer disconnects or sends
/// `Shutdown`. Written as a direct loop (rather than going through
/// `msync_proto::server::serve_connection`'s closure-based dispatch) so
/// `handler` can be borrowed mutably across requests without fighting the
/// borrow checker over a closure that would otherwise need to return a
/// future borrowing its own captured state.
pub async fn serve<S>(mut conn: S, mut handler: TargetHandler) -> Result<(), FrameError>
where
    S: AsyncRead + AsyncWrite + Unpin,
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
        let response: Response = handler.handle(request.body).await;
        write_frame(&mut conn, &Envelope { seq: request.seq, body: response }).await?;

        if is_shutdown {
            return Ok(());
        }
    }
}
