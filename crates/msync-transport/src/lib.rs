//! Connection adapter: compose an independent half-duplex reader and
//! writer into one object implementing both `AsyncRead` and `AsyncWrite`,
//! the shape every other crate here treats "the connection" as.
//!
//! Two concrete ways to get one are provided: spawning the target binary
//! as a child process and piping its stdio ([`DuplexPipe::from_child_stdio`],
//! mirroring `OpenLocalConnection` from the tool this crate reimplements),
//! and an in-process `tokio::io::duplex` pair for tests.

use std::io;
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// A full-duplex byte stream made of two independent halves.
pub struct DuplexPipe<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> DuplexPipe<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R, W> AsyncRead for DuplexPipe<R, W>
where
    R: AsyncRead + Unpin,
    W: Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().reader).poll_read(cx, buf)
    }
}

impl<R, W> AsyncWrite for DuplexPipe<R, W>
where
    R: Unpin,
    W: AsyncWrite + Unpin,
{
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().writer).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().writer).poll_flush(cx)
    }

    /// Closing the write half is how this end signals EOF to the remote
    /// peer — for a child-process pipe that means closing its stdin.
    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().writer).poll_shutdown(cx)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to spawn local target process: {0}")]
    Spawn(#[source] io::Error),
    #[error("spawned process did not expose a stdio pipe")]
    MissingStdio,
}

/// A connection to a target spawned as a local child process, talking to
/// it over its stdin/stdout pipes. The `Child` handle is kept alongside
/// the pipe so the caller can wait on it after shutdown.
pub struct LocalConnection {
    pub pipe: DuplexPipe<ChildStdout, ChildStdin>,
    pub child: Child,
}

impl LocalConnection {
    /// Spawn `program` with `args` in `working_dir`, wiring its stdio into
    /// a [`DuplexPipe`]. Mirrors `OpenLocalConnection`'s local (non-SSH)
    /// transport mode.
    pub fn spawn(program: &str, args: &[String], working_dir: &std::path::Path) -> Result<Self, TransportError> {
        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = command.spawn().map_err(TransportError::Spawn)?;

        let stdin = child.stdin.take().ok_or(TransportError::MissingStdio)?;
        let stdout = child.stdout.take().ok_or(TransportError::MissingStdio)?;

        Ok(Self { pipe: DuplexPipe::new(stdout, stdin), child })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn duplex_pipe_carries_bytes_both_ways() {
        let (a_reader, mut b_writer) = duplex(64);
        let (mut a_writer, b_reader) = duplex(64);
        let mut pipe_a = DuplexPipe::new(a_reader, a_writer);

        b_writer.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        pipe_a.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");

        pipe_a.write_all(b"pong").await.unwrap();
        let mut echoed = [0u8; 4];
        let mut b_reader = b_reader;
        b_reader.read_exact(&mut echoed).await.unwrap();
        assert_eq!(&echoed, b"pong");
    }

    #[tokio::test]
    async fn shutdown_closes_the_write_half() {
        let (_a_reader, b_writer) = duplex(64);
        let (a_writer, mut b_reader) = duplex(64);
        let mut pipe_a = DuplexPipe::new(_a_reader, a_writer);

        pipe_a.shutdown().await.unwrap();
        drop(b_writer);

        let mut buf = Vec::new();
        let n = b_reader.read_to_end(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn local_connection_spawns_and_echoes() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = LocalConnection::spawn("cat", &[], dir.path()).unwrap();

        conn.pipe.write_all(b"hello").await.unwrap();
        conn.pipe.shutdown().await.unwrap();

        let mut out = Vec::new();
        conn.pipe.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"hello");

        conn.child.wait().await.unwrap();
    }
}
