//! Length-prefixed bincode framing: a 4-byte little-endian length prefix
//! followed by a bincode-encoded payload, the same shape the daemon's Unix
//! socket dispatcher frames its requests with.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Frames above this size are refused rather than allocated for — a
/// runaway length prefix (corrupt stream, hostile peer) shouldn't be able
/// to make a peer allocate unbounded memory.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame of {0} bytes exceeds the {MAX_FRAME_LEN} byte limit")]
    TooLarge(usize),
    #[error("bincode error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Envelope wrapping every request/response with a sequence number, so a
/// client can match a reply to the call that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub seq: u64,
    pub body: T,
}

pub async fn write_frame<W, T>(writer: &mut W, envelope: &Envelope<T>) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = bincode::serialize(envelope)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(payload.len()));
    }
    writer.write_all(&(payload.len() as u32).to_le_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_frame<R, T>(reader: &mut R) -> Result<Envelope<T>, FrameError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(len));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;

    Ok(bincode::deserialize(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn round_trips_an_envelope() {
        let (mut a, mut b) = duplex(4096);
        let env = Envelope { seq: 7, body: "hello".to_string() };
        write_frame(&mut a, &env).await.unwrap();
        let decoded: Envelope<String> = read_frame(&mut b).await.unwrap();
        assert_eq!(decoded.seq, 7);
        assert_eq!(decoded.body, "hello");
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected_on_write() {
        let (mut a, _b) = duplex(4096);
        let env = Envelope {
            seq: 1,
            body: vec![0u8; MAX_FRAME_LEN + 1],
        };
        let err = write_frame(&mut a, &env).await.unwrap_err();
        assert!(matches!(err, FrameError::TooLarge(_)));
    }
}
