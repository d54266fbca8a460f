//! P2P message model and frame codec
//!
//! The wire protocol is message-framed: a little-endian u32 length prefix
//! followed by the serialized message. This crate defines the message
//! set and the framing; peer management and flow logic live outside the
//! consensus core.

pub mod message;

pub use message::{Message, MAX_FRAME_SIZE};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("frame of {0} bytes exceeds the protocol maximum")]
    FrameTooLarge(usize),

    #[error("codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Writes one length-prefixed message frame
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, msg: &Message) -> Result<(), FrameError> {
    let payload = bincode::serialize(msg).map_err(|e| FrameError::Codec(e.to_string()))?;
    if payload.len() > MAX_FRAME_SIZE {
        return Err(FrameError::FrameTooLarge(payload.len()));
    }
    writer.write_u32_le(payload.len() as u32).await?;
    writer.write_all(&payload).await?;
    Ok(())
}

/// Reads one length-prefixed message frame
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Message, FrameError> {
    let len = reader.read_u32_le().await? as usize;
    if len > MAX_FRAME_SIZE {
        return Err(FrameError::FrameTooLarge(len));
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    bincode::deserialize(&buf).map_err(|e| FrameError::Codec(e.to_string()))
}
