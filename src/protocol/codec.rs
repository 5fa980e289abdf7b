//! Protocol codec
//!
//! Encoding and framing for the wire protocol.
//!
//! The transport is a plain ordered byte stream, so a single read may
//! deliver any prefix of a response: the header may arrive split across
//! up to nine reads and the body in arbitrarily small pieces. All readers
//! here loop until the exact byte count has accumulated.
//!
//! Sync and async variants implement identical framing; the only
//! difference is where they suspend.

use bytes::{Bytes, BytesMut};
use std::io::{Read, Write};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::Response;
use crate::error::{Result, TickError};

/// Header size: 1 byte success flag + 8 bytes big-endian body length
pub const HEADER_SIZE: usize = 9;

/// Default ceiling on bytes requested per read while draining a body
pub const DEFAULT_READ_CHUNK: usize = 32;

/// Maximum accepted body length (64 MB).
///
/// The length field is attacker-controlled; it must be validated before
/// any allocation sized from it.
pub const MAX_BODY_SIZE: u64 = 64 * 1024 * 1024;

// =============================================================================
// Pure transforms
// =============================================================================

/// Encode a command line for transmission.
///
/// Appends the terminating `\n` when missing. The command text itself must
/// not contain newlines; there is no escaping in this protocol.
pub fn encode_command(command: &str) -> Vec<u8> {
    let mut message = Vec::with_capacity(command.len() + 1);
    message.extend_from_slice(command.as_bytes());
    if !command.ends_with('\n') {
        message.push(b'\n');
    }
    message
}

/// Decode the fixed 9-byte response header into (success, body length)
pub fn decode_header(header: &[u8; HEADER_SIZE]) -> (bool, u64) {
    let success = header[0] != 0;
    let len = u64::from_be_bytes([
        header[1], header[2], header[3], header[4], header[5], header[6], header[7], header[8],
    ]);
    (success, len)
}

// =============================================================================
// Blocking framing
// =============================================================================

/// Read the 9-byte header, looping until all 9 bytes have accumulated.
///
/// End-of-stream before the header completes is a `Protocol` error: the
/// envelope could never be assembled.
pub fn read_header<R: Read>(reader: &mut R) -> Result<(bool, u64)> {
    let mut header = [0u8; HEADER_SIZE];
    let mut filled = 0;
    while filled < HEADER_SIZE {
        let n = reader.read(&mut header[filled..])?;
        if n == 0 {
            return Err(TickError::Protocol(format!(
                "stream ended with incomplete header: {} of {} bytes",
                filled, HEADER_SIZE
            )));
        }
        filled += n;
    }
    Ok(decode_header(&header))
}

/// Read exactly `len` body bytes, in reads bounded by `chunk` bytes each.
///
/// `len == 0` short-circuits without touching the stream. End-of-stream
/// before the body completes is `ConnectionClosed`.
pub fn read_body<R: Read>(reader: &mut R, len: u64, chunk: usize) -> Result<Bytes> {
    if len == 0 {
        return Ok(Bytes::new());
    }
    if len > MAX_BODY_SIZE {
        return Err(TickError::Protocol(format!(
            "body length {} exceeds maximum {}",
            len, MAX_BODY_SIZE
        )));
    }
    let len = len as usize;
    let chunk = chunk.max(1);

    let mut body = BytesMut::with_capacity(len);
    let mut buf = vec![0u8; chunk.min(len)];
    while body.len() < len {
        let want = chunk.min(len - body.len());
        let n = reader.read(&mut buf[..want])?;
        if n == 0 {
            return Err(TickError::ConnectionClosed);
        }
        body.extend_from_slice(&buf[..n]);
    }
    Ok(body.freeze())
}

/// Read a complete framed response (header then body)
pub fn read_response<R: Read>(reader: &mut R, chunk: usize) -> Result<Response> {
    let (success, len) = read_header(reader)?;
    let body = read_body(reader, len, chunk)?;
    Ok(Response { success, body })
}

/// Write an encoded command line and flush it
pub fn write_command<W: Write>(writer: &mut W, command: &str) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Cooperative framing
// =============================================================================

/// Async mirror of [`read_header`]; each read is a suspension point
pub async fn read_header_async<R>(reader: &mut R) -> Result<(bool, u64)>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_SIZE];
    let mut filled = 0;
    while filled < HEADER_SIZE {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            return Err(TickError::Protocol(format!(
                "stream ended with incomplete header: {} of {} bytes",
                filled, HEADER_SIZE
            )));
        }
        filled += n;
    }
    Ok(decode_header(&header))
}

/// Async mirror of [`read_body`]
pub async fn read_body_async<R>(reader: &mut R, len: u64, chunk: usize) -> Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    if len == 0 {
        return Ok(Bytes::new());
    }
    if len > MAX_BODY_SIZE {
        return Err(TickError::Protocol(format!(
            "body length {} exceeds maximum {}",
            len, MAX_BODY_SIZE
        )));
    }
    let len = len as usize;
    let chunk = chunk.max(1);

    let mut body = BytesMut::with_capacity(len);
    let mut buf = vec![0u8; chunk.min(len)];
    while body.len() < len {
        let want = chunk.min(len - body.len());
        let n = reader.read(&mut buf[..want]).await?;
        if n == 0 {
            return Err(TickError::ConnectionClosed);
        }
        body.extend_from_slice(&buf[..n]);
    }
    Ok(body.freeze())
}

/// Async mirror of [`read_response`]
pub async fn read_response_async<R>(reader: &mut R, chunk: usize) -> Result<Response>
where
    R: AsyncRead + Unpin,
{
    let (success, len) = read_header_async(reader).await?;
    let body = read_body_async(reader, len, chunk).await?;
    Ok(Response { success, body })
}

/// Async mirror of [`write_command`]
pub async fn write_command_async<W>(writer: &mut W, command: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode_command(command)).await?;
    writer.flush().await?;
    Ok(())
}
