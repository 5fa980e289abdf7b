//! Codec Tests
//!
//! Framing tests: header/body reassembly under pathological read sizes,
//! end-of-stream handling, and the pure encode/decode transforms.

use std::io::{Cursor, Read};

use tickstore_client::protocol::{
    decode_header, encode_command, read_body, read_body_async, read_header, read_header_async,
    read_response, read_response_async, HEADER_SIZE, MAX_BODY_SIZE,
};
use tickstore_client::TickError;

// =============================================================================
// Test readers
// =============================================================================

/// Yields at most `max` bytes per read call
struct TrickleReader {
    data: Vec<u8>,
    pos: usize,
    max: usize,
}

impl TrickleReader {
    fn new(data: &[u8], max: usize) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            max,
        }
    }
}

impl Read for TrickleReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.max).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Fails the test if the codec touches the stream at all
struct PanicReader;

impl Read for PanicReader {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        panic!("zero-length body must not read from the stream");
    }
}

fn frame(success: bool, body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
    buf.push(success as u8);
    buf.extend_from_slice(&(body.len() as u64).to_be_bytes());
    buf.extend_from_slice(body);
    buf
}

// =============================================================================
// Encode/decode transforms
// =============================================================================

#[test]
fn test_encode_appends_newline() {
    assert_eq!(encode_command("PING"), b"PING\n");
}

#[test]
fn test_encode_keeps_existing_newline() {
    assert_eq!(encode_command("PING\n"), b"PING\n");
}

#[test]
fn test_encode_empty_poll_is_bare_newline() {
    assert_eq!(encode_command(""), b"\n");
}

#[test]
fn test_decode_header_big_endian() {
    let mut header = [0u8; HEADER_SIZE];
    header[0] = 1;
    header[1..].copy_from_slice(&257u64.to_be_bytes());
    assert_eq!(decode_header(&header), (true, 257));

    header[0] = 0;
    header[1..].copy_from_slice(&0u64.to_be_bytes());
    assert_eq!(decode_header(&header), (false, 0));
}

// =============================================================================
// Header assembly
// =============================================================================

#[test]
fn test_header_reassembled_from_any_split() {
    let bytes = frame(true, b"hello");
    // The header may arrive across 1..=9 separate reads
    for max in 1..=HEADER_SIZE {
        let mut reader = TrickleReader::new(&bytes, max);
        let (success, len) = read_header(&mut reader).unwrap();
        assert!(success);
        assert_eq!(len, 5);
    }
}

#[test]
fn test_eof_mid_header_is_protocol_error() {
    let mut reader = Cursor::new(vec![1u8, 0, 0, 0]);
    match read_header(&mut reader) {
        Err(TickError::Protocol(_)) => {}
        other => panic!("expected protocol error, got {:?}", other),
    }
}

// =============================================================================
// Body assembly
// =============================================================================

#[test]
fn test_body_reassembled_from_one_byte_chunks() {
    let body: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
    let mut reader = TrickleReader::new(&body, 1);
    let out = read_body(&mut reader, body.len() as u64, 7).unwrap();
    assert_eq!(&out[..], &body[..]);
}

#[test]
fn test_body_chunk_ceiling_still_collects_everything() {
    let body = vec![42u8; 500];
    let mut reader = Cursor::new(body.clone());
    let out = read_body(&mut reader, 500, 32).unwrap();
    assert_eq!(&out[..], &body[..]);
}

#[test]
fn test_zero_length_body_performs_no_read() {
    let out = read_body(&mut PanicReader, 0, 32).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_oversized_length_field_is_protocol_error() {
    // A hostile header can claim any 64-bit length; it must be rejected
    // before a single byte of it is allocated or read.
    let mut reader = Cursor::new(b"abc".to_vec());
    match read_body(&mut reader, u64::MAX, 32) {
        Err(TickError::Protocol(_)) => {}
        other => panic!("expected protocol error, got {:?}", other),
    }
    assert_eq!(reader.position(), 0);

    let mut reader = Cursor::new(Vec::new());
    match read_body(&mut reader, MAX_BODY_SIZE + 1, 32) {
        Err(TickError::Protocol(_)) => {}
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_eof_mid_body_is_connection_closed() {
    let mut reader = Cursor::new(b"abc".to_vec());
    match read_body(&mut reader, 10, 32) {
        Err(TickError::ConnectionClosed) => {}
        other => panic!("expected connection closed, got {:?}", other),
    }
}

// =============================================================================
// Full responses
// =============================================================================

#[test]
fn test_read_response_header_and_body() {
    let bytes = frame(true, b"PONG");
    let mut reader = Cursor::new(bytes);
    let response = read_response(&mut reader, 32).unwrap();
    assert!(response.success);
    assert_eq!(&response.body[..], b"PONG");
}

#[test]
fn test_read_response_failure_flag() {
    let bytes = frame(false, b"ERR: no db");
    let mut reader = TrickleReader::new(&bytes, 2);
    let response = read_response(&mut reader, 3).unwrap();
    assert!(!response.success);
    assert_eq!(&response.body[..], b"ERR: no db");
}

// =============================================================================
// Async mirrors produce identical wire behavior
// =============================================================================

#[tokio::test]
async fn test_async_header_and_body_match_sync() {
    let bytes = frame(true, b"hello");
    let mut reader: &[u8] = &bytes;
    let (success, len) = read_header_async(&mut reader).await.unwrap();
    assert!(success);
    assert_eq!(len, 5);
    let body = read_body_async(&mut reader, len, 2).await.unwrap();
    assert_eq!(&body[..], b"hello");
}

#[tokio::test]
async fn test_async_zero_length_body() {
    let bytes = frame(false, b"");
    let mut reader: &[u8] = &bytes;
    let response = read_response_async(&mut reader, 32).await.unwrap();
    assert!(!response.success);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_async_oversized_length_field_is_protocol_error() {
    let mut reader: &[u8] = b"abc";
    match read_body_async(&mut reader, u64::MAX, 32).await {
        Err(TickError::Protocol(_)) => {}
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_async_eof_mid_body_is_connection_closed() {
    let mut bytes = frame(true, b"full body here");
    bytes.truncate(HEADER_SIZE + 4);
    let mut reader: &[u8] = &bytes;
    match read_response_async(&mut reader, 32).await {
        Err(TickError::ConnectionClosed) => {}
        other => panic!("expected connection closed, got {:?}", other),
    }
}
