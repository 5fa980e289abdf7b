//! Response definitions
//!
//! Represents decoded server responses.

use bytes::Bytes;

use crate::error::{Result, TickError};

/// Poll sentinel body meaning "no new record since the last poll"
const SENTINEL: &[u8] = b"NONE";

/// A framed response from the server
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Success flag from the header (0x00 / 0x01 on the wire)
    pub success: bool,

    /// Raw response body: JSON, CSV, or a plain message
    pub body: Bytes,
}

impl Response {
    /// Create a response (used by tests and mock servers)
    pub fn new(success: bool, body: impl Into<Bytes>) -> Self {
        Self {
            success,
            body: body.into(),
        }
    }

    /// Body as UTF-8 text. Non-UTF-8 bodies violate the protocol.
    pub fn body_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| TickError::Protocol(format!("non-UTF-8 response body: {}", e)))
    }

    /// Interpret this response as the outcome of a poll command.
    ///
    /// The sentinel is matched with or without a trailing newline; older
    /// servers emit `NONE\n`.
    pub fn into_poll(self) -> Poll {
        let trimmed = match self.body.strip_suffix(b"\n") {
            Some(stripped) => stripped,
            None => &self.body[..],
        };
        if trimmed == SENTINEL {
            Poll::Empty
        } else {
            Poll::Record(self.body)
        }
    }
}

/// Outcome of one poll round trip on a subscribed connection
#[derive(Debug, Clone, PartialEq)]
pub enum Poll {
    /// No new record since the last poll; wait the backoff and poll again
    Empty,

    /// One JSON-encoded record
    Record(Bytes),
}
