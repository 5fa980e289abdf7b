//! Protocol Module
//!
//! Defines the wire protocol spoken with the tickstore server.
//!
//! ## Protocol Format
//!
//! ### Request Format
//! ```text
//! ┌──────────────────────────────┬──────┐
//! │   ASCII command line         │ \n   │
//! └──────────────────────────────┴──────┘
//! ```
//!
//! Commands are a closed set of case-sensitive verbs (`INFO`, `PING`,
//! `ADD`, `BULKADD` … `DDAKLUB`, `GET`, `SUBSCRIBE`, …) with comma/space
//! separated arguments. The empty command polls a subscription.
//!
//! ### Response Format
//! ```text
//! ┌────────────┬──────────────────┬─────────────────────┐
//! │ Success(1) │ Body length (8)  │  UTF-8 body         │
//! └────────────┴──────────────────┴─────────────────────┘
//! ```
//!
//! - Success: 0x00 failure / 0x01 success
//! - Body length: unsigned big-endian
//! - Body: JSON, CSV, or a plain message; the literal `NONE` on a poll
//!   is a sentinel meaning "no new record", not an error
//!
//! Exactly one command is outstanding per connection at any time; responses
//! are matched to requests purely by arrival order.

mod codec;
mod command;
mod response;

pub use codec::{
    decode_header, encode_command, read_body, read_body_async, read_header, read_header_async,
    read_response, read_response_async, write_command, write_command_async, DEFAULT_READ_CHUNK,
    HEADER_SIZE, MAX_BODY_SIZE,
};
pub use command::{Command, GetFormat, ReqCount};
pub use response::{Poll, Response};
