//! # tickstore-client
//!
//! A client driver for the tickstore tick database, reached over one
//! persistent TCP connection:
//! - Line-oriented ASCII command language with a binary response envelope
//! - Partial-read reassembly for the fixed header and variable body
//! - BULKADD batch loading with strict framing guarantees
//! - Subscribe/poll streaming with sentinel-based backoff
//! - Blocking and cooperative (tokio) connection variants
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────┐   ┌────────────────┐   ┌──────────────────┐
//! │ Command       │   │  Bulk Loader   │   │ Subscription     │
//! │ Builders      │   │  (bulk_add)    │   │ Loop (poll)      │
//! └───────┬───────┘   └───────┬────────┘   └────────┬─────────┘
//!         │                   │                     │
//!         └───────────────────┼─────────────────────┘
//!                             ▼
//!                   ┌──────────────────┐
//!                   │   Connection     │
//!                   │ (Client /        │
//!                   │  AsyncClient)    │
//!                   └────────┬─────────┘
//!                            ▼
//!                   ┌──────────────────┐
//!                   │   Wire Codec     │
//!                   │ (9-byte header + │
//!                   │  chunked body)   │
//!                   └──────────────────┘
//! ```
//!
//! Exactly one command is in flight per connection; responses are matched
//! to requests purely by arrival order on the byte stream.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod client;
pub mod protocol;
pub mod update;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::{AsyncClient, Client, Subscription};
pub use config::ClientConfig;
pub use error::{Result, TickError};
pub use protocol::{Command, GetFormat, Poll, ReqCount, Response};
pub use update::Update;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
