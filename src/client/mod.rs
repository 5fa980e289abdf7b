//! Client Module
//!
//! Two connection variants over the same framing logic:
//! - [`Client`] — blocking; each socket operation runs to completion on the
//!   calling thread. One connection per worker.
//! - [`AsyncClient`] — cooperative; socket reads and writes are the only
//!   suspension points, so many connections can share one thread under an
//!   event-driven scheduler.
//!
//! Both are strictly sequential per connection: exactly one command is in
//! flight at a time and responses are matched to requests by arrival order.

mod blocking;
mod nonblocking;
mod subscription;

pub use blocking::Client;
pub use nonblocking::AsyncClient;
pub use subscription::Subscription;

use crate::error::{Result, TickError};
use crate::protocol::Response;

/// Map a plain-text response: success yields the body, failure yields the
/// diagnostic as a `Server` error (never parsed as JSON).
pub(crate) fn text_response(response: Response) -> Result<String> {
    if response.success {
        Ok(response.body_str()?.to_string())
    } else {
        Err(TickError::Server(
            String::from_utf8_lossy(&response.body).into_owned(),
        ))
    }
}
