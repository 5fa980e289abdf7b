//! Subscription state machine and streaming iterator
//!
//! Tracks the client-side Unsubscribed/Subscribed state explicitly so a
//! poll issued without a prior SUBSCRIBE is rejected as a usage error
//! instead of producing undefined wire behavior.

use crate::error::{Result, TickError};
use crate::protocol::Poll;
use crate::update::Update;

use super::blocking::Client;

/// Client-side subscription state
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SubState {
    /// No subscription active on this connection
    Unsubscribed,

    /// SUBSCRIBE succeeded for the named store
    Subscribed(String),
}

impl SubState {
    /// Check that polling is allowed in this state
    pub(crate) fn ensure_subscribed(&self) -> Result<()> {
        match self {
            SubState::Subscribed(_) => Ok(()),
            SubState::Unsubscribed => Err(TickError::NotSubscribed),
        }
    }

    /// Check that a new subscription may start in this state
    pub(crate) fn ensure_unsubscribed(&self) -> Result<()> {
        match self {
            SubState::Unsubscribed => Ok(()),
            SubState::Subscribed(db) => Err(TickError::AlreadySubscribed(db.clone())),
        }
    }
}

/// Lazily produced, logically infinite stream of subscribed records.
///
/// Each `next` call polls the connection; on an empty poll it sleeps the
/// configured backoff before polling again, so two consecutive empty polls
/// are never issued closer together than the backoff. Records are yielded
/// in the exact order the server returns them; nothing is buffered beyond
/// the most recent body.
///
/// The iterator ends only when the connection is no longer subscribed.
/// Restart by re-subscribing.
pub struct Subscription<'a> {
    client: &'a mut Client,
}

impl<'a> Subscription<'a> {
    pub(crate) fn new(client: &'a mut Client) -> Self {
        Self { client }
    }
}

impl Iterator for Subscription<'_> {
    type Item = Result<Update>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if !self.client.is_subscribed() {
                return None;
            }
            match self.client.poll() {
                Ok(Poll::Empty) => std::thread::sleep(self.client.config().poll_backoff),
                Ok(Poll::Record(body)) => {
                    return Some(serde_json::from_slice(&body).map_err(TickError::from))
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
