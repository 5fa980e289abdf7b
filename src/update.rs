//! Tick update type
//!
//! The immutable value inserted into and streamed out of the server.

use std::fmt;

use serde::Deserialize;

/// A single tick: one trade or one order-book level change.
///
/// Created by the caller, serialized into a command line, never mutated
/// after construction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "WireUpdate")]
pub struct Update {
    /// Event timestamp in milliseconds
    pub ts: u64,

    /// Sequence number within the timestamp
    pub seq: u32,

    /// True for a trade, false for an order-book level update
    pub is_trade: bool,

    /// True for the bid side, false for the ask side
    pub is_bid: bool,

    /// Price level
    pub price: f32,

    /// Size at the level (or trade size)
    pub size: f32,
}

impl Update {
    /// Render the comma-separated protocol line (without any verb).
    ///
    /// Booleans render as `t`/`f`. Field spacing matches what the server
    /// parser accepts, including the historical `t ,f` placement.
    /// Floats keep a decimal point (`2.0`, not `2`).
    pub fn to_line(&self) -> String {
        format!(
            "{}, {}, {} ,{}, {:?}, {:?};",
            self.ts,
            self.seq,
            flag(self.is_trade),
            flag(self.is_bid),
            self.price,
            self.size
        )
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

fn flag(b: bool) -> &'static str {
    if b {
        "t"
    } else {
        "f"
    }
}

/// JSON shape the server emits: `ts` is fractional seconds, not
/// milliseconds. Converted back to integer milliseconds on decode.
#[derive(Deserialize)]
struct WireUpdate {
    ts: f64,
    seq: u32,
    is_trade: bool,
    is_bid: bool,
    price: f32,
    size: f32,
}

impl From<WireUpdate> for Update {
    fn from(wire: WireUpdate) -> Self {
        Update {
            ts: (wire.ts * 1000.0).round() as u64,
            seq: wire.seq,
            is_trade: wire.is_trade,
            is_bid: wire.is_bid,
            price: wire.price,
            size: wire.size,
        }
    }
}
