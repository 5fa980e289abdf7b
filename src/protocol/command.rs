//! Command definitions
//!
//! Pure formatting of each logical operation into its protocol string.
//! No I/O happens here; booleans render as `t`/`f`, database names are
//! inserted verbatim (callers must avoid `,`, `;` and newlines in them).

use std::fmt;

use crate::update::Update;

/// How many records a GET or similar command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReqCount {
    /// Every stored record
    All,

    /// The most recent `n` records
    Count(u64),
}

/// Body format requested from GET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetFormat {
    Json,
    Csv,
}

impl fmt::Display for GetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GetFormat::Json => f.write_str("JSON"),
            GetFormat::Csv => f.write_str("CSV"),
        }
    }
}

/// A command to send to the server
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Server build and store information
    Info,

    /// Health check
    Ping,

    /// Server-side command help text
    Help,

    /// Count records; `in_mem` restricts to the in-memory buffer
    CountAll { in_mem: bool },

    /// Insert one update into the currently selected store
    Add(Update),

    /// Insert one update into a named store
    Insert { update: Update, db: String },

    /// Open a batch-insert sequence
    BulkAdd,

    /// One bare update line inside a BULKADD batch (no verb prefix)
    BulkLine(Update),

    /// Close a batch-insert sequence
    BulkEnd,

    /// Fetch records, optionally restricted to a timestamp range
    Get {
        count: ReqCount,
        format: GetFormat,
        range: Option<(u64, u64)>,
    },

    /// Drop records in the selected store (`all` drops every store)
    Clear { all: bool },

    /// Persist the selected store to disk (`all` flushes every store)
    Flush { all: bool },

    /// Create a named store
    Create { db: String },

    /// Select a named store for subsequent commands
    Use { db: String },

    /// Start streaming a named store on this connection
    Subscribe { db: String },

    /// Stop streaming
    Unsubscribe,

    /// The empty command: request the next queued record of a subscription
    Poll,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Info => f.write_str("INFO"),
            Command::Ping => f.write_str("PING"),
            Command::Help => f.write_str("HELP"),
            Command::CountAll { in_mem: false } => f.write_str("COUNT ALL"),
            Command::CountAll { in_mem: true } => f.write_str("COUNT ALL IN MEM"),
            Command::Add(update) => write!(f, "ADD {}", update.to_line()),
            Command::Insert { update, db } => {
                write!(f, "INSERT {} INTO {}", update.to_line(), db)
            }
            Command::BulkAdd => f.write_str("BULKADD"),
            Command::BulkLine(update) => f.write_str(&update.to_line()),
            Command::BulkEnd => f.write_str("DDAKLUB"),
            Command::Get {
                count,
                format,
                range,
            } => {
                match count {
                    ReqCount::All => write!(f, "GET ALL AS {}", format)?,
                    ReqCount::Count(n) => write!(f, "GET {} AS {}", n, format)?,
                }
                if let Some((t0, t1)) = range {
                    write!(f, " FROM {} TO {}", t0, t1)?;
                }
                Ok(())
            }
            Command::Clear { all: false } => f.write_str("CLEAR"),
            Command::Clear { all: true } => f.write_str("CLEAR ALL"),
            Command::Flush { all: false } => f.write_str("FLUSH"),
            Command::Flush { all: true } => f.write_str("FLUSH ALL"),
            Command::Create { db } => write!(f, "CREATE {}", db),
            Command::Use { db } => write!(f, "USE {}", db),
            Command::Subscribe { db } => write!(f, "SUBSCRIBE {}", db),
            Command::Unsubscribe => f.write_str("UNSUBSCRIBE"),
            Command::Poll => Ok(()),
        }
    }
}
