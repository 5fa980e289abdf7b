//! Blocking client
//!
//! Owns one TCP connection to the server and sequences request/response
//! round trips over it. Every operation is a thin formatter over the
//! single `cmd` primitive.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::Bytes;

use crate::config::ClientConfig;
use crate::error::{Result, TickError};
use crate::protocol::{read_response, write_command, Command, GetFormat, Poll, ReqCount, Response};
use crate::update::Update;

use super::subscription::{SubState, Subscription};
use super::text_response;

/// Blocking connection to a tickstore server.
///
/// The socket is exclusively owned by this client; a new command must not
/// be issued until the prior response has been fully consumed, which the
/// `&mut self` receiver on [`Client::cmd`] enforces. There is no
/// mid-command cancellation: dropping the client mid-read invalidates the
/// connection.
pub struct Client {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Connection and framing configuration
    config: ClientConfig,

    /// Client-side subscription state
    state: SubState,

    /// Peer address for logging
    peer_addr: String,
}

impl Client {
    /// Connect with default configuration to `host:port`
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        Self::with_config(ClientConfig::builder().host(host).port(port).build())
    }

    /// Connect with a custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let addr = config.addr();
        let stream = match config.connect_timeout {
            Some(timeout) => {
                let mut last_err = None;
                let mut connected = None;
                for candidate in addr.to_socket_addrs()? {
                    match TcpStream::connect_timeout(&candidate, timeout) {
                        Ok(stream) => {
                            connected = Some(stream);
                            break;
                        }
                        Err(e) => last_err = Some(e),
                    }
                }
                match connected {
                    Some(stream) => stream,
                    None => {
                        return Err(match last_err {
                            Some(e) => TickError::Io(e),
                            None => {
                                TickError::Protocol(format!("no addresses resolved for {}", addr))
                            }
                        })
                    }
                }
            }
            None => TcpStream::connect(&addr)?,
        };

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        if let Some(timeout) = config.read_timeout {
            stream.set_read_timeout(Some(timeout))?;
        }
        if let Some(timeout) = config.write_timeout {
            stream.set_write_timeout(Some(timeout))?;
        }

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| addr.clone());

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connected to tickstore at {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            config,
            state: SubState::Unsubscribed,
            peer_addr,
        })
    }

    /// The request/response primitive.
    ///
    /// Sends one encoded command line, then reads exactly one framed
    /// response (header, then body). Strictly sequential per connection.
    pub fn cmd(&mut self, command: &str) -> Result<Response> {
        tracing::trace!(command, "sending command to {}", self.peer_addr);
        write_command(&mut self.writer, command)?;
        let response = read_response(&mut self.reader, self.config.read_chunk_size)?;
        tracing::trace!(
            success = response.success,
            body_len = response.body.len(),
            "response received"
        );
        Ok(response)
    }

    fn request(&mut self, command: &Command) -> Result<Response> {
        self.cmd(&command.to_string())
    }

    // -------------------------------------------------------------------------
    // Typed operations
    // -------------------------------------------------------------------------

    /// Server build and store information
    pub fn info(&mut self) -> Result<String> {
        let response = self.request(&Command::Info)?;
        text_response(response)
    }

    /// Health check
    pub fn ping(&mut self) -> Result<String> {
        let response = self.request(&Command::Ping)?;
        text_response(response)
    }

    /// Server-side command help text
    pub fn help(&mut self) -> Result<String> {
        let response = self.request(&Command::Help)?;
        text_response(response)
    }

    /// Count of all records in the selected store
    pub fn count_all(&mut self) -> Result<String> {
        let response = self.request(&Command::CountAll { in_mem: false })?;
        text_response(response)
    }

    /// Count of records currently held in memory
    pub fn count_all_in_mem(&mut self) -> Result<String> {
        let response = self.request(&Command::CountAll { in_mem: true })?;
        text_response(response)
    }

    /// Insert one update into the currently selected store
    pub fn add(&mut self, update: &Update) -> Result<String> {
        let response = self.request(&Command::Add(*update))?;
        text_response(response)
    }

    /// Insert one update into a named store
    pub fn insert(&mut self, update: &Update, db: &str) -> Result<String> {
        let response = self.request(&Command::Insert {
            update: *update,
            db: db.to_string(),
        })?;
        text_response(response)
    }

    /// Fetch the most recent `n` records as decoded updates.
    ///
    /// Returns `Ok(None)` when the server rejects the request (for example
    /// an unknown store); the diagnostic body is not parsed as JSON.
    pub fn get(&mut self, n: u64) -> Result<Option<Vec<Update>>> {
        self.get_json(ReqCount::Count(n), None)
    }

    /// Fetch every stored record as decoded updates
    pub fn get_all(&mut self) -> Result<Option<Vec<Update>>> {
        self.get_json(ReqCount::All, None)
    }

    /// Fetch decoded updates, optionally bounded to `[t0, t1]` timestamps
    pub fn get_json(
        &mut self,
        count: ReqCount,
        range: Option<(u64, u64)>,
    ) -> Result<Option<Vec<Update>>> {
        match self.get_raw(count, GetFormat::Json, range)? {
            Some(body) => Ok(Some(serde_json::from_slice(&body)?)),
            None => Ok(None),
        }
    }

    /// Fetch records in the requested format without decoding the body.
    ///
    /// Returns `Ok(None)` on a server rejection.
    pub fn get_raw(
        &mut self,
        count: ReqCount,
        format: GetFormat,
        range: Option<(u64, u64)>,
    ) -> Result<Option<Bytes>> {
        let response = self.request(&Command::Get {
            count,
            format,
            range,
        })?;
        if response.success {
            Ok(Some(response.body))
        } else {
            tracing::debug!(
                "GET rejected by server: {}",
                String::from_utf8_lossy(&response.body)
            );
            Ok(None)
        }
    }

    /// Drop records in the selected store
    pub fn clear(&mut self) -> Result<String> {
        let response = self.request(&Command::Clear { all: false })?;
        text_response(response)
    }

    /// Drop records in every store
    pub fn clear_all(&mut self) -> Result<String> {
        let response = self.request(&Command::Clear { all: true })?;
        text_response(response)
    }

    /// Persist the selected store to disk
    pub fn flush(&mut self) -> Result<String> {
        let response = self.request(&Command::Flush { all: false })?;
        text_response(response)
    }

    /// Persist every store to disk
    pub fn flush_all(&mut self) -> Result<String> {
        let response = self.request(&Command::Flush { all: true })?;
        text_response(response)
    }

    /// Create a named store
    pub fn create(&mut self, db: &str) -> Result<String> {
        let response = self.request(&Command::Create { db: db.to_string() })?;
        text_response(response)
    }

    /// Select a named store for subsequent commands
    pub fn use_db(&mut self, db: &str) -> Result<String> {
        let response = self.request(&Command::Use { db: db.to_string() })?;
        text_response(response)
    }

    // -------------------------------------------------------------------------
    // Bulk loading
    // -------------------------------------------------------------------------

    /// Insert a batch of updates through the BULKADD sub-protocol.
    ///
    /// Sends `BULKADD`, one bare line per update, then the `DDAKLUB`
    /// terminator: exactly N+2 commands, draining N+2 responses in that
    /// fixed order. Skipping any response would desynchronize framing for
    /// every subsequent command on this connection.
    ///
    /// A transport or framing error aborts immediately (the connection is
    /// unusable). A per-line server rejection is remembered, the remaining
    /// lines and the terminator are still sent so the connection leaves
    /// batch mode, and the first rejection is then surfaced.
    pub fn bulk_add(&mut self, updates: &[Update]) -> Result<()> {
        tracing::debug!("bulk adding {} updates", updates.len());

        let mut first_rejection = None;
        let mut note = |response: Response| {
            if !response.success && first_rejection.is_none() {
                first_rejection = Some(TickError::Server(
                    String::from_utf8_lossy(&response.body).into_owned(),
                ));
            }
        };

        let response = self.request(&Command::BulkAdd)?;
        note(response);
        for update in updates {
            let response = self.request(&Command::BulkLine(*update))?;
            note(response);
        }
        let response = self.request(&Command::BulkEnd)?;
        note(response);

        match first_rejection {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // Subscription
    // -------------------------------------------------------------------------

    /// Start streaming the named store on this connection
    pub fn subscribe(&mut self, db: &str) -> Result<()> {
        self.state.ensure_unsubscribed()?;
        let response = self.request(&Command::Subscribe { db: db.to_string() })?;
        if !response.success {
            return Err(TickError::Server(
                String::from_utf8_lossy(&response.body).into_owned(),
            ));
        }
        tracing::debug!("subscribed to {}", db);
        self.state = SubState::Subscribed(db.to_string());
        Ok(())
    }

    /// Request the next queued record with the empty poll command.
    ///
    /// Polling without a prior [`subscribe`](Client::subscribe) is a usage
    /// error.
    pub fn poll(&mut self) -> Result<Poll> {
        self.state.ensure_subscribed()?;
        let response = self.request(&Command::Poll)?;
        if !response.success {
            return Err(TickError::Server(
                String::from_utf8_lossy(&response.body).into_owned(),
            ));
        }
        Ok(response.into_poll())
    }

    /// Stop streaming and return the connection to command mode.
    ///
    /// The client-side state transitions to Unsubscribed even when the
    /// server rejects the command, terminating any poll loop either way.
    pub fn unsubscribe(&mut self) -> Result<()> {
        self.state.ensure_subscribed()?;
        let response = self.request(&Command::Unsubscribe)?;
        self.state = SubState::Unsubscribed;
        tracing::debug!("unsubscribed");
        if !response.success {
            return Err(TickError::Server(
                String::from_utf8_lossy(&response.body).into_owned(),
            ));
        }
        Ok(())
    }

    /// Iterator over subscribed records, polling with the configured
    /// backoff between empty polls
    pub fn updates(&mut self) -> Subscription<'_> {
        Subscription::new(self)
    }

    /// True while a subscription is active on this connection
    pub fn is_subscribed(&self) -> bool {
        matches!(self.state, SubState::Subscribed(_))
    }

    // -------------------------------------------------------------------------
    // Accessors and lifecycle
    // -------------------------------------------------------------------------

    /// Connection and framing configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Close the socket explicitly. Any in-flight state is abandoned; the
    /// client cannot be used afterwards.
    pub fn shutdown(self) -> Result<()> {
        self.writer
            .get_ref()
            .shutdown(std::net::Shutdown::Both)?;
        Ok(())
    }
}
