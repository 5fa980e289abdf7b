//! Cooperative client
//!
//! Mirror of the blocking [`Client`](super::Client) over a tokio socket.
//! Socket reads and writes are the only suspension points, so many logical
//! clients (for example many subscriptions) can share a single thread
//! under the tokio scheduler. Framing is shared with the blocking variant
//! through the codec, so both produce identical wire behavior.

use bytes::Bytes;
use tokio::io::BufStream;
use tokio::net::TcpStream;

use crate::config::ClientConfig;
use crate::error::{Result, TickError};
use crate::protocol::{
    read_response_async, write_command_async, Command, GetFormat, Poll, ReqCount, Response,
};
use crate::update::Update;

use super::subscription::SubState;
use super::text_response;

/// Cooperative connection to a tickstore server.
///
/// Per-operation timeouts are not configured on the socket; wrap calls in
/// `tokio::time::timeout` where needed. Everything else matches the
/// blocking client: one command in flight at a time, FIFO response
/// matching, no mid-command cancellation (dropping a `cmd` future midway
/// invalidates the connection).
pub struct AsyncClient {
    /// Buffered duplex stream
    stream: BufStream<TcpStream>,

    /// Connection and framing configuration
    config: ClientConfig,

    /// Client-side subscription state
    state: SubState,

    /// Peer address for logging
    peer_addr: String,
}

impl AsyncClient {
    /// Connect with default configuration to `host:port`
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        Self::with_config(ClientConfig::builder().host(host).port(port).build()).await
    }

    /// Connect with a custom configuration
    pub async fn with_config(config: ClientConfig) -> Result<Self> {
        let addr = config.addr();
        let stream = match config.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, TcpStream::connect(&addr))
                .await
                .map_err(|_| {
                    TickError::Io(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("connect to {} timed out", addr),
                    ))
                })??,
            None => TcpStream::connect(&addr).await?,
        };

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| addr.clone());

        tracing::debug!("Connected to tickstore at {}", peer_addr);

        Ok(Self {
            stream: BufStream::new(stream),
            config,
            state: SubState::Unsubscribed,
            peer_addr,
        })
    }

    /// The request/response primitive; see [`Client::cmd`](super::Client::cmd)
    pub async fn cmd(&mut self, command: &str) -> Result<Response> {
        tracing::trace!(command, "sending command to {}", self.peer_addr);
        write_command_async(&mut self.stream, command).await?;
        let response = read_response_async(&mut self.stream, self.config.read_chunk_size).await?;
        tracing::trace!(
            success = response.success,
            body_len = response.body.len(),
            "response received"
        );
        Ok(response)
    }

    async fn request(&mut self, command: &Command) -> Result<Response> {
        self.cmd(&command.to_string()).await
    }

    // -------------------------------------------------------------------------
    // Typed operations
    // -------------------------------------------------------------------------

    /// Server build and store information
    pub async fn info(&mut self) -> Result<String> {
        let response = self.request(&Command::Info).await?;
        text_response(response)
    }

    /// Health check
    pub async fn ping(&mut self) -> Result<String> {
        let response = self.request(&Command::Ping).await?;
        text_response(response)
    }

    /// Server-side command help text
    pub async fn help(&mut self) -> Result<String> {
        let response = self.request(&Command::Help).await?;
        text_response(response)
    }

    /// Count of all records in the selected store
    pub async fn count_all(&mut self) -> Result<String> {
        let response = self.request(&Command::CountAll { in_mem: false }).await?;
        text_response(response)
    }

    /// Count of records currently held in memory
    pub async fn count_all_in_mem(&mut self) -> Result<String> {
        let response = self.request(&Command::CountAll { in_mem: true }).await?;
        text_response(response)
    }

    /// Insert one update into the currently selected store
    pub async fn add(&mut self, update: &Update) -> Result<String> {
        let response = self.request(&Command::Add(*update)).await?;
        text_response(response)
    }

    /// Insert one update into a named store
    pub async fn insert(&mut self, update: &Update, db: &str) -> Result<String> {
        let response = self
            .request(&Command::Insert {
                update: *update,
                db: db.to_string(),
            })
            .await?;
        text_response(response)
    }

    /// Fetch the most recent `n` records; `Ok(None)` on server rejection
    pub async fn get(&mut self, n: u64) -> Result<Option<Vec<Update>>> {
        self.get_json(ReqCount::Count(n), None).await
    }

    /// Fetch every stored record; `Ok(None)` on server rejection
    pub async fn get_all(&mut self) -> Result<Option<Vec<Update>>> {
        self.get_json(ReqCount::All, None).await
    }

    /// Fetch decoded updates, optionally bounded to `[t0, t1]` timestamps
    pub async fn get_json(
        &mut self,
        count: ReqCount,
        range: Option<(u64, u64)>,
    ) -> Result<Option<Vec<Update>>> {
        match self.get_raw(count, GetFormat::Json, range).await? {
            Some(body) => Ok(Some(serde_json::from_slice(&body)?)),
            None => Ok(None),
        }
    }

    /// Fetch records in the requested format without decoding the body
    pub async fn get_raw(
        &mut self,
        count: ReqCount,
        format: GetFormat,
        range: Option<(u64, u64)>,
    ) -> Result<Option<Bytes>> {
        let response = self
            .request(&Command::Get {
                count,
                format,
                range,
            })
            .await?;
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
    pub async fn clear(&mut self) -> Result<String> {
        let response = self.request(&Command::Clear { all: false }).await?;
        text_response(response)
    }

    /// Drop records in every store
    pub async fn clear_all(&mut self) -> Result<String> {
        let response = self.request(&Command::Clear { all: true }).await?;
        text_response(response)
    }

    /// Persist the selected store to disk
    pub async fn flush(&mut self) -> Result<String> {
        let response = self.request(&Command::Flush { all: false }).await?;
        text_response(response)
    }

    /// Persist every store to disk
    pub async fn flush_all(&mut self) -> Result<String> {
        let response = self.request(&Command::Flush { all: true }).await?;
        text_response(response)
    }

    /// Create a named store
    pub async fn create(&mut self, db: &str) -> Result<String> {
        let response = self.request(&Command::Create { db: db.to_string() }).await?;
        text_response(response)
    }

    /// Select a named store for subsequent commands
    pub async fn use_db(&mut self, db: &str) -> Result<String> {
        let response = self.request(&Command::Use { db: db.to_string() }).await?;
        text_response(response)
    }

    // -------------------------------------------------------------------------
    // Bulk loading
    // -------------------------------------------------------------------------

    /// Insert a batch through the BULKADD sub-protocol.
    ///
    /// Same contract as [`Client::bulk_add`](super::Client::bulk_add):
    /// exactly N+2 commands, N+2 drained responses, terminator always sent
    /// after the opener succeeds at the transport level, first server
    /// rejection surfaced at the end.
    pub async fn bulk_add(&mut self, updates: &[Update]) -> Result<()> {
        tracing::debug!("bulk adding {} updates", updates.len());

        let mut first_rejection = None;
        let mut note = |response: Response| {
            if !response.success && first_rejection.is_none() {
                first_rejection = Some(TickError::Server(
                    String::from_utf8_lossy(&response.body).into_owned(),
                ));
            }
        };

        let response = self.request(&Command::BulkAdd).await?;
        note(response);
        for update in updates {
            let response = self.request(&Command::BulkLine(*update)).await?;
            note(response);
        }
        let response = self.request(&Command::BulkEnd).await?;
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
    pub async fn subscribe(&mut self, db: &str) -> Result<()> {
        self.state.ensure_unsubscribed()?;
        let response = self
            .request(&Command::Subscribe { db: db.to_string() })
            .await?;
        if !response.success {
            return Err(TickError::Server(
                String::from_utf8_lossy(&response.body).into_owned(),
            ));
        }
        tracing::debug!("subscribed to {}", db);
        self.state = SubState::Subscribed(db.to_string());
        Ok(())
    }

    /// Request the next queued record with the empty poll command
    pub async fn poll(&mut self) -> Result<Poll> {
        self.state.ensure_subscribed()?;
        let response = self.request(&Command::Poll).await?;
        if !response.success {
            return Err(TickError::Server(
                String::from_utf8_lossy(&response.body).into_owned(),
            ));
        }
        Ok(response.into_poll())
    }

    /// Stop streaming; state transitions to Unsubscribed either way
    pub async fn unsubscribe(&mut self) -> Result<()> {
        self.state.ensure_subscribed()?;
        let response = self.request(&Command::Unsubscribe).await?;
        self.state = SubState::Unsubscribed;
        tracing::debug!("unsubscribed");
        if !response.success {
            return Err(TickError::Server(
                String::from_utf8_lossy(&response.body).into_owned(),
            ));
        }
        Ok(())
    }

    /// Await the next record, polling with the configured backoff between
    /// empty polls. Records arrive in server order; nothing is buffered
    /// beyond the most recent body.
    pub async fn next_record(&mut self) -> Result<Update> {
        loop {
            match self.poll().await? {
                Poll::Empty => tokio::time::sleep(self.config.poll_backoff).await,
                Poll::Record(body) => return serde_json::from_slice(&body).map_err(TickError::from),
            }
        }
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

    /// Close the socket explicitly
    pub async fn shutdown(mut self) -> Result<()> {
        use tokio::io::AsyncWriteExt;
        self.stream.shutdown().await?;
        Ok(())
    }
}
