//! Async Redis client for standalone servers and sharded clusters.
//!
//! Requests are built and encoded by [`resp_proto`]; this crate routes the
//! encoded buffer to the node that owns its keys and reads the reply back.
//!
//! - **Dispatch**: [`Client::execute`] encodes, routes by hash slot, checks a
//!   connection out of the node's pool for one round trip and returns it.
//! - **Reservations**: transactions, subscriptions and `MONITOR` hold one
//!   connection for their whole lifetime ([`session`]). Ending the session
//!   returns it; dropping the session mid-exchange closes it instead.
//! - **Topology**: [`Client::refresh_topology`] loads slot ownership with
//!   `CLUSTER SLOTS` from the seed nodes.
//!
//! All key and value parameters accept `impl AsRef<[u8]>`, so you can pass
//! `&str`, `String`, `&[u8]`, `Vec<u8>`, `Bytes`, etc.
//!
//! # Example
//!
//! ```no_run
//! use cluster_redis::{Client, ClientConfig};
//!
//! # async fn example() -> Result<(), cluster_redis::Error> {
//! let client = Client::connect(ClientConfig::cluster(["127.0.0.1:7000"])).await?;
//! client.set("hello", "world").await?;
//! let val = client.get("hello").await?;
//! assert_eq!(val.as_deref(), Some(&b"world"[..]));
//!
//! let mut tx = client.multi_on("counter").await?;
//! tx.queue(&resp_proto::Request::incr("counter")).await?;
//! let replies = tx.exec().await?;
//! # let _ = replies;
//! # Ok(())
//! # }
//! ```

pub mod client;
mod commands;
pub mod config;
pub mod metrics;
pub mod pool;
pub mod router;
pub mod session;
pub mod tcp;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use pool::{NodePool, PoolConfig, PoolStats, PooledConnection};
pub use router::Topology;
pub use session::{Message, Monitor, Subscription, Transaction, Watched};
pub use tcp::{TcpConnection, TcpConnector};
pub use transport::{Connection, Connector};

pub use resp_proto::{FromValue, Request, Value};

use std::io;

// ── Error ───────────────────────────────────────────────────────────────

/// Errors returned by the cluster client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The connection was closed before a response was received.
    #[error("connection closed")]
    ConnectionClosed,

    /// The server returned a Redis error response.
    #[error("redis error: {0}")]
    Redis(String),

    /// The response type did not match the expected type for the command.
    #[error("unexpected response")]
    UnexpectedResponse,

    /// RESP protocol parse error.
    #[error("protocol error: {0}")]
    Protocol(#[from] resp_proto::ParseError),

    /// The request was rejected before anything was sent.
    #[error("encode error: {0}")]
    Encode(#[from] resp_proto::EncodeError),

    /// The request's keys do not select a single node.
    #[error("routing error: {0}")]
    Route(#[from] resp_proto::RouteError),

    /// The reply could not be converted to the requested type.
    #[error("decode error: {0}")]
    Decode(#[from] resp_proto::DecodeError),

    /// I/O error during send or receive.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// No connection to the node became free in time.
    #[error("timed out waiting for a connection to {address}")]
    ReservationTimeout { address: String },

    /// A new connection to the node could not be opened.
    #[error("node {address} unreachable: {reason}")]
    Unreachable { address: String, reason: String },

    /// The node's pool was closed.
    #[error("connection pool closed")]
    PoolClosed,

    /// EXEC returned null because a watched key changed.
    #[error("transaction aborted by a watched key")]
    TransactionAborted,

    /// The session already gave its connection back.
    #[error("session already released")]
    SessionReleased,
}

impl Error {
    /// Whether the same request may succeed if retried later, possibly
    /// after a topology refresh. Nothing was executed by the server.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ReservationTimeout { .. }
                | Error::Unreachable { .. }
                | Error::Route(resp_proto::RouteError::Unroutable(_))
                | Error::Route(resp_proto::RouteError::NoNodes)
        )
    }
}

/// Turn an error reply into [`Error::Redis`].
pub(crate) fn check_reply(value: Value) -> Result<Value, Error> {
    match value.error_message() {
        Some(msg) => Err(Error::Redis(String::from_utf8_lossy(msg).into_owned())),
        None => Ok(value),
    }
}

/// The error for a reply of the wrong shape.
pub(crate) fn unexpected(value: Value) -> Error {
    match check_reply(value) {
        Err(e) => e,
        Ok(_) => Error::UnexpectedResponse,
    }
}
