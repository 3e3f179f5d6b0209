//! The seam between the client and the network.
//!
//! A [`Connection`] moves whole RESP frames: `send` writes one encoded
//! request, `recv` yields one parsed reply. The client never pipelines on a
//! pooled connection, so each `send` is followed by the reply (or replies,
//! for pub/sub) before the connection goes back to its pool.

use std::future::Future;

use bytes::Bytes;
use resp_proto::Value;

use crate::Error;

/// A single connection to one node.
pub trait Connection: Send + 'static {
    /// Write one encoded request. Nothing is written if the returned future
    /// is dropped before it is first polled.
    fn send(&mut self, frame: Bytes) -> impl Future<Output = Result<(), Error>> + Send;

    /// Read the next complete reply.
    fn recv(&mut self) -> impl Future<Output = Result<Value, Error>> + Send;
}

/// Opens connections to nodes by address.
pub trait Connector: Send + Sync + 'static {
    type Conn: Connection;

    fn connect(&self, address: &str) -> impl Future<Output = Result<Self::Conn, Error>> + Send;
}
