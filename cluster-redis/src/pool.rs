//! Per-node connection pool with exclusive checkout.
//!
//! Every exchange, one-shot or session, takes a connection out of the pool
//! for its whole duration, so a checked-out connection is never visible to
//! anything else. The guard returned by [`NodePool::checkout`] puts the
//! connection back when dropped, unless it was left mid-exchange or in a
//! session state (MULTI, subscribed, monitoring), in which case it is closed
//! and the pool opens a fresh one on demand.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cluster_redis::pool::{NodePool, PoolConfig};
//! use cluster_redis::tcp::TcpConnector;
//!
//! # async fn example() -> Result<(), cluster_redis::Error> {
//! let pool = NodePool::new(
//!     "127.0.0.1:6379",
//!     Arc::new(TcpConnector::default()),
//!     PoolConfig::default(),
//! );
//! let mut conn = pool.checkout().await?;
//! let reply = conn
//!     .round_trip(resp_proto::Request::ping().encode()?.into_parts().0)
//!     .await?;
//! # let _ = reply;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use resp_proto::Value;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use crate::config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_POOL_SIZE, DEFAULT_RESERVE_TIMEOUT};
use crate::metrics;
use crate::transport::{Connection, Connector};
use crate::Error;

// ── PoolConfig ──────────────────────────────────────────────────────────

/// Configuration for a [`NodePool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections, idle plus checked out.
    pub size: usize,
    /// How long `checkout` waits for a free connection.
    pub reserve_timeout: Duration,
    /// How long opening a new connection may take.
    pub connect_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_POOL_SIZE,
            reserve_timeout: DEFAULT_RESERVE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Point-in-time counters for one pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Connections waiting in the pool.
    pub idle: usize,
    /// Connections opened over the pool's lifetime.
    pub created: u64,
    /// Checkouts that ended with the connection back in the pool.
    pub released: u64,
    /// Checkouts that ended with the connection closed.
    pub discarded: u64,
}

// ── NodePool ────────────────────────────────────────────────────────────

struct Shared<T> {
    idle: Mutex<Vec<T>>,
    permits: Arc<Semaphore>,
    created: AtomicU64,
    released: AtomicU64,
    discarded: AtomicU64,
}

impl<T> Shared<T> {
    fn pop_idle(&self) -> Option<T> {
        self.idle.lock().unwrap_or_else(|e| e.into_inner()).pop()
    }

    fn push_idle(&self, conn: T) {
        if self.permits.is_closed() {
            return;
        }
        self.idle.lock().unwrap_or_else(|e| e.into_inner()).push(conn);
    }
}

/// Bounded pool of connections to a single node.
pub struct NodePool<C: Connector> {
    address: Arc<str>,
    connector: Arc<C>,
    config: PoolConfig,
    shared: Arc<Shared<C::Conn>>,
}

impl<C: Connector> NodePool<C> {
    pub fn new(address: impl Into<String>, connector: Arc<C>, config: PoolConfig) -> Self {
        let size = config.size.max(1);
        Self {
            address: Arc::from(address.into()),
            connector,
            config,
            shared: Arc::new(Shared {
                idle: Mutex::new(Vec::with_capacity(size)),
                permits: Arc::new(Semaphore::new(size)),
                created: AtomicU64::new(0),
                released: AtomicU64::new(0),
                discarded: AtomicU64::new(0),
            }),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Take exclusive use of a connection, opening one if none is idle.
    ///
    /// Waits at most `reserve_timeout` for a free slot. If the future is
    /// dropped while waiting, nothing is taken.
    pub async fn checkout(&self) -> Result<PooledConnection<C::Conn>, Error> {
        let acquire = self.shared.permits.clone().acquire_owned();
        let permit = match tokio::time::timeout(self.config.reserve_timeout, acquire).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(Error::PoolClosed),
            Err(_) => {
                return Err(Error::ReservationTimeout {
                    address: self.address.to_string(),
                });
            }
        };

        let conn = match self.shared.pop_idle() {
            Some(conn) => conn,
            None => self.connect().await?,
        };

        metrics::CONNECTIONS_CHECKED_OUT.increment();
        Ok(PooledConnection {
            conn: Some(conn),
            shared: self.shared.clone(),
            address: self.address.clone(),
            in_flight: false,
            dirty: false,
            reserved: false,
            _permit: permit,
        })
    }

    async fn connect(&self) -> Result<C::Conn, Error> {
        let connect = self.connector.connect(&self.address);
        match tokio::time::timeout(self.config.connect_timeout, connect).await {
            Ok(Ok(conn)) => {
                self.shared.created.fetch_add(1, Ordering::Relaxed);
                metrics::CONNECTIONS_CREATED.increment();
                debug!(node = %self.address, "opened connection");
                Ok(conn)
            }
            Ok(Err(e)) => Err(Error::Unreachable {
                address: self.address.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(Error::Unreachable {
                address: self.address.to_string(),
                reason: "connect timed out".to_string(),
            }),
        }
    }

    /// Stop handing out connections. Waiters and later checkouts fail with
    /// [`Error::PoolClosed`]; connections already out are closed when their
    /// guards drop.
    pub fn close(&self) {
        self.shared.permits.close();
        self.shared
            .idle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.permits.is_closed()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            idle: self.shared.idle.lock().unwrap_or_else(|e| e.into_inner()).len(),
            created: self.shared.created.load(Ordering::Relaxed),
            released: self.shared.released.load(Ordering::Relaxed),
            discarded: self.shared.discarded.load(Ordering::Relaxed),
        }
    }
}

// ── PooledConnection ────────────────────────────────────────────────────

/// Exclusive use of one pooled connection.
///
/// Dropping the guard is the release. A connection goes back to the pool
/// only if no exchange is in flight and no session state is left on it.
pub struct PooledConnection<T: Connection> {
    conn: Option<T>,
    shared: Arc<Shared<T>>,
    address: Arc<str>,
    /// A request was written and its reply not yet read.
    in_flight: bool,
    /// The server holds per-connection state for a session.
    dirty: bool,
    /// Counted as a reservation in metrics.
    reserved: bool,
    // Dropped after `drop` below has returned the connection.
    _permit: OwnedSemaphorePermit,
}

impl<T: Connection> fmt::Debug for PooledConnection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("address", &self.address)
            .field("in_flight", &self.in_flight)
            .field("dirty", &self.dirty)
            .field("reserved", &self.reserved)
            .finish_non_exhaustive()
    }
}

impl<T: Connection> PooledConnection<T> {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Write one request.
    pub async fn send(&mut self, frame: Bytes) -> Result<(), Error> {
        self.in_flight = true;
        let conn = self.conn.as_mut().ok_or(Error::ConnectionClosed)?;
        conn.send(frame).await
    }

    /// Read one reply.
    pub async fn recv(&mut self) -> Result<Value, Error> {
        let conn = self.conn.as_mut().ok_or(Error::ConnectionClosed)?;
        let value = conn.recv().await?;
        self.in_flight = false;
        Ok(value)
    }

    /// Write one request and read its reply.
    pub async fn round_trip(&mut self, frame: Bytes) -> Result<Value, Error> {
        self.send(frame).await?;
        self.recv().await
    }

    /// Mark the connection as a session. It will not be reused unless the
    /// session ends cleanly with [`end_session`](Self::end_session).
    pub(crate) fn begin_session(&mut self) {
        self.dirty = true;
        if !self.reserved {
            self.reserved = true;
            metrics::RESERVATIONS_ACQUIRED.increment();
            metrics::RESERVATIONS_ACTIVE.increment();
            debug!(node = %self.address, "reserved connection");
        }
    }

    /// The server no longer holds session state for this connection.
    pub(crate) fn end_session(&mut self) {
        self.dirty = false;
    }

    /// Whether dropping now would return the connection to the pool.
    pub fn is_reusable(&self) -> bool {
        self.conn.is_some() && !self.in_flight && !self.dirty
    }
}

impl<T: Connection> Drop for PooledConnection<T> {
    fn drop(&mut self) {
        metrics::CONNECTIONS_CHECKED_OUT.decrement();
        if self.reserved {
            metrics::RESERVATIONS_ACTIVE.decrement();
            debug!(node = %self.address, "released reservation");
        }

        let Some(conn) = self.conn.take() else {
            return;
        };
        if self.in_flight || self.dirty {
            self.shared.discarded.fetch_add(1, Ordering::Relaxed);
            metrics::CONNECTIONS_DISCARDED.increment();
            warn!(
                node = %self.address,
                in_flight = self.in_flight,
                session = self.dirty,
                "discarding connection"
            );
            drop(conn);
        } else {
            self.shared.released.fetch_add(1, Ordering::Relaxed);
            metrics::CONNECTIONS_RELEASED.increment();
            self.shared.push_idle(conn);
        }
    }
}
