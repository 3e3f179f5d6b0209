use std::sync::Arc;

use resp_proto::{Request, Value};
use tracing::debug;

use super::{expect_ok, frame, pin_slot};
use crate::pool::PooledConnection;
use crate::router::Topology;
use crate::transport::Connection;
use crate::{Error, check_reply, unexpected};

// ── Transaction ─────────────────────────────────────────────────────────

/// A MULTI block on a reserved connection.
///
/// Commands are queued in the order [`queue`](Self::queue) is called. The
/// connection is released once EXEC's or DISCARD's reply has been read.
///
/// The first keyed command pins the transaction's slot. It is checked
/// against the topology the connection was reserved under, so a slot owned
/// by another node fails with `RouteError::WrongNode` before anything is
/// sent.
pub struct Transaction<T: Connection> {
    conn: PooledConnection<T>,
    topology: Arc<Topology>,
    slot: Option<u16>,
    queued: usize,
}

impl<T: Connection> Transaction<T> {
    pub(crate) async fn begin(
        mut conn: PooledConnection<T>,
        topology: Arc<Topology>,
        slot: Option<u16>,
    ) -> Result<Self, Error> {
        conn.begin_session();
        let reply = conn.round_trip(frame(&Request::multi())?).await?;
        expect_ok(reply)?;
        debug!(node = %conn.address(), ?slot, "transaction started");
        Ok(Self {
            conn,
            topology,
            slot,
            queued: 0,
        })
    }

    /// Queue one command. Keyed commands must all hash to the same slot.
    ///
    /// A command the server refuses to queue returns [`Error::Redis`]; the
    /// server will then fail EXEC with `EXECABORT`.
    pub async fn queue(&mut self, request: &Request<'_>) -> Result<(), Error> {
        let encoded = request.encode()?;
        pin_slot(
            &mut self.slot,
            encoded.partition(),
            &self.topology,
            self.conn.address(),
        )?;
        let reply = self.conn.round_trip(encoded.into_parts().0).await?;
        match reply {
            Value::SimpleString(ref s) if &s[..] == b"QUEUED" => {
                self.queued += 1;
                Ok(())
            }
            other => Err(unexpected(other)),
        }
    }

    /// Run the queued commands. Returns one reply per command, in queue
    /// order; individual command failures are `Value::Error` entries.
    pub async fn exec(mut self) -> Result<Vec<Value>, Error> {
        let reply = self.conn.round_trip(frame(&Request::exec())?).await?;
        // The server leaves MULTI state whatever EXEC returns.
        self.conn.end_session();
        debug!(node = %self.conn.address(), queued = self.queued, "transaction executed");
        drop(self.conn);

        match check_reply(reply)? {
            Value::Array(replies) => Ok(replies),
            Value::Null => Err(Error::TransactionAborted),
            other => Err(unexpected(other)),
        }
    }

    /// Abandon the queued commands.
    pub async fn discard(mut self) -> Result<(), Error> {
        let reply = self.conn.round_trip(frame(&Request::discard())?).await?;
        expect_ok(reply)?;
        self.conn.end_session();
        Ok(())
    }

    /// Number of commands queued so far.
    pub fn len(&self) -> usize {
        self.queued
    }

    pub fn is_empty(&self) -> bool {
        self.queued == 0
    }

    /// The slot every keyed command is pinned to, once known.
    pub fn slot(&self) -> Option<u16> {
        self.slot
    }

    pub fn address(&self) -> &str {
        self.conn.address()
    }
}

// ── Watched ─────────────────────────────────────────────────────────────

/// Keys under WATCH on a reserved connection, before MULTI.
///
/// Reads issued through [`execute`](Self::execute) see the watched values;
/// [`multi`](Self::multi) opens the transaction that EXEC will abort if any
/// of them changed.
pub struct Watched<T: Connection> {
    conn: PooledConnection<T>,
    topology: Arc<Topology>,
    slot: Option<u16>,
}

impl<T: Connection> Watched<T> {
    pub(crate) async fn begin(
        mut conn: PooledConnection<T>,
        topology: Arc<Topology>,
        watch: &Request<'_>,
    ) -> Result<Self, Error> {
        let encoded = watch.encode()?;
        let mut slot = None;
        pin_slot(&mut slot, encoded.partition(), &topology, conn.address())?;

        conn.begin_session();
        let reply = conn.round_trip(encoded.into_parts().0).await?;
        expect_ok(reply)?;
        Ok(Self {
            conn,
            topology,
            slot,
        })
    }

    /// Run a command on the watching connection.
    pub async fn execute(&mut self, request: &Request<'_>) -> Result<Value, Error> {
        let encoded = request.encode()?;
        pin_slot(
            &mut self.slot,
            encoded.partition(),
            &self.topology,
            self.conn.address(),
        )?;
        let reply = self.conn.round_trip(encoded.into_parts().0).await?;
        check_reply(reply)
    }

    /// Start the transaction guarded by the watched keys.
    pub async fn multi(self) -> Result<Transaction<T>, Error> {
        Transaction::begin(self.conn, self.topology, self.slot).await
    }

    /// Stop watching and release the connection.
    pub async fn unwatch(mut self) -> Result<(), Error> {
        let reply = self.conn.round_trip(frame(&Request::unwatch())?).await?;
        expect_ok(reply)?;
        self.conn.end_session();
        Ok(())
    }
}
