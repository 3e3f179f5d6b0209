use bytes::Bytes;
use resp_proto::{Request, Value};
use tracing::debug;

use super::{expect_ok, frame};
use crate::pool::PooledConnection;
use crate::transport::Connection;
use crate::{Error, unexpected};

/// A connection in MONITOR mode, streaming every command the node runs.
pub struct Monitor<T: Connection> {
    conn: PooledConnection<T>,
}

impl<T: Connection> Monitor<T> {
    pub(crate) async fn start(mut conn: PooledConnection<T>) -> Result<Self, Error> {
        conn.begin_session();
        let reply = conn.round_trip(frame(&Request::monitor())?).await?;
        expect_ok(reply)?;
        debug!(node = %conn.address(), "monitor started");
        Ok(Self { conn })
    }

    /// The next monitor line, e.g.
    /// `1700000000.123456 [0 127.0.0.1:50000] "GET" "key"`.
    pub async fn next_line(&mut self) -> Result<Bytes, Error> {
        match self.conn.recv().await? {
            Value::SimpleString(line) => Ok(line),
            other => Err(unexpected(other)),
        }
    }

    /// Leave MONITOR mode with RESET and release the connection. Lines that
    /// arrive before the RESET reply are dropped.
    pub async fn close(mut self) -> Result<(), Error> {
        self.conn.send(frame(&Request::reset())?).await?;
        loop {
            match self.conn.recv().await? {
                Value::SimpleString(ref s) if &s[..] == b"RESET" => break,
                Value::SimpleString(_) => {}
                other => return Err(unexpected(other)),
            }
        }
        self.conn.end_session();
        debug!(node = %self.conn.address(), "monitor closed");
        Ok(())
    }

    pub fn address(&self) -> &str {
        self.conn.address()
    }
}
