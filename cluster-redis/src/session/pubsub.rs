use std::collections::{HashSet, VecDeque};

use bytes::Bytes;
use resp_proto::{Request, Value};
use tracing::debug;

use super::frame;
use crate::pool::PooledConnection;
use crate::transport::Connection;
use crate::{Error, unexpected};

/// A published message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub channel: Bytes,
    /// The pattern that matched, for PSUBSCRIBE deliveries.
    pub pattern: Option<Bytes>,
    pub payload: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Subscribe,
    Unsubscribe,
    PSubscribe,
    PUnsubscribe,
}

enum Frame {
    Confirm {
        kind: Kind,
        name: Option<Bytes>,
        count: i64,
    },
    Message(Message),
    Pong,
}

fn blob(value: &Value) -> Option<Bytes> {
    match value {
        Value::BulkString(b) | Value::SimpleString(b) => Some(b.clone()),
        _ => None,
    }
}

fn classify(value: Value) -> Result<Frame, Error> {
    let items = value.into_array().map_err(unexpected)?;
    let Some((kind, rest)) = items.split_first() else {
        return Err(Error::UnexpectedResponse);
    };
    let kind = kind.as_bytes().ok_or(Error::UnexpectedResponse)?;

    let confirm = |kind, name: &Value, count: &Value| -> Result<Frame, Error> {
        Ok(Frame::Confirm {
            kind,
            name: blob(name),
            count: count.as_integer().ok_or(Error::UnexpectedResponse)?,
        })
    };

    match (kind, rest) {
        (b"message", [channel, payload]) => Ok(Frame::Message(Message {
            channel: blob(channel).ok_or(Error::UnexpectedResponse)?,
            pattern: None,
            payload: blob(payload).ok_or(Error::UnexpectedResponse)?,
        })),
        (b"pmessage", [pattern, channel, payload]) => Ok(Frame::Message(Message {
            channel: blob(channel).ok_or(Error::UnexpectedResponse)?,
            pattern: Some(blob(pattern).ok_or(Error::UnexpectedResponse)?),
            payload: blob(payload).ok_or(Error::UnexpectedResponse)?,
        })),
        (b"subscribe", [name, count]) => confirm(Kind::Subscribe, name, count),
        (b"unsubscribe", [name, count]) => confirm(Kind::Unsubscribe, name, count),
        (b"psubscribe", [name, count]) => confirm(Kind::PSubscribe, name, count),
        (b"punsubscribe", [name, count]) => confirm(Kind::PUnsubscribe, name, count),
        (b"pong", _) => Ok(Frame::Pong),
        _ => Err(Error::UnexpectedResponse),
    }
}

/// A reserved connection in subscribe mode.
///
/// Messages that arrive while a (un)subscribe call waits for its
/// confirmations are buffered and returned by
/// [`next_message`](Self::next_message) in arrival order. Once the server
/// reports zero remaining subscriptions, the connection goes back to its
/// pool and further commands fail with [`Error::SessionReleased`].
pub struct Subscription<T: Connection> {
    conn: Option<PooledConnection<T>>,
    channels: HashSet<Bytes>,
    patterns: HashSet<Bytes>,
    pending: VecDeque<Message>,
}

impl<T: Connection> Subscription<T> {
    pub(crate) fn new(conn: PooledConnection<T>) -> Self {
        Self {
            conn: Some(conn),
            channels: HashSet::new(),
            patterns: HashSet::new(),
            pending: VecDeque::new(),
        }
    }

    pub async fn subscribe(&mut self, channels: &[impl AsRef<[u8]>]) -> Result<(), Error> {
        let frame = frame(&Request::subscribe(channels))?;
        self.command(frame, Kind::Subscribe, channels.len()).await
    }

    pub async fn psubscribe(&mut self, patterns: &[impl AsRef<[u8]>]) -> Result<(), Error> {
        let frame = frame(&Request::psubscribe(patterns))?;
        self.command(frame, Kind::PSubscribe, patterns.len()).await
    }

    /// Unsubscribe from `channels`, or from every channel if empty.
    pub async fn unsubscribe(&mut self, channels: &[impl AsRef<[u8]>]) -> Result<(), Error> {
        let expected = match channels.len() {
            0 => self.channels.len().max(1),
            n => n,
        };
        let frame = frame(&Request::unsubscribe(channels))?;
        self.command(frame, Kind::Unsubscribe, expected).await
    }

    /// Unsubscribe from `patterns`, or from every pattern if empty.
    pub async fn punsubscribe(&mut self, patterns: &[impl AsRef<[u8]>]) -> Result<(), Error> {
        let expected = match patterns.len() {
            0 => self.patterns.len().max(1),
            n => n,
        };
        let frame = frame(&Request::punsubscribe(patterns))?;
        self.command(frame, Kind::PUnsubscribe, expected).await
    }

    /// Send one (un)subscribe command and wait for one confirmation per
    /// named channel or pattern.
    async fn command(&mut self, frame: Bytes, kind: Kind, expected: usize) -> Result<(), Error> {
        let conn = self.conn.as_mut().ok_or(Error::SessionReleased)?;
        conn.begin_session();
        conn.send(frame).await?;

        let mut confirmed = 0;
        let mut remaining = None;
        while confirmed < expected {
            match classify(conn.recv().await?)? {
                Frame::Message(message) => self.pending.push_back(message),
                Frame::Confirm {
                    kind: got,
                    name,
                    count,
                } => {
                    track(&mut self.channels, &mut self.patterns, got, name);
                    remaining = Some(count);
                    if got == kind {
                        confirmed += 1;
                    }
                }
                Frame::Pong => {}
            }
        }

        if remaining == Some(0) {
            self.release();
        }
        Ok(())
    }

    /// The next published message.
    pub async fn next_message(&mut self) -> Result<Message, Error> {
        if let Some(message) = self.pending.pop_front() {
            return Ok(message);
        }
        let conn = self.conn.as_mut().ok_or(Error::SessionReleased)?;
        loop {
            match classify(conn.recv().await?)? {
                Frame::Message(message) => return Ok(message),
                Frame::Confirm { kind, name, .. } => {
                    track(&mut self.channels, &mut self.patterns, kind, name);
                }
                Frame::Pong => {}
            }
        }
    }

    /// Unsubscribe from everything and release the connection. Buffered and
    /// in-flight messages are dropped.
    pub async fn close(mut self) -> Result<(), Error> {
        let none: [&[u8]; 0] = [];
        if self.conn.is_some() && !self.channels.is_empty() {
            self.unsubscribe(&none).await?;
        }
        if self.conn.is_some() && !self.patterns.is_empty() {
            self.punsubscribe(&none).await?;
        }
        self.pending.clear();
        Ok(())
    }

    /// Channels currently subscribed to.
    pub fn channels(&self) -> impl Iterator<Item = &Bytes> {
        self.channels.iter()
    }

    /// Patterns currently subscribed to.
    pub fn patterns(&self) -> impl Iterator<Item = &Bytes> {
        self.patterns.iter()
    }

    /// Whether the connection is still reserved.
    pub fn is_active(&self) -> bool {
        self.conn.is_some()
    }

    fn release(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            conn.end_session();
            debug!(node = %conn.address(), "subscription ended");
        }
    }
}

fn track(
    channels: &mut HashSet<Bytes>,
    patterns: &mut HashSet<Bytes>,
    kind: Kind,
    name: Option<Bytes>,
) {
    let Some(name) = name else {
        return;
    };
    match kind {
        Kind::Subscribe => {
            channels.insert(name);
        }
        Kind::Unsubscribe => {
            channels.remove(&name);
        }
        Kind::PSubscribe => {
            patterns.insert(name);
        }
        Kind::PUnsubscribe => {
            patterns.remove(&name);
        }
    }
}
