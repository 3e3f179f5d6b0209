//! An in-memory Redis for exercising the client without a server.
//!
//! Every connection shares one keyspace and one command log. The log
//! records which node and which connection each request arrived on, with
//! the exact bytes, so tests can assert on wire format, routing and
//! connection affinity.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::Bytes;
use cluster_redis::{ClientConfig, Connection, Connector, Error, FromValue, Value};

#[derive(Debug, Clone)]
pub struct Logged {
    pub node: String,
    pub conn: usize,
    pub raw: Bytes,
    pub args: Vec<String>,
}

#[derive(Default)]
struct State {
    data: HashMap<Bytes, Bytes>,
    versions: HashMap<Bytes, u64>,
    log: Vec<Logged>,
    next_conn: usize,
    slots: Vec<(u16, u16, String)>,
    unreachable: HashSet<String>,
    published: Vec<(Bytes, Bytes)>,
    monitor_lines: Vec<(String, Bytes)>,
}

impl State {
    fn touch(&mut self, key: &Bytes) {
        *self.versions.entry(key.clone()).or_default() += 1;
    }
}

#[derive(Clone, Default)]
pub struct FakeRedis {
    state: Arc<Mutex<State>>,
}

impl FakeRedis {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cluster whose `CLUSTER SLOTS` reports these ranges.
    pub fn with_slots(slots: &[(u16, u16, &str)]) -> Self {
        let redis = Self::new();
        redis.lock().slots = slots
            .iter()
            .map(|&(start, end, node)| (start, end, node.to_string()))
            .collect();
        redis
    }

    pub fn set_unreachable(&self, address: &str) {
        self.lock().unreachable.insert(address.to_string());
    }

    pub fn log(&self) -> Vec<Logged> {
        self.lock().log.clone()
    }

    /// Logged requests as argument lists.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.lock().log.iter().map(|l| l.args.clone()).collect()
    }

    pub fn connections_opened(&self) -> usize {
        self.lock().next_conn
    }

    pub fn value(&self, key: &str) -> Option<Bytes> {
        self.lock().data.get(key.as_bytes()).cloned()
    }

    /// Change a key as another client would.
    pub fn external_set(&self, key: &str, value: &str) {
        let mut state = self.lock();
        let key = Bytes::copy_from_slice(key.as_bytes());
        state.data.insert(key.clone(), Bytes::copy_from_slice(value.as_bytes()));
        state.touch(&key);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub fn standalone_config() -> ClientConfig {
    ClientConfig::standalone("fake:6379")
        .pool_size(2)
        .reserve_timeout(Duration::from_millis(50))
        .connect_timeout(Duration::from_millis(50))
}

impl Connector for FakeRedis {
    type Conn = FakeConnection;

    async fn connect(&self, address: &str) -> Result<FakeConnection, Error> {
        let mut state = self.lock();
        if state.unreachable.contains(address) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        let id = state.next_conn;
        state.next_conn += 1;
        Ok(FakeConnection {
            id,
            node: address.to_string(),
            redis: self.clone(),
            replies: VecDeque::new(),
            queued: None,
            watched: HashMap::new(),
            channels: Vec::new(),
            patterns: Vec::new(),
            published_seen: 0,
            monitor_seen: None,
            hang: false,
        })
    }
}

pub struct FakeConnection {
    id: usize,
    node: String,
    redis: FakeRedis,
    replies: VecDeque<Value>,
    queued: Option<Vec<Vec<Bytes>>>,
    watched: HashMap<Bytes, u64>,
    channels: Vec<Bytes>,
    patterns: Vec<Bytes>,
    published_seen: usize,
    monitor_seen: Option<usize>,
    hang: bool,
}

fn ok() -> Value {
    Value::simple_string(b"OK")
}

fn glob_matches(pattern: &[u8], name: &[u8]) -> bool {
    match pattern.strip_suffix(b"*") {
        Some(prefix) => name.starts_with(prefix),
        None => pattern == name,
    }
}

impl FakeConnection {
    fn handle(&mut self, args: Vec<Bytes>) -> Vec<Value> {
        let name = args[0].to_ascii_uppercase();

        if let Some(queue) = &mut self.queued
            && !matches!(&name[..], b"EXEC" | b"DISCARD" | b"MULTI" | b"WATCH")
        {
            queue.push(args);
            return vec![Value::simple_string(b"QUEUED")];
        }

        match &name[..] {
            b"MULTI" => {
                self.queued = Some(Vec::new());
                vec![ok()]
            }
            b"EXEC" => {
                let Some(queue) = self.queued.take() else {
                    return vec![Value::error(b"ERR EXEC without MULTI")];
                };
                let dirty = {
                    let state = self.redis.lock();
                    self.watched
                        .iter()
                        .any(|(key, seen)| state.versions.get(key).copied().unwrap_or(0) != *seen)
                };
                self.watched.clear();
                if dirty {
                    return vec![Value::Null];
                }
                let replies = queue.into_iter().map(|c| self.exec_one(c)).collect();
                vec![Value::Array(replies)]
            }
            b"DISCARD" => {
                self.watched.clear();
                match self.queued.take() {
                    Some(_) => vec![ok()],
                    None => vec![Value::error(b"ERR DISCARD without MULTI")],
                }
            }
            b"WATCH" => {
                let state = self.redis.lock();
                for key in &args[1..] {
                    let version = state.versions.get(key).copied().unwrap_or(0);
                    self.watched.insert(key.clone(), version);
                }
                vec![ok()]
            }
            b"UNWATCH" => {
                self.watched.clear();
                vec![ok()]
            }
            b"SUBSCRIBE" | b"PSUBSCRIBE" => {
                if self.channels.is_empty() && self.patterns.is_empty() {
                    self.published_seen = self.redis.lock().published.len();
                }
                let pattern = &name[..] == b"PSUBSCRIBE";
                let kind: &[u8] = if pattern { b"psubscribe" } else { b"subscribe" };
                let mut replies = Vec::new();
                for target in &args[1..] {
                    let set = if pattern { &mut self.patterns } else { &mut self.channels };
                    if !set.contains(target) {
                        set.push(target.clone());
                    }
                    replies.push(self.confirmation(kind, Some(target.clone())));
                }
                replies
            }
            b"UNSUBSCRIBE" | b"PUNSUBSCRIBE" => {
                let pattern = &name[..] == b"PUNSUBSCRIBE";
                let kind: &[u8] = if pattern { b"punsubscribe" } else { b"unsubscribe" };
                let targets: Vec<Bytes> = if args.len() > 1 {
                    args[1..].to_vec()
                } else if pattern {
                    self.patterns.clone()
                } else {
                    self.channels.clone()
                };
                if targets.is_empty() {
                    return vec![self.confirmation(kind, None)];
                }
                let mut replies = Vec::new();
                for target in targets {
                    let set = if pattern { &mut self.patterns } else { &mut self.channels };
                    set.retain(|t| *t != target);
                    replies.push(self.confirmation(kind, Some(target)));
                }
                replies
            }
            b"MONITOR" => {
                self.monitor_seen = Some(self.redis.lock().monitor_lines.len());
                vec![ok()]
            }
            b"RESET" => {
                self.queued = None;
                self.watched.clear();
                self.channels.clear();
                self.patterns.clear();
                self.monitor_seen = None;
                vec![Value::simple_string(b"RESET")]
            }
            b"BLPOP" => {
                self.hang = true;
                Vec::new()
            }
            _ => vec![self.exec_one(args)],
        }
    }

    fn confirmation(&self, kind: &[u8], name: Option<Bytes>) -> Value {
        let count = (self.channels.len() + self.patterns.len()) as i64;
        Value::Array(vec![
            Value::bulk_string(kind),
            name.map(Value::BulkString).unwrap_or(Value::Null),
            Value::Integer(count),
        ])
    }

    fn exec_one(&mut self, args: Vec<Bytes>) -> Value {
        let mut state = self.redis.lock();
        let line = args
            .iter()
            .map(|a| format!("\"{}\"", String::from_utf8_lossy(a)))
            .collect::<Vec<_>>()
            .join(" ");
        let line = format!("1700000000.000000 [0 127.0.0.1:{}] {line}", 50000 + self.id);
        state
            .monitor_lines
            .push((self.node.clone(), Bytes::from(line)));

        let name = args[0].to_ascii_uppercase();
        match &name[..] {
            b"PING" => Value::simple_string(b"PONG"),
            b"ECHO" => Value::BulkString(args[1].clone()),
            b"GET" => match state.data.get(&args[1]) {
                Some(v) => Value::BulkString(v.clone()),
                None => Value::Null,
            },
            b"SET" => {
                let nx = args[3..].iter().any(|a| a.eq_ignore_ascii_case(b"NX"));
                if nx && state.data.contains_key(&args[1]) {
                    return Value::Null;
                }
                state.data.insert(args[1].clone(), args[2].clone());
                state.touch(&args[1]);
                ok()
            }
            b"DEL" => {
                let mut removed = 0;
                for key in &args[1..] {
                    if state.data.remove(key).is_some() {
                        removed += 1;
                        state.touch(key);
                    }
                }
                Value::Integer(removed)
            }
            b"EXISTS" => Value::Integer(
                args[1..]
                    .iter()
                    .filter(|k| state.data.contains_key(*k))
                    .count() as i64,
            ),
            b"INCR" => {
                let current = match state.data.get(&args[1]) {
                    Some(v) => match std::str::from_utf8(v).ok().and_then(|s| s.parse::<i64>().ok()) {
                        Some(n) => n,
                        None => return Value::error(b"ERR value is not an integer or out of range"),
                    },
                    None => 0,
                };
                let next = current + 1;
                state
                    .data
                    .insert(args[1].clone(), Bytes::from(next.to_string()));
                state.touch(&args[1]);
                Value::Integer(next)
            }
            b"MGET" => Value::Array(
                args[1..]
                    .iter()
                    .map(|k| match state.data.get(k) {
                        Some(v) => Value::BulkString(v.clone()),
                        None => Value::Null,
                    })
                    .collect(),
            ),
            b"PUBLISH" => {
                state.published.push((args[1].clone(), args[2].clone()));
                Value::Integer(1)
            }
            b"CLUSTER" => match &args[1].to_ascii_uppercase()[..] {
                b"SLOTS" => {
                    if state.slots.is_empty() {
                        return Value::error(b"ERR This instance has cluster support disabled");
                    }
                    Value::Array(
                        state
                            .slots
                            .iter()
                            .map(|(start, end, node)| {
                                let (host, port) = node.rsplit_once(':').unwrap_or((node.as_str(), "0"));
                                Value::Array(vec![
                                    Value::Integer(*start as i64),
                                    Value::Integer(*end as i64),
                                    Value::Array(vec![
                                        Value::bulk_string(host.as_bytes()),
                                        Value::Integer(port.parse().unwrap_or(0)),
                                    ]),
                                ])
                            })
                            .collect(),
                    )
                }
                _ => ok(),
            },
            b"GEORADIUS" => Value::Integer(0),
            _ => Value::error(b"ERR unknown command"),
        }
    }

    /// Move publications and monitor lines addressed to this connection
    /// into its reply queue. Returns false if nothing can ever arrive.
    fn deliver(&mut self) -> bool {
        let mut state = self.redis.lock();
        let mut streaming = false;

        if !self.channels.is_empty() || !self.patterns.is_empty() {
            streaming = true;
            for (channel, payload) in &state.published[self.published_seen..] {
                if self.channels.contains(channel) {
                    self.replies.push_back(Value::Array(vec![
                        Value::bulk_string(b"message"),
                        Value::BulkString(channel.clone()),
                        Value::BulkString(payload.clone()),
                    ]));
                }
                for pattern in &self.patterns {
                    if glob_matches(pattern, channel) {
                        self.replies.push_back(Value::Array(vec![
                            Value::bulk_string(b"pmessage"),
                            Value::BulkString(pattern.clone()),
                            Value::BulkString(channel.clone()),
                            Value::BulkString(payload.clone()),
                        ]));
                    }
                }
            }
            self.published_seen = state.published.len();
        }

        if let Some(seen) = self.monitor_seen {
            streaming = true;
            for (node, line) in &state.monitor_lines[seen..] {
                if *node == self.node {
                    self.replies.push_back(Value::SimpleString(line.clone()));
                }
            }
            self.monitor_seen = Some(state.monitor_lines.len());
        }

        drop(state);
        streaming
    }

    fn record(&self, raw: &Bytes, args: &[Bytes]) {
        self.redis.lock().log.push(Logged {
            node: self.node.clone(),
            conn: self.id,
            raw: raw.clone(),
            args: args
                .iter()
                .map(|a| String::from_utf8_lossy(a).into_owned())
                .collect(),
        });
    }
}

impl Connection for FakeConnection {
    async fn send(&mut self, frame: Bytes) -> Result<(), Error> {
        let (value, _) = Value::parse_bytes(frame.clone())?;
        let args = Vec::<Bytes>::from_value(value)?;
        self.record(&frame, &args);
        let replies = self.handle(args);
        self.replies.extend(replies);
        Ok(())
    }

    async fn recv(&mut self) -> Result<Value, Error> {
        loop {
            if let Some(value) = self.replies.pop_front() {
                return Ok(value);
            }
            if self.hang {
                std::future::pending::<()>().await;
            }
            if !self.deliver() {
                return Err(Error::ConnectionClosed);
            }
            if self.replies.is_empty() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }
    }
}
