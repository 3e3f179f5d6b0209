//! Client configuration.

use std::time::Duration;

/// Default number of connections kept per node.
pub const DEFAULT_POOL_SIZE: usize = 8;

/// Default time to wait for a free connection.
pub const DEFAULT_RESERVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time to wait for a TCP connect.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Addresses (`host:port`) used to discover the cluster, or the single
    /// server in standalone mode.
    pub seeds: Vec<String>,
    /// Discover slot ownership with `CLUSTER SLOTS` instead of sending
    /// everything to the first seed.
    pub cluster: bool,
    /// Node that receives keyless commands (PING, INFO, MULTI without a
    /// key ...). `None` picks the first known primary.
    pub default_node: Option<String>,
    /// Maximum connections per node, including reserved ones.
    pub pool_size: usize,
    /// How long to wait for a free connection before failing with
    /// [`Error::ReservationTimeout`](crate::Error::ReservationTimeout).
    pub reserve_timeout: Duration,
    /// How long to wait for a new connection before the node is
    /// considered unreachable.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::standalone("127.0.0.1:6379")
    }
}

impl ClientConfig {
    /// A single server that owns every slot.
    pub fn standalone(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            seeds: vec![address.clone()],
            cluster: false,
            default_node: Some(address),
            pool_size: DEFAULT_POOL_SIZE,
            reserve_timeout: DEFAULT_RESERVE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// A cluster discovered from the given seed nodes.
    pub fn cluster<I, S>(seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seeds: seeds.into_iter().map(Into::into).collect(),
            cluster: true,
            default_node: None,
            pool_size: DEFAULT_POOL_SIZE,
            reserve_timeout: DEFAULT_RESERVE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn reserve_timeout(mut self, timeout: Duration) -> Self {
        self.reserve_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn default_node(mut self, address: impl Into<String>) -> Self {
        self.default_node = Some(address.into());
        self
    }
}
