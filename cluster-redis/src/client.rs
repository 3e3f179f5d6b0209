//! The request dispatcher.
//!
//! A [`Client`] is cheap to clone and safe to share between tasks. Each
//! request is encoded before anything else happens, so a malformed request
//! fails without touching the network. The encoded buffer is routed by the
//! slot of its partition keys, written on a connection checked out of that
//! node's pool, and the connection is returned once the reply is read.
//!
//! Redirects (MOVED/ASK) are surfaced as [`Error::Redis`]; callers decide
//! whether to [`refresh_topology`](Client::refresh_topology) and retry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use resp_proto::{Encoded, FromValue, PartitionDescriptor, Request, Value};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::metrics;
use crate::pool::{NodePool, PoolConfig, PoolStats, PooledConnection};
use crate::router::Topology;
use crate::session::{Monitor, Subscription, Transaction, Watched};
use crate::tcp::TcpConnector;
use crate::transport::Connector;
use crate::{Error, check_reply, unexpected};

struct Inner<K: Connector> {
    config: ClientConfig,
    connector: Arc<K>,
    topology: RwLock<Arc<Topology>>,
    pools: Mutex<HashMap<String, Arc<NodePool<K>>>>,
}

/// A Redis client that routes commands by hash slot.
pub struct Client<K: Connector = TcpConnector> {
    inner: Arc<Inner<K>>,
}

impl<K: Connector> Clone for Client<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Client<TcpConnector> {
    /// Create a TCP client. In cluster mode the slot map is loaded from the
    /// seeds before returning.
    pub async fn connect(config: ClientConfig) -> Result<Self, Error> {
        let client = Self::with_connector(config, TcpConnector::default());
        if client.inner.config.cluster {
            client.refresh_topology().await?;
        }
        Ok(client)
    }
}

impl<K: Connector> Client<K> {
    /// Create a client over any transport. No connection is opened until
    /// the first request. Cluster clients start with an empty topology.
    pub fn with_connector(config: ClientConfig, connector: K) -> Self {
        let topology = match (config.cluster, config.seeds.first()) {
            (false, Some(seed)) => {
                let node = config.default_node.clone().unwrap_or_else(|| seed.clone());
                Topology::standalone(node)
            }
            _ => Topology::from_slot_map(Default::default(), config.default_node.clone()),
        };
        Self {
            inner: Arc::new(Inner {
                config,
                connector: Arc::new(connector),
                topology: RwLock::new(Arc::new(topology)),
                pools: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    // ── Topology ────────────────────────────────────────────────────────

    /// The current slot map snapshot.
    pub fn topology(&self) -> Arc<Topology> {
        self.inner
            .topology
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the slot map. Pools of nodes that left are closed.
    pub fn set_topology(&self, topology: Topology) {
        let nodes: Vec<String> = topology.nodes().into_iter().map(String::from).collect();
        *self.inner.topology.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(topology);

        let mut pools = self.inner.pools.lock().unwrap_or_else(|e| e.into_inner());
        pools.retain(|address, pool| {
            let keep = nodes.contains(address) || self.inner.config.seeds.contains(address);
            if !keep {
                pool.close();
            }
            keep
        });
    }

    /// Load slot ownership with `CLUSTER SLOTS`, asking known primaries
    /// first and then the seeds. The first node that answers wins.
    pub async fn refresh_topology(&self) -> Result<(), Error> {
        let current = self.topology();
        let mut candidates: Vec<String> =
            current.slot_map().primaries().into_iter().map(String::from).collect();
        for seed in &self.inner.config.seeds {
            if !candidates.contains(seed) {
                candidates.push(seed.clone());
            }
        }

        let mut last_error = Error::Route(resp_proto::RouteError::NoNodes);
        for address in &candidates {
            match self.fetch_topology(address).await {
                Ok(topology) => {
                    info!(
                        node = %address,
                        ranges = topology.slot_map().ranges().len(),
                        "loaded cluster topology"
                    );
                    self.set_topology(topology);
                    return Ok(());
                }
                Err(e) => {
                    warn!(node = %address, error = %e, "topology refresh failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn fetch_topology(&self, address: &str) -> Result<Topology, Error> {
        let encoded = Request::cluster_slots().encode()?;
        let reply = check_reply(self.exchange(address, encoded).await?)?;
        Topology::from_cluster_slots(&reply, self.inner.config.default_node.clone())
            .ok_or_else(|| unexpected(reply))
    }

    /// Address of the node that owns a request's keys.
    pub fn route(&self, partition: &PartitionDescriptor) -> Result<String, Error> {
        match self.topology().route(partition) {
            Ok(address) => Ok(address.to_string()),
            Err(e) => {
                metrics::ROUTING_ERRORS.increment();
                Err(e.into())
            }
        }
    }

    // ── Pools ───────────────────────────────────────────────────────────

    /// The pool for a node, created on first use.
    pub fn pool(&self, address: &str) -> Arc<NodePool<K>> {
        let mut pools = self.inner.pools.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pool) = pools.get(address) {
            return pool.clone();
        }
        let config = &self.inner.config;
        let pool = Arc::new(NodePool::new(
            address,
            self.inner.connector.clone(),
            PoolConfig {
                size: config.pool_size,
                reserve_timeout: config.reserve_timeout,
                connect_timeout: config.connect_timeout,
            },
        ));
        pools.insert(address.to_string(), pool.clone());
        pool
    }

    pub fn pool_stats(&self, address: &str) -> Option<PoolStats> {
        let pools = self.inner.pools.lock().unwrap_or_else(|e| e.into_inner());
        pools.get(address).map(|pool| pool.stats())
    }

    /// Close every pool. Later requests fail with [`Error::PoolClosed`]
    /// until a pool is recreated by a topology change.
    pub fn close(&self) {
        let mut pools = self.inner.pools.lock().unwrap_or_else(|e| e.into_inner());
        for pool in pools.values() {
            pool.close();
        }
        pools.clear();
    }

    // ── Dispatch ────────────────────────────────────────────────────────

    /// Encode, route and send a request. Error replies become
    /// [`Error::Redis`].
    pub async fn execute(&self, request: &Request<'_>) -> Result<Value, Error> {
        let encoded = request.encode()?;
        self.dispatch(encoded).await
    }

    /// Like [`execute`](Self::execute), converting the reply.
    pub async fn query<T: FromValue>(&self, request: &Request<'_>) -> Result<T, Error> {
        let value = self.execute(request).await?;
        Ok(T::from_value(value)?)
    }

    /// Send an already encoded request to the node owning its keys.
    pub async fn dispatch(&self, encoded: Encoded) -> Result<Value, Error> {
        let address = self.route(encoded.partition())?;
        check_reply(self.exchange(&address, encoded).await?)
    }

    /// Send a request to a specific node, ignoring its keys. Used for
    /// node-local commands such as `CLUSTER ADDSLOTS` or `INFO`.
    pub async fn execute_on(&self, address: &str, request: &Request<'_>) -> Result<Value, Error> {
        let encoded = request.encode()?;
        check_reply(self.exchange(address, encoded).await?)
    }

    /// One round trip on a pooled connection. The reply is returned as is.
    async fn exchange(&self, address: &str, encoded: Encoded) -> Result<Value, Error> {
        let pool = self.pool(address);
        let mut conn = pool.checkout().await?;

        debug!(
            node = %address,
            command = %encoded.command(),
            bytes = encoded.len(),
            "dispatch"
        );
        metrics::REQUESTS_DISPATCHED.increment();
        metrics::REQUEST_BYTES.add(encoded.len() as u64);

        let (bytes, _) = encoded.into_parts();
        conn.round_trip(bytes).await
    }

    // ── Reservations ────────────────────────────────────────────────────

    /// Check a connection out of a node's pool for exclusive use by a
    /// session.
    pub async fn reserve(&self, address: &str) -> Result<PooledConnection<K::Conn>, Error> {
        self.pool(address).checkout().await
    }

    /// Start a transaction on the default node. Keyed commands queued later
    /// must all hash to one slot owned by that node.
    pub async fn multi(&self) -> Result<Transaction<K::Conn>, Error> {
        let topology = self.topology();
        let address = topology.any_node()?.to_string();
        let conn = self.reserve(&address).await?;
        Transaction::begin(conn, topology, None).await
    }

    /// Start a transaction on the node that owns `key`, pinned to its slot.
    pub async fn multi_on(
        &self,
        key: &(impl AsRef<[u8]> + ?Sized),
    ) -> Result<Transaction<K::Conn>, Error> {
        let slot = resp_proto::hash_slot(key.as_ref());
        let topology = self.topology();
        let address = topology.route_slot(slot)?.to_string();
        let conn = self.reserve(&address).await?;
        Transaction::begin(conn, topology, Some(slot)).await
    }

    /// WATCH `keys` on a reserved connection to the node that owns them.
    pub async fn watch(&self, keys: &[impl AsRef<[u8]>]) -> Result<Watched<K::Conn>, Error> {
        let request = Request::watch(keys);
        let encoded = request.encode()?;
        let address = self.route(encoded.partition())?;
        let conn = self.reserve(&address).await?;
        Watched::begin(conn, self.topology(), &request).await
    }

    /// Subscribe to channels on the default node.
    pub async fn subscribe(
        &self,
        channels: &[impl AsRef<[u8]>],
    ) -> Result<Subscription<K::Conn>, Error> {
        let mut subscription = self.subscription().await?;
        subscription.subscribe(channels).await?;
        Ok(subscription)
    }

    /// Subscribe to patterns on the default node.
    pub async fn psubscribe(
        &self,
        patterns: &[impl AsRef<[u8]>],
    ) -> Result<Subscription<K::Conn>, Error> {
        let mut subscription = self.subscription().await?;
        subscription.psubscribe(patterns).await?;
        Ok(subscription)
    }

    async fn subscription(&self) -> Result<Subscription<K::Conn>, Error> {
        let address = self.topology().any_node()?.to_string();
        Ok(Subscription::new(self.reserve(&address).await?))
    }

    /// Stream every command run by the default node.
    pub async fn monitor(&self) -> Result<Monitor<K::Conn>, Error> {
        let address = self.topology().any_node()?.to_string();
        self.monitor_node(&address).await
    }

    /// Stream every command run by `address`.
    pub async fn monitor_node(&self, address: &str) -> Result<Monitor<K::Conn>, Error> {
        Monitor::start(self.reserve(address).await?).await
    }
}
