//! Dispatcher behavior against the in-memory fake.

mod common;

use std::time::Duration;

use bytes::Bytes;
use cluster_redis::{Client, ClientConfig, Error, Request};
use common::{FakeRedis, standalone_config};
use resp_proto::{GeoRadiusOptions, GeoUnit, RouteError, hash_slot};

fn standalone() -> (FakeRedis, Client<FakeRedis>) {
    let redis = FakeRedis::new();
    let client = Client::with_connector(standalone_config(), redis.clone());
    (redis, client)
}

async fn two_node_cluster() -> (FakeRedis, Client<FakeRedis>) {
    let redis = FakeRedis::with_slots(&[(0, 8191, "10.0.0.1:7000"), (8192, 16383, "10.0.0.2:7000")]);
    let config = ClientConfig::cluster(["10.0.0.1:7000"])
        .pool_size(2)
        .reserve_timeout(Duration::from_millis(50));
    let client = Client::with_connector(config, redis.clone());
    client.refresh_topology().await.unwrap();
    (redis, client)
}

// ── Wire format ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_writes_exact_bytes() {
    let (redis, client) = standalone();
    client.set("k", "v").await.unwrap();

    let log = redis.log();
    assert_eq!(log.len(), 1);
    assert_eq!(&log[0].raw[..], b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n");
    assert_eq!(log[0].node, "fake:6379");
    assert_eq!(client.get("k").await.unwrap(), Some(Bytes::from_static(b"v")));
}

#[tokio::test]
async fn test_del_keeps_key_order() {
    let (redis, client) = standalone();
    client.set("{u}b", "1").await.unwrap();
    let removed = client.del(&["{u}a", "{u}c", "{u}b"]).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(redis.commands()[1], ["DEL", "{u}a", "{u}c", "{u}b"]);
}

#[tokio::test]
async fn test_cluster_addslots_goes_to_named_node() {
    let (redis, client) = standalone();
    client.cluster_addslots("fake:6379", &[1, 2, 3]).await.unwrap();
    let log = redis.log();
    assert_eq!(
        &log[0].raw[..],
        b"*5\r\n$7\r\nCLUSTER\r\n$8\r\nADDSLOTS\r\n$1\r\n1\r\n$1\r\n2\r\n$1\r\n3\r\n"
    );
}

#[tokio::test]
async fn test_georadius_store_keys_route_with_source() {
    let (redis, client) = standalone();
    let options = GeoRadiusOptions::default().store("{g}dst");
    let stored = client
        .georadius("{g}src", 13.36, 38.11, 200.0, GeoUnit::Kilometers, &options)
        .await
        .unwrap();
    assert_eq!(stored, cluster_redis::Value::Integer(0));
    let command = &redis.commands()[0];
    assert_eq!(&command[..2], ["GEORADIUS", "{g}src"]);
    assert_eq!(&command[command.len() - 2..], ["STORE", "{g}dst"]);

    let split = GeoRadiusOptions::default().store("elsewhere");
    let err = client
        .georadius("{g}src", 13.36, 38.11, 200.0, GeoUnit::Kilometers, &split)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Route(RouteError::CrossSlot { .. })));
    assert_eq!(redis.log().len(), 1);
}

// ── Failing before I/O ──────────────────────────────────────────────────

#[tokio::test]
async fn test_cross_slot_rejected_without_io() {
    let (redis, client) = standalone();
    let err = client.del(&["foo", "bar"]).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Route(RouteError::CrossSlot {
            first: 12182,
            other: 5061
        })
    ));
    assert_eq!(redis.connections_opened(), 0);
    assert!(redis.log().is_empty());
}

#[tokio::test]
async fn test_invalid_argument_rejected_without_io() {
    let (redis, client) = standalone();
    let err = client.execute(&Request::named(b"NOSUCHCMD")).await.unwrap_err();
    assert!(matches!(err, Error::Encode(_)));

    let empty: [&str; 0] = [];
    let err = client.del(&empty).await.unwrap_err();
    assert!(matches!(err, Error::Encode(_)));
    assert_eq!(redis.connections_opened(), 0);
}

// ── Replies ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_reply_becomes_redis_error() {
    let (_redis, client) = standalone();
    client.set("n", "abc").await.unwrap();
    let err = client.incr("n").await.unwrap_err();
    assert!(matches!(err, Error::Redis(ref msg) if msg.starts_with("ERR value is not an integer")));
}

#[tokio::test]
async fn test_typed_replies() {
    let (_redis, client) = standalone();
    client.set("{m}a", "1").await.unwrap();
    client.set("{m}c", "3").await.unwrap();
    let values = client.mget(&["{m}a", "{m}b", "{m}c"]).await.unwrap();
    assert_eq!(
        values,
        vec![Some(Bytes::from_static(b"1")), None, Some(Bytes::from_static(b"3"))]
    );
    assert!(client.exists("{m}a").await.unwrap());
    assert!(!client.set_nx("{m}a", "again").await.unwrap());
    client.ping().await.unwrap();
}

// ── Routing ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_requests_route_to_slot_owner() {
    let (redis, client) = two_node_cluster().await;
    assert_eq!(hash_slot(b"foo"), 12182);

    client.set("foo", "1").await.unwrap();
    client.set("bar", "2").await.unwrap();

    let log = redis.log();
    assert_eq!(log[0].args, ["CLUSTER", "SLOTS"]);
    assert_eq!(log[0].node, "10.0.0.1:7000");
    assert_eq!(log[1].node, "10.0.0.2:7000");
    assert_eq!(log[2].node, "10.0.0.1:7000");

    let topology = client.topology();
    assert_eq!(topology.nodes(), vec!["10.0.0.1:7000", "10.0.0.2:7000"]);
}

#[tokio::test]
async fn test_refresh_fails_without_cluster_support() {
    let redis = FakeRedis::new();
    let client = Client::with_connector(ClientConfig::cluster(["solo:6379"]), redis);
    let err = client.refresh_topology().await.unwrap_err();
    assert!(matches!(err, Error::Redis(_)));

    // Nothing owns any slot yet.
    let err = client.get("foo").await.unwrap_err();
    assert!(matches!(err, Error::Route(RouteError::Unroutable(12182))));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_node() {
    let (redis, client) = standalone();
    redis.set_unreachable("fake:6379");
    let err = client.get("k").await.unwrap_err();
    assert!(matches!(err, Error::Unreachable { ref address, .. } if address == "fake:6379"));
}

// ── Pool behavior ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_connections_are_reused() {
    let (redis, client) = standalone();
    for i in 0..5 {
        client.set("k", i.to_string()).await.unwrap();
    }
    assert_eq!(redis.connections_opened(), 1);
    let stats = client.pool_stats("fake:6379").unwrap();
    assert_eq!(stats.released, 5);
    assert_eq!(stats.idle, 1);
}

#[tokio::test]
async fn test_reservation_timeout_when_pool_exhausted() {
    let (_redis, client) = standalone();
    let _first = client.multi().await.unwrap();
    let _second = client.multi().await.unwrap();

    let err = client.get("k").await.unwrap_err();
    assert!(matches!(err, Error::ReservationTimeout { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_cancelled_request_discards_connection() {
    let (redis, client) = standalone();
    let blocking = Request::blpop(&["queue"], 0.0);
    let outcome = tokio::time::timeout(Duration::from_millis(20), client.execute(&blocking)).await;
    assert!(outcome.is_err());

    let stats = client.pool_stats("fake:6379").unwrap();
    assert_eq!(stats.discarded, 1);
    assert_eq!(stats.idle, 0);

    // The next request gets a fresh connection, not the one with a reply
    // still pending.
    client.set("k", "v").await.unwrap();
    let log = redis.log();
    assert_ne!(log[0].conn, log[1].conn);
}

#[tokio::test]
async fn test_close_drops_pools() {
    let (_redis, client) = standalone();
    client.set("k", "v").await.unwrap();
    client.close();
    // A closed pool is dropped; the next request builds a new one.
    client.set("k", "w").await.unwrap();
}
