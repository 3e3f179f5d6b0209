//! Integration tests for cluster-redis against a real Redis server.
//!
//! These tests are `#[ignore]` by default because they require a running
//! Redis instance on `127.0.0.1:6379`. Run them with:
//!
//!   cargo test -p cluster-redis --test integration -- --ignored --nocapture

use std::time::Duration;

use bytes::Bytes;
use cluster_redis::{Client, ClientConfig, Error, Request, Value};
use resp_proto::{FieldValue, ScoreMember, SetOptions};

// ── Helpers ─────────────────────────────────────────────────────────────

const REDIS_ADDR: &str = "127.0.0.1:6379";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn connect_redis() -> Client {
    init_tracing();
    if std::net::TcpStream::connect_timeout(&REDIS_ADDR.parse().unwrap(), Duration::from_secs(2))
        .is_err()
    {
        panic!("Redis not reachable at {REDIS_ADDR}");
    }
    Client::connect(ClientConfig::standalone(REDIS_ADDR).pool_size(4))
        .await
        .unwrap()
}

/// Keys unique to one test so tests can run concurrently.
fn key(test: &str, name: &str) -> String {
    format!("cluster-redis:{{{test}}}:{name}")
}

// ── Strings ─────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn test_set_get_del() {
    let client = connect_redis().await;
    let k = key("sgd", "k");

    client.set(&k, "value").await.unwrap();
    assert_eq!(client.get(&k).await.unwrap(), Some(Bytes::from_static(b"value")));
    assert_eq!(client.del(&[&k]).await.unwrap(), 1);
    assert_eq!(client.get(&k).await.unwrap(), None);
}

#[tokio::test]
#[ignore]
async fn test_set_with_options() {
    let client = connect_redis().await;
    let k = key("setopt", "k");
    client.del(&[&k]).await.unwrap();

    let reply = client
        .set_with(&k, "v1", SetOptions::new().nx().ex(60))
        .await
        .unwrap();
    assert_eq!(reply, Value::simple_string(b"OK"));
    let ttl = client.ttl(&k).await.unwrap();
    assert!((1..=60).contains(&ttl), "ttl = {ttl}");

    let reply = client
        .set_with(&k, "v2", SetOptions::new().nx())
        .await
        .unwrap();
    assert!(reply.is_null());

    let old = client.set_with(&k, "v3", SetOptions::new().get()).await.unwrap();
    assert_eq!(old, Value::bulk_string(b"v1"));
    client.del(&[&k]).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_counters_and_errors() {
    let client = connect_redis().await;
    let k = key("incr", "n");
    client.del(&[&k]).await.unwrap();

    assert_eq!(client.incr(&k).await.unwrap(), 1);
    assert_eq!(client.incrby(&k, 9).await.unwrap(), 10);
    assert_eq!(client.incrbyfloat(&k, 0.5).await.unwrap(), 10.5);

    client.set(&k, "text").await.unwrap();
    assert!(matches!(client.incr(&k).await, Err(Error::Redis(_))));
    client.del(&[&k]).await.unwrap();
}

// ── Collections ─────────────────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn test_hash_and_sorted_set() {
    let client = connect_redis().await;
    let h = key("coll", "h");
    let z = key("coll", "z");
    client.del(&[&h, &z]).await.unwrap();

    let added = client
        .hset(&h, &[FieldValue::new("a", "1"), FieldValue::new("b", "2")])
        .await
        .unwrap();
    assert_eq!(added, 2);
    let all = client.hgetall(&h).await.unwrap();
    assert_eq!(all.get(&Bytes::from_static(b"b")), Some(&Bytes::from_static(b"2")));

    client
        .zadd(&z, &[ScoreMember::new(2.0, "two"), ScoreMember::new(1.0, "one")])
        .await
        .unwrap();
    let ranked = client.zrange_with_scores(&z, 0, -1).await.unwrap();
    assert_eq!(
        ranked,
        vec![
            (Bytes::from_static(b"one"), 1.0),
            (Bytes::from_static(b"two"), 2.0)
        ]
    );
    client.del(&[&h, &z]).await.unwrap();
}

// ── Sessions ────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn test_transaction() {
    let client = connect_redis().await;
    let k = key("tx", "n");
    client.del(&[&k]).await.unwrap();

    let mut tx = client.multi_on(&k).await.unwrap();
    tx.queue(&Request::incr(&k)).await.unwrap();
    tx.queue(&Request::incrby(&k, 5)).await.unwrap();
    let replies = tx.exec().await.unwrap();
    assert_eq!(replies, vec![Value::Integer(1), Value::Integer(6)]);
    client.del(&[&k]).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_pubsub() {
    let client = connect_redis().await;
    let channel = key("pubsub", "chan");

    let mut sub = client.subscribe(&[&channel]).await.unwrap();
    client.publish(&channel, "hi").await.unwrap();
    let message = tokio::time::timeout(Duration::from_secs(2), sub.next_message())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&message.payload[..], b"hi");
    sub.close().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_monitor_close() {
    let client = connect_redis().await;
    let monitor = client.monitor().await.unwrap();
    client.ping().await.unwrap();
    monitor.close().await.unwrap();
}
