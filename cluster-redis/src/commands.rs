//! Typed command methods on [`Client`].
//!
//! Each method builds a [`Request`], sends it through the dispatcher and
//! converts the reply. Anything not covered here goes through
//! [`Client::execute`] or [`Client::query`] with a request built directly.

use std::collections::HashMap;

use bytes::Bytes;
use resp_proto::{
    Condition, FieldValue, GeoMember, GeoRadiusOptions, GeoUnit, KeyValue, Request, ScoreMember,
    SetOptions, Value,
};

use crate::transport::Connector;
use crate::{Client, Error};

impl<K: Connector> Client<K> {
    // ── Strings ─────────────────────────────────────────────────────────

    /// Get the value of a key.
    pub async fn get(&self, key: impl AsRef<[u8]>) -> Result<Option<Bytes>, Error> {
        self.query(&Request::get(&key)).await
    }

    /// Set a key-value pair.
    pub async fn set(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<(), Error> {
        self.query(&Request::set(&key, &value)).await
    }

    /// SET with expiration, condition and GET options. The reply is `+OK`,
    /// null when a condition was not met, or the old value with `GET`.
    pub async fn set_with(
        &self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        options: SetOptions,
    ) -> Result<Value, Error> {
        self.execute(&Request::set_with(&key, &value, options)).await
    }

    /// Set a key only if it does not exist. Returns whether it was set.
    pub async fn set_nx(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<bool, Error> {
        let reply = self
            .execute(&Request::set_with(&key, &value, SetOptions::new().nx()))
            .await?;
        Ok(!reply.is_null())
    }

    /// Get the values of keys that share a slot.
    pub async fn mget(&self, keys: &[impl AsRef<[u8]>]) -> Result<Vec<Option<Bytes>>, Error> {
        self.query(&Request::mget(keys)).await
    }

    /// Set several keys that share a slot.
    pub async fn mset(&self, pairs: &[KeyValue<'_>]) -> Result<(), Error> {
        self.query(&Request::mset(pairs)).await
    }

    pub async fn incr(&self, key: impl AsRef<[u8]>) -> Result<i64, Error> {
        self.query(&Request::incr(&key)).await
    }

    pub async fn incrby(&self, key: impl AsRef<[u8]>, delta: i64) -> Result<i64, Error> {
        self.query(&Request::incrby(&key, delta)).await
    }

    pub async fn incrbyfloat(&self, key: impl AsRef<[u8]>, delta: f64) -> Result<f64, Error> {
        self.query(&Request::incrbyfloat(&key, delta)).await
    }

    pub async fn decr(&self, key: impl AsRef<[u8]>) -> Result<i64, Error> {
        self.query(&Request::decr(&key)).await
    }

    /// Append to a string. Returns the new length.
    pub async fn append(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<i64, Error> {
        self.query(&Request::append(&key, &value)).await
    }

    pub async fn strlen(&self, key: impl AsRef<[u8]>) -> Result<i64, Error> {
        self.query(&Request::strlen(&key)).await
    }

    // ── Keys ────────────────────────────────────────────────────────────

    /// Delete keys that share a slot. Returns the number removed.
    pub async fn del(&self, keys: &[impl AsRef<[u8]>]) -> Result<i64, Error> {
        self.query(&Request::del(keys)).await
    }

    pub async fn unlink(&self, keys: &[impl AsRef<[u8]>]) -> Result<i64, Error> {
        self.query(&Request::unlink(keys)).await
    }

    /// Whether a key exists.
    pub async fn exists(&self, key: impl AsRef<[u8]>) -> Result<bool, Error> {
        let n: i64 = self.query(&Request::exists(&[key])).await?;
        Ok(n > 0)
    }

    /// Set a TTL in seconds. Returns whether it was applied.
    pub async fn expire(
        &self,
        key: impl AsRef<[u8]>,
        seconds: i64,
        condition: Option<Condition>,
    ) -> Result<bool, Error> {
        self.query(&Request::expire(&key, seconds, condition)).await
    }

    pub async fn persist(&self, key: impl AsRef<[u8]>) -> Result<bool, Error> {
        self.query(&Request::persist(&key)).await
    }

    /// Remaining TTL in seconds; -1 without TTL, -2 if missing.
    pub async fn ttl(&self, key: impl AsRef<[u8]>) -> Result<i64, Error> {
        self.query(&Request::ttl(&key)).await
    }

    pub async fn pttl(&self, key: impl AsRef<[u8]>) -> Result<i64, Error> {
        self.query(&Request::pttl(&key)).await
    }

    pub async fn key_type(&self, key: impl AsRef<[u8]>) -> Result<String, Error> {
        self.query(&Request::key_type(&key)).await
    }

    pub async fn rename(&self, from: impl AsRef<[u8]>, to: impl AsRef<[u8]>) -> Result<(), Error> {
        self.query(&Request::rename(&from, &to)).await
    }

    // ── Hashes ──────────────────────────────────────────────────────────

    /// Set hash fields. Returns the number of new fields.
    pub async fn hset(&self, key: impl AsRef<[u8]>, pairs: &[FieldValue<'_>]) -> Result<i64, Error> {
        self.query(&Request::hset(&key, pairs)).await
    }

    pub async fn hget(
        &self,
        key: impl AsRef<[u8]>,
        field: impl AsRef<[u8]>,
    ) -> Result<Option<Bytes>, Error> {
        self.query(&Request::hget(&key, &field)).await
    }

    pub async fn hmget(
        &self,
        key: impl AsRef<[u8]>,
        fields: &[impl AsRef<[u8]>],
    ) -> Result<Vec<Option<Bytes>>, Error> {
        self.query(&Request::hmget(&key, fields)).await
    }

    pub async fn hgetall(&self, key: impl AsRef<[u8]>) -> Result<HashMap<Bytes, Bytes>, Error> {
        self.query(&Request::hgetall(&key)).await
    }

    pub async fn hdel(&self, key: impl AsRef<[u8]>, fields: &[impl AsRef<[u8]>]) -> Result<i64, Error> {
        self.query(&Request::hdel(&key, fields)).await
    }

    pub async fn hincrby(
        &self,
        key: impl AsRef<[u8]>,
        field: impl AsRef<[u8]>,
        delta: i64,
    ) -> Result<i64, Error> {
        self.query(&Request::hincrby(&key, &field, delta)).await
    }

    pub async fn hlen(&self, key: impl AsRef<[u8]>) -> Result<i64, Error> {
        self.query(&Request::hlen(&key)).await
    }

    // ── Lists ───────────────────────────────────────────────────────────

    /// Push to the head. Returns the new length.
    pub async fn lpush(&self, key: impl AsRef<[u8]>, values: &[impl AsRef<[u8]>]) -> Result<i64, Error> {
        self.query(&Request::lpush(&key, values)).await
    }

    /// Push to the tail. Returns the new length.
    pub async fn rpush(&self, key: impl AsRef<[u8]>, values: &[impl AsRef<[u8]>]) -> Result<i64, Error> {
        self.query(&Request::rpush(&key, values)).await
    }

    pub async fn lpop(&self, key: impl AsRef<[u8]>) -> Result<Option<Bytes>, Error> {
        self.query(&Request::lpop(&key, None)).await
    }

    pub async fn rpop(&self, key: impl AsRef<[u8]>) -> Result<Option<Bytes>, Error> {
        self.query(&Request::rpop(&key, None)).await
    }

    pub async fn lrange(&self, key: impl AsRef<[u8]>, start: i64, stop: i64) -> Result<Vec<Bytes>, Error> {
        self.query(&Request::lrange(&key, start, stop)).await
    }

    pub async fn llen(&self, key: impl AsRef<[u8]>) -> Result<i64, Error> {
        self.query(&Request::llen(&key)).await
    }

    // ── Sets ────────────────────────────────────────────────────────────

    pub async fn sadd(&self, key: impl AsRef<[u8]>, members: &[impl AsRef<[u8]>]) -> Result<i64, Error> {
        self.query(&Request::sadd(&key, members)).await
    }

    pub async fn srem(&self, key: impl AsRef<[u8]>, members: &[impl AsRef<[u8]>]) -> Result<i64, Error> {
        self.query(&Request::srem(&key, members)).await
    }

    pub async fn smembers(&self, key: impl AsRef<[u8]>) -> Result<Vec<Bytes>, Error> {
        self.query(&Request::smembers(&key)).await
    }

    pub async fn sismember(&self, key: impl AsRef<[u8]>, member: impl AsRef<[u8]>) -> Result<bool, Error> {
        self.query(&Request::sismember(&key, &member)).await
    }

    pub async fn scard(&self, key: impl AsRef<[u8]>) -> Result<i64, Error> {
        self.query(&Request::scard(&key)).await
    }

    // ── Sorted sets ─────────────────────────────────────────────────────

    /// Add scored members. Returns the number of new members.
    pub async fn zadd(&self, key: impl AsRef<[u8]>, members: &[ScoreMember<'_>]) -> Result<i64, Error> {
        self.query(&Request::zadd(&key, members)).await
    }

    pub async fn zscore(
        &self,
        key: impl AsRef<[u8]>,
        member: impl AsRef<[u8]>,
    ) -> Result<Option<f64>, Error> {
        self.query(&Request::zscore(&key, &member)).await
    }

    /// Members by rank, lowest score first.
    pub async fn zrange(&self, key: impl AsRef<[u8]>, start: i64, stop: i64) -> Result<Vec<Bytes>, Error> {
        self.query(&Request::zrange(&key, start, stop, false, false)).await
    }

    /// Members with their scores by rank.
    pub async fn zrange_with_scores(
        &self,
        key: impl AsRef<[u8]>,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(Bytes, f64)>, Error> {
        let flat: Vec<Value> = self
            .query(&Request::zrange(&key, start, stop, false, true))
            .await?;
        pairs(flat)
    }

    pub async fn zcard(&self, key: impl AsRef<[u8]>) -> Result<i64, Error> {
        self.query(&Request::zcard(&key)).await
    }

    // ── Geo ─────────────────────────────────────────────────────────────

    pub async fn geoadd(&self, key: impl AsRef<[u8]>, members: &[GeoMember<'_>]) -> Result<i64, Error> {
        self.query(&Request::geoadd(&key, members)).await
    }

    pub async fn geodist(
        &self,
        key: impl AsRef<[u8]>,
        member1: impl AsRef<[u8]>,
        member2: impl AsRef<[u8]>,
        unit: Option<GeoUnit>,
    ) -> Result<Option<f64>, Error> {
        self.query(&Request::geodist(&key, &member1, &member2, unit)).await
    }

    /// GEORADIUS. The reply shape depends on the `WITH*` options; with
    /// `STORE`/`STOREDIST` it is the number of stored members. Store keys
    /// must share the source key's slot.
    pub async fn georadius(
        &self,
        key: impl AsRef<[u8]>,
        longitude: f64,
        latitude: f64,
        radius: f64,
        unit: GeoUnit,
        options: &GeoRadiusOptions<'_>,
    ) -> Result<Value, Error> {
        self.execute(&Request::georadius(&key, longitude, latitude, radius, unit, options))
            .await
    }

    // ── Pub/Sub ─────────────────────────────────────────────────────────

    /// Publish a message. Returns the number of receivers.
    pub async fn publish(&self, channel: impl AsRef<[u8]>, message: impl AsRef<[u8]>) -> Result<i64, Error> {
        self.query(&Request::publish(&channel, &message)).await
    }

    // ── Server ──────────────────────────────────────────────────────────

    /// PING the default node.
    pub async fn ping(&self) -> Result<(), Error> {
        match self.execute(&Request::ping()).await? {
            Value::SimpleString(ref s) if &s[..] == b"PONG" => Ok(()),
            _ => Err(Error::UnexpectedResponse),
        }
    }

    /// INFO from a node, as text.
    pub async fn info(&self, address: &str, section: Option<&str>) -> Result<String, Error> {
        let reply = self.execute_on(address, &Request::info(section)).await?;
        Ok(resp_proto::FromValue::from_value(reply)?)
    }

    pub async fn dbsize(&self, address: &str) -> Result<i64, Error> {
        let reply = self.execute_on(address, &Request::dbsize()).await?;
        Ok(resp_proto::FromValue::from_value(reply)?)
    }

    /// Assign slots to a node.
    pub async fn cluster_addslots(&self, address: &str, slots: &[u16]) -> Result<(), Error> {
        self.execute_on(address, &Request::cluster_addslots(slots)).await?;
        Ok(())
    }
}

/// `[member, score, member, score, ...]` into pairs.
fn pairs(flat: Vec<Value>) -> Result<Vec<(Bytes, f64)>, Error> {
    if flat.len() % 2 != 0 {
        return Err(Error::UnexpectedResponse);
    }
    let mut out = Vec::with_capacity(flat.len() / 2);
    let mut iter = flat.into_iter();
    while let (Some(member), Some(score)) = (iter.next(), iter.next()) {
        out.push((
            resp_proto::FromValue::from_value(member)?,
            resp_proto::FromValue::from_value(score)?,
        ));
    }
    Ok(out)
}
