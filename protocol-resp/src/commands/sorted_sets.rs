use crate::Request;
use crate::arg::ScoreMember;
use crate::commands::ScanOptions;
use crate::options::{Aggregate, Comparison, Condition};
use crate::token::{Token, cmd, kw};

/// Options for ZADD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZAddOptions {
    pub condition: Option<Condition>,
    pub comparison: Option<Comparison>,
    /// Return the number of changed elements instead of added ones.
    pub changed: bool,
    /// Act like ZINCRBY; takes exactly one score/member pair.
    pub incr: bool,
}

/// Options for ZUNIONSTORE and ZINTERSTORE.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZStoreOptions<'a> {
    pub weights: Option<&'a [f64]>,
    pub aggregate: Option<Aggregate>,
}

impl<'a> Request<'a> {
    pub fn zadd(key: &'a (impl AsRef<[u8]> + ?Sized), members: &[ScoreMember<'a>]) -> Self {
        Request::zadd_with(key, ZAddOptions::default(), members)
    }

    pub fn zadd_with(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        options: ZAddOptions,
        members: &[ScoreMember<'a>],
    ) -> Self {
        Request::new(cmd::ZADD)
            .key(key)
            .opt_flag(options.condition)
            .opt_flag(options.comparison)
            .flag_if(options.changed, kw::CH)
            .flag_if(options.incr, kw::INCR)
            .composites(members)
            .require(!members.is_empty(), "at least one score/member pair is required")
            .require(!options.incr || members.len() == 1, "INCR takes exactly one score/member pair")
    }

    pub fn zrem(key: &'a (impl AsRef<[u8]> + ?Sized), members: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::ZREM)
            .key(key)
            .bytes_slice(members)
            .require(!members.is_empty(), "at least one member is required")
    }

    pub fn zscore(key: &'a (impl AsRef<[u8]> + ?Sized), member: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::ZSCORE).key(key).bytes(member)
    }

    pub fn zincrby(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        delta: f64,
        member: &'a (impl AsRef<[u8]> + ?Sized),
    ) -> Self {
        Request::new(cmd::ZINCRBY).key(key).arg(delta).bytes(member)
    }

    pub fn zcard(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::ZCARD).key(key)
    }

    /// ZCOUNT over an inclusive score range. Infinite bounds are allowed.
    pub fn zcount(key: &'a (impl AsRef<[u8]> + ?Sized), min: f64, max: f64) -> Self {
        Request::new(cmd::ZCOUNT).key(key).arg(min).arg(max)
    }

    pub fn zrank(key: &'a (impl AsRef<[u8]> + ?Sized), member: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::ZRANK).key(key).bytes(member)
    }

    pub fn zrevrank(key: &'a (impl AsRef<[u8]> + ?Sized), member: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::ZREVRANK).key(key).bytes(member)
    }

    /// ZRANGE by index.
    pub fn zrange(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        start: i64,
        stop: i64,
        rev: bool,
        with_scores: bool,
    ) -> Self {
        Request::new(cmd::ZRANGE)
            .key(key)
            .arg(start)
            .arg(stop)
            .flag_if(rev, kw::REV)
            .flag_if(with_scores, kw::WITHSCORES)
    }

    /// ZRANGEBYSCORE over an inclusive score range, optionally paged with
    /// `LIMIT offset count`.
    pub fn zrangebyscore(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        min: f64,
        max: f64,
        with_scores: bool,
        limit: Option<(i64, i64)>,
    ) -> Self {
        let req = Request::new(cmd::ZRANGEBYSCORE)
            .key(key)
            .arg(min)
            .arg(max)
            .flag_if(with_scores, kw::WITHSCORES);
        match limit {
            Some((offset, count)) => req.flag(kw::LIMIT).arg(offset).arg(count),
            None => req,
        }
    }

    pub fn zremrangebyrank(key: &'a (impl AsRef<[u8]> + ?Sized), start: i64, stop: i64) -> Self {
        Request::new(cmd::ZREMRANGEBYRANK).key(key).arg(start).arg(stop)
    }

    pub fn zremrangebyscore(key: &'a (impl AsRef<[u8]> + ?Sized), min: f64, max: f64) -> Self {
        Request::new(cmd::ZREMRANGEBYSCORE).key(key).arg(min).arg(max)
    }

    pub fn zunionstore(
        destination: &'a (impl AsRef<[u8]> + ?Sized),
        keys: &'a [impl AsRef<[u8]>],
        options: &ZStoreOptions<'a>,
    ) -> Self {
        Request::zstore(cmd::ZUNIONSTORE, destination.as_ref(), keys, options)
    }

    pub fn zinterstore(
        destination: &'a (impl AsRef<[u8]> + ?Sized),
        keys: &'a [impl AsRef<[u8]>],
        options: &ZStoreOptions<'a>,
    ) -> Self {
        Request::zstore(cmd::ZINTERSTORE, destination.as_ref(), keys, options)
    }

    /// `destination numkeys key... [WEIGHTS w...] [AGGREGATE mode]`
    fn zstore(
        command: Token,
        destination: &'a [u8],
        keys: &'a [impl AsRef<[u8]>],
        options: &ZStoreOptions<'a>,
    ) -> Self {
        let mut req = Request::new(command)
            .key(destination)
            .arg(keys.len())
            .keys(keys)
            .require(!keys.is_empty(), "at least one source key is required");
        if let Some(weights) = options.weights {
            req = req
                .require(weights.len() == keys.len(), "one weight per source key is required")
                .flag(kw::WEIGHTS)
                .args(weights.iter().copied());
        }
        req.opt_keyword(kw::AGGREGATE, options.aggregate)
    }

    pub fn zpopmin(key: &'a (impl AsRef<[u8]> + ?Sized), count: Option<u64>) -> Self {
        Request::new(cmd::ZPOPMIN).key(key).opt_arg(count)
    }

    pub fn zpopmax(key: &'a (impl AsRef<[u8]> + ?Sized), count: Option<u64>) -> Self {
        Request::new(cmd::ZPOPMAX).key(key).opt_arg(count)
    }

    pub fn zscan(key: &'a (impl AsRef<[u8]> + ?Sized), cursor: u64, options: &ScanOptions<'a>) -> Self {
        Request::new(cmd::ZSCAN).key(key).arg(cursor).scan_options(options)
    }
}
