use crate::Request;
use crate::options::{InsertPosition, ListSide};
use crate::token::cmd;

impl<'a> Request<'a> {
    pub fn lpush(key: &'a (impl AsRef<[u8]> + ?Sized), values: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::LPUSH)
            .key(key)
            .bytes_slice(values)
            .require(!values.is_empty(), "at least one value is required")
    }

    pub fn rpush(key: &'a (impl AsRef<[u8]> + ?Sized), values: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::RPUSH)
            .key(key)
            .bytes_slice(values)
            .require(!values.is_empty(), "at least one value is required")
    }

    pub fn lpushx(key: &'a (impl AsRef<[u8]> + ?Sized), values: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::LPUSHX)
            .key(key)
            .bytes_slice(values)
            .require(!values.is_empty(), "at least one value is required")
    }

    pub fn rpushx(key: &'a (impl AsRef<[u8]> + ?Sized), values: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::RPUSHX)
            .key(key)
            .bytes_slice(values)
            .require(!values.is_empty(), "at least one value is required")
    }

    pub fn lpop(key: &'a (impl AsRef<[u8]> + ?Sized), count: Option<u64>) -> Self {
        Request::new(cmd::LPOP).key(key).opt_arg(count)
    }

    pub fn rpop(key: &'a (impl AsRef<[u8]> + ?Sized), count: Option<u64>) -> Self {
        Request::new(cmd::RPOP).key(key).opt_arg(count)
    }

    pub fn llen(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::LLEN).key(key)
    }

    pub fn lrange(key: &'a (impl AsRef<[u8]> + ?Sized), start: i64, stop: i64) -> Self {
        Request::new(cmd::LRANGE).key(key).arg(start).arg(stop)
    }

    pub fn lindex(key: &'a (impl AsRef<[u8]> + ?Sized), index: i64) -> Self {
        Request::new(cmd::LINDEX).key(key).arg(index)
    }

    pub fn lset(key: &'a (impl AsRef<[u8]> + ?Sized), index: i64, value: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::LSET).key(key).arg(index).bytes(value)
    }

    pub fn ltrim(key: &'a (impl AsRef<[u8]> + ?Sized), start: i64, stop: i64) -> Self {
        Request::new(cmd::LTRIM).key(key).arg(start).arg(stop)
    }

    pub fn lrem(key: &'a (impl AsRef<[u8]> + ?Sized), count: i64, value: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::LREM).key(key).arg(count).bytes(value)
    }

    pub fn linsert(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        position: InsertPosition,
        pivot: &'a (impl AsRef<[u8]> + ?Sized),
        value: &'a (impl AsRef<[u8]> + ?Sized),
    ) -> Self {
        Request::new(cmd::LINSERT)
            .key(key)
            .arg(position)
            .bytes(pivot)
            .bytes(value)
    }

    pub fn lmove(
        source: &'a (impl AsRef<[u8]> + ?Sized),
        destination: &'a (impl AsRef<[u8]> + ?Sized),
        from: ListSide,
        to: ListSide,
    ) -> Self {
        Request::new(cmd::LMOVE)
            .key(source)
            .key(destination)
            .arg(from)
            .arg(to)
    }

    pub fn rpoplpush(
        source: &'a (impl AsRef<[u8]> + ?Sized),
        destination: &'a (impl AsRef<[u8]> + ?Sized),
    ) -> Self {
        Request::new(cmd::RPOPLPUSH).key(source).key(destination)
    }

    /// BLPOP with a timeout in seconds (0 blocks indefinitely).
    pub fn blpop(keys: &'a [impl AsRef<[u8]>], timeout: f64) -> Self {
        Request::new(cmd::BLPOP)
            .keys(keys)
            .arg(timeout)
            .require(!keys.is_empty(), "at least one key is required")
    }

    pub fn brpop(keys: &'a [impl AsRef<[u8]>], timeout: f64) -> Self {
        Request::new(cmd::BRPOP)
            .keys(keys)
            .arg(timeout)
            .require(!keys.is_empty(), "at least one key is required")
    }
}
