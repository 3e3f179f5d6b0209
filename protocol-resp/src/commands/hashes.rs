use crate::Request;
use crate::arg::FieldValue;
use crate::commands::ScanOptions;
use crate::token::cmd;

impl<'a> Request<'a> {
    pub fn hset(key: &'a (impl AsRef<[u8]> + ?Sized), pairs: &[FieldValue<'a>]) -> Self {
        Request::new(cmd::HSET)
            .key(key)
            .composites(pairs)
            .require(!pairs.is_empty(), "at least one field/value pair is required")
    }

    pub fn hsetnx(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        field: &'a (impl AsRef<[u8]> + ?Sized),
        value: &'a (impl AsRef<[u8]> + ?Sized),
    ) -> Self {
        Request::new(cmd::HSETNX).key(key).bytes(field).bytes(value)
    }

    pub fn hget(key: &'a (impl AsRef<[u8]> + ?Sized), field: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::HGET).key(key).bytes(field)
    }

    pub fn hmget(key: &'a (impl AsRef<[u8]> + ?Sized), fields: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::HMGET)
            .key(key)
            .bytes_slice(fields)
            .require(!fields.is_empty(), "at least one field is required")
    }

    pub fn hgetall(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::HGETALL).key(key)
    }

    pub fn hdel(key: &'a (impl AsRef<[u8]> + ?Sized), fields: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::HDEL)
            .key(key)
            .bytes_slice(fields)
            .require(!fields.is_empty(), "at least one field is required")
    }

    pub fn hexists(key: &'a (impl AsRef<[u8]> + ?Sized), field: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::HEXISTS).key(key).bytes(field)
    }

    pub fn hlen(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::HLEN).key(key)
    }

    pub fn hkeys(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::HKEYS).key(key)
    }

    pub fn hvals(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::HVALS).key(key)
    }

    pub fn hincrby(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        field: &'a (impl AsRef<[u8]> + ?Sized),
        delta: i64,
    ) -> Self {
        Request::new(cmd::HINCRBY).key(key).bytes(field).arg(delta)
    }

    pub fn hincrbyfloat(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        field: &'a (impl AsRef<[u8]> + ?Sized),
        delta: f64,
    ) -> Self {
        Request::new(cmd::HINCRBYFLOAT).key(key).bytes(field).arg(delta)
    }

    pub fn hscan(key: &'a (impl AsRef<[u8]> + ?Sized), cursor: u64, options: &ScanOptions<'a>) -> Self {
        Request::new(cmd::HSCAN).key(key).arg(cursor).scan_options(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::wire;

    #[test]
    fn test_hset_pairs() {
        let pairs = [FieldValue::new("f1", "v1"), FieldValue::new("f2", "v2")];
        let encoded = Request::hset("h", &pairs).encode().unwrap();
        assert_eq!(encoded.array_len(), 2 + pairs.len() * 2);
        let (frames, keys) = wire(Request::hset("h", &pairs));
        assert_eq!(frames, ["HSET", "h", "f1", "v1", "f2", "v2"]);
        assert_eq!(keys, ["h"]);
    }

    #[test]
    fn test_hmget_fields_are_not_keys() {
        let (frames, keys) = wire(Request::hmget("h", &["a", "b"]));
        assert_eq!(frames, ["HMGET", "h", "a", "b"]);
        assert_eq!(keys, ["h"]);
    }

    #[test]
    fn test_empty_variadics_rejected() {
        let none: [&str; 0] = [];
        assert!(Request::hdel("h", &none).encode().is_err());
        assert!(Request::hset("h", &[]).encode().is_err());
    }

    #[test]
    fn test_hscan() {
        let opts = ScanOptions::default().count(10);
        let (frames, _) = wire(Request::hscan("h", 5, &opts));
        assert_eq!(frames, ["HSCAN", "h", "5", "COUNT", "10"]);
    }
}
