use crate::Request;
use crate::arg::KeyValue;
use crate::options::{BitOp, BitUnit, Condition, Expiration};
use crate::token::{cmd, kw};

/// Options for SET.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    pub expiration: Option<Expiration>,
    pub condition: Option<Condition>,
    /// Return the old value (`GET`).
    pub get: bool,
}

impl SetOptions {
    pub const fn new() -> Self {
        Self {
            expiration: None,
            condition: None,
            get: false,
        }
    }

    /// Expire after `seconds` (`EX`).
    pub const fn ex(mut self, seconds: u64) -> Self {
        self.expiration = Some(Expiration::Ex(seconds));
        self
    }

    /// Expire after `milliseconds` (`PX`).
    pub const fn px(mut self, milliseconds: u64) -> Self {
        self.expiration = Some(Expiration::Px(milliseconds));
        self
    }

    pub const fn exat(mut self, unix_seconds: u64) -> Self {
        self.expiration = Some(Expiration::ExAt(unix_seconds));
        self
    }

    pub const fn pxat(mut self, unix_milliseconds: u64) -> Self {
        self.expiration = Some(Expiration::PxAt(unix_milliseconds));
        self
    }

    pub const fn keep_ttl(mut self) -> Self {
        self.expiration = Some(Expiration::KeepTtl);
        self
    }

    /// Only set if the key does not exist.
    pub const fn nx(mut self) -> Self {
        self.condition = Some(Condition::Nx);
        self
    }

    /// Only set if the key exists.
    pub const fn xx(mut self) -> Self {
        self.condition = Some(Condition::Xx);
        self
    }

    pub const fn get(mut self) -> Self {
        self.get = true;
        self
    }
}

impl<'a> Request<'a> {
    /// Append an expiration option: `EX n`, `PX n`, ... or `KEEPTTL`.
    pub fn opt_expiration(self, expiration: Option<Expiration>) -> Self {
        match expiration.map(Expiration::parts) {
            Some((token, Some(n))) => self.keyword(token, n),
            Some((token, None)) => self.flag(token),
            None => self,
        }
    }

    pub fn get(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::GET).key(key)
    }

    pub fn set(key: &'a (impl AsRef<[u8]> + ?Sized), value: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::SET).key(key).bytes(value)
    }

    pub fn set_with(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        value: &'a (impl AsRef<[u8]> + ?Sized),
        options: SetOptions,
    ) -> Self {
        Request::set(key, value)
            .opt_expiration(options.expiration)
            .opt_flag(options.condition)
            .flag_if(options.get, kw::GET)
    }

    pub fn setex(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        seconds: u64,
        value: &'a (impl AsRef<[u8]> + ?Sized),
    ) -> Self {
        Request::new(cmd::SETEX).key(key).arg(seconds).bytes(value)
    }

    pub fn psetex(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        milliseconds: u64,
        value: &'a (impl AsRef<[u8]> + ?Sized),
    ) -> Self {
        Request::new(cmd::PSETEX).key(key).arg(milliseconds).bytes(value)
    }

    pub fn setnx(key: &'a (impl AsRef<[u8]> + ?Sized), value: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::SETNX).key(key).bytes(value)
    }

    pub fn getset(key: &'a (impl AsRef<[u8]> + ?Sized), value: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::GETSET).key(key).bytes(value)
    }

    pub fn getdel(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::GETDEL).key(key)
    }

    pub fn getrange(key: &'a (impl AsRef<[u8]> + ?Sized), start: i64, end: i64) -> Self {
        Request::new(cmd::GETRANGE).key(key).arg(start).arg(end)
    }

    pub fn setrange(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        offset: u64,
        value: &'a (impl AsRef<[u8]> + ?Sized),
    ) -> Self {
        Request::new(cmd::SETRANGE).key(key).arg(offset).bytes(value)
    }

    pub fn strlen(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::STRLEN).key(key)
    }

    pub fn append(key: &'a (impl AsRef<[u8]> + ?Sized), value: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::APPEND).key(key).bytes(value)
    }

    pub fn mget(keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::MGET)
            .keys(keys)
            .require(!keys.is_empty(), "at least one key is required")
    }

    pub fn mset(pairs: &[KeyValue<'a>]) -> Self {
        Request::new(cmd::MSET)
            .composites(pairs)
            .require(!pairs.is_empty(), "at least one key/value pair is required")
    }

    pub fn msetnx(pairs: &[KeyValue<'a>]) -> Self {
        Request::new(cmd::MSETNX)
            .composites(pairs)
            .require(!pairs.is_empty(), "at least one key/value pair is required")
    }

    pub fn incr(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::INCR).key(key)
    }

    pub fn incrby(key: &'a (impl AsRef<[u8]> + ?Sized), delta: i64) -> Self {
        Request::new(cmd::INCRBY).key(key).arg(delta)
    }

    pub fn incrbyfloat(key: &'a (impl AsRef<[u8]> + ?Sized), delta: f64) -> Self {
        Request::new(cmd::INCRBYFLOAT).key(key).arg(delta)
    }

    pub fn decr(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::DECR).key(key)
    }

    pub fn decrby(key: &'a (impl AsRef<[u8]> + ?Sized), delta: i64) -> Self {
        Request::new(cmd::DECRBY).key(key).arg(delta)
    }

    // bitmaps

    pub fn setbit(key: &'a (impl AsRef<[u8]> + ?Sized), offset: u64, bit: bool) -> Self {
        Request::new(cmd::SETBIT).key(key).arg(offset).arg(u64::from(bit))
    }

    pub fn getbit(key: &'a (impl AsRef<[u8]> + ?Sized), offset: u64) -> Self {
        Request::new(cmd::GETBIT).key(key).arg(offset)
    }

    pub fn bitcount(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::BITCOUNT).key(key)
    }

    /// BITCOUNT over `start..=end`, in bytes unless a unit is given.
    pub fn bitcount_range(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        start: i64,
        end: i64,
        unit: Option<BitUnit>,
    ) -> Self {
        Request::bitcount(key).arg(start).arg(end).opt_flag(unit)
    }

    /// BITOP with the destination key followed by the source keys.
    pub fn bitop(
        op: BitOp,
        destination: &'a (impl AsRef<[u8]> + ?Sized),
        sources: &'a [impl AsRef<[u8]>],
    ) -> Self {
        Request::new(cmd::BITOP)
            .arg(op)
            .key(destination)
            .keys(sources)
            .require(!sources.is_empty(), "at least one source key is required")
    }

    pub fn bitpos(key: &'a (impl AsRef<[u8]> + ?Sized), bit: bool) -> Self {
        Request::new(cmd::BITPOS).key(key).arg(u64::from(bit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::wire;

    #[test]
    fn test_set_scenario() {
        let encoded = Request::set("k", "v").encode().unwrap();
        assert_eq!(
            encoded.as_bytes(),
            b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n"
        );
    }

    #[test]
    fn test_set_options_slots() {
        let base = Request::set("k", "v").array_len();
        let opts = SetOptions::new().ex(10);
        assert_eq!(Request::set_with("k", "v", opts).array_len(), base + 2);
        let opts = SetOptions::new().keep_ttl();
        assert_eq!(Request::set_with("k", "v", opts).array_len(), base + 1);
        let opts = SetOptions::new().px(5).nx().get();
        assert_eq!(Request::set_with("k", "v", opts).array_len(), base + 4);
        assert_eq!(Request::set_with("k", "v", SetOptions::new()).array_len(), base);
    }

    #[test]
    fn test_set_with_wire_order() {
        let (frames, keys) = wire(Request::set_with("k", "v", SetOptions::new().ex(60).xx()));
        assert_eq!(frames, ["SET", "k", "v", "EX", "60", "XX"]);
        assert_eq!(keys, ["k"]);
    }

    #[test]
    fn test_mset_keys() {
        let pairs = [KeyValue::new("a", "1"), KeyValue::new("b", "2")];
        let (frames, keys) = wire(Request::mset(&pairs));
        assert_eq!(frames, ["MSET", "a", "1", "b", "2"]);
        assert_eq!(keys, ["a", "b"]);
        assert!(Request::mset(&[]).encode().is_err());
    }

    #[test]
    fn test_mget_requires_keys() {
        let empty: [&str; 0] = [];
        assert!(Request::mget(&empty).encode().is_err());
    }

    #[test]
    fn test_bitop_destination_then_sources() {
        let (frames, keys) = wire(Request::bitop(BitOp::And, "dest", &["s1", "s2"]));
        assert_eq!(frames, ["BITOP", "AND", "dest", "s1", "s2"]);
        assert_eq!(keys, ["dest", "s1", "s2"]);
    }

    #[test]
    fn test_numeric_arguments() {
        let (frames, _) = wire(Request::incrbyfloat("k", -0.5));
        assert_eq!(frames, ["INCRBYFLOAT", "k", "-0.5"]);
        let (frames, _) = wire(Request::bitcount_range("k", 0, -1, Some(BitUnit::Bit)));
        assert_eq!(frames, ["BITCOUNT", "k", "0", "-1", "BIT"]);
        let (frames, _) = wire(Request::setbit("k", 7, true));
        assert_eq!(frames, ["SETBIT", "k", "7", "1"]);
    }
}
