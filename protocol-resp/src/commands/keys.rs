use crate::Request;
use crate::options::Condition;
use crate::token::{cmd, kw};

/// Options shared by SCAN, HSCAN, SSCAN and ZSCAN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions<'a> {
    pub pattern: Option<&'a [u8]>,
    pub count: Option<u64>,
    /// Only honored by SCAN.
    pub kind: Option<&'a str>,
}

impl<'a> ScanOptions<'a> {
    pub fn pattern(mut self, pattern: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        self.pattern = Some(pattern.as_ref());
        self
    }

    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn kind(mut self, kind: &'a str) -> Self {
        self.kind = Some(kind);
        self
    }
}

impl<'a> Request<'a> {
    /// Append `MATCH pattern` and `COUNT n` when present.
    pub(crate) fn scan_options(self, options: &ScanOptions<'a>) -> Self {
        self.opt_keyword(kw::MATCH, options.pattern)
            .opt_keyword(kw::COUNT, options.count)
    }

    pub fn del(keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::DEL)
            .keys(keys)
            .require(!keys.is_empty(), "at least one key is required")
    }

    pub fn unlink(keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::UNLINK)
            .keys(keys)
            .require(!keys.is_empty(), "at least one key is required")
    }

    pub fn exists(keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::EXISTS)
            .keys(keys)
            .require(!keys.is_empty(), "at least one key is required")
    }

    pub fn touch(keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::TOUCH)
            .keys(keys)
            .require(!keys.is_empty(), "at least one key is required")
    }

    pub fn expire(key: &'a (impl AsRef<[u8]> + ?Sized), seconds: i64, condition: Option<Condition>) -> Self {
        Request::new(cmd::EXPIRE).key(key).arg(seconds).opt_flag(condition)
    }

    pub fn pexpire(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        milliseconds: i64,
        condition: Option<Condition>,
    ) -> Self {
        Request::new(cmd::PEXPIRE).key(key).arg(milliseconds).opt_flag(condition)
    }

    pub fn expireat(key: &'a (impl AsRef<[u8]> + ?Sized), unix_seconds: u64) -> Self {
        Request::new(cmd::EXPIREAT).key(key).arg(unix_seconds)
    }

    pub fn persist(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::PERSIST).key(key)
    }

    pub fn ttl(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::TTL).key(key)
    }

    pub fn pttl(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::PTTL).key(key)
    }

    /// TYPE
    pub fn key_type(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::TYPE).key(key)
    }

    pub fn rename(from: &'a (impl AsRef<[u8]> + ?Sized), to: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::RENAME).key(from).key(to)
    }

    pub fn renamenx(from: &'a (impl AsRef<[u8]> + ?Sized), to: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::RENAMENX).key(from).key(to)
    }

    /// KEYS. The pattern is not a partition key.
    pub fn keys_matching(pattern: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::KEYS).bytes(pattern)
    }

    pub fn scan(cursor: u64, options: &ScanOptions<'a>) -> Self {
        Request::new(cmd::SCAN)
            .arg(cursor)
            .scan_options(options)
            .opt_keyword(kw::TYPE, options.kind)
    }

    pub fn randomkey() -> Self {
        Request::new(cmd::RANDOMKEY)
    }
}
