use crate::Request;
use crate::commands::ScanOptions;
use crate::token::cmd;

impl<'a> Request<'a> {
    pub fn sadd(key: &'a (impl AsRef<[u8]> + ?Sized), members: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::SADD)
            .key(key)
            .bytes_slice(members)
            .require(!members.is_empty(), "at least one member is required")
    }

    pub fn srem(key: &'a (impl AsRef<[u8]> + ?Sized), members: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::SREM)
            .key(key)
            .bytes_slice(members)
            .require(!members.is_empty(), "at least one member is required")
    }

    pub fn smembers(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::SMEMBERS).key(key)
    }

    pub fn sismember(key: &'a (impl AsRef<[u8]> + ?Sized), member: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::SISMEMBER).key(key).bytes(member)
    }

    pub fn smismember(key: &'a (impl AsRef<[u8]> + ?Sized), members: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::SMISMEMBER)
            .key(key)
            .bytes_slice(members)
            .require(!members.is_empty(), "at least one member is required")
    }

    pub fn scard(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::SCARD).key(key)
    }

    pub fn spop(key: &'a (impl AsRef<[u8]> + ?Sized), count: Option<u64>) -> Self {
        Request::new(cmd::SPOP).key(key).opt_arg(count)
    }

    /// SRANDMEMBER. A negative count may return duplicates.
    pub fn srandmember(key: &'a (impl AsRef<[u8]> + ?Sized), count: Option<i64>) -> Self {
        Request::new(cmd::SRANDMEMBER).key(key).opt_arg(count)
    }

    pub fn sinter(keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::SINTER)
            .keys(keys)
            .require(!keys.is_empty(), "at least one key is required")
    }

    pub fn sunion(keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::SUNION)
            .keys(keys)
            .require(!keys.is_empty(), "at least one key is required")
    }

    pub fn sdiff(keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::SDIFF)
            .keys(keys)
            .require(!keys.is_empty(), "at least one key is required")
    }

    pub fn sinterstore(destination: &'a (impl AsRef<[u8]> + ?Sized), keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::SINTERSTORE)
            .key(destination)
            .keys(keys)
            .require(!keys.is_empty(), "at least one source key is required")
    }

    pub fn sunionstore(destination: &'a (impl AsRef<[u8]> + ?Sized), keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::SUNIONSTORE)
            .key(destination)
            .keys(keys)
            .require(!keys.is_empty(), "at least one source key is required")
    }

    pub fn sdiffstore(destination: &'a (impl AsRef<[u8]> + ?Sized), keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::SDIFFSTORE)
            .key(destination)
            .keys(keys)
            .require(!keys.is_empty(), "at least one source key is required")
    }

    pub fn smove(
        source: &'a (impl AsRef<[u8]> + ?Sized),
        destination: &'a (impl AsRef<[u8]> + ?Sized),
        member: &'a (impl AsRef<[u8]> + ?Sized),
    ) -> Self {
        Request::new(cmd::SMOVE).key(source).key(destination).bytes(member)
    }

    pub fn sscan(key: &'a (impl AsRef<[u8]> + ?Sized), cursor: u64, options: &ScanOptions<'a>) -> Self {
        Request::new(cmd::SSCAN).key(key).arg(cursor).scan_options(options)
    }

    // hyperloglog

    pub fn pfadd(key: &'a (impl AsRef<[u8]> + ?Sized), elements: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::PFADD).key(key).bytes_slice(elements)
    }

    pub fn pfcount(keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::PFCOUNT)
            .keys(keys)
            .require(!keys.is_empty(), "at least one key is required")
    }

    pub fn pfmerge(destination: &'a (impl AsRef<[u8]> + ?Sized), sources: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::PFMERGE).key(destination).keys(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::wire;

    #[test]
    fn test_store_destination_first() {
        let (frames, keys) = wire(Request::sunionstore("{s}out", &["{s}a", "{s}b"]));
        assert_eq!(frames, ["SUNIONSTORE", "{s}out", "{s}a", "{s}b"]);
        assert_eq!(keys, ["{s}out", "{s}a", "{s}b"]);
    }

    #[test]
    fn test_members_are_not_keys() {
        let (_, keys) = wire(Request::sadd("s", &["m1", "m2"]));
        assert_eq!(keys, ["s"]);
    }

    #[test]
    fn test_pfadd_allows_no_elements() {
        let none: [&str; 0] = [];
        let (frames, _) = wire(Request::pfadd("hll", &none));
        assert_eq!(frames, ["PFADD", "hll"]);
    }

    #[test]
    fn test_srandmember_negative_count() {
        let (frames, _) = wire(Request::srandmember("s", Some(-2)));
        assert_eq!(frames, ["SRANDMEMBER", "s", "-2"]);
    }
}
