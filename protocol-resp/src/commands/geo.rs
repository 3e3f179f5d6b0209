use crate::Request;
use crate::arg::GeoMember;
use crate::options::{Condition, GeoUnit, SortOrder};
use crate::token::{cmd, kw};

/// Options for GEORADIUS and GEORADIUSBYMEMBER.
///
/// `store` and `store_dist` name destination keys; when present they are
/// partition keys, after the source key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeoRadiusOptions<'a> {
    pub with_coord: bool,
    pub with_dist: bool,
    pub with_hash: bool,
    pub count: Option<u64>,
    /// Return as soon as `count` matches are found. Requires `count`.
    pub any: bool,
    pub order: Option<SortOrder>,
    pub store: Option<&'a [u8]>,
    pub store_dist: Option<&'a [u8]>,
}

impl<'a> GeoRadiusOptions<'a> {
    pub fn store(mut self, key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        self.store = Some(key.as_ref());
        self
    }

    pub fn store_dist(mut self, key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        self.store_dist = Some(key.as_ref());
        self
    }

    pub fn count(mut self, count: u64, any: bool) -> Self {
        self.count = Some(count);
        self.any = any;
        self
    }
}

impl<'a> Request<'a> {
    /// `[WITHCOORD] [WITHDIST] [WITHHASH] [COUNT n [ANY]] [ASC|DESC]
    /// [STORE key] [STOREDIST key]`
    fn radius_options(self, options: &GeoRadiusOptions<'a>) -> Self {
        self.flag_if(options.with_coord, kw::WITHCOORD)
            .flag_if(options.with_dist, kw::WITHDIST)
            .flag_if(options.with_hash, kw::WITHHASH)
            .opt_keyword(kw::COUNT, options.count)
            .flag_if(options.any && options.count.is_some(), kw::ANY)
            .require(!options.any || options.count.is_some(), "ANY requires COUNT")
            .opt_flag(options.order)
            .opt_keyword_key(kw::STORE, options.store)
            .opt_keyword_key(kw::STOREDIST, options.store_dist)
    }

    pub fn geoadd(key: &'a (impl AsRef<[u8]> + ?Sized), members: &[GeoMember<'a>]) -> Self {
        Request::geoadd_with(key, None, false, members)
    }

    pub fn geoadd_with(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        condition: Option<Condition>,
        changed: bool,
        members: &[GeoMember<'a>],
    ) -> Self {
        Request::new(cmd::GEOADD)
            .key(key)
            .opt_flag(condition)
            .flag_if(changed, kw::CH)
            .composites(members)
            .require(!members.is_empty(), "at least one member is required")
    }

    pub fn geodist(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        member1: &'a (impl AsRef<[u8]> + ?Sized),
        member2: &'a (impl AsRef<[u8]> + ?Sized),
        unit: Option<GeoUnit>,
    ) -> Self {
        Request::new(cmd::GEODIST)
            .key(key)
            .bytes(member1)
            .bytes(member2)
            .opt_flag(unit)
    }

    pub fn geopos(key: &'a (impl AsRef<[u8]> + ?Sized), members: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::GEOPOS).key(key).bytes_slice(members)
    }

    pub fn geohash(key: &'a (impl AsRef<[u8]> + ?Sized), members: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::GEOHASH).key(key).bytes_slice(members)
    }

    pub fn georadius(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        longitude: f64,
        latitude: f64,
        radius: f64,
        unit: GeoUnit,
        options: &GeoRadiusOptions<'a>,
    ) -> Self {
        Request::new(cmd::GEORADIUS)
            .key(key)
            .arg(longitude)
            .arg(latitude)
            .arg(radius)
            .arg(unit)
            .radius_options(options)
    }

    pub fn georadiusbymember(
        key: &'a (impl AsRef<[u8]> + ?Sized),
        member: &'a (impl AsRef<[u8]> + ?Sized),
        radius: f64,
        unit: GeoUnit,
        options: &GeoRadiusOptions<'a>,
    ) -> Self {
        Request::new(cmd::GEORADIUSBYMEMBER)
            .key(key)
            .bytes(member)
            .arg(radius)
            .arg(unit)
            .radius_options(options)
    }
}
