//! Interned command, sub-command and keyword tokens.
//!
//! A [`Token`] is a `'static` upper-case byte string together with the size of
//! its bulk string frame, computed at compile time. Tokens are grouped in three
//! tables: [`cmd`] for top-level commands, [`sub`] for sub-commands (the second
//! word of `CLUSTER ADDSLOTS`, `CONFIG GET`, ...) and [`kw`] for option
//! keywords such as `MATCH` or `WITHSCORES`.

use std::fmt;

use bytes::BufMut;

use crate::size;

/// An immutable wire token with its precomputed frame size.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    name: &'static [u8],
    frame_len: usize,
}

impl Token {
    /// Intern a token. The frame size is computed once, at compile time for
    /// tokens declared as constants.
    pub const fn new(name: &'static [u8]) -> Self {
        Self {
            name,
            frame_len: size::bulk_len(name.len()),
        }
    }

    /// The token bytes, e.g. `b"ZADD"`.
    #[inline]
    pub const fn as_bytes(&self) -> &'static [u8] {
        self.name
    }

    /// Size of the token's bulk string frame: `$<len>\r\n<name>\r\n`.
    #[inline]
    pub const fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Append the token's bulk string frame.
    #[inline]
    pub fn write<B: BufMut>(&self, out: &mut B) {
        let mut len = itoa::Buffer::new();
        out.put_u8(b'$');
        out.put_slice(len.format(self.name.len()).as_bytes());
        out.put_slice(b"\r\n");
        out.put_slice(self.name);
        out.put_slice(b"\r\n");
    }

    /// Find the command token with the given name, ignoring ASCII case.
    pub fn lookup(name: &[u8]) -> Option<Token> {
        if name.is_empty() {
            return None;
        }
        cmd::ALL
            .iter()
            .copied()
            .find(|token| token.name.eq_ignore_ascii_case(name))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", String::from_utf8_lossy(self.name))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.name))
    }
}

macro_rules! tokens {
    ($($ident:ident = $name:literal),* $(,)?) => {
        use super::Token;

        $(
            #[doc = concat!("`", stringify!($ident), "`")]
            pub const $ident: Token = Token::new($name);
        )*

        /// Every token in this table, in declaration order.
        pub static ALL: &[Token] = &[$($ident),*];
    };
}

/// Top-level commands.
pub mod cmd {
    tokens! {
        // connection / server
        PING = b"PING",
        ECHO = b"ECHO",
        INFO = b"INFO",
        DBSIZE = b"DBSIZE",
        FLUSHDB = b"FLUSHDB",
        FLUSHALL = b"FLUSHALL",
        TIME = b"TIME",
        CONFIG = b"CONFIG",
        CLIENT = b"CLIENT",
        CLUSTER = b"CLUSTER",
        MONITOR = b"MONITOR",
        RESET = b"RESET",
        READONLY = b"READONLY",
        READWRITE = b"READWRITE",
        ASKING = b"ASKING",
        // strings
        GET = b"GET",
        SET = b"SET",
        SETEX = b"SETEX",
        PSETEX = b"PSETEX",
        SETNX = b"SETNX",
        GETSET = b"GETSET",
        GETDEL = b"GETDEL",
        GETRANGE = b"GETRANGE",
        SETRANGE = b"SETRANGE",
        STRLEN = b"STRLEN",
        APPEND = b"APPEND",
        MGET = b"MGET",
        MSET = b"MSET",
        MSETNX = b"MSETNX",
        INCR = b"INCR",
        INCRBY = b"INCRBY",
        INCRBYFLOAT = b"INCRBYFLOAT",
        DECR = b"DECR",
        DECRBY = b"DECRBY",
        // bitmaps
        SETBIT = b"SETBIT",
        GETBIT = b"GETBIT",
        BITCOUNT = b"BITCOUNT",
        BITOP = b"BITOP",
        BITPOS = b"BITPOS",
        // keys
        DEL = b"DEL",
        UNLINK = b"UNLINK",
        EXISTS = b"EXISTS",
        EXPIRE = b"EXPIRE",
        PEXPIRE = b"PEXPIRE",
        EXPIREAT = b"EXPIREAT",
        PERSIST = b"PERSIST",
        TTL = b"TTL",
        PTTL = b"PTTL",
        TYPE = b"TYPE",
        RENAME = b"RENAME",
        RENAMENX = b"RENAMENX",
        TOUCH = b"TOUCH",
        KEYS = b"KEYS",
        SCAN = b"SCAN",
        RANDOMKEY = b"RANDOMKEY",
        // hashes
        HSET = b"HSET",
        HSETNX = b"HSETNX",
        HGET = b"HGET",
        HMGET = b"HMGET",
        HGETALL = b"HGETALL",
        HDEL = b"HDEL",
        HEXISTS = b"HEXISTS",
        HLEN = b"HLEN",
        HKEYS = b"HKEYS",
        HVALS = b"HVALS",
        HINCRBY = b"HINCRBY",
        HINCRBYFLOAT = b"HINCRBYFLOAT",
        HSCAN = b"HSCAN",
        // lists
        LPUSH = b"LPUSH",
        RPUSH = b"RPUSH",
        LPUSHX = b"LPUSHX",
        RPUSHX = b"RPUSHX",
        LPOP = b"LPOP",
        RPOP = b"RPOP",
        LLEN = b"LLEN",
        LRANGE = b"LRANGE",
        LINDEX = b"LINDEX",
        LSET = b"LSET",
        LTRIM = b"LTRIM",
        LREM = b"LREM",
        LINSERT = b"LINSERT",
        LMOVE = b"LMOVE",
        RPOPLPUSH = b"RPOPLPUSH",
        BLPOP = b"BLPOP",
        BRPOP = b"BRPOP",
        // sets
        SADD = b"SADD",
        SREM = b"SREM",
        SMEMBERS = b"SMEMBERS",
        SISMEMBER = b"SISMEMBER",
        SMISMEMBER = b"SMISMEMBER",
        SCARD = b"SCARD",
        SPOP = b"SPOP",
        SRANDMEMBER = b"SRANDMEMBER",
        SINTER = b"SINTER",
        SUNION = b"SUNION",
        SDIFF = b"SDIFF",
        SINTERSTORE = b"SINTERSTORE",
        SUNIONSTORE = b"SUNIONSTORE",
        SDIFFSTORE = b"SDIFFSTORE",
        SMOVE = b"SMOVE",
        SSCAN = b"SSCAN",
        // sorted sets
        ZADD = b"ZADD",
        ZREM = b"ZREM",
        ZSCORE = b"ZSCORE",
        ZINCRBY = b"ZINCRBY",
        ZCARD = b"ZCARD",
        ZCOUNT = b"ZCOUNT",
        ZRANK = b"ZRANK",
        ZREVRANK = b"ZREVRANK",
        ZRANGE = b"ZRANGE",
        ZRANGEBYSCORE = b"ZRANGEBYSCORE",
        ZREMRANGEBYRANK = b"ZREMRANGEBYRANK",
        ZREMRANGEBYSCORE = b"ZREMRANGEBYSCORE",
        ZUNIONSTORE = b"ZUNIONSTORE",
        ZINTERSTORE = b"ZINTERSTORE",
        ZPOPMIN = b"ZPOPMIN",
        ZPOPMAX = b"ZPOPMAX",
        ZSCAN = b"ZSCAN",
        // geo
        GEOADD = b"GEOADD",
        GEODIST = b"GEODIST",
        GEOPOS = b"GEOPOS",
        GEOHASH = b"GEOHASH",
        GEORADIUS = b"GEORADIUS",
        GEORADIUSBYMEMBER = b"GEORADIUSBYMEMBER",
        // hyperloglog
        PFADD = b"PFADD",
        PFCOUNT = b"PFCOUNT",
        PFMERGE = b"PFMERGE",
        // pub/sub
        PUBLISH = b"PUBLISH",
        SUBSCRIBE = b"SUBSCRIBE",
        UNSUBSCRIBE = b"UNSUBSCRIBE",
        PSUBSCRIBE = b"PSUBSCRIBE",
        PUNSUBSCRIBE = b"PUNSUBSCRIBE",
        PUBSUB = b"PUBSUB",
        // transactions
        MULTI = b"MULTI",
        EXEC = b"EXEC",
        DISCARD = b"DISCARD",
        WATCH = b"WATCH",
        UNWATCH = b"UNWATCH",
        // scripting
        EVAL = b"EVAL",
        EVALSHA = b"EVALSHA",
    }
}

/// Sub-commands: the token that follows a container command.
pub mod sub {
    tokens! {
        ADDSLOTS = b"ADDSLOTS",
        DELSLOTS = b"DELSLOTS",
        COUNTKEYSINSLOT = b"COUNTKEYSINSLOT",
        GETKEYSINSLOT = b"GETKEYSINSLOT",
        KEYSLOT = b"KEYSLOT",
        SLOTS = b"SLOTS",
        NODES = b"NODES",
        INFO = b"INFO",
        MYID = b"MYID",
        MEET = b"MEET",
        FORGET = b"FORGET",
        REPLICATE = b"REPLICATE",
        GET = b"GET",
        SET = b"SET",
        RESETSTAT = b"RESETSTAT",
        REWRITE = b"REWRITE",
        SETNAME = b"SETNAME",
        GETNAME = b"GETNAME",
        ID = b"ID",
        LIST = b"LIST",
        CHANNELS = b"CHANNELS",
        NUMSUB = b"NUMSUB",
        NUMPAT = b"NUMPAT",
    }
}

/// Option keywords and enum flags.
pub mod kw {
    tokens! {
        NX = b"NX",
        XX = b"XX",
        GT = b"GT",
        LT = b"LT",
        CH = b"CH",
        INCR = b"INCR",
        EX = b"EX",
        PX = b"PX",
        EXAT = b"EXAT",
        PXAT = b"PXAT",
        KEEPTTL = b"KEEPTTL",
        GET = b"GET",
        MATCH = b"MATCH",
        COUNT = b"COUNT",
        TYPE = b"TYPE",
        ANY = b"ANY",
        WITHSCORES = b"WITHSCORES",
        LIMIT = b"LIMIT",
        REV = b"REV",
        BYSCORE = b"BYSCORE",
        BYLEX = b"BYLEX",
        WEIGHTS = b"WEIGHTS",
        AGGREGATE = b"AGGREGATE",
        SUM = b"SUM",
        MIN = b"MIN",
        MAX = b"MAX",
        ASC = b"ASC",
        DESC = b"DESC",
        WITHCOORD = b"WITHCOORD",
        WITHDIST = b"WITHDIST",
        WITHHASH = b"WITHHASH",
        STORE = b"STORE",
        STOREDIST = b"STOREDIST",
        M = b"m",
        KM = b"km",
        MI = b"mi",
        FT = b"ft",
        AND = b"AND",
        OR = b"OR",
        XOR = b"XOR",
        NOT = b"NOT",
        BYTE = b"BYTE",
        BIT = b"BIT",
        LEFT = b"LEFT",
        RIGHT = b"RIGHT",
        BEFORE = b"BEFORE",
        AFTER = b"AFTER",
        ASYNC = b"ASYNC",
        SYNC = b"SYNC",
    }
}
