use crate::Request;
use crate::token::{Token, cmd};

impl<'a> Request<'a> {
    pub fn multi() -> Self {
        Request::new(cmd::MULTI)
    }

    pub fn exec() -> Self {
        Request::new(cmd::EXEC)
    }

    pub fn discard() -> Self {
        Request::new(cmd::DISCARD)
    }

    pub fn watch(keys: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::WATCH)
            .keys(keys)
            .require(!keys.is_empty(), "at least one key is required")
    }

    pub fn unwatch() -> Self {
        Request::new(cmd::UNWATCH)
    }

    /// EVAL with its declared keys (partition keys) and plain arguments.
    pub fn eval(
        script: &'a str,
        keys: &'a [impl AsRef<[u8]>],
        args: &'a [impl AsRef<[u8]>],
    ) -> Self {
        Request::script(cmd::EVAL, script, keys, args)
    }

    pub fn evalsha(
        sha1: &'a str,
        keys: &'a [impl AsRef<[u8]>],
        args: &'a [impl AsRef<[u8]>],
    ) -> Self {
        Request::script(cmd::EVALSHA, sha1, keys, args)
    }

    /// `script numkeys key... arg...`
    fn script(
        command: Token,
        script: &'a str,
        keys: &'a [impl AsRef<[u8]>],
        args: &'a [impl AsRef<[u8]>],
    ) -> Self {
        Request::new(command)
            .require(!script.is_empty(), "script must not be empty")
            .arg(script)
            .arg(keys.len())
            .keys(keys)
            .bytes_slice(args)
    }
}
