use crate::Request;
use crate::token::{cmd, sub};

impl<'a> Request<'a> {
    /// PUBLISH. Channels are not partition keys: cluster pub/sub messages
    /// propagate to every node.
    pub fn publish(channel: &'a (impl AsRef<[u8]> + ?Sized), message: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::PUBLISH).bytes(channel).bytes(message)
    }

    pub fn subscribe(channels: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::SUBSCRIBE)
            .bytes_slice(channels)
            .require(!channels.is_empty(), "at least one channel is required")
    }

    pub fn psubscribe(patterns: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::PSUBSCRIBE)
            .bytes_slice(patterns)
            .require(!patterns.is_empty(), "at least one pattern is required")
    }

    /// UNSUBSCRIBE. No channels means every channel.
    pub fn unsubscribe(channels: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::UNSUBSCRIBE).bytes_slice(channels)
    }

    /// PUNSUBSCRIBE. No patterns means every pattern.
    pub fn punsubscribe(patterns: &'a [impl AsRef<[u8]>]) -> Self {
        Request::new(cmd::PUNSUBSCRIBE).bytes_slice(patterns)
    }

    pub fn pubsub_channels(pattern: Option<&'a str>) -> Self {
        Request::with_subcommand(cmd::PUBSUB, sub::CHANNELS).opt_arg(pattern)
    }

    pub fn pubsub_numsub(channels: &'a [impl AsRef<[u8]>]) -> Self {
        Request::with_subcommand(cmd::PUBSUB, sub::NUMSUB).bytes_slice(channels)
    }

    pub fn pubsub_numpat() -> Self {
        Request::with_subcommand(cmd::PUBSUB, sub::NUMPAT)
    }
}
