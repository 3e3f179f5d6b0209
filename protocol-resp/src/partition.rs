//! Partition keys: the arguments of a request that decide which shard owns it.

use bytes::Bytes;

use crate::error::RouteError;
use crate::slot::hash_slot;

/// Accumulates the routing keys of one request, in wire order.
///
/// One collector backs exactly one request; [`build`](Self::build) consumes it.
#[derive(Debug, Default)]
pub struct KeyCollector {
    keys: Vec<Bytes>,
}

impl KeyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
        }
    }

    /// Append one routing key.
    #[inline]
    pub fn add_key(&mut self, key: Bytes) {
        self.keys.push(key);
    }

    pub fn build(self) -> PartitionDescriptor {
        PartitionDescriptor { keys: self.keys }
    }
}

/// The routing keys of an encoded request.
///
/// An empty descriptor means the request is not data-addressed (PING, INFO,
/// CLUSTER ...) and may go to any node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionDescriptor {
    keys: Vec<Bytes>,
}

impl PartitionDescriptor {
    /// Keys in the order they appear on the wire.
    pub fn keys(&self) -> &[Bytes] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// The single slot every key hashes to, or `None` for a keyless request.
    pub fn slot(&self) -> Result<Option<u16>, RouteError> {
        let mut keys = self.keys.iter();
        let Some(first) = keys.next() else {
            return Ok(None);
        };
        let first = hash_slot(first);
        for key in keys {
            let other = hash_slot(key);
            if other != first {
                return Err(RouteError::CrossSlot { first, other });
            }
        }
        Ok(Some(first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(keys: &[&'static [u8]]) -> PartitionDescriptor {
        let mut collector = KeyCollector::new();
        for key in keys {
            collector.add_key(Bytes::from_static(key));
        }
        collector.build()
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let d = descriptor(&[b"c", b"a", b"b"]);
        assert_eq!(d.keys(), [&b"c"[..], &b"a"[..], &b"b"[..]]);
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn test_empty_descriptor_has_no_slot() {
        let d = KeyCollector::new().build();
        assert!(d.is_empty());
        assert_eq!(d.slot(), Ok(None));
    }

    #[test]
    fn test_same_slot_via_hash_tag() {
        let d = descriptor(&[b"{user1000}.following", b"{user1000}.followers"]);
        assert_eq!(d.slot(), Ok(Some(hash_slot(b"user1000"))));
    }

    #[test]
    fn test_cross_slot_rejected() {
        let d = descriptor(&[b"foo", b"bar"]);
        assert_eq!(
            d.slot(),
            Err(RouteError::CrossSlot {
                first: 12182,
                other: 5061
            })
        );
    }
}
