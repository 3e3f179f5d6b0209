//! Redis Cluster hash slots and the slot-to-node map.
//!
//! Keys hash with CRC16-XMODEM modulo 16384. A key containing a non-empty
//! `{tag}` hashes only the tag, which is how callers co-locate keys.

use crate::Value;

/// Total number of hash slots in a Redis Cluster.
pub const SLOT_COUNT: u16 = 16384;

/// Compute CRC16-XMODEM checksum (same algorithm as Redis).
#[inline]
pub fn crc16(data: &[u8]) -> u16 {
    crc16::State::<crc16::XMODEM>::calculate(data)
}

/// The part of a key that is hashed: the first non-empty `{...}` tag, or the
/// whole key.
#[inline]
pub fn hash_tag(key: &[u8]) -> &[u8] {
    let Some(open) = memchr::memchr(b'{', key) else {
        return key;
    };
    let rest = &key[open + 1..];
    match memchr::memchr(b'}', rest) {
        Some(0) | None => key,
        Some(close) => &rest[..close],
    }
}

/// Compute the hash slot for a key.
#[inline]
pub fn hash_slot(key: &[u8]) -> u16 {
    crc16(hash_tag(key)) % SLOT_COUNT
}

/// A node as reported by `CLUSTER SLOTS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Address as `host:port`.
    pub address: String,
    /// Node ID, when the server reports one.
    pub node_id: Option<String>,
}

/// An inclusive slot range owned by one primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRange {
    pub start: u16,
    pub end: u16,
    pub primary: NodeInfo,
    pub replicas: Vec<NodeInfo>,
}

/// Slot ownership, sorted by start slot for binary-search lookups.
#[derive(Debug, Clone, Default)]
pub struct SlotMap {
    ranges: Vec<SlotRange>,
}

impl SlotMap {
    /// An empty map: every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// A map in which a single node owns every slot.
    pub fn single(address: impl Into<String>) -> Self {
        Self::from_ranges(vec![SlotRange {
            start: 0,
            end: SLOT_COUNT - 1,
            primary: NodeInfo {
                address: address.into(),
                node_id: None,
            },
            replicas: Vec::new(),
        }])
    }

    /// Build a map from explicit ranges.
    pub fn from_ranges(mut ranges: Vec<SlotRange>) -> Self {
        ranges.sort_by_key(|r| r.start);
        Self { ranges }
    }

    /// Decode a `CLUSTER SLOTS` reply.
    ///
    /// Returns `None` if the value does not have the documented shape.
    pub fn from_cluster_slots(value: &Value) -> Option<Self> {
        let entries = value.as_array()?;
        let mut ranges = Vec::with_capacity(entries.len());

        for entry in entries {
            let items = entry.as_array()?;
            // [start, end, primary, replica...]
            let [start, end, primary, replicas @ ..] = items else {
                return None;
            };
            let start = u16::try_from(int_value(start)?).ok()?;
            let end = u16::try_from(int_value(end)?).ok()?;
            if start > end || end >= SLOT_COUNT {
                return None;
            }
            ranges.push(SlotRange {
                start,
                end,
                primary: node_info(primary)?,
                replicas: replicas.iter().map(node_info).collect::<Option<_>>()?,
            });
        }

        Some(Self::from_ranges(ranges))
    }

    /// The range that contains `slot`.
    pub fn lookup(&self, slot: u16) -> Option<&SlotRange> {
        let idx = self
            .ranges
            .partition_point(|r| r.start <= slot)
            .checked_sub(1)?;
        let range = &self.ranges[idx];
        (slot <= range.end).then_some(range)
    }

    /// Address of the primary that owns `slot`.
    pub fn primary_for(&self, slot: u16) -> Option<&str> {
        self.lookup(slot).map(|r| r.primary.address.as_str())
    }

    /// Distinct primary addresses, in slot order.
    pub fn primaries(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for range in &self.ranges {
            let addr = range.primary.address.as_str();
            if !out.contains(&addr) {
                out.push(addr);
            }
        }
        out
    }

    pub fn ranges(&self) -> &[SlotRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(n) => Some(*n),
        Value::BulkString(s) => std::str::from_utf8(s).ok()?.parse().ok(),
        _ => None,
    }
}

/// `[ip, port]` or `[ip, port, node_id, ...]`.
fn node_info(value: &Value) -> Option<NodeInfo> {
    let items = value.as_array()?;
    let [ip, port, rest @ ..] = items else {
        return None;
    };
    let ip = std::str::from_utf8(ip.as_bytes()?).ok()?;
    let port = int_value(port)?;
    let node_id = rest
        .first()
        .and_then(Value::as_bytes)
        .and_then(|id| std::str::from_utf8(id).ok())
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    Some(NodeInfo {
        address: format!("{ip}:{port}"),
        node_id,
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn test_crc16_known_vector() {
        assert_eq!(crc16(b""), 0);
        assert_eq!(crc16(b"123456789"), 0x31C3);
    }

    #[test]
    fn test_hash_slot_known_keys() {
        // Values as reported by CLUSTER KEYSLOT.
        assert_eq!(hash_slot(b"foo"), 12182);
        assert_eq!(hash_slot(b"bar"), 5061);
    }

    #[test]
    fn test_hash_slot_tag() {
        assert_eq!(hash_slot(b"{user}.name"), hash_slot(b"{user}.email"));
        assert_eq!(hash_slot(b"{user}.name"), hash_slot(b"user"));
    }

    #[test]
    fn test_hash_tag_edge_cases() {
        assert_eq!(hash_tag(b"{}key"), b"{}key");
        assert_eq!(hash_tag(b"{{user}}"), b"{user");
        assert_eq!(hash_tag(b"{user"), b"{user");
        assert_eq!(hash_tag(b"plain"), b"plain");
    }

    fn node(ip: &str, port: i64, id: Option<&str>) -> Value {
        let mut arr = vec![
            Value::BulkString(Bytes::copy_from_slice(ip.as_bytes())),
            Value::Integer(port),
        ];
        if let Some(id) = id {
            arr.push(Value::BulkString(Bytes::copy_from_slice(id.as_bytes())));
        }
        Value::Array(arr)
    }

    fn three_node_reply() -> Value {
        Value::Array(vec![
            Value::Array(vec![
                Value::Integer(5461),
                Value::Integer(10922),
                node("10.0.0.2", 7000, Some("b")),
            ]),
            Value::Array(vec![
                Value::Integer(0),
                Value::Integer(5460),
                node("10.0.0.1", 7000, Some("a")),
                node("10.0.0.4", 7001, None),
            ]),
            Value::Array(vec![
                Value::Integer(10923),
                Value::Integer(16383),
                node("10.0.0.3", 7000, Some("")),
            ]),
        ])
    }

    #[test]
    fn test_slot_map_lookup() {
        let map = SlotMap::from_cluster_slots(&three_node_reply()).unwrap();
        assert_eq!(map.ranges().len(), 3);
        assert_eq!(map.primary_for(0), Some("10.0.0.1:7000"));
        assert_eq!(map.primary_for(5460), Some("10.0.0.1:7000"));
        assert_eq!(map.primary_for(5461), Some("10.0.0.2:7000"));
        assert_eq!(map.primary_for(16383), Some("10.0.0.3:7000"));

        let first = map.lookup(0).unwrap();
        assert_eq!(first.primary.node_id.as_deref(), Some("a"));
        assert_eq!(first.replicas[0].address, "10.0.0.4:7001");
        assert!(map.lookup(16383).unwrap().primary.node_id.is_none());
    }

    #[test]
    fn test_slot_map_primaries_in_slot_order() {
        let map = SlotMap::from_cluster_slots(&three_node_reply()).unwrap();
        assert_eq!(
            map.primaries(),
            vec!["10.0.0.1:7000", "10.0.0.2:7000", "10.0.0.3:7000"]
        );
    }

    #[test]
    fn test_slot_map_gap() {
        let map = SlotMap::from_cluster_slots(&Value::Array(vec![Value::Array(vec![
            Value::Integer(100),
            Value::Integer(200),
            node("10.0.0.1", 7000, None),
        ])]))
        .unwrap();
        assert!(map.lookup(50).is_none());
        assert!(map.lookup(150).is_some());
        assert!(map.lookup(201).is_none());
    }

    #[test]
    fn test_slot_map_rejects_malformed() {
        assert!(SlotMap::from_cluster_slots(&Value::Integer(1)).is_none());
        let short = Value::Array(vec![Value::Array(vec![Value::Integer(0)])]);
        assert!(SlotMap::from_cluster_slots(&short).is_none());
        let inverted = Value::Array(vec![Value::Array(vec![
            Value::Integer(10),
            Value::Integer(5),
            node("10.0.0.1", 7000, None),
        ])]);
        assert!(SlotMap::from_cluster_slots(&inverted).is_none());
    }

    #[test]
    fn test_single_owns_everything() {
        let map = SlotMap::single("127.0.0.1:6379");
        assert_eq!(map.primary_for(0), Some("127.0.0.1:6379"));
        assert_eq!(map.primary_for(SLOT_COUNT - 1), Some("127.0.0.1:6379"));
        assert!(SlotMap::new().is_empty());
    }
}
