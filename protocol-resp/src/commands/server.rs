//! Connection, server-admin and cluster-admin commands. None of these are
//! data-addressed, so none collect partition keys.

use crate::Request;
use crate::options::FlushMode;
use crate::token::{cmd, sub};

impl<'a> Request<'a> {
    pub fn ping() -> Self {
        Request::new(cmd::PING)
    }

    pub fn echo(message: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::new(cmd::ECHO).bytes(message)
    }

    pub fn info(section: Option<&'a str>) -> Self {
        Request::new(cmd::INFO).opt_arg(section)
    }

    pub fn dbsize() -> Self {
        Request::new(cmd::DBSIZE)
    }

    pub fn flushdb(mode: Option<FlushMode>) -> Self {
        Request::new(cmd::FLUSHDB).opt_flag(mode)
    }

    pub fn flushall(mode: Option<FlushMode>) -> Self {
        Request::new(cmd::FLUSHALL).opt_flag(mode)
    }

    pub fn time() -> Self {
        Request::new(cmd::TIME)
    }

    pub fn readonly() -> Self {
        Request::new(cmd::READONLY)
    }

    pub fn readwrite() -> Self {
        Request::new(cmd::READWRITE)
    }

    pub fn asking() -> Self {
        Request::new(cmd::ASKING)
    }

    pub fn monitor() -> Self {
        Request::new(cmd::MONITOR)
    }

    pub fn reset() -> Self {
        Request::new(cmd::RESET)
    }

    // CONFIG

    pub fn config_get(pattern: &'a str) -> Self {
        Request::with_subcommand(cmd::CONFIG, sub::GET).arg(pattern)
    }

    pub fn config_set(parameter: &'a str, value: &'a str) -> Self {
        Request::with_subcommand(cmd::CONFIG, sub::SET)
            .arg(parameter)
            .arg(value)
    }

    pub fn config_resetstat() -> Self {
        Request::with_subcommand(cmd::CONFIG, sub::RESETSTAT)
    }

    pub fn config_rewrite() -> Self {
        Request::with_subcommand(cmd::CONFIG, sub::REWRITE)
    }

    // CLIENT

    pub fn client_setname(name: &'a str) -> Self {
        Request::with_subcommand(cmd::CLIENT, sub::SETNAME).arg(name)
    }

    pub fn client_getname() -> Self {
        Request::with_subcommand(cmd::CLIENT, sub::GETNAME)
    }

    pub fn client_id() -> Self {
        Request::with_subcommand(cmd::CLIENT, sub::ID)
    }

    pub fn client_list() -> Self {
        Request::with_subcommand(cmd::CLIENT, sub::LIST)
    }

    // CLUSTER

    pub fn cluster_addslots(slots: &[u16]) -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::ADDSLOTS)
            .args(slots.iter().copied())
            .require(!slots.is_empty(), "at least one slot is required")
    }

    pub fn cluster_delslots(slots: &[u16]) -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::DELSLOTS)
            .args(slots.iter().copied())
            .require(!slots.is_empty(), "at least one slot is required")
    }

    pub fn cluster_countkeysinslot(slot: u16) -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::COUNTKEYSINSLOT).arg(slot)
    }

    pub fn cluster_getkeysinslot(slot: u16, count: u64) -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::GETKEYSINSLOT)
            .arg(slot)
            .arg(count)
    }

    /// CLUSTER KEYSLOT. The key is an argument here, not a partition key.
    pub fn cluster_keyslot(key: &'a (impl AsRef<[u8]> + ?Sized)) -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::KEYSLOT).bytes(key)
    }

    pub fn cluster_slots() -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::SLOTS)
    }

    pub fn cluster_nodes() -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::NODES)
    }

    pub fn cluster_info() -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::INFO)
    }

    pub fn cluster_myid() -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::MYID)
    }

    pub fn cluster_meet(ip: &'a str, port: u16) -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::MEET).arg(ip).arg(port)
    }

    pub fn cluster_forget(node_id: &'a str) -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::FORGET).arg(node_id)
    }

    pub fn cluster_replicate(node_id: &'a str) -> Self {
        Request::with_subcommand(cmd::CLUSTER, sub::REPLICATE).arg(node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::wire;

    #[test]
    fn test_cluster_addslots_scenario() {
        let encoded = Request::cluster_addslots(&[1, 2, 3]).encode().unwrap();
        assert_eq!(
            encoded.as_bytes(),
            b"*5\r\n$7\r\nCLUSTER\r\n$8\r\nADDSLOTS\r\n$1\r\n1\r\n$1\r\n2\r\n$1\r\n3\r\n"
        );
        assert!(encoded.partition().is_empty());
    }

    #[test]
    fn test_cluster_keyslot_is_not_routed() {
        let (frames, keys) = wire(Request::cluster_keyslot("somekey"));
        assert_eq!(frames, ["CLUSTER", "KEYSLOT", "somekey"]);
        assert!(keys.is_empty());
    }

    #[test]
    fn test_optional_section() {
        assert_eq!(Request::info(None).array_len(), 1);
        let (frames, _) = wire(Request::info(Some("replication")));
        assert_eq!(frames, ["INFO", "replication"]);
        let (frames, _) = wire(Request::flushdb(Some(FlushMode::Async)));
        assert_eq!(frames, ["FLUSHDB", "ASYNC"]);
    }

    #[test]
    fn test_config_and_client_subcommands() {
        let (frames, _) = wire(Request::config_set("maxmemory", "100mb"));
        assert_eq!(frames, ["CONFIG", "SET", "maxmemory", "100mb"]);
        let (frames, _) = wire(Request::client_setname("worker-1"));
        assert_eq!(frames, ["CLIENT", "SETNAME", "worker-1"]);
    }

    #[test]
    fn test_ping() {
        assert_eq!(Request::ping().encode().unwrap().as_bytes(), b"*1\r\n$4\r\nPING\r\n");
    }
}
