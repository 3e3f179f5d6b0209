//! Slot-to-node routing.

use resp_proto::{PartitionDescriptor, RouteError, SlotMap, Value};

/// Which node owns which slot, plus where keyless commands go.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    slots: SlotMap,
    default_node: Option<String>,
}

impl Topology {
    /// A single node that owns every slot.
    pub fn standalone(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            slots: SlotMap::single(address.clone()),
            default_node: Some(address),
        }
    }

    pub fn from_slot_map(slots: SlotMap, default_node: Option<String>) -> Self {
        Self {
            slots,
            default_node,
        }
    }

    /// Build from a `CLUSTER SLOTS` reply.
    pub fn from_cluster_slots(reply: &Value, default_node: Option<String>) -> Option<Self> {
        SlotMap::from_cluster_slots(reply).map(|slots| Self::from_slot_map(slots, default_node))
    }

    /// Node for a request's keys. Keyless requests go to the default node.
    pub fn route(&self, partition: &PartitionDescriptor) -> Result<&str, RouteError> {
        match partition.slot()? {
            Some(slot) => self.route_slot(slot),
            None => self.any_node(),
        }
    }

    pub fn route_slot(&self, slot: u16) -> Result<&str, RouteError> {
        self.slots
            .primary_for(slot)
            .ok_or(RouteError::Unroutable(slot))
    }

    /// The configured default node, or the first known primary.
    pub fn any_node(&self) -> Result<&str, RouteError> {
        if let Some(node) = &self.default_node {
            return Ok(node);
        }
        self.slots
            .primaries()
            .into_iter()
            .next()
            .ok_or(RouteError::NoNodes)
    }

    /// Every primary, followed by the default node if it is not one.
    pub fn nodes(&self) -> Vec<&str> {
        let mut nodes = self.slots.primaries();
        if let Some(node) = self.default_node.as_deref()
            && !nodes.contains(&node)
        {
            nodes.push(node);
        }
        nodes
    }

    pub fn slot_map(&self) -> &SlotMap {
        &self.slots
    }

    pub fn default_node(&self) -> Option<&str> {
        self.default_node.as_deref()
    }
}
