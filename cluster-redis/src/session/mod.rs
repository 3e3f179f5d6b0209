//! Sessions that keep one connection reserved across several exchanges.
//!
//! Each session owns a [`PooledConnection`](crate::PooledConnection). The
//! terminating call (`exec`, `discard`, `unwatch`, unsubscribing from
//! everything, `close`) leaves the server-side state and hands the
//! connection back to its pool. Dropping a session without ending it closes
//! the connection, since the server would still apply the session state to
//! whoever used it next.

mod monitor;
mod pubsub;
mod transaction;

pub use monitor::Monitor;
pub use pubsub::{Message, Subscription};
pub use transaction::{Transaction, Watched};

use bytes::Bytes;
use resp_proto::{PartitionDescriptor, Request, RouteError, Value};

use crate::router::Topology;
use crate::{Error, unexpected};

fn frame(request: &Request<'_>) -> Result<Bytes, Error> {
    Ok(request.encode()?.into_parts().0)
}

fn expect_ok(reply: Value) -> Result<(), Error> {
    match reply {
        Value::SimpleString(ref s) if &s[..] == b"OK" => Ok(()),
        other => Err(unexpected(other)),
    }
}

/// Keep every keyed request of a session on one slot, owned by the node
/// the session's connection is reserved on.
fn pin_slot(
    pinned: &mut Option<u16>,
    partition: &PartitionDescriptor,
    topology: &Topology,
    address: &str,
) -> Result<(), Error> {
    let Some(slot) = partition.slot()? else {
        return Ok(());
    };
    match *pinned {
        None => {
            let owner = topology.route_slot(slot)?;
            if owner != address {
                return Err(RouteError::WrongNode {
                    slot,
                    owner: owner.to_string(),
                }
                .into());
            }
            *pinned = Some(slot);
        }
        Some(first) if first != slot => {
            return Err(RouteError::CrossSlot { first, other: slot }.into());
        }
        Some(_) => {}
    }
    Ok(())
}
