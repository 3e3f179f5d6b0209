//! Client metrics, registered with metriken.

use metriken::{Counter, Gauge, metric};

// ── Requests ─────────────────────────────────────────────────────

#[metric(
    name = "cluster_redis/requests/dispatched",
    description = "Requests sent through the per-request dispatcher"
)]
pub static REQUESTS_DISPATCHED: Counter = Counter::new();

#[metric(
    name = "cluster_redis/requests/bytes",
    description = "Encoded request bytes written by the dispatcher"
)]
pub static REQUEST_BYTES: Counter = Counter::new();

#[metric(
    name = "cluster_redis/requests/routing_errors",
    description = "Requests rejected because their keys span slots or no node owns them"
)]
pub static ROUTING_ERRORS: Counter = Counter::new();

// ── Reservations ─────────────────────────────────────────────────

#[metric(
    name = "cluster_redis/reservations/acquired",
    description = "Connections reserved for a transaction, subscription or monitor"
)]
pub static RESERVATIONS_ACQUIRED: Counter = Counter::new();

#[metric(
    name = "cluster_redis/reservations/active",
    description = "Reservations currently open"
)]
pub static RESERVATIONS_ACTIVE: Gauge = Gauge::new();

// ── Connections ──────────────────────────────────────────────────

#[metric(
    name = "cluster_redis/connections/created",
    description = "Connections opened to any node"
)]
pub static CONNECTIONS_CREATED: Counter = Counter::new();

#[metric(
    name = "cluster_redis/connections/released",
    description = "Connections returned to their pool"
)]
pub static CONNECTIONS_RELEASED: Counter = Counter::new();

#[metric(
    name = "cluster_redis/connections/discarded",
    description = "Connections dropped mid-exchange or in a session state and not reused"
)]
pub static CONNECTIONS_DISCARDED: Counter = Counter::new();

#[metric(
    name = "cluster_redis/connections/checked_out",
    description = "Connections currently checked out of a pool"
)]
pub static CONNECTIONS_CHECKED_OUT: Gauge = Gauge::new();
