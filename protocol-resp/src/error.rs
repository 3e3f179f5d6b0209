//! Error types for request encoding, routing and reply parsing.

/// Error type for RESP parsing operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Need more data to complete parsing.
    /// This is not a fatal error - the caller should buffer more data and retry.
    #[error("incomplete data")]
    Incomplete,

    /// Invalid type prefix byte.
    #[error("invalid prefix byte: {0:#04x}")]
    InvalidPrefix(u8),

    /// Invalid integer format.
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Protocol violation.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Collection size exceeds maximum allowed limit.
    #[error("collection too large: {0} elements exceeds limit")]
    CollectionTooLarge(usize),

    /// Nesting depth exceeds maximum allowed limit.
    #[error("nesting too deep: depth {0} exceeds limit")]
    NestingTooDeep(usize),

    /// Bulk string exceeds maximum allowed size.
    #[error("bulk string too long: {len} bytes exceeds {max} byte limit")]
    BulkStringTooLong { len: usize, max: usize },

    /// Invalid floating point number (RESP3).
    #[cfg(feature = "resp3")]
    #[error("invalid double: {0}")]
    InvalidDouble(String),

    /// Invalid boolean value (RESP3).
    #[cfg(feature = "resp3")]
    #[error("invalid boolean: expected 't' or 'f'")]
    InvalidBoolean,
}

impl ParseError {
    /// Returns true if this error indicates more data is needed.
    #[inline]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ParseError::Incomplete)
    }
}

/// A request could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A required argument was missing or malformed. Raised before any size
    /// computation or allocation.
    #[error("invalid argument for {command}: {reason}")]
    InvalidArgument {
        command: String,
        reason: &'static str,
    },

    /// The encoder wrote a different number of bytes than the estimator
    /// computed. This is a defect in the size arithmetic, never a user error.
    #[error("capacity mismatch: estimated {expected} bytes, wrote {written}")]
    CapacityMismatch { expected: usize, written: usize },
}

/// A request's partition keys do not select a single shard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Keys of one request hash to different slots.
    #[error("keys hash to different slots ({first} and {other})")]
    CrossSlot { first: u16, other: u16 },

    /// No node owns the slot the keys hash to.
    #[error("no node owns slot {0}")]
    Unroutable(u16),

    /// The topology has no nodes to send a keyless command to.
    #[error("no nodes available")]
    NoNodes,

    /// A connection reserved on one node was asked to serve a slot that
    /// another node owns.
    #[error("slot {slot} is owned by {owner}, not the reserved node")]
    WrongNode { slot: u16, owner: String },
}

/// A reply did not have the shape the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected response: expected {expected}, got {actual}")]
    Unexpected {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid number in response: {0}")]
    InvalidNumber(String),

    #[error("expected {expected} elements, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}
