//! RESP request encoding and routing for cluster-aware Redis clients.
//!
//! This crate is the synchronous half of a Redis client: it turns commands
//! into wire buffers and tells the caller where to send them. It never
//! performs I/O.
//!
//! - **Requests**: a single generic [`Request`] builder covers every command.
//!   Its size is computed exactly before one buffer is allocated, and the
//!   encoder checks that it wrote exactly that many bytes.
//! - **Tokens**: command, sub-command and keyword tokens are interned
//!   constants ([`cmd`], [`sub`], [`kw`]) with precomputed frame sizes.
//! - **Routing**: arguments marked as keys are collected, in wire order, into
//!   a [`PartitionDescriptor`] that resolves to a hash slot.
//! - **Replies**: [`Value`] parses RESP2 (and RESP3 with the `resp3` feature);
//!   [`FromValue`] converts replies into the type the caller asks for.
//!
//! # Features
//!
//! - `resp3` - Enables RESP3 reply types:
//!   - Boolean (`#t`/`#f`)
//!   - Double (`,3.14159`)
//!   - BigNumber (`(12345678901234567890`)
//!   - BulkError (`!<len>\r\n<error>`)
//!   - VerbatimString (`=<len>\r\ntxt:<data>`)
//!   - Map (`%<len>\r\n<key><val>...`)
//!   - Set (`~<len>\r\n<elem>...`)
//!   - Push (`><len>\r\n<elem>...`)
//!   - Null (`_\r\n`)
//!
//! # Example
//!
//! ```
//! use resp_proto::{Request, SetOptions, Value};
//!
//! // Encode a SET with a TTL
//! let encoded = Request::set_with("mykey", "myvalue", SetOptions::new().ex(3600))
//!     .encode()
//!     .unwrap();
//! assert_eq!(encoded.array_len(), 5);
//!
//! // Route it
//! let slot = encoded.partition().slot().unwrap();
//! assert_eq!(slot, Some(resp_proto::hash_slot(b"mykey")));
//!
//! // Parse the response
//! let (value, consumed) = Value::parse(b"+OK\r\n").unwrap();
//! assert_eq!(consumed, 5);
//! ```

mod arg;
mod commands;
mod decode;
mod error;
mod options;
mod partition;
mod request;
mod scan;
pub mod size;
mod slot;
mod token;
mod value;

pub use arg::{Argument, Composite, FieldValue, GeoMember, KeyValue, ScoreMember};
pub use commands::{GeoRadiusOptions, ScanOptions, SetOptions, ZAddOptions, ZStoreOptions};
pub use decode::FromValue;
pub use error::{DecodeError, EncodeError, ParseError, RouteError};
pub use options::{
    Aggregate, BitOp, BitUnit, Comparison, Condition, Expiration, FlushMode, GeoUnit,
    InsertPosition, ListSide, SortOrder,
};
pub use partition::{KeyCollector, PartitionDescriptor};
pub use request::{Encoded, Request};
pub use scan::FrameScanner;
pub use slot::{NodeInfo, SLOT_COUNT, SlotMap, SlotRange, crc16, hash_slot, hash_tag};
pub use token::{Token, cmd, kw, sub};
pub use value::{
    DEFAULT_MAX_BULK_STRING_LEN, DEFAULT_MAX_COLLECTION_ELEMENTS, DEFAULT_MAX_DEPTH, ParseOptions,
    Value,
};
