//! Client-side request encoding.
//!
//! Every command is built by the same generic [`Request`] builder: a command
//! token, an optional sub-command token, and an ordered list of
//! [`Argument`]s, some of which are marked as partition keys. Encoding is two
//! passes over that list: the first sums exact frame sizes, the second writes
//! into a buffer allocated once with exactly that capacity.
//!
//! # Example
//!
//! ```
//! use resp_proto::{Request, cmd};
//!
//! let encoded = Request::new(cmd::SET).key("k").bytes("v").encode().unwrap();
//! assert_eq!(encoded.as_bytes(), b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n");
//! assert_eq!(encoded.partition().keys(), [&b"k"[..]]);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::arg::{Argument, Composite};
use crate::error::EncodeError;
use crate::partition::{KeyCollector, PartitionDescriptor};
use crate::size::{self, CRLF_LEN};
use crate::token::Token;

/// Placeholder for a request whose command name did not resolve.
const UNNAMED: Token = Token::new(b"");

/// A request under construction.
///
/// Optional arguments are added with the `opt_*` methods: an absent value
/// contributes neither array slots nor bytes. Argument errors are recorded
/// and reported by [`encode`](Self::encode) before anything is sized or
/// allocated.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    command: Token,
    subcommand: Option<Token>,
    args: Vec<Argument<'a>>,
    /// Indices into `args` of the partition keys, ascending.
    keys: Vec<usize>,
    invalid: Option<EncodeError>,
}

impl<'a> Request<'a> {
    /// Start a request for a top-level command.
    #[inline]
    pub fn new(command: Token) -> Self {
        Self {
            command,
            subcommand: None,
            args: Vec::new(),
            keys: Vec::new(),
            invalid: None,
        }
    }

    /// Start a request for a container command such as `CLUSTER ADDSLOTS`.
    #[inline]
    pub fn with_subcommand(command: Token, subcommand: Token) -> Self {
        let mut req = Self::new(command);
        req.subcommand = Some(subcommand);
        req
    }

    /// Start a request from a command name, resolved case-insensitively
    /// against the command table.
    pub fn named(name: &[u8]) -> Self {
        match Token::lookup(name) {
            Some(command) => Self::new(command),
            None => {
                let mut req = Self::new(UNNAMED);
                let reason = if name.is_empty() {
                    "command name is empty"
                } else {
                    "unknown command"
                };
                req.invalid = Some(EncodeError::InvalidArgument {
                    command: String::from_utf8_lossy(name).into_owned(),
                    reason,
                });
                req
            }
        }
    }

    /// Reserve room for `additional` more arguments.
    #[inline]
    pub fn reserve(mut self, additional: usize) -> Self {
        self.args.reserve(additional);
        self
    }

    // ========================================================================
    // Arguments
    // ========================================================================

    /// Append one argument.
    #[inline]
    pub fn arg(mut self, arg: impl Into<Argument<'a>>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append one raw byte argument.
    #[inline]
    pub fn bytes<V: AsRef<[u8]> + ?Sized>(mut self, value: &'a V) -> Self {
        self.args.push(Argument::Bytes(value.as_ref()));
        self
    }

    /// Append an argument if present.
    #[inline]
    pub fn opt_arg<A: Into<Argument<'a>>>(self, arg: Option<A>) -> Self {
        match arg {
            Some(arg) => self.arg(arg),
            None => self,
        }
    }

    /// Append every argument of a sequence, in iteration order.
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Argument<'a>>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append raw byte arguments from a slice.
    pub fn bytes_slice<V: AsRef<[u8]>>(mut self, values: &'a [V]) -> Self {
        self.args.reserve(values.len());
        for value in values {
            self.args.push(Argument::Bytes(value.as_ref()));
        }
        self
    }

    /// Append a bare keyword flag.
    #[inline]
    pub fn flag(self, token: Token) -> Self {
        self.arg(token)
    }

    /// Append a bare keyword flag when `set` is true (one slot, or none).
    #[inline]
    pub fn flag_if(self, set: bool, token: Token) -> Self {
        if set { self.arg(token) } else { self }
    }

    /// Append an option-enum flag if present.
    #[inline]
    pub fn opt_flag<F: Into<Argument<'a>>>(self, flag: Option<F>) -> Self {
        self.opt_arg(flag)
    }

    /// Append a `TOKEN value` pair (two slots).
    #[inline]
    pub fn keyword(self, token: Token, value: impl Into<Argument<'a>>) -> Self {
        self.arg(token).arg(value)
    }

    /// Append a `TOKEN value` pair if the value is present (two slots, or none).
    #[inline]
    pub fn opt_keyword<A: Into<Argument<'a>>>(self, token: Token, value: Option<A>) -> Self {
        match value {
            Some(value) => self.keyword(token, value),
            None => self,
        }
    }

    // ========================================================================
    // Partition keys
    // ========================================================================

    /// Append a key argument and mark it as a partition key.
    pub fn key<K: AsRef<[u8]> + ?Sized>(mut self, key: &'a K) -> Self {
        self.push_key(key.as_ref());
        self
    }

    /// Append a key argument if present. An absent key is not collected.
    #[inline]
    pub fn opt_key<K: AsRef<[u8]> + ?Sized>(self, key: Option<&'a K>) -> Self {
        match key {
            Some(key) => self.key(key),
            None => self,
        }
    }

    /// Append a `TOKEN key` pair whose key is a partition key, if present.
    #[inline]
    pub fn opt_keyword_key<K: AsRef<[u8]> + ?Sized>(self, token: Token, key: Option<&'a K>) -> Self {
        match key {
            Some(key) => self.arg(token).key(key),
            None => self,
        }
    }

    /// Append key arguments from an indexable sequence.
    pub fn keys<K: AsRef<[u8]>>(mut self, keys: &'a [K]) -> Self {
        self.args.reserve(keys.len());
        self.keys.reserve(keys.len());
        let mut i = 0;
        while i < keys.len() {
            self.push_key(keys[i].as_ref());
            i += 1;
        }
        self
    }

    /// Append key arguments from any sequence, in iteration order.
    pub fn keys_iter<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        for key in keys {
            self.push_key(key);
        }
        self
    }

    fn push_key(&mut self, key: &'a [u8]) {
        self.keys.push(self.args.len());
        self.args.push(Argument::Bytes(key));
    }

    // ========================================================================
    // Composites
    // ========================================================================

    /// Append one composite value as its consecutive frames.
    pub fn composite<C: Composite<'a>>(mut self, value: &C) -> Self {
        self.push_composite(value);
        self
    }

    /// Append a sequence of composite values.
    pub fn composites<C: Composite<'a>>(mut self, values: &[C]) -> Self {
        self.args.reserve(values.len() * C::FRAMES);
        for value in values {
            self.push_composite(value);
        }
        self
    }

    fn push_composite<C: Composite<'a>>(&mut self, value: &C) {
        value.visit(|arg, is_key| {
            if is_key {
                match arg.as_raw() {
                    Some(key) => self.push_key(key),
                    None => self.args.push(arg),
                }
            } else {
                self.args.push(arg);
            }
        });
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Fail the request with `reason` unless `ok` holds.
    #[inline]
    pub fn require(mut self, ok: bool, reason: &'static str) -> Self {
        if !ok {
            self.reject(reason);
        }
        self
    }

    fn reject(&mut self, reason: &'static str) {
        if self.invalid.is_none() {
            self.invalid = Some(EncodeError::InvalidArgument {
                command: self.command.to_string(),
                reason,
            });
        }
    }

    // ========================================================================
    // Size estimation
    // ========================================================================

    pub fn command(&self) -> Token {
        self.command
    }

    pub fn subcommand(&self) -> Option<Token> {
        self.subcommand
    }

    pub fn arguments(&self) -> &[Argument<'a>] {
        &self.args
    }

    /// Declared RESP array length: the command, any sub-command, and one
    /// slot per argument frame.
    #[inline]
    pub fn array_len(&self) -> usize {
        1 + usize::from(self.subcommand.is_some()) + self.args.len()
    }

    /// Exact size of the encoded request in bytes.
    pub fn encoded_len(&self) -> usize {
        size::array_header_len(self.array_len())
            + self.command.frame_len()
            + self.subcommand.map_or(0, |sub| sub.frame_len())
            + size::sum_slice(&self.args, Argument::encoded_len)
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    /// Encode into one exactly-sized buffer and collect the partition keys.
    pub fn encode(&self) -> Result<Encoded, EncodeError> {
        if let Some(err) = &self.invalid {
            return Err(err.clone());
        }

        let array_len = self.array_len();
        let capacity = self.encoded_len();
        let mut buf = BytesMut::with_capacity(capacity);

        // *<count>\r\n
        let mut count = itoa::Buffer::new();
        buf.put_u8(b'*');
        buf.put_slice(count.format(array_len).as_bytes());
        buf.put_slice(b"\r\n");

        self.command.write(&mut buf);
        if let Some(sub) = self.subcommand {
            sub.write(&mut buf);
        }

        let mut key_ranges = Vec::with_capacity(self.keys.len());
        let mut next_key = self.keys.iter().copied().peekable();
        for (idx, arg) in self.args.iter().enumerate() {
            arg.write(&mut buf);
            if next_key.next_if_eq(&idx).is_some() {
                let end = buf.len() - CRLF_LEN;
                key_ranges.push(end - arg.payload_len()..end);
            }
        }

        check_written(capacity, buf.len())?;

        let bytes = buf.freeze();
        let mut collector = KeyCollector::with_capacity(key_ranges.len());
        for range in key_ranges {
            collector.add_key(bytes.slice(range));
        }

        Ok(Encoded {
            command: self.command,
            bytes,
            array_len,
            partition: collector.build(),
        })
    }
}

#[inline]
fn check_written(expected: usize, written: usize) -> Result<(), EncodeError> {
    if expected == written {
        Ok(())
    } else {
        Err(EncodeError::CapacityMismatch { expected, written })
    }
}

/// A request on the wire: the encoded buffer plus its routing keys.
///
/// The partition keys are slices of the same buffer, not copies.
#[derive(Debug, Clone)]
pub struct Encoded {
    command: Token,
    bytes: Bytes,
    array_len: usize,
    partition: PartitionDescriptor,
}

impl Encoded {
    pub fn command(&self) -> Token {
        self.command
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of elements in the RESP array.
    pub fn array_len(&self) -> usize {
        self.array_len
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn partition(&self) -> &PartitionDescriptor {
        &self.partition
    }

    /// Split into the wire buffer and the routing keys.
    pub fn into_parts(self) -> (Bytes, PartitionDescriptor) {
        (self.bytes, self.partition)
    }
}
