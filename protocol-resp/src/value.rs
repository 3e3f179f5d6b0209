//! RESP reply values and parsing.
//!
//! RESP2 defines the following value types:
//! - Simple String: `+OK\r\n`
//! - Error: `-ERR message\r\n`
//! - Integer: `:1000\r\n`
//! - Bulk String: `$6\r\nfoobar\r\n`
//! - Null Bulk String / Null Array: `$-1\r\n`, `*-1\r\n`
//! - Array: `*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n`
//!
//! RESP3 adds Null, Boolean, Double, Big Number, Bulk Error, Verbatim String,
//! Map, Set and Push (enabled with the `resp3` feature).
//!
//! Parsing is zero-copy: string variants are `Bytes::slice()` views of the
//! input buffer.

use bytes::{BufMut, Bytes};

use crate::error::ParseError;

/// Default maximum number of elements in a single collection.
pub const DEFAULT_MAX_COLLECTION_ELEMENTS: usize = 1024 * 1024;

/// Default maximum size of a bulk string in bytes (512MB, the server limit).
pub const DEFAULT_MAX_BULK_STRING_LEN: usize = 512 * 1024 * 1024;

/// Default maximum nesting depth for arrays, maps, sets and pushes.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Limits applied while parsing a reply.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Maximum number of elements in a single collection.
    pub max_collection_elements: usize,
    /// Maximum size of a bulk string in bytes.
    pub max_bulk_string_len: usize,
    /// Maximum nesting depth for recursive structures.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseOptions {
    pub const fn new() -> Self {
        Self {
            max_collection_elements: DEFAULT_MAX_COLLECTION_ELEMENTS,
            max_bulk_string_len: DEFAULT_MAX_BULK_STRING_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub const fn max_collection_elements(mut self, count: usize) -> Self {
        self.max_collection_elements = count;
        self
    }

    pub const fn max_bulk_string_len(mut self, len: usize) -> Self {
        self.max_bulk_string_len = len;
        self
    }

    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// A RESP protocol value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    SimpleString(Bytes),
    Error(Bytes),
    Integer(i64),
    BulkString(Bytes),
    /// Null bulk string, null array, or RESP3 null.
    Null,
    Array(Vec<Value>),
    #[cfg(feature = "resp3")]
    Boolean(bool),
    #[cfg(feature = "resp3")]
    Double(f64),
    #[cfg(feature = "resp3")]
    BigNumber(Bytes),
    #[cfg(feature = "resp3")]
    BulkError(Bytes),
    #[cfg(feature = "resp3")]
    VerbatimString { format: [u8; 3], data: Bytes },
    #[cfg(feature = "resp3")]
    Map(Vec<(Value, Value)>),
    #[cfg(feature = "resp3")]
    Set(Vec<Value>),
    #[cfg(feature = "resp3")]
    Push(Vec<Value>),
}

impl Value {
    pub fn simple_string(s: &[u8]) -> Self {
        Value::SimpleString(Bytes::copy_from_slice(s))
    }

    pub fn error(msg: &[u8]) -> Self {
        Value::Error(Bytes::copy_from_slice(msg))
    }

    pub fn bulk_string(data: &[u8]) -> Self {
        Value::BulkString(Bytes::copy_from_slice(data))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for error replies, including RESP3 bulk errors.
    pub fn is_error(&self) -> bool {
        match self {
            Value::Error(_) => true,
            #[cfg(feature = "resp3")]
            Value::BulkError(_) => true,
            _ => false,
        }
    }

    /// The error message of an error reply.
    pub fn error_message(&self) -> Option<&[u8]> {
        match self {
            Value::Error(msg) => Some(msg),
            #[cfg(feature = "resp3")]
            Value::BulkError(msg) => Some(msg),
            _ => None,
        }
    }

    /// Contents of a simple, bulk or verbatim string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::SimpleString(s) | Value::BulkString(s) => Some(s),
            #[cfg(feature = "resp3")]
            Value::VerbatimString { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Elements of an array-like value. RESP3 sets and pushes count as arrays.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(elements) => Some(elements),
            #[cfg(feature = "resp3")]
            Value::Set(elements) | Value::Push(elements) => Some(elements),
            _ => None,
        }
    }

    /// Consume an array-like value into its elements.
    pub fn into_array(self) -> Result<Vec<Value>, Value> {
        match self {
            Value::Array(elements) => Ok(elements),
            #[cfg(feature = "resp3")]
            Value::Set(elements) | Value::Push(elements) => Ok(elements),
            other => Err(other),
        }
    }

    /// A short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::SimpleString(_) => "simple string",
            Value::Error(_) => "error",
            Value::Integer(_) => "integer",
            Value::BulkString(_) => "bulk string",
            Value::Null => "null",
            Value::Array(_) => "array",
            #[cfg(feature = "resp3")]
            Value::Boolean(_) => "boolean",
            #[cfg(feature = "resp3")]
            Value::Double(_) => "double",
            #[cfg(feature = "resp3")]
            Value::BigNumber(_) => "big number",
            #[cfg(feature = "resp3")]
            Value::BulkError(_) => "bulk error",
            #[cfg(feature = "resp3")]
            Value::VerbatimString { .. } => "verbatim string",
            #[cfg(feature = "resp3")]
            Value::Map(_) => "map",
            #[cfg(feature = "resp3")]
            Value::Set(_) => "set",
            #[cfg(feature = "resp3")]
            Value::Push(_) => "push",
        }
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    /// Parse a RESP value from raw bytes.
    ///
    /// Returns the parsed value and the number of bytes consumed, or
    /// `ParseError::Incomplete` if more data is needed.
    #[inline]
    pub fn parse(data: &[u8]) -> Result<(Self, usize), ParseError> {
        Self::parse_bytes(Bytes::copy_from_slice(data))
    }

    /// Parse a RESP value zero-copy from a `Bytes` buffer.
    #[inline]
    pub fn parse_bytes(data: Bytes) -> Result<(Self, usize), ParseError> {
        Self::parse_bytes_with_options(data, &ParseOptions::default())
    }

    /// Parse a RESP value zero-copy with custom limits.
    pub fn parse_bytes_with_options(
        data: Bytes,
        options: &ParseOptions,
    ) -> Result<(Self, usize), ParseError> {
        Parser {
            data: &data,
            options,
        }
        .value(0, 0)
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    /// Append the RESP encoding of this value.
    pub fn encode<B: BufMut>(&self, out: &mut B) {
        match self {
            Value::SimpleString(s) => line(out, b'+', s),
            Value::Error(msg) => line(out, b'-', msg),
            Value::Integer(n) => line(out, b':', itoa::Buffer::new().format(*n).as_bytes()),
            Value::BulkString(data) => blob(out, b'$', data),
            Value::Null => out.put_slice(b"$-1\r\n"),
            Value::Array(elements) => aggregate(out, b'*', elements),
            #[cfg(feature = "resp3")]
            Value::Boolean(b) => out.put_slice(if *b { b"#t\r\n" } else { b"#f\r\n" }),
            #[cfg(feature = "resp3")]
            Value::Double(d) => line(out, b',', ryu::Buffer::new().format(*d).as_bytes()),
            #[cfg(feature = "resp3")]
            Value::BigNumber(n) => line(out, b'(', n),
            #[cfg(feature = "resp3")]
            Value::BulkError(msg) => blob(out, b'!', msg),
            #[cfg(feature = "resp3")]
            Value::VerbatimString { format, data } => {
                let mut payload = Vec::with_capacity(4 + data.len());
                payload.extend_from_slice(format);
                payload.push(b':');
                payload.extend_from_slice(data);
                blob(out, b'=', &payload);
            }
            #[cfg(feature = "resp3")]
            Value::Map(entries) => {
                line(out, b'%', itoa::Buffer::new().format(entries.len()).as_bytes());
                for (k, v) in entries {
                    k.encode(out);
                    v.encode(out);
                }
            }
            #[cfg(feature = "resp3")]
            Value::Set(elements) => aggregate(out, b'~', elements),
            #[cfg(feature = "resp3")]
            Value::Push(elements) => aggregate(out, b'>', elements),
        }
    }

    /// The RESP encoding of this value as a fresh buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = Vec::new();
        self.encode(&mut out);
        out.into()
    }
}

fn line<B: BufMut>(out: &mut B, prefix: u8, body: &[u8]) {
    out.put_u8(prefix);
    out.put_slice(body);
    out.put_slice(b"\r\n");
}

fn blob<B: BufMut>(out: &mut B, prefix: u8, body: &[u8]) {
    line(out, prefix, itoa::Buffer::new().format(body.len()).as_bytes());
    out.put_slice(body);
    out.put_slice(b"\r\n");
}

fn aggregate<B: BufMut>(out: &mut B, prefix: u8, elements: &[Value]) {
    line(out, prefix, itoa::Buffer::new().format(elements.len()).as_bytes());
    for element in elements {
        element.encode(out);
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Find the position of \r\n in the data.
#[inline]
pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    memchr::memchr(b'\r', data).and_then(|pos| {
        if pos + 1 < data.len() && data[pos + 1] == b'\n' {
            Some(pos)
        } else {
            None
        }
    })
}

pub(crate) fn parse_int(text: &[u8]) -> Result<i64, ParseError> {
    std::str::from_utf8(text)
        .map_err(|e| ParseError::InvalidInteger(e.to_string()))?
        .parse()
        .map_err(|e: std::num::ParseIntError| ParseError::InvalidInteger(e.to_string()))
}

struct Parser<'p> {
    data: &'p Bytes,
    options: &'p ParseOptions,
}

impl Parser<'_> {
    /// Parse one value starting at `pos`. Returns the value and the position
    /// just past it.
    fn value(&self, pos: usize, depth: usize) -> Result<(Value, usize), ParseError> {
        let Some(&prefix) = self.data.get(pos) else {
            return Err(ParseError::Incomplete);
        };
        match prefix {
            b'+' => self.line(pos).map(|(s, end)| (Value::SimpleString(s), end)),
            b'-' => self.line(pos).map(|(s, end)| (Value::Error(s), end)),
            b':' => {
                let (text, end) = self.line(pos)?;
                Ok((Value::Integer(parse_int(&text)?), end))
            }
            b'$' => match self.blob(pos)? {
                (Some(data), end) => Ok((Value::BulkString(data), end)),
                (None, end) => Ok((Value::Null, end)),
            },
            b'*' => match self.elements(pos, depth, 1)? {
                (Some(elements), end) => Ok((Value::Array(elements), end)),
                (None, end) => Ok((Value::Null, end)),
            },
            #[cfg(feature = "resp3")]
            b'_' => {
                let (text, end) = self.line(pos)?;
                if !text.is_empty() {
                    return Err(ParseError::Protocol("null with payload".to_string()));
                }
                Ok((Value::Null, end))
            }
            #[cfg(feature = "resp3")]
            b'#' => {
                let (text, end) = self.line(pos)?;
                match &text[..] {
                    b"t" => Ok((Value::Boolean(true), end)),
                    b"f" => Ok((Value::Boolean(false), end)),
                    _ => Err(ParseError::InvalidBoolean),
                }
            }
            #[cfg(feature = "resp3")]
            b',' => {
                let (text, end) = self.line(pos)?;
                let text = std::str::from_utf8(&text)
                    .map_err(|e| ParseError::InvalidDouble(e.to_string()))?;
                let value = match text {
                    "inf" | "+inf" => f64::INFINITY,
                    "-inf" => f64::NEG_INFINITY,
                    "nan" | "-nan" => f64::NAN,
                    other => other
                        .parse()
                        .map_err(|e: std::num::ParseFloatError| {
                            ParseError::InvalidDouble(e.to_string())
                        })?,
                };
                Ok((Value::Double(value), end))
            }
            #[cfg(feature = "resp3")]
            b'(' => self.line(pos).map(|(s, end)| (Value::BigNumber(s), end)),
            #[cfg(feature = "resp3")]
            b'!' => match self.blob(pos)? {
                (Some(data), end) => Ok((Value::BulkError(data), end)),
                (None, _) => Err(ParseError::Protocol("null bulk error".to_string())),
            },
            #[cfg(feature = "resp3")]
            b'=' => match self.blob(pos)? {
                (Some(data), end) if data.len() >= 4 && data[3] == b':' => {
                    let format = [data[0], data[1], data[2]];
                    Ok((
                        Value::VerbatimString {
                            format,
                            data: data.slice(4..),
                        },
                        end,
                    ))
                }
                _ => Err(ParseError::Protocol("malformed verbatim string".to_string())),
            },
            #[cfg(feature = "resp3")]
            b'%' => match self.elements(pos, depth, 2)? {
                (Some(flat), end) => {
                    let mut entries = Vec::with_capacity(flat.len() / 2);
                    let mut iter = flat.into_iter();
                    while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
                        entries.push((k, v));
                    }
                    Ok((Value::Map(entries), end))
                }
                (None, end) => Ok((Value::Null, end)),
            },
            #[cfg(feature = "resp3")]
            b'~' => match self.elements(pos, depth, 1)? {
                (Some(elements), end) => Ok((Value::Set(elements), end)),
                (None, end) => Ok((Value::Null, end)),
            },
            #[cfg(feature = "resp3")]
            b'>' => match self.elements(pos, depth, 1)? {
                (Some(elements), end) => Ok((Value::Push(elements), end)),
                (None, end) => Ok((Value::Null, end)),
            },
            other => Err(ParseError::InvalidPrefix(other)),
        }
    }

    /// The body of a `<prefix><body>\r\n` line.
    fn line(&self, pos: usize) -> Result<(Bytes, usize), ParseError> {
        let end = pos + 1 + find_crlf(&self.data[pos + 1..]).ok_or(ParseError::Incomplete)?;
        Ok((self.data.slice(pos + 1..end), end + 2))
    }

    /// A length-prefixed payload. `None` for a negative length.
    fn blob(&self, pos: usize) -> Result<(Option<Bytes>, usize), ParseError> {
        let (text, start) = self.line(pos)?;
        let len = parse_int(&text)?;
        if len < 0 {
            return Ok((None, start));
        }
        let len = len as usize;
        if len > self.options.max_bulk_string_len {
            return Err(ParseError::BulkStringTooLong {
                len,
                max: self.options.max_bulk_string_len,
            });
        }
        let end = start
            .checked_add(len)
            .ok_or_else(|| ParseError::InvalidInteger("length overflow".to_string()))?;
        if self.data.len() < end + 2 {
            return Err(ParseError::Incomplete);
        }
        if &self.data[end..end + 2] != b"\r\n" {
            return Err(ParseError::Protocol("missing trailing CRLF".to_string()));
        }
        Ok((Some(self.data.slice(start..end)), end + 2))
    }

    /// `count * per_entry` nested values. `None` for a negative count.
    fn elements(
        &self,
        pos: usize,
        depth: usize,
        per_entry: usize,
    ) -> Result<(Option<Vec<Value>>, usize), ParseError> {
        if depth >= self.options.max_depth {
            return Err(ParseError::NestingTooDeep(depth));
        }
        let (text, mut cursor) = self.line(pos)?;
        let count = parse_int(&text)?;
        if count < 0 {
            return Ok((None, cursor));
        }
        let count = count as usize;
        if count > self.options.max_collection_elements {
            return Err(ParseError::CollectionTooLarge(count));
        }
        let total = count * per_entry;
        let mut elements = Vec::with_capacity(total);
        for _ in 0..total {
            let (value, next) = self.value(cursor, depth + 1)?;
            elements.push(value);
            cursor = next;
        }
        Ok((Some(elements), cursor))
    }
}
