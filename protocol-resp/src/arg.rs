//! Request arguments.
//!
//! [`Argument`] is the tagged union every request is built from. Each variant
//! reports its exact frame size and writes itself as one bulk string.
//! Composite arguments (score/member pairs, field/value pairs, geo triples)
//! expand into a fixed number of consecutive frames, declared by
//! [`Composite::FRAMES`].

use bytes::{BufMut, Bytes};

use crate::size;
use crate::token::Token;

/// A single bulk-string argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Argument<'a> {
    /// Raw bytes, written verbatim.
    Bytes(&'a [u8]),
    /// UTF-8 text, counted in bytes.
    Text(&'a str),
    /// Signed integer, written as decimal text.
    Int(i64),
    /// Unsigned integer, written as decimal text.
    UInt(u64),
    /// Float, written as its shortest round-trip decimal text.
    Float(f64),
    /// A keyword or sub-command token.
    Token(Token),
}

impl<'a> Argument<'a> {
    /// Number of payload bytes inside the bulk string frame.
    #[inline]
    pub fn payload_len(&self) -> usize {
        match self {
            Argument::Bytes(b) => b.len(),
            Argument::Text(s) => s.len(),
            Argument::Int(n) => size::int_text_len(*n),
            Argument::UInt(n) => size::digits(*n),
            Argument::Float(f) => size::float_text_len(*f),
            Argument::Token(t) => t.as_bytes().len(),
        }
    }

    /// Exact size of this argument's bulk string frame.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        match self {
            Argument::Token(t) => t.frame_len(),
            _ => size::bulk_len(self.payload_len()),
        }
    }

    /// The payload if it is already a byte string (not a number).
    pub fn as_raw(&self) -> Option<&'a [u8]> {
        match *self {
            Argument::Bytes(b) => Some(b),
            Argument::Text(s) => Some(s.as_bytes()),
            Argument::Token(t) => Some(t.as_bytes()),
            _ => None,
        }
    }

    /// Append this argument's bulk string frame.
    pub fn write<B: BufMut>(&self, out: &mut B) {
        match self {
            Argument::Bytes(b) => write_bulk(out, b),
            Argument::Text(s) => write_bulk(out, s.as_bytes()),
            Argument::Int(n) => {
                let mut buf = itoa::Buffer::new();
                write_bulk(out, buf.format(*n).as_bytes());
            }
            Argument::UInt(n) => {
                let mut buf = itoa::Buffer::new();
                write_bulk(out, buf.format(*n).as_bytes());
            }
            Argument::Float(f) => {
                let mut buf = ryu::Buffer::new();
                write_bulk(out, buf.format(*f).as_bytes());
            }
            Argument::Token(t) => t.write(out),
        }
    }
}

#[inline]
fn write_bulk<B: BufMut>(out: &mut B, payload: &[u8]) {
    let mut len = itoa::Buffer::new();
    out.put_u8(b'$');
    out.put_slice(len.format(payload.len()).as_bytes());
    out.put_slice(b"\r\n");
    out.put_slice(payload);
    out.put_slice(b"\r\n");
}

impl<'a> From<&'a [u8]> for Argument<'a> {
    fn from(value: &'a [u8]) -> Self {
        Argument::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Argument<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Argument::Bytes(value)
    }
}

impl<'a> From<&'a Vec<u8>> for Argument<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Argument::Bytes(value)
    }
}

impl<'a> From<&'a Bytes> for Argument<'a> {
    fn from(value: &'a Bytes) -> Self {
        Argument::Bytes(value)
    }
}

impl<'a> From<&'a str> for Argument<'a> {
    fn from(value: &'a str) -> Self {
        Argument::Text(value)
    }
}

impl<'a> From<&'a String> for Argument<'a> {
    fn from(value: &'a String) -> Self {
        Argument::Text(value)
    }
}

impl From<i64> for Argument<'_> {
    fn from(value: i64) -> Self {
        Argument::Int(value)
    }
}

impl From<i32> for Argument<'_> {
    fn from(value: i32) -> Self {
        Argument::Int(value.into())
    }
}

impl From<u64> for Argument<'_> {
    fn from(value: u64) -> Self {
        Argument::UInt(value)
    }
}

impl From<u32> for Argument<'_> {
    fn from(value: u32) -> Self {
        Argument::UInt(value.into())
    }
}

impl From<u16> for Argument<'_> {
    fn from(value: u16) -> Self {
        Argument::UInt(value.into())
    }
}

impl From<usize> for Argument<'_> {
    fn from(value: usize) -> Self {
        Argument::UInt(value as u64)
    }
}

impl From<f64> for Argument<'_> {
    fn from(value: f64) -> Self {
        Argument::Float(value)
    }
}

impl From<Token> for Argument<'_> {
    fn from(value: Token) -> Self {
        Argument::Token(value)
    }
}

/// An argument that expands into a fixed number of consecutive frames.
pub trait Composite<'a> {
    /// Number of bulk string frames one value writes.
    const FRAMES: usize;

    /// Visit the frames in wire order. The flag marks partition keys.
    fn visit<F: FnMut(Argument<'a>, bool)>(&self, f: F);

    /// Total frame size of one value.
    fn encoded_len(&self) -> usize {
        let mut total = 0;
        self.visit(|arg, _| total += arg.encoded_len());
        total
    }
}

/// A sorted-set `score member` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreMember<'a> {
    pub score: f64,
    pub member: &'a [u8],
}

impl<'a> ScoreMember<'a> {
    pub fn new<M: AsRef<[u8]> + ?Sized>(score: f64, member: &'a M) -> Self {
        Self {
            score,
            member: member.as_ref(),
        }
    }
}

impl<'a> Composite<'a> for ScoreMember<'a> {
    const FRAMES: usize = 2;

    fn visit<F: FnMut(Argument<'a>, bool)>(&self, mut f: F) {
        f(Argument::Float(self.score), false);
        f(Argument::Bytes(self.member), false);
    }
}

/// A hash `field value` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldValue<'a> {
    pub field: &'a [u8],
    pub value: &'a [u8],
}

impl<'a> FieldValue<'a> {
    pub fn new<F, V>(field: &'a F, value: &'a V) -> Self
    where
        F: AsRef<[u8]> + ?Sized,
        V: AsRef<[u8]> + ?Sized,
    {
        Self {
            field: field.as_ref(),
            value: value.as_ref(),
        }
    }
}

impl<'a> Composite<'a> for FieldValue<'a> {
    const FRAMES: usize = 2;

    fn visit<F: FnMut(Argument<'a>, bool)>(&self, mut f: F) {
        f(Argument::Bytes(self.field), false);
        f(Argument::Bytes(self.value), false);
    }
}

/// A `key value` pair as taken by MSET. The key is a partition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValue<'a> {
    pub key: &'a [u8],
    pub value: &'a [u8],
}

impl<'a> KeyValue<'a> {
    pub fn new<K, V>(key: &'a K, value: &'a V) -> Self
    where
        K: AsRef<[u8]> + ?Sized,
        V: AsRef<[u8]> + ?Sized,
    {
        Self {
            key: key.as_ref(),
            value: value.as_ref(),
        }
    }
}

impl<'a> Composite<'a> for KeyValue<'a> {
    const FRAMES: usize = 2;

    fn visit<F: FnMut(Argument<'a>, bool)>(&self, mut f: F) {
        f(Argument::Bytes(self.key), true);
        f(Argument::Bytes(self.value), false);
    }
}

/// A `longitude latitude member` triple as taken by GEOADD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoMember<'a> {
    pub longitude: f64,
    pub latitude: f64,
    pub member: &'a [u8],
}

impl<'a> GeoMember<'a> {
    pub fn new<M: AsRef<[u8]> + ?Sized>(longitude: f64, latitude: f64, member: &'a M) -> Self {
        Self {
            longitude,
            latitude,
            member: member.as_ref(),
        }
    }
}

impl<'a> Composite<'a> for GeoMember<'a> {
    const FRAMES: usize = 3;

    fn visit<F: FnMut(Argument<'a>, bool)>(&self, mut f: F) {
        f(Argument::Float(self.longitude), false);
        f(Argument::Float(self.latitude), false);
        f(Argument::Bytes(self.member), false);
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::token::kw;

    fn written(arg: Argument<'_>) -> Vec<u8> {
        let mut buf = BytesMut::new();
        arg.write(&mut buf);
        buf.to_vec()
    }

    #[test]
    fn test_write_variants() {
        assert_eq!(written(Argument::Bytes(b"k")), b"$1\r\nk\r\n");
        assert_eq!(written(Argument::Text("héllo")), "$6\r\nhéllo\r\n".as_bytes());
        assert_eq!(written(Argument::Int(-12)), b"$3\r\n-12\r\n");
        assert_eq!(written(Argument::UInt(3600)), b"$4\r\n3600\r\n");
        assert_eq!(written(Argument::Float(2.5)), b"$3\r\n2.5\r\n");
        assert_eq!(written(Argument::Token(kw::MATCH)), b"$5\r\nMATCH\r\n");
    }

    #[test]
    fn test_non_finite_floats_are_representable() {
        assert_eq!(written(Argument::Float(f64::INFINITY)), b"$3\r\ninf\r\n");
        assert_eq!(written(Argument::Float(f64::NEG_INFINITY)), b"$4\r\n-inf\r\n");
        assert_eq!(written(Argument::Float(f64::NAN)), b"$3\r\nNaN\r\n");
    }

    #[test]
    fn test_encoded_len_matches_write() {
        let args = [
            Argument::Bytes(&[0u8; 123]),
            Argument::Text("ünïcödé"),
            Argument::Int(i64::MIN),
            Argument::UInt(u64::MAX),
            Argument::Float(-1.0e-300),
            Argument::Float(f64::NAN),
            Argument::Token(kw::WITHSCORES),
        ];
        for arg in args {
            assert_eq!(arg.encoded_len(), written(arg).len(), "{arg:?}");
        }
    }

    #[test]
    fn test_composite_frames() {
        let geo = GeoMember::new(13.361389, 38.115556, "Palermo");
        let mut frames = 0;
        geo.visit(|_, _| frames += 1);
        assert_eq!(frames, GeoMember::FRAMES);

        let mut keys = Vec::new();
        KeyValue::new("k", "v").visit(|arg, is_key| {
            if is_key {
                keys.push(arg);
            }
        });
        assert_eq!(keys, vec![Argument::Bytes(b"k")]);
    }

    #[test]
    fn test_composite_encoded_len() {
        let pair = ScoreMember::new(1.5, "m");
        let mut buf = BytesMut::new();
        pair.visit(|arg, _| arg.write(&mut buf));
        assert_eq!(pair.encoded_len(), buf.len());
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Argument::from("a"), Argument::Text("a"));
        assert_eq!(Argument::from(&b"a"[..]), Argument::Bytes(b"a"));
        assert_eq!(Argument::from(7u16), Argument::UInt(7));
        assert_eq!(Argument::from(-7i32), Argument::Int(-7));
        assert_eq!(Argument::from(kw::NX), Argument::Token(kw::NX));
    }
}
