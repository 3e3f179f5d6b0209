//! Typed coercion of reply values.
//!
//! The same RESP array decodes into different element types depending on the
//! call site (`Vec<Bytes>` for MGET, `Vec<Option<f64>>` for ZMSCORE ...).
//! The caller names the target type; [`FromValue`] does the checked
//! conversion.

use std::collections::HashMap;
use std::hash::Hash;

use bytes::Bytes;

use crate::Value;
use crate::error::DecodeError;

/// Conversion from a reply value into a Rust type.
///
/// Error replies are handled by the caller before decoding; seeing one here
/// is a shape mismatch.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, DecodeError>;
}

fn unexpected<T>(expected: &'static str, value: &Value) -> Result<T, DecodeError> {
    Err(DecodeError::Unexpected {
        expected,
        actual: value.kind(),
    })
}

fn parse_text<T: std::str::FromStr>(text: &[u8]) -> Result<T, DecodeError> {
    std::str::from_utf8(text)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DecodeError::InvalidNumber(String::from_utf8_lossy(text).into_owned()))
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        Ok(value)
    }
}

impl FromValue for () {
    fn from_value(_: Value) -> Result<Self, DecodeError> {
        Ok(())
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Integer(n) => Ok(n != 0),
            Value::SimpleString(ref s) if &s[..] == b"OK" => Ok(true),
            Value::Null => Ok(false),
            #[cfg(feature = "resp3")]
            Value::Boolean(b) => Ok(b),
            other => unexpected("integer or boolean", &other),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Integer(n) => Ok(n),
            Value::BulkString(ref s) | Value::SimpleString(ref s) => parse_text(s),
            other => unexpected("integer", &other),
        }
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Integer(n) => {
                u64::try_from(n).map_err(|_| DecodeError::InvalidNumber(n.to_string()))
            }
            Value::BulkString(ref s) | Value::SimpleString(ref s) => parse_text(s),
            other => unexpected("integer", &other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::BulkString(ref s) | Value::SimpleString(ref s) => match &s[..] {
                b"inf" | b"+inf" => Ok(f64::INFINITY),
                b"-inf" => Ok(f64::NEG_INFINITY),
                other => parse_text(other),
            },
            Value::Integer(n) => Ok(n as f64),
            #[cfg(feature = "resp3")]
            Value::Double(d) => Ok(d),
            other => unexpected("float", &other),
        }
    }
}

impl FromValue for Bytes {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::BulkString(s) | Value::SimpleString(s) => Ok(s),
            #[cfg(feature = "resp3")]
            Value::VerbatimString { data, .. } => Ok(data),
            other => unexpected("string", &other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        Bytes::from_value(value).map(Vec::from)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        let bytes = Bytes::from_value(value)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::Unexpected {
            expected: "UTF-8 string",
            actual: "binary string",
        })
    }
}

/// Null decodes to `None`; anything else decodes as `T`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// A null array decodes as empty.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(Vec::new()),
            other => match other.into_array() {
                Ok(elements) => elements.into_iter().map(T::from_value).collect(),
                Err(other) => unexpected("array", &other),
            },
        }
    }
}

/// Accepts a flat `[k1, v1, k2, v2, ...]` array (RESP2 HGETALL) or a RESP3 map.
impl<K, V> FromValue for HashMap<K, V>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
{
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(HashMap::new()),
            #[cfg(feature = "resp3")]
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => {
                let elements = match other.into_array() {
                    Ok(elements) => elements,
                    Err(other) => return unexpected("array or map", &other),
                };
                if elements.len() % 2 != 0 {
                    return Err(DecodeError::WrongLength {
                        expected: elements.len() + 1,
                        actual: elements.len(),
                    });
                }
                let mut map = HashMap::with_capacity(elements.len() / 2);
                let mut iter = elements.into_iter();
                while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
                    map.insert(K::from_value(k)?, V::from_value(v)?);
                }
                Ok(map)
            }
        }
    }
}

macro_rules! tuple_from_value {
    ($len:literal => $($name:ident),+) => {
        impl<$($name: FromValue),+> FromValue for ($($name,)+) {
            fn from_value(value: Value) -> Result<Self, DecodeError> {
                let elements = match value.into_array() {
                    Ok(elements) => elements,
                    Err(other) => return unexpected("array", &other),
                };
                if elements.len() != $len {
                    return Err(DecodeError::WrongLength {
                        expected: $len,
                        actual: elements.len(),
                    });
                }
                let mut iter = elements.into_iter();
                Ok(($(
                    match iter.next() {
                        Some(element) => $name::from_value(element)?,
                        None => return Err(DecodeError::WrongLength { expected: $len, actual: 0 }),
                    },
                )+))
            }
        }
    };
}

tuple_from_value!(2 => A, B);
tuple_from_value!(3 => A, B, C);
