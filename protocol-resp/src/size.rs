//! Exact wire-size arithmetic for RESP request frames.
//!
//! Every function here is pure: it reports how many bytes a frame will occupy
//! without writing anything. The encoder in [`crate::request`] allocates
//! exactly the sum of these figures and then verifies it wrote that many.

/// Bytes taken by the `\r\n` terminator.
pub const CRLF_LEN: usize = 2;

/// Number of decimal digits needed to print `n`.
#[inline]
pub const fn digits(mut n: u64) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

/// Length of the ASCII decimal text of a signed integer, sign included.
#[inline]
pub const fn int_text_len(n: i64) -> usize {
    if n < 0 {
        1 + digits(n.unsigned_abs())
    } else {
        digits(n as u64)
    }
}

/// Length of the ASCII text of a float as the encoder prints it.
///
/// NaN and the infinities are representable (`NaN`, `inf`, `-inf`); the
/// server decides whether it accepts them.
#[inline]
pub fn float_text_len(f: f64) -> usize {
    let mut buf = ryu::Buffer::new();
    buf.format(f).len()
}

/// Size of an array header: `*<count>\r\n`.
#[inline]
pub const fn array_header_len(count: usize) -> usize {
    1 + digits(count as u64) + CRLF_LEN
}

/// Size of a bulk string frame carrying `payload_len` bytes:
/// `$<len>\r\n<payload>\r\n`.
#[inline]
pub const fn bulk_len(payload_len: usize) -> usize {
    1 + digits(payload_len as u64) + CRLF_LEN + payload_len + CRLF_LEN
}

/// Sum of the frame sizes of an indexable sequence.
///
/// Must agree byte-for-byte with [`sum_iter`]; it only skips the iterator
/// adapter chain.
#[inline]
pub fn sum_slice<T>(items: &[T], size_of: impl Fn(&T) -> usize) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < items.len() {
        total += size_of(&items[i]);
        i += 1;
    }
    total
}

/// Sum of the frame sizes of any sequence, in iteration order.
#[inline]
pub fn sum_iter<I: IntoIterator>(items: I, size_of: impl Fn(&I::Item) -> usize) -> usize {
    items.into_iter().map(|item| size_of(&item)).sum()
}
