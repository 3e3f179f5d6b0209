//! Incremental frame boundary detection.
//!
//! A large reply usually arrives over many reads. [`FrameScanner`] walks
//! element headers as bytes come in and remembers where it stopped, so each
//! byte is looked at once no matter how the reply is split. When the last
//! element of the frame is in, it reports the frame length and the caller
//! parses exactly that many bytes with
//! [`Value::parse_bytes_with_options`](crate::Value::parse_bytes_with_options).
//!
//! The scanner enforces the same [`ParseOptions`] limits as the parser, so an
//! oversized bulk string or collection is rejected from its header instead of
//! after it has been buffered.

use crate::error::ParseError;
use crate::value::{ParseOptions, find_crlf, parse_int};

enum Kind {
    Line,
    Blob,
    Aggregate(usize),
}

/// Finds where one RESP frame ends, across calls on a growing buffer.
///
/// The buffer passed to [`scan`](Self::scan) must start at the frame and may
/// only grow between calls until a length is returned.
#[derive(Debug, Clone, Default)]
pub struct FrameScanner {
    /// Offset of the next element header. Everything before it is complete.
    pos: usize,
    /// Elements still owed by each open aggregate, innermost last.
    pending: Vec<usize>,
}

impl FrameScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes at the start of the frame already known to be complete.
    pub fn scanned(&self) -> usize {
        self.pos
    }

    /// Forget progress, for a buffer that no longer starts at this frame.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.pending.clear();
    }

    /// Advance over the complete elements in `data`. Returns the frame
    /// length once the frame is complete and resets for the next one.
    pub fn scan(
        &mut self,
        data: &[u8],
        options: &ParseOptions,
    ) -> Result<Option<usize>, ParseError> {
        loop {
            let Some(&prefix) = data.get(self.pos) else {
                return Ok(None);
            };
            let kind = match prefix {
                b'+' | b'-' | b':' => Kind::Line,
                #[cfg(feature = "resp3")]
                b'_' | b'#' | b',' | b'(' => Kind::Line,
                b'$' => Kind::Blob,
                #[cfg(feature = "resp3")]
                b'!' | b'=' => Kind::Blob,
                b'*' => Kind::Aggregate(1),
                #[cfg(feature = "resp3")]
                b'~' | b'>' => Kind::Aggregate(1),
                #[cfg(feature = "resp3")]
                b'%' => Kind::Aggregate(2),
                other => return Err(ParseError::InvalidPrefix(other)),
            };
            let Some(crlf) = find_crlf(&data[self.pos + 1..]) else {
                return Ok(None);
            };
            let text = &data[self.pos + 1..self.pos + 1 + crlf];
            let body = self.pos + 1 + crlf + 2;

            let owed = match kind {
                Kind::Line => {
                    self.pos = body;
                    0
                }
                Kind::Blob => match blob_end(data.len(), text, body, options)? {
                    Some(end) => {
                        self.pos = end;
                        0
                    }
                    // The header is re-read next time; the payload is not.
                    None => return Ok(None),
                },
                Kind::Aggregate(per_entry) => {
                    let owed = self.open(text, per_entry, options)?;
                    self.pos = body;
                    owed
                }
            };
            if owed > 0 {
                self.pending.push(owed);
                continue;
            }

            // One element is done. Close every aggregate it completes.
            loop {
                match self.pending.last_mut() {
                    None => {
                        let len = self.pos;
                        self.reset();
                        return Ok(Some(len));
                    }
                    Some(owed) => {
                        *owed -= 1;
                        if *owed > 0 {
                            break;
                        }
                        self.pending.pop();
                    }
                }
            }
        }
    }

    /// Number of nested values an aggregate header announces.
    fn open(
        &self,
        text: &[u8],
        per_entry: usize,
        options: &ParseOptions,
    ) -> Result<usize, ParseError> {
        let depth = self.pending.len();
        if depth >= options.max_depth {
            return Err(ParseError::NestingTooDeep(depth));
        }
        let count = parse_int(text)?;
        if count < 0 {
            return Ok(0);
        }
        let count = count as usize;
        if count > options.max_collection_elements {
            return Err(ParseError::CollectionTooLarge(count));
        }
        Ok(count * per_entry)
    }
}

/// End of a length-prefixed payload if all of it is buffered.
fn blob_end(
    available: usize,
    text: &[u8],
    body: usize,
    options: &ParseOptions,
) -> Result<Option<usize>, ParseError> {
    let len = parse_int(text)?;
    if len < 0 {
        return Ok(Some(body));
    }
    let len = len as usize;
    if len > options.max_bulk_string_len {
        return Err(ParseError::BulkStringTooLong {
            len,
            max: options.max_bulk_string_len,
        });
    }
    let end = body
        .checked_add(len)
        .and_then(|n| n.checked_add(2))
        .ok_or_else(|| ParseError::InvalidInteger("length overflow".to_string()))?;
    Ok((available >= end).then_some(end))
}
