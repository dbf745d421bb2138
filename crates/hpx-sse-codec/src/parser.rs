//! Line-level parsing for the SSE decoder.
//!
//! The decoder works on a fully buffered input, so normalisation happens once
//! up front: [`normalize`] strips the BOM and folds every line ending into LF,
//! [`Lines`] splits the result, and [`read_line`] classifies each line.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::constants::{BOM, COLON, CR, LF};

/// A full line from an SSE stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawEventLine<'a> {
    /// Comment line (starts with `:`)
    Comment,
    /// A field line with optional value.
    Field {
        field_name: &'a [u8],
        field_value: Option<&'a [u8]>,
    },
    /// An empty line (event delimiter).
    Empty,
}

/// Valid field names per the
/// [HTML Living Standard](https://html.spec.whatwg.org/multipage/server-sent-events.html#event-stream-interpretation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldName {
    Event,
    Data,
    Id,
    Retry,
    Ignored,
}

impl FieldName {
    pub(crate) fn from_bytes(name: &[u8]) -> Self {
        match name {
            b"event" => Self::Event,
            b"data" => Self::Data,
            b"id" => Self::Id,
            b"retry" => Self::Retry,
            _ => Self::Ignored,
        }
    }
}

/// Strips a leading BOM and rewrites CRLF and lone CR line endings to LF.
///
/// CRLF is folded before lone CR so a pair never turns into two line breaks.
/// Input without any CR is returned without copying.
pub(crate) fn normalize(mut raw: Bytes) -> Bytes {
    if raw.starts_with(BOM) {
        raw.advance(BOM.len());
    }

    if memchr::memchr(CR, &raw).is_none() {
        return raw;
    }

    let mut out = BytesMut::with_capacity(raw.len());
    let mut rest = &raw[..];
    while let Some(pos) = memchr::memchr(CR, rest) {
        out.extend_from_slice(&rest[..pos]);
        out.put_u8(LF);
        rest = match rest.get(pos + 1) {
            Some(&LF) => &rest[pos + 2..],
            _ => &rest[pos + 1..],
        };
    }
    out.extend_from_slice(rest);
    out.freeze()
}

/// Splits a normalised buffer on LF.
///
/// Like a plain split, the fragment after the last LF is always yielded, so
/// input ending in `\n` produces a trailing empty line.
#[derive(Debug)]
pub(crate) struct Lines {
    buf: Bytes,
    finished: bool,
}

impl Lines {
    pub(crate) fn new(buf: Bytes) -> Self {
        Self {
            buf,
            finished: false,
        }
    }
}

impl Iterator for Lines {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.finished {
            return None;
        }
        match memchr::memchr(LF, &self.buf) {
            Some(pos) => {
                let line = self.buf.split_to(pos);
                self.buf.advance(1);
                Some(line)
            }
            None => {
                self.finished = true;
                Some(core::mem::take(&mut self.buf))
            }
        }
    }
}

/// Classifies a single line (without its terminator).
pub(crate) fn read_line(bytes: &[u8]) -> RawEventLine<'_> {
    match memchr::memchr(COLON, bytes) {
        Some(0) => RawEventLine::Comment,
        Some(colon_pos) => {
            let value = &bytes[colon_pos + 1..];
            // Strip single leading space if present.
            let value = match value {
                [b' ', rest @ ..] => rest,
                _ => value,
            };
            RawEventLine::Field {
                field_name: &bytes[..colon_pos],
                field_value: Some(value),
            }
        }
        None if bytes.is_empty() => RawEventLine::Empty,
        None => RawEventLine::Field {
            field_name: bytes,
            field_value: None,
        },
    }
}
