//! SSE decoder for fully buffered input.

use std::io::{self, Read};

use bytes::{Bytes, BytesMut};
use bytes_utils::Str;

use crate::{
    config::CodecConfig,
    constants::{EMPTY_STR, LF, NUL},
    error::{SseError, SseResult},
    event::Event,
    parser::{FieldName, Lines, RawEventLine, normalize, read_line},
};

// ---------------------------------------------------------------------------
// EventBuilder
// ---------------------------------------------------------------------------

/// Accumulated `data:` lines.
///
/// The common case is a single `data:` line per event, so the first value is
/// kept as a zero-copy slice of the input and only upgraded to a mutable
/// buffer when a second line arrives.
#[derive(Debug, Default)]
enum DataBuffer {
    #[default]
    Uninit,
    Immutable(Bytes),
    Mutable(BytesMut),
}

impl DataBuffer {
    fn freeze(self) -> Bytes {
        match self {
            Self::Uninit => Bytes::new(),
            Self::Immutable(b) => b,
            Self::Mutable(b) => b.freeze(),
        }
    }

    fn push(&mut self, line: Bytes) {
        match self {
            Self::Uninit => *self = Self::Immutable(line),
            Self::Immutable(first) => {
                let mut buf = BytesMut::with_capacity(first.len() + 1 + line.len());
                buf.extend_from_slice(first);
                buf.extend_from_slice(&[LF]);
                buf.extend_from_slice(&line);
                *self = Self::Mutable(buf);
            }
            Self::Mutable(buf) => {
                buf.extend_from_slice(&[LF]);
                buf.extend_from_slice(&line);
            }
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::Uninit)
    }
}

/// In-progress event between two blank lines.
#[derive(Debug)]
struct EventBuilder {
    event: Str,
    id: Str,
    retry: u64,
    data: DataBuffer,
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self {
            event: EMPTY_STR,
            id: EMPTY_STR,
            retry: 0,
            data: DataBuffer::default(),
        }
    }
}

impl EventBuilder {
    fn add(&mut self, field_name: FieldName, value: Bytes) {
        match field_name {
            FieldName::Event => self.event = lossy_str(value),
            FieldName::Data => self.data.push(value),
            FieldName::Id => {
                if memchr::memchr(NUL, &value).is_none() {
                    self.id = lossy_str(value);
                } else {
                    tracing::trace!("Ignoring SSE id containing NUL");
                }
            }
            FieldName::Retry => match parse_retry(&value) {
                Some(retry) => self.retry = retry,
                None => tracing::trace!(
                    value = %String::from_utf8_lossy(&value),
                    "Ignoring invalid SSE retry value"
                ),
            },
            FieldName::Ignored => (),
        }
    }

    /// Returns true when a blank line should be skipped rather than end an
    /// event: nothing but `id` / `retry` has been seen yet.
    fn is_blank(&self) -> bool {
        self.data.is_empty() && self.event.is_empty()
    }

    /// Finish the current event and reset for the next one.
    fn dispatch(&mut self, default_event_type: &Str) -> Event {
        let EventBuilder {
            mut event,
            id,
            retry,
            data,
        } = core::mem::take(self);

        if event.is_empty() {
            event = default_event_type.clone();
        }

        Event {
            event,
            data: data.freeze(),
            id,
            retry,
        }
    }
}

/// Strict base-10 parse. Signs are accepted but the result must be
/// non-negative.
fn parse_retry(value: &[u8]) -> Option<u64> {
    let value = std::str::from_utf8(value).ok()?;
    let retry: i64 = value.parse().ok()?;
    u64::try_from(retry).ok()
}

/// Converts a field value to [`Str`] without copying when it is valid UTF-8.
fn lossy_str(value: Bytes) -> Str {
    match std::str::from_utf8(&value) {
        // Safety: we just validated the bytes are valid UTF-8.
        Ok(_) => unsafe { Str::from_inner_unchecked(value) },
        Err(_) => Str::from(&*String::from_utf8_lossy(&value)),
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Parses complete SSE byte streams into [`Event`]s.
///
/// The whole input is drained before parsing starts. Once it has been read,
/// decoding cannot fail: malformed fields are skipped.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    config: CodecConfig,
}

impl Decoder {
    /// Create a decoder with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Config`] if the configuration is invalid.
    pub fn new(config: CodecConfig) -> SseResult<Self> {
        config.validate().map_err(SseError::config)?;
        Ok(Self { config })
    }

    /// The configuration this decoder was built with.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Drain `reader` and decode every complete event in it.
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Read`] if reading fails or the input exceeds
    /// [`CodecConfig::max_input_size`].
    pub fn decode<R: Read>(&self, reader: R) -> SseResult<Vec<Event>> {
        let mut raw = Vec::new();
        match self.config.max_input_size {
            Some(limit) => {
                reader
                    .take(read_limit(limit))
                    .read_to_end(&mut raw)
                    .map_err(SseError::Read)?;
                check_limit(raw.len(), limit)?;
            }
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut raw).map_err(SseError::Read)?;
            }
        }
        Ok(self.decode_bytes(raw))
    }

    /// Async counterpart of [`Decoder::decode`].
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Read`] if reading fails or the input exceeds
    /// [`CodecConfig::max_input_size`].
    #[cfg(feature = "tokio")]
    pub async fn decode_async<R>(&self, reader: R) -> SseResult<Vec<Event>>
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        use tokio::io::AsyncReadExt;

        let mut raw = Vec::new();
        match self.config.max_input_size {
            Some(limit) => {
                reader
                    .take(read_limit(limit))
                    .read_to_end(&mut raw)
                    .await
                    .map_err(SseError::Read)?;
                check_limit(raw.len(), limit)?;
            }
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut raw).await.map_err(SseError::Read)?;
            }
        }
        Ok(self.decode_bytes(raw))
    }

    /// Decode an in-memory buffer.
    ///
    /// The size limit does not apply here; it only guards draining a source.
    pub fn decode_bytes(&self, raw: impl Into<Bytes>) -> Vec<Event> {
        let raw = normalize(raw.into());
        let input_len = raw.len();

        let mut events = Vec::new();
        let mut builder = EventBuilder::default();

        for line in Lines::new(raw) {
            match read_line(&line) {
                RawEventLine::Empty => {
                    if builder.is_blank() {
                        continue;
                    }
                    events.push(builder.dispatch(&self.config.default_event_type));
                }
                RawEventLine::Comment => (),
                RawEventLine::Field {
                    field_name,
                    field_value,
                } => {
                    let name = FieldName::from_bytes(field_name);
                    if name == FieldName::Ignored {
                        tracing::trace!(
                            field = %String::from_utf8_lossy(field_name),
                            "Ignoring unknown SSE field"
                        );
                        continue;
                    }
                    let value = field_value
                        .map(|value| line.slice_ref(value))
                        .unwrap_or_default();
                    builder.add(name, value);
                }
            }
        }

        tracing::debug!(
            events = events.len(),
            bytes = input_len,
            "Decoded SSE stream"
        );
        events
    }
}

/// One byte past the limit so an oversized input is detectable.
fn read_limit(limit: usize) -> u64 {
    u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1)
}

fn check_limit(len: usize, limit: usize) -> SseResult<()> {
    if len > limit {
        return Err(SseError::Read(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("SSE input exceeds {limit} bytes"),
        )));
    }
    Ok(())
}

/// Drain `reader` and decode it with the default configuration.
///
/// # Errors
///
/// Returns [`SseError::Read`] if reading fails.
pub fn decode<R: Read>(reader: R) -> SseResult<Vec<Event>> {
    Decoder::default().decode(reader)
}

/// Decode an in-memory buffer with the default configuration.
pub fn decode_bytes(raw: impl Into<Bytes>) -> Vec<Event> {
    Decoder::default().decode_bytes(raw)
}

/// Async counterpart of [`decode`].
///
/// # Errors
///
/// Returns [`SseError::Read`] if reading fails.
#[cfg(feature = "tokio")]
pub async fn decode_async<R>(reader: R) -> SseResult<Vec<Event>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    Decoder::default().decode_async(reader).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_str(input: &'static str) -> Vec<Event> {
        decode_bytes(input)
    }

    fn message(data: &'static str) -> Event {
        Event::new(data).with_event("message")
    }

    #[test]
    fn valid_data_fields() {
        assert_eq!(
            decode_str("data: Hello, world!\n\n"),
            vec![message("Hello, world!")]
        );
        assert_eq!(
            decode_str("data: Hello,\ndata: world!\n\n"),
            vec![message("Hello,\nworld!")]
        );
        assert_eq!(
            decode_str("data: Hello,\n\ndata: world!\n\n"),
            vec![message("Hello,"), message("world!")]
        );
    }

    #[test]
    fn trailing_newline_closes_event() {
        // The fragment after the final LF is an empty line.
        assert_eq!(decode_str("data: Hello\n"), vec![message("Hello")]);
        assert_eq!(decode_str("data: Hello"), vec![]);
        assert_eq!(decode_str(""), vec![]);
    }

    #[test]
    fn html_standard_examples() {
        assert_eq!(
            decode_str(
                "data: This is the first message.

data: This is the second message, it
data: has two lines.

data: This is the third message.

"
            ),
            vec![
                message("This is the first message."),
                message("This is the second message, it\nhas two lines."),
                message("This is the third message."),
            ]
        );

        assert_eq!(
            decode_str(
                "event: add
data: 73857293

event: remove
data: 2153

event: add
data: 113411

"
            ),
            vec![
                Event::new("73857293").with_event("add"),
                Event::new("2153").with_event("remove"),
                Event::new("113411").with_event("add"),
            ]
        );

        assert_eq!(
            decode_str("data: YHOO\ndata: +2\ndata: 10\n\n"),
            vec![message("YHOO\n+2\n10")]
        );

        assert_eq!(
            decode_str("data\n\ndata\ndata\n\ndata:\n"),
            vec![message(""), message("\n"), message("")]
        );
    }

    #[test]
    fn id_only_block_carries_into_next_event() {
        // A blank line with no data and no event type is skipped without
        // resetting the pending id / retry.
        assert_eq!(
            decode_str("id: 7\nretry: 100\n\ndata: x\n\n"),
            vec![message("x").with_id("7").with_retry(100)]
        );
    }

    #[test]
    fn event_without_data() {
        assert_eq!(
            decode_str("event: ping\n\n"),
            vec![Event::default().with_event("ping")]
        );
    }

    #[test]
    fn last_field_wins() {
        assert_eq!(
            decode_str("event: a\nevent: b\nid: 1\nid: 2\nretry: 5\nretry: 6\ndata: d\n\n"),
            vec![Event::new("d").with_event("b").with_id("2").with_retry(6)]
        );
    }

    #[test]
    fn retry_parsing() {
        assert_eq!(parse_retry(b"3000"), Some(3000));
        assert_eq!(parse_retry(b"0"), Some(0));
        assert_eq!(parse_retry(b"+15"), Some(15));
        assert_eq!(parse_retry(b"-100"), None);
        assert_eq!(parse_retry(b"100ms"), None);
        assert_eq!(parse_retry(b" 100"), None);
        assert_eq!(parse_retry(b""), None);
        assert_eq!(parse_retry(b"invalid"), None);
        assert_eq!(parse_retry(b"99999999999999999999"), None);
    }

    #[test]
    fn invalid_retry_keeps_previous_value() {
        assert_eq!(
            decode_str("retry: 250\nretry: soon\ndata: x\n\n"),
            vec![message("x").with_retry(250)]
        );
    }

    #[test]
    fn id_with_nul_is_ignored() {
        assert_eq!(
            decode_str("id: ok\nid: bad\0id\ndata: x\n\n"),
            vec![message("x").with_id("ok")]
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        assert_eq!(
            decode_str("foo: bar\nDATA: loud\ndata: x\n\n"),
            vec![message("x")]
        );
    }

    #[test]
    fn invalid_utf8_is_lossy_for_names() {
        let events = decode_bytes(Bytes::from_static(b"event: a\xffb\ndata: \xfe\n\n"));
        assert_eq!(events.len(), 1);
        assert_eq!(&*events[0].event, "a\u{FFFD}b");
        assert_eq!(events[0].data, Bytes::from_static(b"\xfe"));
    }

    #[test]
    fn custom_default_event_type() {
        let decoder =
            Decoder::new(CodecConfig::new().default_event_type("update")).expect("valid config");
        let events = decoder.decode_bytes("data: x\n\nevent: own\ndata: y\n\n");
        assert_eq!(
            events,
            vec![
                Event::new("x").with_event("update"),
                Event::new("y").with_event("own"),
            ]
        );
    }

    #[test]
    fn input_limit() {
        let decoder =
            Decoder::new(CodecConfig::new().max_input_size(Some(12))).expect("valid config");

        let events = decoder
            .decode(&b"data: abc\n\n"[..])
            .expect("within limit");
        assert_eq!(events, vec![message("abc")]);

        let err = decoder
            .decode(&b"data: abcdef\n\n"[..])
            .expect_err("over limit");
        assert!(err.is_read());
        assert_eq!(
            err.io_error().map(io::Error::kind),
            Some(io::ErrorKind::InvalidData)
        );
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn async_matches_sync() {
        let input: &[u8] = b"\xEF\xBB\xBFevent: t\r\nid: 1\rdata: a\ndata: b\r\n\r\n";
        let sync_events = decode(input).expect("sync decode");
        let async_events = decode_async(input).await.expect("async decode");
        assert_eq!(sync_events, async_events);
        assert_eq!(
            sync_events,
            vec![Event::new("a\nb").with_event("t").with_id("1")]
        );
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn async_input_limit() {
        let decoder =
            Decoder::new(CodecConfig::new().max_input_size(Some(4))).expect("valid config");
        let err = decoder
            .decode_async(&b"data: too long\n\n"[..])
            .await
            .expect_err("over limit");
        assert!(err.is_read());
    }
}
