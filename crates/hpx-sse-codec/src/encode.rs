//! SSE encoder.
//!
//! Fields are written in a fixed order (`event`, `id`, `retry`, `data`) and
//! the event is closed with a blank line. The payload is copied verbatim
//! after `data: `: newlines inside it are *not* split into further `data:`
//! lines. When decoded again, only the first payload line lands in `data`;
//! every later line is re-parsed as a field line of its own, so a line such
//! as `id: x` or `retry: 5` inside the payload is applied to the event.

use std::io::{self, BufWriter, Read, Write};

use bytes::{BufMut, BytesMut};

use crate::{
    config::CodecConfig,
    constants::{
        COPY_CHUNK_SIZE, DATA_PREFIX, EVENT_PREFIX, EVENT_TERMINATOR, ID_PREFIX, LF, RETRY_PREFIX,
    },
    error::{SseError, SseResult},
    event::Event,
};

/// Renders everything up to and including the `data: ` prefix.
pub(crate) fn render_header(event: &Event, out: &mut BytesMut) {
    if !event.event.is_empty() {
        out.put_slice(EVENT_PREFIX);
        out.put_slice(event.event.as_bytes());
        out.put_u8(LF);
    }
    if !event.id.is_empty() {
        out.put_slice(ID_PREFIX);
        out.put_slice(event.id.as_bytes());
        out.put_u8(LF);
    }
    if event.retry > 0 {
        out.put_slice(RETRY_PREFIX);
        out.put_slice(event.retry.to_string().as_bytes());
        out.put_u8(LF);
    }
    out.put_slice(DATA_PREFIX);
}

/// Serializes [`Event`]s into the SSE wire format.
#[derive(Clone, Debug, Default)]
pub struct Encoder {
    config: CodecConfig,
}

impl Encoder {
    /// Create an encoder with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Config`] if the configuration is invalid.
    pub fn new(config: CodecConfig) -> SseResult<Self> {
        config.validate().map_err(SseError::config)?;
        Ok(Self { config })
    }

    /// The configuration this encoder was built with.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Write `event` to `writer`, flushing before returning.
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Write`] as soon as the sink rejects a write.
    pub fn encode<W: Write>(&self, writer: W, event: &Event) -> SseResult<()> {
        self.encode_with_payload(writer, event, &event.data[..])
    }

    /// Write `event` to `writer`, streaming the payload from `payload`
    /// instead of `event.data`.
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Write`] if the sink fails and [`SseError::Read`]
    /// if the payload source fails.
    pub fn encode_with_payload<W, R>(
        &self,
        writer: W,
        event: &Event,
        mut payload: R,
    ) -> SseResult<()>
    where
        W: Write,
        R: Read,
    {
        let mut buf = BufWriter::with_capacity(self.config.write_buffer_capacity, writer);

        let mut header = BytesMut::with_capacity(64);
        render_header(event, &mut header);

        let payload_len = match write_event(&mut buf, &header, &mut payload) {
            Ok(n) => n,
            Err(e) => {
                // `BufWriter` flushes on drop; discard the buffered bytes so
                // nothing reaches the sink after a failure.
                let (_writer, _discarded) = buf.into_parts();
                return Err(e);
            }
        };

        let event_type: &str = &event.event;
        tracing::debug!(
            event = event_type,
            bytes = header.len() + payload_len + EVENT_TERMINATOR.len(),
            "Encoded SSE event"
        );
        Ok(())
    }

    /// Async counterpart of [`Encoder::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Write`] as soon as the sink rejects a write.
    #[cfg(feature = "tokio")]
    pub async fn encode_async<W>(&self, writer: W, event: &Event) -> SseResult<()>
    where
        W: tokio::io::AsyncWrite + Unpin,
    {
        use tokio::io::AsyncWriteExt;

        let mut buf = tokio::io::BufWriter::with_capacity(self.config.write_buffer_capacity, writer);

        let mut header = BytesMut::with_capacity(64);
        render_header(event, &mut header);
        buf.write_all(&header).await.map_err(SseError::Write)?;
        buf.write_all(&event.data).await.map_err(SseError::Write)?;
        buf.write_all(EVENT_TERMINATOR)
            .await
            .map_err(SseError::Write)?;
        buf.flush().await.map_err(SseError::Write)?;

        let event_type: &str = &event.event;
        tracing::debug!(
            event = event_type,
            bytes = header.len() + event.data.len() + EVENT_TERMINATOR.len(),
            "Encoded SSE event"
        );
        Ok(())
    }
}

/// Writes header, payload and terminator, then flushes.
fn write_event<W: Write, R: Read>(
    buf: &mut BufWriter<W>,
    header: &[u8],
    payload: &mut R,
) -> SseResult<usize> {
    buf.write_all(header).map_err(SseError::Write)?;
    let payload_len = copy_payload(payload, buf)?;
    buf.write_all(EVENT_TERMINATOR).map_err(SseError::Write)?;
    buf.flush().map_err(SseError::Write)?;
    Ok(payload_len)
}

/// Copies `payload` into `writer`, keeping read and write failures apart.
fn copy_payload<R: Read, W: Write>(payload: &mut R, writer: &mut W) -> SseResult<usize> {
    let mut chunk = [0u8; COPY_CHUNK_SIZE];
    let mut total = 0;
    loop {
        let n = match payload.read(&mut chunk) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SseError::Read(e)),
        };
        writer.write_all(&chunk[..n]).map_err(SseError::Write)?;
        total += n;
    }
}

/// Encode `event` into `writer` with the default configuration.
///
/// # Errors
///
/// Returns [`SseError::Write`] if the sink fails.
pub fn encode<W: Write>(writer: W, event: &Event) -> SseResult<()> {
    Encoder::default().encode(writer, event)
}

/// Encode `event` into `writer`, reading the payload from `payload`.
///
/// # Errors
///
/// Returns [`SseError::Write`] if the sink fails and [`SseError::Read`] if
/// the payload source fails.
pub fn encode_with_payload<W, R>(writer: W, event: &Event, payload: R) -> SseResult<()>
where
    W: Write,
    R: Read,
{
    Encoder::default().encode_with_payload(writer, event, payload)
}

/// Async counterpart of [`encode`].
///
/// # Errors
///
/// Returns [`SseError::Write`] if the sink fails.
#[cfg(feature = "tokio")]
pub async fn encode_async<W>(writer: W, event: &Event) -> SseResult<()>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    Encoder::default().encode_async(writer, event).await
}
