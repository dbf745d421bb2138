//! Common constants used by the encoder and the decoder.

use bytes_utils::Str;

/// Newline byte
pub(crate) const LF: u8 = b'\n';
/// Carriage return byte
pub(crate) const CR: u8 = b'\r';
/// Field name / value separator
pub(crate) const COLON: u8 = b':';
/// Byte that invalidates an `id` value
pub(crate) const NUL: u8 = 0;

/// Byte Order Mark as char
const BOM_CHAR: char = '\u{FEFF}';
const BOM_LEN: usize = BOM_CHAR.len_utf8();
/// Byte representation of the BOM [`char`]
pub(crate) const BOM: &[u8; BOM_LEN] = &{
    let mut buf = [0u8; BOM_LEN];
    BOM_CHAR.encode_utf8(&mut buf);
    buf
};

/// Empty instance of [`Str`], from an `&'static ""`
pub(crate) const EMPTY_STR: Str = Str::from_static("");
/// Default event type string (`"message"`)
pub(crate) const MESSAGE_STR: Str = Str::from_static("message");

pub(crate) const EVENT_PREFIX: &[u8] = b"event: ";
pub(crate) const ID_PREFIX: &[u8] = b"id: ";
pub(crate) const RETRY_PREFIX: &[u8] = b"retry: ";
pub(crate) const DATA_PREFIX: &[u8] = b"data: ";
/// Ends the `data` line and the event block.
pub(crate) const EVENT_TERMINATOR: &[u8] = b"\n\n";

/// Capacity of the encoder's buffered writer unless configured otherwise.
pub(crate) const DEFAULT_WRITE_BUFFER_CAPACITY: usize = 4096;
/// Chunk size used when copying a streamed payload.
pub(crate) const COPY_CHUNK_SIZE: usize = 8 * 1024;
