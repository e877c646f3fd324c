//! Protocol codec
//!
//! Encoding of outbound commands.
//!
//! ## Wire Format
//!
//! A command is an array of bulk strings: the command name followed by its
//! arguments.
//! ```text
//! *<argc+1>\r\n
//! $<len>\r\n<name>\r\n
//! $<len>\r\n<arg>\r\n      (repeated per argument)
//! ```
//!
//! Nothing here flushes. Callers that need a command on the network right
//! away flush the writer themselves.

use std::io::Write;

use bytes::{BufMut, BytesMut};

use super::{Command, ARRAY, BULK, CRLF};
use crate::error::Result;

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command name and its arguments
pub fn encode_command<A: AsRef<[u8]>>(name: &[u8], args: &[A]) -> BytesMut {
    let payload_len = name.len() + args.iter().map(|a| a.as_ref().len()).sum::<usize>();
    // Each header is at most a tag, 20 digits and CRLF
    let mut buf = BytesMut::with_capacity(payload_len + (args.len() + 2) * 25);

    put_header(&mut buf, ARRAY, args.len() + 1);
    put_bulk(&mut buf, name);
    for arg in args {
        put_bulk(&mut buf, arg.as_ref());
    }

    buf
}

/// Append a `<tag><decimal>\r\n` header
fn put_header(buf: &mut BytesMut, tag: u8, len: usize) {
    buf.put_u8(tag);
    buf.put_slice(len.to_string().as_bytes());
    buf.put_slice(CRLF);
}

/// Append a bulk string: header, payload, terminator
fn put_bulk(buf: &mut BytesMut, data: &[u8]) {
    put_header(buf, BULK, data.len());
    buf.put_slice(data);
    buf.put_slice(CRLF);
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a command name and arguments to a stream (no flush)
pub fn write_command<W: Write, A: AsRef<[u8]>>(
    writer: &mut W,
    name: &[u8],
    args: &[A],
) -> Result<()> {
    let bytes = encode_command(name, args);
    writer.write_all(&bytes)?;
    Ok(())
}

/// Write a typed command to a stream (no flush)
pub fn write_frame<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    write_command(writer, command.name(), &command.args())
}
