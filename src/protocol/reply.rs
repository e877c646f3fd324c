//! Reply decoder
//!
//! Consumes exactly one reply from a byte stream, nested replies included,
//! and reports only whether it was an error reply. Values are never
//! materialized: bulk payloads are skipped and status/integer text is
//! discarded.
//!
//! | Tag | Reply         | Result                       |
//! |-----|---------------|------------------------------|
//! | `$` | bulk string   | `None` (payload skipped)     |
//! | `:` | integer       | `None`                       |
//! | `*` | array         | `None` (elements consumed)   |
//! | `+` | simple string | `None`                       |
//! | `-` | error         | `Some(message)`              |
//!
//! Any other tag is a framing fault, as is array nesting deeper than
//! [`MAX_NESTING`].

use std::io::{self, Read};

use bytes::{BufMut, BytesMut};

use super::{ARRAY, BULK, ERROR, INTEGER, SIMPLE};
use crate::error::{EndpointError, Result};

/// Initial capacity of the segment accumulator
const SEGMENT_CAPACITY: usize = 128;

/// Deepest array nesting accepted before the stream is treated as hostile
pub const MAX_NESTING: usize = 1024;

/// Decode one reply
///
/// Returns `Ok(None)` for every non-error reply and `Ok(Some(text))` for an
/// error reply. `Err` means the stream is no longer aligned on a reply
/// boundary.
pub fn read_reply<R: Read>(reader: &mut R) -> Result<Option<String>> {
    read_nested(reader, 0)
}

fn read_nested<R: Read>(reader: &mut R, depth: usize) -> Result<Option<String>> {
    let tag = read_byte(reader)?;
    match tag {
        BULK => {
            let len = read_length(reader)?;
            if len < 0 {
                return Ok(None);
            }
            skip(reader, len as u64)?;
            expect_crlf(reader)?;
            Ok(None)
        }
        INTEGER | SIMPLE => {
            skip_line(reader)?;
            Ok(None)
        }
        ARRAY => {
            if depth >= MAX_NESTING {
                return Err(EndpointError::Protocol(format!(
                    "array nesting deeper than {}",
                    MAX_NESTING
                )));
            }
            let count = read_length(reader)?;
            for _ in 0..count.max(0) {
                // Element errors are part of the aggregate, not the outcome
                read_nested(reader, depth + 1)?;
            }
            Ok(None)
        }
        ERROR => {
            let line = read_line(reader)?;
            Ok(Some(String::from_utf8_lossy(&line).into_owned()))
        }
        other => Err(EndpointError::Protocol(format!(
            "expect [$,:,*,+,-] but: {}",
            other as char
        ))),
    }
}

// =============================================================================
// Read primitives
// =============================================================================

fn read_byte<R: Read>(reader: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    Ok(byte[0])
}

/// Feed a segment's bytes to `keep` up to its CRLF terminator
///
/// A CR that is not followed by LF is kept on its own; the byte after it is
/// examined again, since it may start the terminator.
fn scan_line<R: Read>(reader: &mut R, mut keep: impl FnMut(u8)) -> Result<()> {
    let mut byte = read_byte(reader)?;
    loop {
        if byte != b'\r' {
            keep(byte);
            byte = read_byte(reader)?;
            continue;
        }
        let next = read_byte(reader)?;
        if next == b'\n' {
            return Ok(());
        }
        keep(byte);
        byte = next;
    }
}

/// Read a segment up to its CRLF terminator (terminator consumed, not returned)
fn read_line<R: Read>(reader: &mut R) -> Result<BytesMut> {
    let mut line = BytesMut::with_capacity(SEGMENT_CAPACITY);
    scan_line(reader, |byte| line.put_u8(byte))?;
    Ok(line)
}

/// Scan to the CRLF terminator, discarding everything
fn skip_line<R: Read>(reader: &mut R) -> Result<()> {
    scan_line(reader, |_| {})
}

/// Read a signed decimal length or count line
fn read_length<R: Read>(reader: &mut R) -> Result<i64> {
    let line = read_line(reader)?;
    std::str::from_utf8(&line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|n| *n >= -1)
        .ok_or_else(|| {
            EndpointError::Protocol(format!(
                "invalid length: {:?}",
                String::from_utf8_lossy(&line)
            ))
        })
}

/// Skip exactly `len` bytes
fn skip<R: Read>(reader: &mut R, len: u64) -> Result<()> {
    let skipped = io::copy(&mut reader.by_ref().take(len), &mut io::sink())?;
    if skipped < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("bulk payload truncated: {} of {} bytes", skipped, len),
        )
        .into());
    }
    Ok(())
}

/// Consume the terminator that follows a bulk payload
fn expect_crlf<R: Read>(reader: &mut R) -> Result<()> {
    let mut crlf = [0u8; 2];
    reader.read_exact(&mut crlf)?;
    if &crlf != b"\r\n" {
        return Err(EndpointError::Protocol(format!(
            "bulk payload not terminated by CRLF: {:?}",
            String::from_utf8_lossy(&crlf)
        )));
    }
    Ok(())
}
