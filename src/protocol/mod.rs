//! Protocol Module
//!
//! RESP wire protocol as seen from the client side.
//!
//! ### Type Tags
//! - `$`: bulk string (`$<len>\r\n<bytes>\r\n`, `$-1\r\n` for null)
//! - `:`: integer
//! - `*`: array (`*<count>\r\n` then `count` replies, `*-1\r\n` for null)
//! - `+`: simple string
//! - `-`: error
//!
//! Commands go out as arrays of bulk strings; replies come back as any of
//! the five types above.

mod codec;
mod command;
mod reply;

pub use codec::{encode_command, write_command, write_frame};
pub use command::{Command, CommandType, AUTH, PING, REPLACE, RESTORE, SELECT};
pub use reply::{read_reply, MAX_NESTING};

pub const BULK: u8 = b'$';
pub const INTEGER: u8 = b':';
pub const ARRAY: u8 = b'*';
pub const SIMPLE: u8 = b'+';
pub const ERROR: u8 = b'-';

/// Segment terminator
pub const CRLF: &[u8] = b"\r\n";
