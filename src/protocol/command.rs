//! Command definitions
//!
//! The commands an endpoint sends to the server.

use std::borrow::Cow;

pub const AUTH: &[u8] = b"AUTH";
pub const PING: &[u8] = b"PING";
pub const SELECT: &[u8] = b"SELECT";
pub const RESTORE: &[u8] = b"RESTORE";
pub const REPLACE: &[u8] = b"REPLACE";

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Auth,
    Ping,
    Select,
    Restore,
}

/// An outbound command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Authenticate with a password
    Auth { password: Vec<u8> },

    /// Ping (liveness check)
    Ping,

    /// Switch the connection's database
    Select { db: u32 },

    /// Restore a serialized value under a key
    Restore {
        key: Vec<u8>,
        ttl: Vec<u8>,
        payload: Vec<u8>,
        replace: bool,
    },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Auth { .. } => CommandType::Auth,
            Command::Ping => CommandType::Ping,
            Command::Select { .. } => CommandType::Select,
            Command::Restore { .. } => CommandType::Restore,
        }
    }

    /// Command name as sent on the wire
    pub fn name(&self) -> &'static [u8] {
        match self.command_type() {
            CommandType::Auth => AUTH,
            CommandType::Ping => PING,
            CommandType::Select => SELECT,
            CommandType::Restore => RESTORE,
        }
    }

    /// Arguments following the command name, in wire order
    pub fn args(&self) -> Vec<Cow<'_, [u8]>> {
        match self {
            Command::Auth { password } => vec![Cow::Borrowed(password.as_slice())],
            Command::Ping => Vec::new(),
            Command::Select { db } => vec![Cow::Owned(db.to_string().into_bytes())],
            Command::Restore {
                key,
                ttl,
                payload,
                replace,
            } => {
                let mut args = vec![
                    Cow::Borrowed(key.as_slice()),
                    Cow::Borrowed(ttl.as_slice()),
                    Cow::Borrowed(payload.as_slice()),
                ];
                if *replace {
                    args.push(Cow::Borrowed(REPLACE));
                }
                args
            }
        }
    }

    /// Human-readable label used to tag the command's reply in logs
    ///
    /// The AUTH label never includes the password.
    pub fn label(&self) -> String {
        match self {
            Command::Auth { .. } => "auth".to_string(),
            Command::Ping => "ping".to_string(),
            Command::Select { db } => format!("select {}", db),
            Command::Restore { key, .. } => format!("restore {}", String::from_utf8_lossy(key)),
        }
    }
}
