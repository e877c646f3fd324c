//! Shared test helpers
//!
//! A scripted single-connection RESP server and a recording failure log.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use pipekv::{Config, FailureLog};
use tracing::Level;

// =============================================================================
// Tracing
// =============================================================================

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Scripted Server
// =============================================================================

/// Decides the reply (if any) for each received command
pub type Responder = Box<dyn FnMut(&[Vec<u8>]) -> Option<Vec<u8>> + Send>;

/// A server that accepts one connection and answers each command through a
/// responder
///
/// `None` sends nothing back; an empty reply hangs up.
pub struct ScriptedServer {
    addr: String,
    commands: Receiver<Vec<Vec<u8>>>,
}

impl ScriptedServer {
    pub fn start(responder: impl FnMut(&[Vec<u8>]) -> Option<Vec<u8>> + Send + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (tx, rx) = unbounded();
        let responder: Responder = Box::new(responder);

        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                serve(stream, responder, tx);
            }
        });

        Self { addr, commands: rx }
    }

    /// `+PONG` to PING, `+OK` to everything else
    pub fn healthy() -> Self {
        Self::start(ok_responder)
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn config(&self) -> Config {
        Config::builder().addr(self.addr.clone()).idle_poll_ms(1).build()
    }

    /// Next command the server received, as name + arguments
    pub fn next_command(&self) -> Vec<Vec<u8>> {
        self.commands
            .recv_timeout(Duration::from_secs(5))
            .expect("server received no command")
    }
}

/// Standard replies for a healthy server
pub fn ok_responder(command: &[Vec<u8>]) -> Option<Vec<u8>> {
    if command[0] == b"PING" {
        Some(b"+PONG\r\n".to_vec())
    } else {
        Some(b"+OK\r\n".to_vec())
    }
}

fn serve(stream: TcpStream, mut responder: Responder, tx: Sender<Vec<Vec<u8>>>) {
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);
    while let Some(command) = read_command(&mut reader) {
        let reply = responder(&command);
        let _ = tx.send(command);
        if let Some(reply) = reply {
            if reply.is_empty() {
                let _ = writer.shutdown(Shutdown::Both);
                return;
            }
            if writer.write_all(&reply).is_err() {
                return;
            }
        }
    }
}

/// Parse one `*N` array of bulk strings; `None` on EOF or garbage
fn read_command<R: BufRead>(reader: &mut R) -> Option<Vec<Vec<u8>>> {
    let count = read_header(reader, b'*')?;
    let mut parts = Vec::with_capacity(count);
    for _ in 0..count {
        let len = read_header(reader, b'$')?;
        let mut data = vec![0u8; len + 2];
        reader.read_exact(&mut data).ok()?;
        data.truncate(len);
        parts.push(data);
    }
    Some(parts)
}

fn read_header<R: BufRead>(reader: &mut R, tag: u8) -> Option<usize> {
    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line).ok()? == 0 || line[0] != tag {
        return None;
    }
    std::str::from_utf8(&line[1..line.len() - 2]).ok()?.parse().ok()
}

// =============================================================================
// Recording Failure Log
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub level: Level,
    pub label: String,
    pub reason: String,
}

#[derive(Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<Failure>>,
}

impl RecordingLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<Failure> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl FailureLog for RecordingLog {
    fn record(&self, level: Level, label: &str, reason: &str) {
        self.entries.lock().push(Failure {
            level,
            label: label.to_string(),
            reason: reason.to_string(),
        });
    }
}

// =============================================================================
// Waiting
// =============================================================================

/// Poll `condition` until it holds or five seconds pass
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
