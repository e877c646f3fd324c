//! Endpoint
//!
//! A pipelined client connection.
//!
//! ## Lifecycle
//! 1. Connect
//! 2. Handshake on the calling thread: AUTH (or PING), then SELECT, each
//!    flushed and answered before the next
//! 3. Start the reply reader
//! 4. Pipelined `select`/`restore` until `close`
//!
//! ## Concurrency
//! - Output stream: written by caller threads under a mutex
//! - Input stream: read by the caller during the handshake, then owned by
//!   the reply reader
//! - Command queue: the only hand-off between the two sides
//!
//! A command and its label are written and queued under the same lock, so
//! queue order matches wire order across any number of caller threads.

use std::io::{BufWriter, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, Thread};
use std::time::Duration;

use parking_lot::Mutex;

use super::connection::{close_socket_quietly, close_writer_quietly, discard_writer, Connection};
use super::reader::ReplyReader;
use crate::config::Config;
use crate::error::{EndpointError, Result};
use crate::log::{FailureLog, TracingLog};
use crate::protocol::{read_reply, write_frame, Command};
use crate::queue::CommandQueue;

// =============================================================================
// Shared State
// =============================================================================

/// State reachable from both caller threads and the reply reader
pub(crate) struct Shared {
    /// Labels of commands awaiting a reply
    queue: CommandQueue,

    /// Output stream; `None` once released
    writer: Mutex<Option<BufWriter<TcpStream>>>,

    /// Socket handle used to wake the reader and for final shutdown
    socket: TcpStream,

    peer_addr: String,

    /// Set by the first close or fault; never cleared
    closing: AtomicBool,

    /// Set once output, socket and labels have been released
    released: AtomicBool,

    /// Fatal fault hit by the reply reader
    fault: Mutex<Option<String>>,
}

impl Shared {
    fn new(writer: BufWriter<TcpStream>, socket: TcpStream, peer_addr: String) -> Self {
        Self {
            queue: CommandQueue::new(),
            writer: Mutex::new(Some(writer)),
            socket,
            peer_addr,
            closing: AtomicBool::new(false),
            released: AtomicBool::new(false),
            fault: Mutex::new(None),
        }
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    /// Record a reader fault and tear down; the reader exits right after
    pub fn fail(&self, fault: &EndpointError) {
        self.fault.lock().get_or_insert_with(|| fault.to_string());
        self.closing.store(true, Ordering::Release);
        self.release(false);
    }

    /// Close output stream and socket, then drop pending labels
    ///
    /// A graceful release flushes buffered output before the socket goes.
    /// Otherwise the socket goes first: a writer blocked on a full socket
    /// buffer holds the output lock until its write fails, and unsent
    /// output is discarded.
    ///
    /// Runs at most once; every step swallows its own errors.
    fn release(&self, graceful: bool) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        if graceful {
            close_writer_quietly(self.writer.lock().take());
            close_socket_quietly(&self.socket);
        } else {
            close_socket_quietly(&self.socket);
            discard_writer(self.writer.lock().take());
        }
        let dropped = self.queue.clear();
        if dropped > 0 {
            tracing::warn!(
                "Discarded {} pending command(s) for {}",
                dropped,
                self.peer_addr
            );
        }
        tracing::debug!("Connection to {} closed", self.peer_addr);
    }
}

// =============================================================================
// Endpoint
// =============================================================================

/// Pipelined client endpoint
///
/// Handshake commands are synchronous; `select` and `restore` return as soon
/// as the command is buffered and only the failure log ever sees their
/// replies.
pub struct Endpoint {
    shared: Arc<Shared>,

    /// Reply reader thread, taken by the first close
    reader: Mutex<Option<JoinHandle<Result<()>>>>,

    /// Handle used to unpark the reader
    reader_thread: Thread,
}

impl Endpoint {
    /// Connect and handshake, logging async failures through `tracing`
    pub fn connect(config: Config) -> Result<Self> {
        Self::connect_with_log(config, Arc::new(TracingLog))
    }

    /// Connect and handshake with a custom failure log
    ///
    /// Fails if the connection cannot be opened, if any handshake command
    /// gets an error reply, or on any I/O fault during the handshake. The
    /// connection is closed before the error is returned.
    pub fn connect_with_log(config: Config, log: Arc<dyn FailureLog>) -> Result<Self> {
        let mut conn = Connection::open(&config)?;

        if let Err(e) = handshake(&mut conn, &config) {
            tracing::warn!("Handshake with {} failed: {}", conn.peer_addr(), e);
            let (_, writer, socket, _) = conn.into_parts();
            close_writer_quietly(Some(writer));
            close_socket_quietly(&socket);
            return Err(e);
        }

        let (input, output, socket, peer_addr) = conn.into_parts();
        let shared = Arc::new(Shared::new(output, socket, peer_addr));

        let reader = ReplyReader::new(
            input,
            Arc::clone(&shared),
            log,
            Duration::from_millis(config.idle_poll_ms),
        );
        let handle = match reader.spawn() {
            Ok(handle) => handle,
            Err(e) => {
                shared.closing.store(true, Ordering::Release);
                shared.release(true);
                return Err(e.into());
            }
        };

        tracing::info!("Endpoint ready for {} (db {})", shared.peer_addr(), config.db);

        Ok(Self {
            shared,
            reader_thread: handle.thread().clone(),
            reader: Mutex::new(Some(handle)),
        })
    }

    // =========================================================================
    // Pipelined Commands
    // =========================================================================

    /// Queue a SELECT; its reply is only observed by the failure log
    pub fn select(&self, db: u32) -> Result<()> {
        self.dispatch(Command::Select { db })
    }

    /// Queue a RESTORE, with the REPLACE flag when `replace` is set
    pub fn restore(&self, key: &[u8], ttl: &[u8], payload: &[u8], replace: bool) -> Result<()> {
        self.dispatch(Command::Restore {
            key: key.to_vec(),
            ttl: ttl.to_vec(),
            payload: payload.to_vec(),
            replace,
        })
    }

    /// Push buffered commands to the network
    pub fn flush(&self) -> Result<()> {
        let result = {
            let mut guard = self.shared.writer.lock();
            let writer = guard.as_mut().ok_or(EndpointError::Closed)?;
            writer.flush()
        };
        if let Err(e) = result {
            tracing::error!("Flush to {} failed: {}", self.shared.peer_addr(), e);
            self.close();
            return Err(e.into());
        }
        Ok(())
    }

    /// Encode a command, then queue its label
    fn dispatch(&self, command: Command) -> Result<()> {
        if self.shared.is_closing() {
            return Err(EndpointError::Closed);
        }

        let label = command.label();
        let result = {
            let mut guard = self.shared.writer.lock();
            let writer = guard.as_mut().ok_or(EndpointError::Closed)?;
            write_frame(writer, &command).map(|()| self.shared.queue.offer(label))
        };

        match result {
            Ok(()) => {
                tracing::trace!("Dispatched {:?} to {}", command.command_type(), self.shared.peer_addr());
                self.reader_thread.unpark();
                Ok(())
            }
            Err(e) => {
                tracing::error!("Dispatch to {} failed: {}", self.shared.peer_addr(), e);
                self.close();
                Err(e)
            }
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Number of pipelined commands whose reply has not been read
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    /// True once the connection has been released
    pub fn is_closed(&self) -> bool {
        self.shared.released.load(Ordering::Acquire)
    }

    /// Fatal fault that made the reply reader close the endpoint
    pub fn fault(&self) -> Option<String> {
        self.shared.fault.lock().clone()
    }

    pub fn peer_addr(&self) -> &str {
        self.shared.peer_addr()
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Close the endpoint
    ///
    /// Stops and joins the reply reader first, then closes the output
    /// stream and the socket and drops pending labels. Safe to call any
    /// number of times, from any thread, including the reader itself.
    pub fn close(&self) {
        self.shared.closing.store(true, Ordering::Release);

        // Unblocks a reader waiting on a reply that will never come
        let _ = self.shared.socket.shutdown(Shutdown::Read);
        self.reader_thread.unpark();

        if let Some(handle) = self.reader.lock().take() {
            if handle.thread().id() != thread::current().id() {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::debug!("Reply reader had failed: {}", e),
                    Err(_) => tracing::error!("Reply reader for {} panicked", self.shared.peer_addr()),
                }
            }
        }

        self.shared.release(true);
    }

    /// Close an endpoint if there is one
    pub fn close_quietly(endpoint: Option<&Endpoint>) {
        if let Some(endpoint) = endpoint {
            endpoint.close();
        }
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        self.close();
    }
}

// =============================================================================
// Handshake
// =============================================================================

/// AUTH or PING, then SELECT, each confirmed before the next
fn handshake(conn: &mut Connection, config: &Config) -> Result<()> {
    let greeting = match &config.password {
        Some(password) => Command::Auth {
            password: password.clone().into_bytes(),
        },
        None => Command::Ping,
    };
    sync_send(conn, &greeting)?;
    sync_send(conn, &Command::Select { db: config.db })?;
    Ok(())
}

/// Write, flush and read exactly one reply
fn sync_send(conn: &mut Connection, command: &Command) -> Result<()> {
    write_frame(conn.writer(), command)?;
    conn.writer().flush()?;

    match read_reply(conn.reader())? {
        None => {
            tracing::debug!("Handshake {} ok", command.label());
            Ok(())
        }
        Some(reason) => Err(EndpointError::Handshake {
            command: command.label(),
            reason,
        }),
    }
}
