//! Connection
//!
//! One TCP session to one server, split into buffered input and output
//! halves.

use std::io::{BufReader, BufWriter, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{EndpointError, Result};

/// An open connection to the server
pub struct Connection {
    /// Buffered input stream
    reader: BufReader<TcpStream>,

    /// Buffered output stream
    writer: BufWriter<TcpStream>,

    /// The socket itself, kept for shutdown
    socket: TcpStream,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Connect to the configured address
    ///
    /// Tries every resolved address in turn and keeps the first that
    /// connects within the timeout.
    pub fn open(config: &Config) -> Result<Self> {
        let addrs: Vec<SocketAddr> = config
            .addr
            .to_socket_addrs()
            .map_err(|e| EndpointError::Config(format!("cannot resolve {}: {}", config.addr, e)))?
            .collect();
        if addrs.is_empty() {
            return Err(EndpointError::Config(format!(
                "{} resolved to no addresses",
                config.addr
            )));
        }

        let mut last_err = None;
        let mut socket = None;
        for addr in &addrs {
            let attempt = if config.connect_timeout_ms > 0 {
                TcpStream::connect_timeout(addr, Duration::from_millis(config.connect_timeout_ms))
            } else {
                TcpStream::connect(addr)
            };
            match attempt {
                Ok(stream) => {
                    socket = Some(stream);
                    break;
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }
        let socket = match (socket, last_err) {
            (Some(socket), _) => socket,
            (None, Some(e)) => return Err(e.into()),
            (None, None) => return Err(EndpointError::Config("no address to connect".to_string())),
        };

        socket.set_nodelay(config.nodelay)?;
        if config.write_timeout_ms > 0 {
            socket.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        let peer_addr = socket
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| config.addr.clone());

        // Clone stream for separate read/write handles
        let reader = BufReader::with_capacity(config.input_buffer_size, socket.try_clone()?);
        let writer = BufWriter::with_capacity(config.output_buffer_size, socket.try_clone()?);

        tracing::debug!("Connected to {}", peer_addr);

        Ok(Self {
            reader,
            writer,
            socket,
            peer_addr,
        })
    }

    /// Input stream (handshake only; the reply reader owns it afterwards)
    pub fn reader(&mut self) -> &mut BufReader<TcpStream> {
        &mut self.reader
    }

    /// Output stream
    pub fn writer(&mut self) -> &mut BufWriter<TcpStream> {
        &mut self.writer
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Split into input stream, output stream, socket and peer address
    pub fn into_parts(self) -> (BufReader<TcpStream>, BufWriter<TcpStream>, TcpStream, String) {
        (self.reader, self.writer, self.socket, self.peer_addr)
    }
}

// =============================================================================
// Best-effort teardown helpers
// =============================================================================

/// Flush and drop an output stream, ignoring failures
pub fn close_writer_quietly(writer: Option<BufWriter<TcpStream>>) {
    if let Some(mut writer) = writer {
        if let Err(e) = writer.flush() {
            tracing::debug!("Discarding unflushed output: {}", e);
        }
        let _ = writer.get_ref().shutdown(Shutdown::Write);
    }
}

/// Drop an output stream without flushing what it still buffers
pub fn discard_writer(writer: Option<BufWriter<TcpStream>>) {
    if let Some(writer) = writer {
        let (_, buffered) = writer.into_parts();
        match buffered {
            Ok(unsent) if !unsent.is_empty() => {
                tracing::debug!("Discarding {} unsent byte(s)", unsent.len());
            }
            _ => {}
        }
    }
}

/// Shut down both directions of a socket, ignoring failures
pub fn close_socket_quietly(socket: &TcpStream) {
    if let Err(e) = socket.shutdown(Shutdown::Both) {
        tracing::trace!("Socket shutdown: {}", e);
    }
}
