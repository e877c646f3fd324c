//! Reply Reader
//!
//! Background thread that reads one reply per pending command label.
//!
//! ## Activation
//! 1. Stop if the endpoint is closing
//! 2. Poll the command queue; park briefly when it is empty
//! 3. Decode exactly one reply for the label
//! 4. Error reply → failure log, endpoint stays open
//! 5. Framing or I/O fault → endpoint torn down, thread ends with `Err`

use std::io::Read;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::Level;

use super::endpoint::Shared;
use crate::error::Result;
use crate::log::FailureLog;
use crate::protocol::read_reply;

/// Reads replies for pipelined commands
pub(crate) struct ReplyReader<R> {
    /// Input stream, owned from the end of the handshake on
    input: R,

    /// State shared with the endpoint
    shared: Arc<Shared>,

    /// Destination for error replies
    log: Arc<dyn FailureLog>,

    /// Park duration when no label is pending
    idle: Duration,
}

impl<R: Read + Send + 'static> ReplyReader<R> {
    pub fn new(input: R, shared: Arc<Shared>, log: Arc<dyn FailureLog>, idle: Duration) -> Self {
        Self {
            input,
            shared,
            log,
            idle,
        }
    }

    /// Start the reader thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<Result<()>>> {
        thread::Builder::new()
            .name("reply-reader".to_string())
            .spawn(move || self.run())
    }

    /// Activate until the endpoint closes or the stream faults
    ///
    /// The input stream is dropped when this returns.
    fn run(mut self) -> Result<()> {
        tracing::debug!("Reply reader started for {}", self.shared.peer_addr());

        loop {
            if self.shared.is_closing() {
                tracing::debug!("Reply reader stopped for {}", self.shared.peer_addr());
                return Ok(());
            }

            match self.activate() {
                Ok(true) => {}
                Ok(false) => thread::park_timeout(self.idle),
                Err(_) if self.shared.is_closing() => {
                    // Close woke us by shutting down the read half
                    tracing::debug!("Reply reader stopped for {}", self.shared.peer_addr());
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!(
                        "Reply reader for {} failed, closing endpoint: {}",
                        self.shared.peer_addr(),
                        e
                    );
                    self.shared.fail(&e);
                    return Err(e);
                }
            }
        }
    }

    /// One activation: returns whether a reply was decoded
    fn activate(&mut self) -> Result<bool> {
        let Some(label) = self.shared.queue().poll() else {
            return Ok(false);
        };

        if let Some(reason) = read_reply(&mut self.input)? {
            self.log.record(Level::ERROR, &label, &reason);
        } else {
            tracing::trace!("{} ok", label);
        }
        Ok(true)
    }
}
