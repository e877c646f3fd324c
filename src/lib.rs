//! # pipekv
//!
//! A pipelined client endpoint for RESP key-value servers:
//! - Commands encoded as arrays of bulk strings
//! - Synchronous handshake (AUTH or PING, then SELECT)
//! - Fire-and-forget `select`/`restore` with replies read in the background
//! - Error replies for pipelined commands reported through a failure log
//!
//! ## Architecture Overview
//!
//! ```text
//!   caller threads                         reply-reader thread
//!        │                                          ▲
//!        │ select / restore                         │ poll label
//!        ▼                                          │
//! ┌─────────────┐   label    ┌──────────────┐       │
//! │  Endpoint   ├───────────►│ CommandQueue ├───────┘
//! └──────┬──────┘            └──────────────┘       │
//!        │ encode                                   │ read_reply
//!        ▼                                          │
//! ┌─────────────┐                           ┌───────┴──────┐
//! │ BufWriter   │──────► server ───────────►│  BufReader   │
//! └─────────────┘                           └──────────────┘
//! ```
//!
//! Error replies go to the [`FailureLog`]; framing or I/O faults close the
//! endpoint.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod log;
pub mod protocol;
pub mod queue;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{EndpointError, Result};
pub use config::Config;
pub use log::{FailureLog, TracingLog};
pub use network::Endpoint;
pub use queue::CommandQueue;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pipekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
