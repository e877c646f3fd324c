//! Network Module
//!
//! Client-side connection handling.
//!
//! ## Architecture
//! - `Connection`: TCP session split into buffered input/output halves
//! - `Endpoint`: handshake, pipelined dispatch, teardown
//! - Reply reader: one background thread per endpoint, one reply per
//!   queued command label

mod connection;
mod endpoint;
mod reader;

pub use connection::Connection;
pub use endpoint::Endpoint;
