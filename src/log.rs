//! Failure log
//!
//! Where error replies to pipelined commands end up. Callers never see
//! those replies; a `FailureLog` is the only observer.

use tracing::Level;

/// Receives error replies for pipelined commands
///
/// Implementations must return quickly: they run on the reply reader
/// thread between two reply decodes.
pub trait FailureLog: Send + Sync {
    /// Record that the command tagged `label` failed with `reason`
    fn record(&self, level: Level, label: &str, reason: &str);
}

/// Default failure log backed by `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl FailureLog for TracingLog {
    fn record(&self, level: Level, label: &str, reason: &str) {
        // tracing needs the level at compile time
        if level == Level::ERROR {
            tracing::error!(label = %label, reason = %reason, "{} failed. reason : {}", label, reason);
        } else if level == Level::WARN {
            tracing::warn!(label = %label, reason = %reason, "{} failed. reason : {}", label, reason);
        } else if level == Level::INFO {
            tracing::info!(label = %label, reason = %reason, "{} failed. reason : {}", label, reason);
        } else if level == Level::DEBUG {
            tracing::debug!(label = %label, reason = %reason, "{} failed. reason : {}", label, reason);
        } else {
            tracing::trace!(label = %label, reason = %reason, "{} failed. reason : {}", label, reason);
        }
    }
}
