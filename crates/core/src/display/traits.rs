//! Display sink trait definition.

use super::types::{DisplayError, DisplaySnapshot};

/// Receives one snapshot per render tick.
///
/// Called from the render loop, so implementations should return quickly.
/// An error is logged and the loop carries on with the next tick.
pub trait DisplaySink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &str;

    fn present(&self, snapshot: &DisplaySnapshot) -> Result<(), DisplayError>;
}
