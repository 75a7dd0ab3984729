//! Display boundary: the per-tick snapshot and the sink that draws it.

mod sinks;
mod traits;
mod types;

pub use sinks::{LatestSnapshotSink, TracingDisplaySink};
pub use traits::DisplaySink;
pub use types::{DisplayError, DisplaySnapshot, PanelStaleness};
