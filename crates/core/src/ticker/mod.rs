//! Scrolling alert and headline ticker.

mod compositor;
mod config;
mod types;

pub use compositor::{advance, compose_stream, remap, TickerCompositor};
pub use config::TickerConfig;
pub use types::{
    TickerBlock, TickerCursor, TickerEntry, TickerPhase, TickerSegment, TickerStream,
};
