//! Ticker stream and cursor types.

use serde::Serialize;

use crate::feed::{AlertEntry, HeadlineEntry};

/// The three logical blocks of the ticker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerBlock {
    AlertsFirst,
    Headlines,
    AlertsSecond,
}

/// One item on the ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerEntry {
    pub id: String,
    pub text: String,
}

impl From<&AlertEntry> for TickerEntry {
    fn from(entry: &AlertEntry) -> Self {
        Self {
            id: entry.id.clone(),
            text: entry.text.clone(),
        }
    }
}

impl From<&HeadlineEntry> for TickerEntry {
    fn from(entry: &HeadlineEntry) -> Self {
        Self {
            id: entry.id.clone(),
            text: entry.text.clone(),
        }
    }
}

/// Entries of one block, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerSegment {
    pub block: TickerBlock,
    pub entries: Vec<TickerEntry>,
}

/// Scroll offset into the composed stream.
///
/// `position` is measured in characters and kept within `[0, len)` of the
/// stream it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TickerCursor {
    pub position: f64,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerPhase {
    /// Source data changed; the stream is rebuilt on the next tick.
    Composing,
    Scrolling,
}

/// The composed ticker line. Empty means idle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerStream {
    pub(crate) segments: Vec<TickerSegment>,
    pub(crate) chars: Vec<char>,
}

impl TickerStream {
    pub fn segments(&self) -> &[TickerSegment] {
        &self.segments
    }

    /// Length in characters, including the trailing separator.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// `width` characters starting at `start`, wrapping around the end.
    pub fn window(&self, start: usize, width: usize) -> String {
        if self.chars.is_empty() {
            return String::new();
        }
        let len = self.chars.len();
        (0..width).map(|i| self.chars[(start + i) % len]).collect()
    }
}
