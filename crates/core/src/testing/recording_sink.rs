//! Recording display sink for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::display::{DisplayError, DisplaySink, DisplaySnapshot};

/// Keeps every frame it is given. Can be switched into a failing mode to
/// check that the render loop survives sink errors.
#[derive(Debug, Default)]
pub struct RecordingDisplaySink {
    frames: Mutex<Vec<DisplaySnapshot>>,
    failing: AtomicBool,
}

impl RecordingDisplaySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames presented so far, including those that were rejected.
    pub fn frames(&self) -> Vec<DisplaySnapshot> {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<DisplaySnapshot> {
        self.frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl DisplaySink for RecordingDisplaySink {
    fn name(&self) -> &str {
        "recording"
    }

    fn present(&self, snapshot: &DisplaySnapshot) -> Result<(), DisplayError> {
        self.frames
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(snapshot.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(DisplayError::Unavailable("recording sink set to fail".to_string()));
        }
        Ok(())
    }
}
