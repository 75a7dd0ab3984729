//! Panel rotation: fixed cyclic order with per-panel dwell.

mod config;
mod machine;
mod types;

pub use config::{MissingPanelPolicy, PanelDwellOverrides, RotationConfig, MAX_DWELL, MIN_DWELL};
pub use machine::PanelRotator;
pub use types::{Panel, PanelState};
