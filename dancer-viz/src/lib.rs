#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod color_map;
pub mod downsample;
pub mod frame;
pub mod layout;
pub mod peaks;
pub mod render_loop;
pub mod sample;
pub mod settings;

pub use frame::{build_slots, render_frame};
pub use layout::LayoutEngine;
pub use peaks::PeakTracker;
pub use render_loop::{FrameOutcome, RenderLoop, TickScheduler};
pub use sample::{FrequencySample, SpectrumSource, VisualSlot, MAGNITUDE_MAX};
pub use settings::{DancingStyle, SettingsError, VisualizerSettings};
