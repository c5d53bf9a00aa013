//! Application configuration and constants
//!
//! This module defines central configuration values used across the firmware.
//! Naming, USB identity and start-up defaults should reference these
//! constants rather than hardcoding values.

use crate::audio_types::{SampleRateHz, VolumePercent};

/// The application name
pub const APP_NAME: &str = "USB Audio Out";

/// The application type/category
pub const APP_TYPE: &str = "UAC1 speaker";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sample rate the host is offered first and the output starts with.
pub const DEFAULT_FREQUENCY: SampleRateHz = SampleRateHz::HZ_48000;

/// Start-up output volume in percent.
pub const DEFAULT_VOLUME_PERCENT: u8 = 70;

/// Start-up output volume as a newtype.
pub fn default_volume() -> VolumePercent {
    VolumePercent::new(DEFAULT_VOLUME_PERCENT)
}

/// Bytes in one USB full-speed isochronous frame at 48 kHz, 16-bit stereo
/// (48 samples × 2 channels × 2 bytes).
pub const USB_FRAME_BYTES_48K: usize = 192;

/// Depth of the USB → audio task request queue.
pub const REQUEST_QUEUE_DEPTH: usize = 8;

/// Interval of the periodic bookkeeping tick, in milliseconds (one USB frame).
pub const PERIODIC_TICK_MS: u64 = 1;

/// Full application title (name + type)
pub const fn app_title() -> &'static str {
    APP_NAME
}
