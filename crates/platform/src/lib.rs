//! Hardware Abstraction Layer (HAL) for the USB audio output firmware
//!
//! This crate provides the trait seams between the audio-output state machine
//! and the hardware it drives, so the state machine can be developed and
//! tested without a board attached.
//!
//! # Architecture Layers
//!
//! ```text
//! USB Audio Class driver (external)
//!         ↓
//! Audio output state machine (playback crate)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Board adapters (firmware crate: CS43L22 over I2C, I2S + DMA)
//! ```
//!
//! # Abstractions
//!
//! - [`CodecDriver`] - codec control path (power, volume, mute)
//! - [`DmaStream`] - memory → I2S transfer engine
//! - [`audio_types`] - validated newtypes for volume, rate and mute
//! - [`audio_config`] - I2S / DMA stream configuration data
//!
//! # Features
//!
//! - `std`: expose [`mocks`] outside of unit tests
//! - `defmt`: enable defmt logging derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{CodecDriver, VolumeLevel};
//!
//! fn louder<C: CodecDriver>(codec: &mut C) {
//!     let _ = codec.set_volume(VolumeLevel::MAX);
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no unwrap in production code
#![deny(clippy::expect_used)] // no expect in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod audio_config;
pub mod audio_types;
pub mod codec;
pub mod config;
pub mod dma;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main high-level traits
pub use codec::{CodecDriver, OutputDevice, PowerDownMode};
pub use dma::{
    AbortCompletion, AudioBuffer, BufferError, DmaInterruptFlags, DmaStream, TransferId,
    TransferRequest, DMA_MAX_SAMPLES,
};

// Re-export audio newtypes
pub use audio_types::{MuteState, OutOfRangeError, SampleRateHz, VolumeLevel, VolumePercent};
