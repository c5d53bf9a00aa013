//! USB audio output firmware for STM32F4 boards with a CS43L22 codec
//!
//! Turns USB Audio Class playback requests into codec control writes and
//! I2S DMA transfers.
//!
//! # Architecture
//!
//! ```text
//! USB class driver ──▶ usb::USB_AUDIO_REQUESTS ──▶ audio control task
//!                                                       │
//!                                    playback::AudioOutput (state machine)
//!                                      │                     │
//!                               Cs43l22 (I2C)        I2sDmaStream ──▶ I2S DMA task
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the STM32F407 target (embassy, defmt)
//! - `board-discovery` / `board-324xg-eval` / `board-324x9i-eval` - board wiring
//! - `std` - Enable standard library (for host testing)
//!
//! # Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)] // register maps are glob-imported by their drivers

pub mod audio;
pub mod boot;
pub mod board;
pub mod usb;

#[cfg(feature = "hardware")]
pub mod exception_handlers;

pub use audio::{Cs43l22, Cs43l22Error, I2sDmaStream, NoResetPin};
pub use board::{ActiveBoard, Board, CodecBusPins, PinId};
pub use usb::{dispatch, try_submit, ControlResponse, UsbAudioRequest, USB_AUDIO_REQUESTS};
