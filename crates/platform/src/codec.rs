//! Audio codec control abstraction
//!
//! The codec sits on a low-speed control bus (I2C on every supported board)
//! and is fed samples over I2S by the [`DmaStream`](crate::DmaStream). This
//! trait covers the control path only. Every method is blocking but bounded
//! by the bus driver's timeout, so it is safe to call from the audio task.

use crate::audio_types::{MuteState, SampleRateHz, VolumeLevel, VolumePercent};

/// Analog output routing selected at bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OutputDevice {
    /// Speaker amplifier only.
    Speaker = 1,
    /// Headphone jack only.
    Headphone = 2,
    /// Speaker and headphone together.
    Both = 3,
    /// Codec auto-detects the connected output.
    Auto = 4,
}

/// How far `stop` powers the codec down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerDownMode {
    /// Hold the codec in reset. Registers are lost; bring-up must run again.
    Hardware = 1,
    /// Power down DAC and outputs through the control bus; registers survive.
    Software = 2,
}

/// Audio codec control trait.
///
/// One implementation per codec chip; board specifics (I2C address, output
/// routing) are supplied by the caller.
pub trait CodecDriver {
    /// Error type
    type Error: core::fmt::Debug;

    /// One-time bring-up: reset, clocking, interface format, routing,
    /// initial volume, power on.
    fn init(
        &mut self,
        output: OutputDevice,
        volume: VolumePercent,
        frequency: SampleRateHz,
    ) -> Result<(), Self::Error>;

    /// Release the codec (power down and hold in reset).
    fn deinit(&mut self) -> Result<(), Self::Error>;

    /// Power the output stage back up after a software stop.
    fn play(&mut self) -> Result<(), Self::Error>;

    /// Silence output and enter power save, keeping the stream position.
    fn pause(&mut self) -> Result<(), Self::Error>;

    /// Leave power save and restore output from where `pause` left it.
    fn resume(&mut self) -> Result<(), Self::Error>;

    /// Mute and power down the output stage.
    fn stop(&mut self, mode: PowerDownMode) -> Result<(), Self::Error>;

    /// Set master output level.
    fn set_volume(&mut self, level: VolumeLevel) -> Result<(), Self::Error>;

    /// Mute or unmute the output.
    fn set_mute(&mut self, mute: MuteState) -> Result<(), Self::Error>;
}
