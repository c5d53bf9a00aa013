//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common errors:
//! - `VolumePercent`: clamps 0–100, the unit the USB host and init path use
//! - `VolumeLevel`: codec-scale 0–255, derived from `VolumePercent` or raw
//! - `SampleRateHz`: validates 8000–96000 Hz (STM32F4 I2S PLL range)
//! - `MuteState`: two-valued mute flag with explicit raw decoding

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("value {value} outside {min}..={max}")]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── VolumePercent ────────────────────────────────────────────────────────────

/// Volume as a percentage, clamped to 0–100.
///
/// Wraps a `u8` with the invariant `0 <= value <= 100`.
/// Construct with [`VolumePercent::new`] (clamping) or
/// [`VolumePercent::try_new`] (fallible, strict).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct VolumePercent(u8);

impl VolumePercent {
    /// Create a `VolumePercent`, clamping values above 100 to 100.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Create a `VolumePercent` from a 32-bit host value, clamping above 100.
    ///
    /// The USB class layer hands volumes over as `u32`.
    #[must_use]
    pub fn saturating_from_u32(value: u32) -> Self {
        // min(100) guarantees the value fits in u8.
        #[allow(clippy::cast_possible_truncation)]
        Self(value.min(100) as u8)
    }

    /// Create a `VolumePercent`, returning an error if `value > 100`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `value > 100`.
    pub fn try_new(value: u8) -> Result<Self, OutOfRangeError> {
        if value > 100 {
            Err(OutOfRangeError {
                value: u32::from(value),
                min: 0,
                max: 100,
            })
        } else {
            Ok(Self(value))
        }
    }

    /// Return the inner volume value (0–100).
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

// ── VolumeLevel ──────────────────────────────────────────────────────────────

/// Codec-scale output level, 0x00 (quietest) to 0xFF (loudest).
///
/// Every `u8` is a valid level; the codec driver maps it onto its own
/// register encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct VolumeLevel(u8);

impl VolumeLevel {
    /// Lowest level.
    pub const MIN: Self = Self(0x00);

    /// Highest level.
    pub const MAX: Self = Self(0xFF);

    /// Wrap a raw codec-scale level.
    #[must_use]
    pub const fn new(level: u8) -> Self {
        Self(level)
    }

    /// Scale a percentage onto the codec range: `pct * 255 / 100`.
    ///
    /// - 0%   → 0x00
    /// - 100% → 0xFF
    #[must_use]
    pub fn from_percent(volume: VolumePercent) -> Self {
        // max: 100 * 255 = 25500 < u16::MAX, result <= 255
        #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
        let level = (u16::from(volume.get()) * 255 / 100) as u8;
        Self(level)
    }

    /// Return the raw level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<VolumePercent> for VolumeLevel {
    fn from(volume: VolumePercent) -> Self {
        Self::from_percent(volume)
    }
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Sample rate in Hz, validated to the range the STM32F4 I2S clock tree
/// produces for the codec (8 kHz to 96 kHz).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (telephony).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 96000 Hz.
    pub const MAX_HZ: u32 = 96_000;

    /// USB Audio Class full-speed default.
    pub const HZ_48000: Self = Self(48_000);

    /// Create a `SampleRateHz`, returning an error if out of 8000–96000 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > 96000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if !(Self::MIN_HZ..=Self::MAX_HZ).contains(&hz) {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        } else {
            Ok(Self(hz))
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

// ── MuteState ────────────────────────────────────────────────────────────────

/// Output mute flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MuteState {
    /// Audio passes through (raw 0).
    Unmuted,
    /// Output silenced (raw 1).
    Muted,
}

impl MuteState {
    /// Decode the raw USB mute control value: 0 = unmute, 1 = mute.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] for any other value.
    pub fn from_raw(raw: u8) -> Result<Self, OutOfRangeError> {
        match raw {
            0 => Ok(Self::Unmuted),
            1 => Ok(Self::Muted),
            other => Err(OutOfRangeError {
                value: u32::from(other),
                min: 0,
                max: 1,
            }),
        }
    }

    /// Returns `true` for [`MuteState::Muted`].
    #[must_use]
    pub fn is_muted(self) -> bool {
        matches!(self, Self::Muted)
    }
}

impl From<bool> for MuteState {
    fn from(muted: bool) -> Self {
        if muted {
            Self::Muted
        } else {
            Self::Unmuted
        }
    }
}
