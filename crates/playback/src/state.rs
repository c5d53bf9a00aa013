//! Playback lifecycle states.
//!
//! ```text
//!             initialize            play
//! Inactive ──────────────▶ Active ───────▶ Playing ◀──────▶ Paused
//!    ▲                                      │   ▲   pause/play
//!    │ deinitialize (from any state)   stop │   │ play
//!    │                                      ▼   │
//!    └──────────────────────────────────── Stopped
//!
//! any state ──(hardware fault / guarded command)──▶ Error
//! Error ──initialize──▶ Active
//! ```

/// Current state of the audio output.
///
/// Each state has a stable one-byte code, reported by the raw
/// `get_state` entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PlaybackState {
    /// Not initialized, or deinitialized. Initial state.
    Inactive = 0x00,
    /// Codec brought up, no transfer started yet.
    Active = 0x01,
    /// A DMA transfer feeds the codec.
    Playing = 0x02,
    /// Codec in power save; stream position kept.
    Paused = 0x03,
    /// Codec powered down after a stop; a new Play restarts output.
    Stopped = 0x04,
    /// Hardware fault or command outside the lifecycle. Only
    /// (re-)initialization leaves this state.
    Error = 0x05,
}

impl PlaybackState {
    /// Stable one-byte code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a one-byte state code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::Inactive),
            0x01 => Some(Self::Active),
            0x02 => Some(Self::Playing),
            0x03 => Some(Self::Paused),
            0x04 => Some(Self::Stopped),
            0x05 => Some(Self::Error),
            _ => None,
        }
    }

    /// States in which every playback command is rejected and forces
    /// [`PlaybackState::Error`].
    pub const fn rejects_commands(self) -> bool {
        matches!(self, Self::Inactive | Self::Error)
    }

    /// All states, in code order.
    pub const ALL: [Self; 6] = [
        Self::Inactive,
        Self::Active,
        Self::Playing,
        Self::Paused,
        Self::Stopped,
        Self::Error,
    ];
}

/// Who owns the buffer of the current transfer, and how far the DMA engine
/// has got with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferPhase {
    /// No transfer; the caller owns every buffer.
    Idle,
    /// DMA owns the buffer and has not reached its midpoint.
    InFlight,
    /// DMA owns the buffer and has passed its midpoint.
    HalfComplete,
    /// Aborted; the stream may still read the buffer until it
    /// acknowledges the abort.
    Draining,
}

impl TransferPhase {
    /// `true` while the DMA engine owns a buffer.
    pub const fn dma_owns_buffer(self) -> bool {
        !matches!(self, Self::Idle)
    }
}
