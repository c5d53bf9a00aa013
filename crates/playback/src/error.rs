//! Audio output errors.
//!
//! Three classes, distinguished by what they do to the state:
//!
//! | Class      | Variants                                                     | State after          |
//! |------------|--------------------------------------------------------------|----------------------|
//! | sequencing | `NotPermitted`, `UnknownCommand`, `EmptyBuffer`, `MisalignedBuffer`, `InvalidFrequency`, `InvalidMute` | unchanged |
//! | hardware   | `Codec`, `DmaStart`, `Preempted`                             | `Error`              |
//! | guard      | `InvalidState`                                               | `Error`              |

use crate::command::AudioCommand;
use crate::state::PlaybackState;

/// Codec operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareOp {
    /// Bring-up.
    Init,
    /// Power back up after a stop.
    Play,
    /// Enter power save.
    Pause,
    /// Leave power save.
    Resume,
    /// Software power-down.
    Stop,
    /// Master volume write.
    SetVolume,
    /// Mute / unmute.
    SetMute,
}

/// Failure of an audio output operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioError {
    /// The command is not valid in the current state.
    #[error("{command:?} not permitted in {state:?}")]
    NotPermitted {
        /// Rejected command.
        command: AudioCommand,
        /// State it was issued in.
        state: PlaybackState,
    },
    /// The command tag is not Play, Pause, Resume or Stop.
    #[error("unknown command tag {0:#04x}")]
    UnknownCommand(u8),
    /// Play was issued with a buffer that holds no sample.
    #[error("play with empty buffer")]
    EmptyBuffer,
    /// Play was issued with a buffer the 16-bit DMA engine cannot read.
    #[error("play with misaligned buffer")]
    MisalignedBuffer,
    /// The raw interface received a frequency outside 8–96 kHz.
    #[error("unsupported frequency {0} Hz")]
    InvalidFrequency(u32),
    /// The raw interface received a mute value other than 0 or 1.
    #[error("invalid mute value {0}")]
    InvalidMute(u8),
    /// A codec control-bus operation failed.
    #[error("codec {0:?} failed")]
    Codec(HardwareOp),
    /// The DMA stream refused to start.
    #[error("DMA start failed")]
    DmaStart,
    /// An interrupt moved the state while the command was in progress.
    #[error("preempted by transition to {0:?}")]
    Preempted(PlaybackState),
    /// Command issued before initialization or after a fault.
    #[error("command rejected in {0:?}")]
    InvalidState(PlaybackState),
}

impl AudioError {
    /// `true` for errors that mean the hardware is no longer trusted.
    pub const fn is_hardware(&self) -> bool {
        matches!(self, Self::Codec(_) | Self::DmaStart | Self::Preempted(_))
    }

    /// `true` for errors that leave the state untouched.
    pub const fn is_sequencing(&self) -> bool {
        matches!(
            self,
            Self::NotPermitted { .. }
                | Self::UnknownCommand(_)
                | Self::EmptyBuffer
                | Self::MisalignedBuffer
                | Self::InvalidFrequency(_)
                | Self::InvalidMute(_)
        )
    }
}

impl From<platform::BufferError> for AudioError {
    fn from(err: platform::BufferError) -> Self {
        match err {
            platform::BufferError::Empty => Self::EmptyBuffer,
            platform::BufferError::Misaligned => Self::MisalignedBuffer,
        }
    }
}
