//! Audio output core — playback state machine for the USB audio speaker.
//!
//! Coordinates USB class-layer commands, DMA transfer events and the codec
//! control path into one playback lifecycle:
//!
//! - [`AudioOutput`] executes commands (task context, single owner)
//! - [`OutputStatus`] holds the state shared with the DMA interrupt
//! - [`AudioOutInterface`] is the raw `u8`-in / `u8`-out surface for a class
//!   driver written against the C function table
//!
//! Allocation-free and `no_std`; the hardware sits behind
//! [`platform::CodecDriver`] and [`platform::DmaStream`].
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod command;
pub mod engine;
pub mod error;
pub mod fops;
pub mod state;
pub mod status;

pub use command::{AudioCommand, CommandCode, PlaybackRequest};
pub use engine::AudioOutput;
pub use error::{AudioError, HardwareOp};
pub use fops::{AudioOutInterface, AUDIO_FAIL, AUDIO_OK};
pub use state::{PlaybackState, TransferPhase};
pub use status::{OutputStatus, StatusSnapshot};

#[cfg(test)]
mod tests {
    /// State code tests
    mod state_tests {
        use crate::state::PlaybackState;

        #[test]
        fn test_state_codes_are_stable() {
            assert_eq!(PlaybackState::Inactive.code(), 0x00);
            assert_eq!(PlaybackState::Active.code(), 0x01);
            assert_eq!(PlaybackState::Playing.code(), 0x02);
            assert_eq!(PlaybackState::Paused.code(), 0x03);
            assert_eq!(PlaybackState::Stopped.code(), 0x04);
            assert_eq!(PlaybackState::Error.code(), 0x05);
        }

        #[test]
        fn test_state_code_round_trip() {
            for state in PlaybackState::ALL {
                assert_eq!(PlaybackState::from_code(state.code()), Some(state));
            }
            assert_eq!(PlaybackState::from_code(0x06), None);
        }

        #[test]
        fn test_only_inactive_and_error_reject_commands() {
            for state in PlaybackState::ALL {
                let expected = matches!(state, PlaybackState::Inactive | PlaybackState::Error);
                assert_eq!(state.rejects_commands(), expected, "{state:?}");
            }
        }
    }

    /// Command tag tests
    mod command_tests {
        use crate::command::{AudioCommand, CommandCode};
        use crate::error::AudioError;

        #[test]
        fn test_known_tags_decode() {
            assert_eq!(CommandCode::new(0x01).decode(), Ok(AudioCommand::Play));
            assert_eq!(CommandCode::new(0x02).decode(), Ok(AudioCommand::Pause));
            assert_eq!(CommandCode::new(0x03).decode(), Ok(AudioCommand::Resume));
            assert_eq!(CommandCode::new(0x04).decode(), Ok(AudioCommand::Stop));
        }

        #[test]
        fn test_unknown_tag_is_rejected() {
            assert_eq!(
                CommandCode::new(0x00).decode(),
                Err(AudioError::UnknownCommand(0x00))
            );
            assert_eq!(
                CommandCode::new(0x7F).decode(),
                Err(AudioError::UnknownCommand(0x7F))
            );
        }

        #[test]
        fn test_command_to_code() {
            assert_eq!(CommandCode::from(AudioCommand::Stop), CommandCode::STOP);
            assert_eq!(CommandCode::from(AudioCommand::Resume).get(), 0x03);
        }
    }

    /// Error classification tests
    mod error_tests {
        use crate::error::{AudioError, HardwareOp};
        use crate::state::PlaybackState;

        #[test]
        fn test_hardware_errors_are_classified() {
            assert!(AudioError::Codec(HardwareOp::SetVolume).is_hardware());
            assert!(AudioError::DmaStart.is_hardware());
            assert!(AudioError::Preempted(PlaybackState::Error).is_hardware());
            assert!(!AudioError::EmptyBuffer.is_hardware());
            assert!(!AudioError::InvalidState(PlaybackState::Inactive).is_hardware());
        }

        #[test]
        fn test_guard_is_neither_sequencing_nor_hardware() {
            let err = AudioError::InvalidState(PlaybackState::Error);
            assert!(!err.is_sequencing());
            assert!(!err.is_hardware());
        }

        #[test]
        fn test_error_display() {
            let msg = format!("{}", AudioError::UnknownCommand(0x09));
            assert_eq!(msg, "unknown command tag 0x09");
        }
    }
}
