//! Playback commands and the request that carries them.

use platform::AudioBuffer;

use crate::error::AudioError;

/// Decoded playback command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioCommand {
    /// Start (or restart) a transfer; from `Paused`, resume instead.
    Play,
    /// Silence output, keep the stream position.
    Pause,
    /// Leave `Paused`.
    Resume,
    /// Power the output down and abort the transfer.
    Stop,
}

/// Raw command tag as received from the USB class layer.
///
/// Unknown tags are representable; they are rejected when the request is
/// executed, not when it is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct CommandCode(u8);

impl CommandCode {
    /// `AUDIO_CMD_PLAY`
    pub const PLAY: Self = Self(0x01);
    /// `AUDIO_CMD_PAUSE`
    pub const PAUSE: Self = Self(0x02);
    /// `AUDIO_CMD_RESUME`
    pub const RESUME: Self = Self(0x03);
    /// `AUDIO_CMD_STOP`
    pub const STOP: Self = Self(0x04);

    /// Wrap a raw tag.
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw tag.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Decode the tag.
    ///
    /// # Errors
    ///
    /// [`AudioError::UnknownCommand`] for any tag other than 0x01..=0x04.
    pub const fn decode(self) -> Result<AudioCommand, AudioError> {
        match self.0 {
            0x01 => Ok(AudioCommand::Play),
            0x02 => Ok(AudioCommand::Pause),
            0x03 => Ok(AudioCommand::Resume),
            0x04 => Ok(AudioCommand::Stop),
            other => Err(AudioError::UnknownCommand(other)),
        }
    }
}

impl From<AudioCommand> for CommandCode {
    fn from(command: AudioCommand) -> Self {
        match command {
            AudioCommand::Play => Self::PLAY,
            AudioCommand::Pause => Self::PAUSE,
            AudioCommand::Resume => Self::RESUME,
            AudioCommand::Stop => Self::STOP,
        }
    }
}

impl From<u8> for CommandCode {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

/// A command plus the buffer it applies to.
///
/// Only `Play` from a non-paused state uses the buffer; the other commands
/// are built with [`AudioBuffer::empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackRequest {
    buffer: AudioBuffer,
    code: CommandCode,
}

impl PlaybackRequest {
    /// Request with an arbitrary (possibly unknown) tag.
    pub const fn new(buffer: AudioBuffer, code: CommandCode) -> Self {
        Self { buffer, code }
    }

    /// Play `buffer`.
    pub const fn play(buffer: AudioBuffer) -> Self {
        Self::new(buffer, CommandCode::PLAY)
    }

    /// Pause.
    pub const fn pause() -> Self {
        Self::new(AudioBuffer::empty(), CommandCode::PAUSE)
    }

    /// Resume.
    pub const fn resume() -> Self {
        Self::new(AudioBuffer::empty(), CommandCode::RESUME)
    }

    /// Stop.
    pub const fn stop() -> Self {
        Self::new(AudioBuffer::empty(), CommandCode::STOP)
    }

    /// Buffer handed to the DMA engine on Play.
    pub const fn buffer(&self) -> AudioBuffer {
        self.buffer
    }

    /// Command tag.
    pub const fn code(&self) -> CommandCode {
        self.code
    }
}
