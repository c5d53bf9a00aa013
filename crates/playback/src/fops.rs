//! Raw function-table surface for a USB Audio Class driver.
//!
//! Mirrors the `USBD_AUDIO_ItfTypeDef` shape: every entry point takes plain
//! integers and answers [`AUDIO_OK`] or [`AUDIO_FAIL`]. Validation of the raw
//! values happens here; everything else is the typed [`AudioOutput`] API.

use platform::{
    AudioBuffer, CodecDriver, DmaStream, MuteState, SampleRateHz, VolumeLevel, VolumePercent,
};

use crate::command::{CommandCode, PlaybackRequest};
use crate::engine::AudioOutput;
use crate::error::AudioError;

/// Operation succeeded.
pub const AUDIO_OK: u8 = 0x00;
/// Operation failed.
pub const AUDIO_FAIL: u8 = 0xFF;

/// Collapse a typed result into the raw status byte.
pub fn status_code(result: Result<(), AudioError>) -> u8 {
    match result {
        Ok(()) => AUDIO_OK,
        Err(_) => AUDIO_FAIL,
    }
}

/// Raw audio-output entry points.
pub trait AudioOutInterface {
    /// Initialize with `frequency` in Hz and `volume` in percent. `options`
    /// is reserved.
    fn init(&mut self, frequency: u32, volume: u32, options: u32) -> u8;

    /// Deinitialize. `options` is reserved. Always [`AUDIO_OK`].
    fn deinit(&mut self, options: u32) -> u8;

    /// Execute command tag `cmd` on `buffer`.
    fn audio_cmd(&mut self, buffer: AudioBuffer, cmd: u8) -> u8;

    /// Set the codec-scale volume (0–255).
    fn volume_ctl(&mut self, volume: u8) -> u8;

    /// 0 = unmute, 1 = mute.
    fn mute_ctl(&mut self, mute: u8) -> u8;

    /// Periodic hook. Always [`AUDIO_OK`].
    fn periodic_tc(&mut self, cmd: u8) -> u8;

    /// Current state code.
    fn get_state(&self) -> u8;
}

impl<C, D> AudioOutInterface for AudioOutput<'_, C, D>
where
    C: CodecDriver,
    D: DmaStream,
{
    fn init(&mut self, frequency: u32, volume: u32, _options: u32) -> u8 {
        let Ok(frequency) = SampleRateHz::new(frequency) else {
            #[cfg(feature = "defmt")]
            defmt::warn!("audio: init rejected, {} Hz unsupported", frequency);
            return status_code(Err(AudioError::InvalidFrequency(frequency)));
        };
        let volume = VolumePercent::saturating_from_u32(volume);
        status_code(self.initialize(frequency, volume))
    }

    fn deinit(&mut self, _options: u32) -> u8 {
        self.deinitialize();
        AUDIO_OK
    }

    fn audio_cmd(&mut self, buffer: AudioBuffer, cmd: u8) -> u8 {
        status_code(self.command(PlaybackRequest::new(buffer, CommandCode::new(cmd))))
    }

    fn volume_ctl(&mut self, volume: u8) -> u8 {
        status_code(self.set_volume(VolumeLevel::new(volume)))
    }

    fn mute_ctl(&mut self, mute: u8) -> u8 {
        let result = MuteState::from_raw(mute)
            .map_err(|_| AudioError::InvalidMute(mute))
            .and_then(|mute| self.set_mute(mute));
        status_code(result)
    }

    fn periodic_tc(&mut self, cmd: u8) -> u8 {
        status_code(self.periodic_tick(cmd))
    }

    fn get_state(&self) -> u8 {
        self.state().code()
    }
}
