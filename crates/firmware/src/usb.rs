//! USB Audio Class request handoff
//!
//! The class driver runs in the USB interrupt context and must not block on
//! the codec's control bus. It turns each class event into a
//! [`UsbAudioRequest`], queues it on [`USB_AUDIO_REQUESTS`], and the audio
//! control task applies it through [`dispatch`].
//!
//! | Class event                     | Request                      |
//! |---------------------------------|------------------------------|
//! | `SET_INTERFACE` alt 1           | `Init { frequency, volume }` |
//! | `SET_INTERFACE` alt 0           | `DeInit`                     |
//! | ISO OUT packet ready            | `Stream(buffer)`             |
//! | Feature unit `SET_CUR` volume   | `SetVolume(level)`           |
//! | Feature unit `SET_CUR` mute     | `SetMute(raw)`               |
//! | Start of frame                  | `Tick`                       |

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use platform::config::REQUEST_QUEUE_DEPTH;
use platform::AudioBuffer;
use playback::{AudioOutInterface, CommandCode, AUDIO_OK};

/// One class-layer request for the audio output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsbAudioRequest {
    /// Streaming interface enabled.
    Init {
        /// Sample rate in Hz from the endpoint's sampling frequency control.
        frequency: u32,
        /// Initial volume in percent.
        volume: u32,
    },
    /// Streaming interface disabled.
    DeInit,
    /// Play a received packet.
    Stream(AudioBuffer),
    /// Host paused the stream.
    Pause,
    /// Host resumed the stream.
    Resume,
    /// Host stopped the stream.
    Stop,
    /// Codec-scale volume (0–255).
    SetVolume(u8),
    /// Raw mute control value.
    SetMute(u8),
    /// Periodic hook.
    Tick,
}

/// What the class driver answers on the control endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlResponse {
    /// Request accepted.
    Ack,
    /// Request rejected; the endpoint stalls.
    Stall,
}

impl ControlResponse {
    /// Map a raw status byte onto the control response.
    pub const fn from_status(status: u8) -> Self {
        if status == AUDIO_OK {
            Self::Ack
        } else {
            Self::Stall
        }
    }
}

/// Queue between the USB class driver and the audio control task.
pub static USB_AUDIO_REQUESTS: Channel<
    CriticalSectionRawMutex,
    UsbAudioRequest,
    REQUEST_QUEUE_DEPTH,
> = Channel::new();

/// Queue `request` without blocking.
///
/// Safe to call from interrupt context. A full queue drops the request and
/// hands it back so the caller can stall the control transfer.
pub fn try_submit(request: UsbAudioRequest) -> Result<(), UsbAudioRequest> {
    USB_AUDIO_REQUESTS.try_send(request).map_err(|err| {
        let TrySendError::Full(request) = err;
        #[cfg(feature = "defmt")]
        defmt::warn!("USB audio request dropped (queue full): {}", request);
        request
    })
}

/// Apply one request to the audio output.
pub fn dispatch<I: AudioOutInterface>(output: &mut I, request: UsbAudioRequest) -> ControlResponse {
    let status = match request {
        UsbAudioRequest::Init { frequency, volume } => output.init(frequency, volume, 0),
        UsbAudioRequest::DeInit => output.deinit(0),
        UsbAudioRequest::Stream(buffer) => output.audio_cmd(buffer, CommandCode::PLAY.get()),
        UsbAudioRequest::Pause => output.audio_cmd(AudioBuffer::empty(), CommandCode::PAUSE.get()),
        UsbAudioRequest::Resume => {
            output.audio_cmd(AudioBuffer::empty(), CommandCode::RESUME.get())
        }
        UsbAudioRequest::Stop => output.audio_cmd(AudioBuffer::empty(), CommandCode::STOP.get()),
        UsbAudioRequest::SetVolume(level) => output.volume_ctl(level),
        UsbAudioRequest::SetMute(raw) => output.mute_ctl(raw),
        UsbAudioRequest::Tick => output.periodic_tc(0),
    };
    let response = ControlResponse::from_status(status);
    #[cfg(feature = "defmt")]
    {
        if response == ControlResponse::Stall {
            defmt::warn!("USB audio request {} failed (state {})", request, output.get_state());
        }
    }
    response
}
