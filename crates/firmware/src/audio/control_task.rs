//! Audio control task: applies queued USB requests to the audio output.
//!
//! Owns the [`AudioOutput`] for the board. Requests arrive on
//! [`USB_AUDIO_REQUESTS`]; between requests a ticker drives the periodic
//! hook at the USB frame rate.

use embassy_futures::select::{select, Either};
use embassy_stm32::dma::NoDma;
use embassy_stm32::i2c::I2c;
use embassy_stm32::peripherals::I2C1;
use embassy_time::{Delay, Duration, Ticker};
use platform::config::PERIODIC_TICK_MS;
use playback::AudioOutput;

use crate::audio::codec::cs43l22::Cs43l22;
use crate::audio::stream::I2sDmaStream;
use crate::usb::{dispatch, ControlResponse, UsbAudioRequest, USB_AUDIO_REQUESTS};

/// Codec reset line on the selected board.
#[cfg(feature = "board-discovery")]
pub type CodecReset = embassy_stm32::gpio::Output<'static, embassy_stm32::gpio::AnyPin>;

/// Codec reset line on the selected board.
#[cfg(not(feature = "board-discovery"))]
pub type CodecReset = crate::audio::codec::cs43l22::NoResetPin;

/// CS43L22 on I2C1, blocking transfers.
pub type BoardCodec = Cs43l22<I2c<'static, I2C1, NoDma, NoDma>, CodecReset, Delay>;

/// Audio output as owned by the control task.
pub type BoardOutput = AudioOutput<'static, BoardCodec, I2sDmaStream>;

/// Serve USB audio requests until reset.
#[embassy_executor::task]
pub async fn audio_control_task(mut output: BoardOutput) {
    let requests = USB_AUDIO_REQUESTS.receiver();
    let mut ticker = Ticker::every(Duration::from_millis(PERIODIC_TICK_MS));

    defmt::info!("Audio control task started");

    loop {
        let request = match select(requests.receive(), ticker.next()).await {
            Either::First(request) => request,
            Either::Second(()) => UsbAudioRequest::Tick,
        };

        if dispatch(&mut output, request) == ControlResponse::Stall {
            let status = output.status().snapshot();
            defmt::debug!(
                "audio: state={} transfers={=u32} errors={=u32}",
                status.state,
                status.completed_transfers,
                status.transfer_errors
            );
        }
    }
}
