//! USB audio output firmware - Main Entry Point
//!
//! Hardware-only entry point for the STM32F407.

#![no_std]
#![no_main]

#[cfg(feature = "board-324x9i-eval")]
compile_error!("board-324x9i-eval needs an STM32F429 chip feature; the hardware build targets stm32f407vg");

use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32::dma::NoDma;
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::i2s::{Config as I2sConfig, Format, Standard, I2S};
use embassy_stm32::time::Hertz;
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_time::Delay;
use platform::config::{default_volume, APP_NAME, APP_VERSION, DEFAULT_FREQUENCY};
use platform::CodecDriver;
use playback::{AudioOutput, OutputStatus};

use firmware::audio::control_task::{audio_control_task, BoardCodec, CodecReset};
use firmware::audio::stream::{i2s_stream_task, CodecI2s};
use firmware::{try_submit, ActiveBoard, Board, Cs43l22, I2sDmaStream, UsbAudioRequest};

// Panic handler
use panic_probe as _;

bind_interrupts!(struct Irqs {
    I2C1_EV => i2c::EventInterruptHandler<peripherals::I2C1>;
    I2C1_ER => i2c::ErrorInterruptHandler<peripherals::I2C1>;
});

/// Shared between the control task (commands) and the stream task (completion).
static OUTPUT_STATUS: OutputStatus = OutputStatus::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!("{=str} v{=str}", APP_NAME, APP_VERSION);
    defmt::info!("Board: {=str}", ActiveBoard::NAME);

    // Step 1: clocks. Default config leaves PLLI2S off (no bit clock).
    let p = embassy_stm32::init(firmware::boot::build_embassy_config());

    // Step 2: codec control bus and reset line.
    let bus = ActiveBoard::CODEC_BUS;
    let pins = ActiveBoard::CODEC_BUS_PINS;
    defmt::info!(
        "I2C1: SCL P{=char}{=u8}, SDA P{=char}{=u8}",
        pins.scl.port,
        pins.scl.pin,
        pins.sda.port,
        pins.sda.pin
    );
    #[cfg(feature = "board-discovery")]
    let (scl, sda) = (p.PB6, p.PB9);
    #[cfg(not(feature = "board-discovery"))]
    let (scl, sda) = (p.PB6, p.PB7);
    let i2c = I2c::new(
        p.I2C1,
        scl,
        sda,
        Irqs,
        NoDma,
        NoDma,
        Hertz(bus.speed_hz),
        Default::default(),
    );

    #[cfg(feature = "board-discovery")]
    let reset: CodecReset = {
        use embassy_stm32::gpio::{Level, Output, Speed};
        // PD4, held low until bring-up.
        Output::new(p.PD4, Level::Low, Speed::Low).degrade()
    };
    #[cfg(not(feature = "board-discovery"))]
    let reset: CodecReset = firmware::NoResetPin;

    let mut codec: BoardCodec = Cs43l22::new(i2c, reset, Delay, bus.address);

    // Early presence check; bring-up proper runs on the first Init request.
    if codec.init(ActiveBoard::OUTPUT, default_volume(), DEFAULT_FREQUENCY).is_ok() {
        match codec.verify_chip_id() {
            Ok(id) => defmt::info!("CS43L22 detected (ID register {=u8:#04x})", id),
            Err(e) => defmt::warn!("CS43L22 ID check failed: {}", defmt::Debug2Format(&e)),
        }
        if let Err(e) = codec.deinit() {
            defmt::warn!("CS43L22 release failed: {}", defmt::Debug2Format(&e));
        }
    } else {
        defmt::warn!("CS43L22 not responding on I2C1 @ {=u8:#04x}", bus.address);
    }

    // Step 3: I2S TX + DMA stream.
    let i2s_config = ActiveBoard::i2s_config(DEFAULT_FREQUENCY);
    let mut config = I2sConfig::default();
    config.standard = Standard::Philips;
    config.format = Format::Data16Channel16;
    config.master_clock = i2s_config.mclk_output;

    #[cfg(feature = "board-discovery")]
    let i2s: CodecI2s = I2S::new(
        p.SPI3,
        p.PC12, // SD
        p.PA4,  // WS
        p.PC10, // CK
        p.PC7,  // MCK
        p.DMA1_CH7,
        NoDma,
        Hertz(i2s_config.sample_rate.get()),
        config,
    );
    #[cfg(not(feature = "board-discovery"))]
    let i2s: CodecI2s = I2S::new(
        p.SPI2,
        p.PB15, // SD
        p.PB12, // WS
        p.PB10, // CK
        p.PC6,  // MCK
        p.DMA1_CH4,
        NoDma,
        Hertz(i2s_config.sample_rate.get()),
        config,
    );

    defmt::info!(
        "I2S: {=u32} Hz, BCLK {=u32} Hz, DMA{=u8} stream {=u8}",
        i2s_config.sample_rate.get(),
        i2s_config.bclk_hz(),
        ActiveBoard::I2S_DMA.controller,
        ActiveBoard::I2S_DMA.stream
    );
    spawner.must_spawn(i2s_stream_task(i2s, &OUTPUT_STATUS));

    // Step 4: audio control task.
    let output = AudioOutput::new(&OUTPUT_STATUS, codec, I2sDmaStream::new(), ActiveBoard::OUTPUT);
    spawner.must_spawn(audio_control_task(output));

    // Step 5: USB class driver. Until it is wired, bring the output up with
    // the default stream parameters so the codec is configured at boot.
    let init = UsbAudioRequest::Init {
        frequency: DEFAULT_FREQUENCY.get(),
        volume: u32::from(default_volume().get()),
    };
    if try_submit(init).is_err() {
        defmt::error!("Initial audio request dropped");
    }

    defmt::info!("Boot complete");
}
