//! Board adapters
//!
//! Each supported evaluation board is a zero-sized type implementing
//! [`Board`]. The codec driver and the audio task read everything
//! board-specific (I2C address, analog routing, I2S / DMA wiring) from the
//! [`ActiveBoard`] alias, which is chosen by Cargo feature:
//!
//! | Feature             | Board            | Routing     | I2C1 SCL/SDA | I2S  | DMA1 stream |
//! |---------------------|------------------|-------------|--------------|------|-------------|
//! | `board-discovery`   | STM32F4-Discovery| `Auto`      | PB6 / PB9    | SPI3 | 7           |
//! | `board-324xg-eval`  | STM324xG-EVAL    | `Auto`      | PB6 / PB7    | SPI2 | 4           |
//! | `board-324x9i-eval` | STM324x9I-EVAL   | `Both`      | PB6 / PB7    | SPI2 | 4           |
//!
//! Nothing outside this module branches on the board.

use platform::audio_config::{CodecBusConfig, DmaStreamConfig, I2sAudioConfig};
use platform::{OutputDevice, SampleRateHz};

/// A GPIO pin by port letter and number, e.g. `PB9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId {
    /// Port letter (`'A'`..=`'I'`).
    pub port: char,
    /// Pin number within the port.
    pub pin: u8,
}

impl PinId {
    /// `P<port><pin>`.
    pub const fn new(port: char, pin: u8) -> Self {
        Self { port, pin }
    }
}

impl core::fmt::Display for PinId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "P{}{}", self.port, self.pin)
    }
}

/// Pins carrying the codec control bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CodecBusPins {
    /// I2C clock.
    pub scl: PinId,
    /// I2C data.
    pub sda: PinId,
}

/// Static description of one board's audio path.
pub trait Board {
    /// Human-readable board name (logged at boot).
    const NAME: &'static str;

    /// Codec control bus (7-bit address, speed).
    const CODEC_BUS: CodecBusConfig;

    /// I2C1 pins the codec bus is routed to.
    const CODEC_BUS_PINS: CodecBusPins;

    /// Analog output the codec is routed to at bring-up.
    const OUTPUT: OutputDevice;

    /// DMA stream feeding the I2S transmit register.
    const I2S_DMA: DmaStreamConfig;

    /// Whether the codec reset line is driven by an MCU GPIO.
    const HAS_RESET_GPIO: bool;

    /// I2S format for `frequency`.
    fn i2s_config(frequency: SampleRateHz) -> I2sAudioConfig {
        I2sAudioConfig::cs43l22(frequency)
    }
}

/// STM32F4-Discovery (MB997): CS43L22 with headphone jack, reset on PD4.
pub struct Stm32f4Discovery;

impl Board for Stm32f4Discovery {
    const NAME: &'static str = "STM32F4-Discovery";
    const CODEC_BUS: CodecBusConfig = CodecBusConfig::CS43L22;
    const CODEC_BUS_PINS: CodecBusPins = CodecBusPins {
        scl: PinId::new('B', 6),
        sda: PinId::new('B', 9),
    };
    const OUTPUT: OutputDevice = OutputDevice::Auto;
    const I2S_DMA: DmaStreamConfig = DmaStreamConfig::SPI3_TX;
    const HAS_RESET_GPIO: bool = true;
}

/// Both EVAL boards share the I2C1 routing.
const EVAL_CODEC_BUS_PINS: CodecBusPins = CodecBusPins {
    scl: PinId::new('B', 6),
    sda: PinId::new('B', 7),
};

/// STM324xG-EVAL: CS43L22, reset through the IO expander.
pub struct Stm324xgEval;

impl Board for Stm324xgEval {
    const NAME: &'static str = "STM324xG-EVAL";
    const CODEC_BUS: CodecBusConfig = CodecBusConfig::CS43L22;
    const CODEC_BUS_PINS: CodecBusPins = EVAL_CODEC_BUS_PINS;
    const OUTPUT: OutputDevice = OutputDevice::Auto;
    const I2S_DMA: DmaStreamConfig = DmaStreamConfig::SPI2_TX;
    const HAS_RESET_GPIO: bool = false;
}

/// STM324x9I-EVAL: speaker and headphone driven together.
pub struct Stm324x9iEval;

impl Board for Stm324x9iEval {
    const NAME: &'static str = "STM324x9I-EVAL";
    const CODEC_BUS: CodecBusConfig = CodecBusConfig::CS43L22;
    const CODEC_BUS_PINS: CodecBusPins = EVAL_CODEC_BUS_PINS;
    const OUTPUT: OutputDevice = OutputDevice::Both;
    const I2S_DMA: DmaStreamConfig = DmaStreamConfig::SPI2_TX;
    const HAS_RESET_GPIO: bool = false;
}

#[cfg(any(
    all(feature = "board-discovery", feature = "board-324xg-eval"),
    all(feature = "board-discovery", feature = "board-324x9i-eval"),
    all(feature = "board-324xg-eval", feature = "board-324x9i-eval"),
))]
compile_error!("select exactly one board-* feature");

/// Board selected at build time.
#[cfg(feature = "board-discovery")]
pub type ActiveBoard = Stm32f4Discovery;

/// Board selected at build time.
#[cfg(feature = "board-324xg-eval")]
pub type ActiveBoard = Stm324xgEval;

/// Board selected at build time.
#[cfg(feature = "board-324x9i-eval")]
pub type ActiveBoard = Stm324x9iEval;

#[cfg(not(any(
    feature = "board-discovery",
    feature = "board-324xg-eval",
    feature = "board-324x9i-eval"
)))]
compile_error!("select a board-* feature");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_uses_spi3_stream7() {
        assert_eq!(Stm32f4Discovery::I2S_DMA.stream, 7);
        assert_eq!(Stm32f4Discovery::OUTPUT, OutputDevice::Auto);
    }

    #[test]
    fn eval_324xg_uses_spi2_stream4() {
        assert_eq!(Stm324xgEval::I2S_DMA.stream, 4);
        assert_eq!(Stm324xgEval::OUTPUT, OutputDevice::Auto);
    }

    #[test]
    fn eval_324x9i_routes_both_outputs() {
        assert_eq!(Stm324x9iEval::OUTPUT, OutputDevice::Both);
    }

    #[test]
    fn discovery_codec_bus_is_pb6_pb9() {
        let pins = Stm32f4Discovery::CODEC_BUS_PINS;
        assert_eq!(pins.scl, PinId::new('B', 6));
        assert_eq!(pins.sda, PinId::new('B', 9));
    }

    #[test]
    fn eval_boards_codec_bus_is_pb6_pb7() {
        for pins in [Stm324xgEval::CODEC_BUS_PINS, Stm324x9iEval::CODEC_BUS_PINS] {
            assert_eq!(pins.scl, PinId::new('B', 6));
            assert_eq!(pins.sda, PinId::new('B', 7));
        }
    }

    #[test]
    fn pin_id_formats_like_the_datasheet() {
        assert_eq!(PinId::new('B', 9).to_string(), "PB9");
    }

    #[test]
    fn all_boards_share_codec_address() {
        assert_eq!(Stm32f4Discovery::CODEC_BUS.address, 0x4A);
        assert_eq!(Stm324xgEval::CODEC_BUS.address, 0x4A);
        assert_eq!(Stm324x9iEval::CODEC_BUS.address, 0x4A);
    }

    #[test]
    fn i2s_config_follows_frequency() {
        let cfg = ActiveBoard::i2s_config(SampleRateHz::HZ_48000);
        assert_eq!(cfg.sample_rate, SampleRateHz::HZ_48000);
        assert_eq!(cfg.bclk_hz(), 1_536_000);
    }
}
