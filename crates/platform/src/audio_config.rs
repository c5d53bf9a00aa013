//! Audio peripheral configuration for the I2S + DMA output path.
//!
//! Defines the I2S format the codec expects, the DMA stream that feeds the
//! I2S transmit register, and the control-bus parameters of the codec.
//!
//! # Clock chain
//!
//! ```text
//! PLLI2S → I2SxCLK → prescaler (I2SDIV, ODD) → BCLK = 32 × fs (16-bit stereo)
//!                                            → MCLK = 256 × fs (when enabled)
//! ```
//!
//! The CS43L22 auto-detects its clock ratio from the incoming bit clock
//! (register 0x05 = 0x81), so MCLK output is disabled by default.
//!
//! # DMA
//!
//! | Board         | I2S  | DMA  | Stream | Channel |
//! |---------------|------|------|--------|---------|
//! | 324xG-EVAL    | SPI2 | DMA1 | 4      | 0       |
//! | F4-Discovery  | SPI3 | DMA1 | 7      | 0       |

use crate::audio_types::SampleRateHz;

/// I2S frame alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2sStandard {
    /// Philips I2S: data delayed one bit clock after WS.
    Philips,
    /// Left justified (MSB first, no delay).
    Msb,
    /// Right justified.
    Lsb,
}

/// I2S format and clocking for the codec's audio data input.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2sAudioConfig {
    /// Frame alignment.
    pub standard: I2sStandard,
    /// Sample rate.
    pub sample_rate: SampleRateHz,
    /// Bits per sample on the wire.
    pub data_bits: u8,
    /// Number of channels per frame.
    pub channels: u8,
    /// Drive MCLK (256 × fs) to the codec.
    pub mclk_output: bool,
}

impl I2sAudioConfig {
    /// CS43L22 reference configuration: Philips, 16-bit stereo, no MCLK.
    pub fn cs43l22(sample_rate: SampleRateHz) -> Self {
        Self {
            standard: I2sStandard::Philips,
            sample_rate,
            data_bits: 16,
            channels: 2,
            mclk_output: false,
        }
    }

    /// Bit clock: `data_bits × channels × fs`.
    ///
    /// 16-bit / 2ch / 48 kHz: 1 536 000 Hz.
    #[allow(clippy::arithmetic_side_effects)] // max 32 × 2 × 96 000 fits in u32
    pub fn bclk_hz(&self) -> u32 {
        u32::from(self.data_bits) * u32::from(self.channels) * self.sample_rate.get()
    }

    /// Master clock when enabled: `256 × fs`. `None` when MCLK is off.
    #[allow(clippy::arithmetic_side_effects)] // max 256 × 96 000 fits in u32
    pub fn mclk_hz(&self) -> Option<u32> {
        self.mclk_output.then(|| 256 * self.sample_rate.get())
    }
}

/// Which DMA stream feeds the I2S transmit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaStreamConfig {
    /// DMA controller number (1 or 2).
    pub controller: u8,
    /// Stream index (0–7).
    pub stream: u8,
    /// Request channel (0–7).
    pub channel: u8,
    /// NVIC preemption priority of the stream interrupt (0 = highest).
    pub irq_priority: u8,
}

impl DmaStreamConfig {
    /// SPI2/I2S2 TX on DMA1 stream 4, channel 0.
    pub const SPI2_TX: Self = Self {
        controller: 1,
        stream: 4,
        channel: 0,
        irq_priority: 0,
    };

    /// SPI3/I2S3 TX on DMA1 stream 7, channel 0.
    pub const SPI3_TX: Self = Self {
        controller: 1,
        stream: 7,
        channel: 0,
        irq_priority: 0,
    };

    /// Streams 0–3 report in LISR, 4–7 in HISR.
    pub fn uses_high_status_register(&self) -> bool {
        self.stream >= 4
    }
}

/// Codec control-bus parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CodecBusConfig {
    /// 7-bit I2C address.
    pub address: u8,
    /// Bus clock in Hz.
    pub speed_hz: u32,
}

impl CodecBusConfig {
    /// CS43L22 with AD0 low: 7-bit 0x4A (wire 0x94/0x95), 100 kHz.
    pub const CS43L22: Self = Self {
        address: 0x4A,
        speed_hz: 100_000,
    };
}
