//! CS43L22 register map
//!
//! Source: Cirrus Logic CS43L22 datasheet DS792F2, section 7 (Register
//! Quick Reference) and the STM32F4-Discovery BSP bring-up sequence.
//!
//! # Power sequencing
//!
//! The chip must see `POWER_CTL1_DOWN` (0x01) in register 0x02 before any
//! other control write after reset, and must only be powered up
//! (`POWER_CTL1_UP`, 0x9E) once the output routing and clocking registers
//! hold their final values. Writing 0x9F powers the whole device down while
//! keeping the register file.
//!
//! # Master volume encoding
//!
//! Registers 0x20/0x21 are two's complement in 0.5 dB steps with 0x18 as
//! +12 dB and 0x19 as -102 dB. The linear 0x00–0xFF level used by the rest of
//! the firmware is mapped with [`master_volume`].

use platform::{OutputDevice, VolumeLevel};

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// Chip ID and revision (read only). Bits \[7:3\] hold the chip ID.
pub const REG_ID: u8 = 0x01;

/// Power control 1: whole-device power up / down.
pub const REG_POWER_CTL1: u8 = 0x02;

/// Power control 2: speaker and headphone channel enables.
pub const REG_POWER_CTL2: u8 = 0x04;

/// Clocking control: auto-detect, MCLK divide.
pub const REG_CLOCKING_CTL: u8 = 0x05;

/// Interface control 1: slave mode, DAC interface format, word length.
pub const REG_INTERFACE_CTL1: u8 = 0x06;

/// Analog zero-cross and soft-ramp settings.
pub const REG_ANALOG_ZC_SR: u8 = 0x0A;

/// Miscellaneous control: digital soft ramp, de-emphasis.
pub const REG_MISC_CTL: u8 = 0x0E;

/// Playback control 2: headphone / speaker mute, channel swap.
pub const REG_PLAYBACK_CTL2: u8 = 0x0F;

/// PCM volume A.
pub const REG_PCMA_VOL: u8 = 0x1A;

/// PCM volume B.
pub const REG_PCMB_VOL: u8 = 0x1B;

/// Tone control: bass/treble corner frequencies.
pub const REG_TONE_CTL: u8 = 0x1F;

/// Master volume A.
pub const REG_MASTER_A_VOL: u8 = 0x20;

/// Master volume B.
pub const REG_MASTER_B_VOL: u8 = 0x21;

/// Headphone volume A.
pub const REG_HP_A_VOL: u8 = 0x22;

/// Headphone volume B.
pub const REG_HP_B_VOL: u8 = 0x23;

/// Speaker volume A.
pub const REG_SPK_A_VOL: u8 = 0x24;

/// Speaker volume B.
pub const REG_SPK_B_VOL: u8 = 0x25;

/// Limiter control 1: thresholds.
pub const REG_LIMIT_CTL1: u8 = 0x27;

// ---------------------------------------------------------------------------
// Register field values
// ---------------------------------------------------------------------------

/// Chip ID field of `REG_ID`.
pub const CHIP_ID: u8 = 0xE0;

/// Mask of the chip ID field in `REG_ID`.
pub const CHIP_ID_MASK: u8 = 0xF8;

/// Power control 1: power down (register file retained).
pub const POWER_CTL1_DOWN: u8 = 0x01;

/// Power control 1: power up.
pub const POWER_CTL1_UP: u8 = 0x9E;

/// Power control 1: full power down used by stop / deinit.
pub const POWER_CTL1_FULL_DOWN: u8 = 0x9F;

/// Power control 2: every output off (mute).
pub const POWER_CTL2_ALL_OFF: u8 = 0xFF;

/// Power control 2: speaker on, headphone off.
pub const POWER_CTL2_SPEAKER: u8 = 0xFA;

/// Power control 2: speaker off, headphone on.
pub const POWER_CTL2_HEADPHONE: u8 = 0xAF;

/// Power control 2: speaker and headphone on.
pub const POWER_CTL2_BOTH: u8 = 0xAA;

/// Power control 2: follow the SPK/HP detect pin.
pub const POWER_CTL2_AUTO: u8 = 0x05;

/// Clocking: auto-detect speed, MCLK divide by 2.
pub const CLOCKING_AUTO: u8 = 0x81;

/// Interface control 1: slave, I2S Philips, up to 24-bit.
pub const INTERFACE_I2S_SLAVE: u8 = 0x04;

/// Playback control 2: headphone / speaker unmuted, no swap.
pub const PLAYBACK_CTL2_SPEAKER_MONO: u8 = 0x06;

/// Analog ZC/SR: soft ramp and zero cross disabled.
pub const ANALOG_ZC_SR_OFF: u8 = 0x00;

/// Misc control: digital soft ramp on.
pub const MISC_SOFT_RAMP: u8 = 0x04;

/// Limiter: thresholds at 0 dB.
pub const LIMIT_OFF: u8 = 0x00;

/// Tone control: treble 5 kHz, bass 50 Hz corners.
pub const TONE_DEFAULT: u8 = 0x0F;

/// PCM volume: +5 dB.
pub const PCM_VOL_DEFAULT: u8 = 0x0A;

/// Speaker volume: 0 dB.
pub const SPK_VOL_0DB: u8 = 0x00;

/// Master volume register value for a linear `level`.
///
/// Levels up to 0xE6 land in the -102 dB..0 dB window starting at 0x19;
/// higher levels wrap into the 0x00..=0x18 positive-gain range.
pub fn master_volume(level: VolumeLevel) -> u8 {
    let raw = level.get();
    if raw > 0xE6 {
        raw.wrapping_sub(0xE7)
    } else {
        raw.wrapping_add(0x19)
    }
}

/// `REG_POWER_CTL2` value that routes audio to `output`.
pub const fn power_ctl2(output: OutputDevice) -> u8 {
    match output {
        OutputDevice::Speaker => POWER_CTL2_SPEAKER,
        OutputDevice::Headphone => POWER_CTL2_HEADPHONE,
        OutputDevice::Both => POWER_CTL2_BOTH,
        OutputDevice::Auto => POWER_CTL2_AUTO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_mapping_edges() {
        assert_eq!(master_volume(VolumeLevel::MIN), 0x19);
        assert_eq!(master_volume(VolumeLevel::new(0xE6)), 0xFF);
        assert_eq!(master_volume(VolumeLevel::new(0xE7)), 0x00);
        assert_eq!(master_volume(VolumeLevel::MAX), 0x18);
    }

    #[test]
    fn routing_values() {
        assert_eq!(power_ctl2(OutputDevice::Speaker), 0xFA);
        assert_eq!(power_ctl2(OutputDevice::Headphone), 0xAF);
        assert_eq!(power_ctl2(OutputDevice::Both), 0xAA);
        assert_eq!(power_ctl2(OutputDevice::Auto), 0x05);
    }
}
