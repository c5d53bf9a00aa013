//! CS43L22 control-path driver
//!
//! Talks to the chip over blocking I2C (`embedded_hal::i2c::I2c`) and drives
//! the active-low reset line through `embedded_hal::digital::OutputPin`. The
//! sample stream reaches the codec over I2S via the DMA stream; that path
//! does not go through this driver.
//!
//! # I2C Address
//!
//! | AD0 pin | Address |
//! |---------|---------|
//! | GND     | `0x4A`  |
//! | VDD     | `0x4B`  |

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal::i2c::I2c;
use platform::{
    CodecDriver, MuteState, OutputDevice, PowerDownMode, SampleRateHz, VolumeLevel, VolumePercent,
};

use super::registers::*;

/// Reset pulse width and post-reset settle time.
const RESET_DELAY_MS: u32 = 5;

/// CS43L22 driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cs43l22Error<E> {
    /// Control bus transfer failed.
    #[error("I2C error: {0:?}")]
    I2c(E),
    /// The reset GPIO could not be driven.
    #[error("reset pin error")]
    ResetPin,
    /// Operation needs a completed bring-up.
    #[error("codec not initialized")]
    NotInitialized,
    /// `REG_ID` did not hold the CS43L22 chip ID.
    #[error("unexpected chip ID {0:#04x}")]
    UnexpectedChipId(u8),
}

/// Stand-in reset line for boards where the codec reset is not on an MCU
/// GPIO (EVAL boards route it through an IO expander held high at boot).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResetPin;

impl ErrorType for NoResetPin {
    type Error = Infallible;
}

impl OutputPin for NoResetPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// CS43L22 audio DAC with class-D speaker and headphone drivers.
pub struct Cs43l22<I2C, RST, D> {
    i2c: I2C,
    reset: RST,
    delay: D,
    address: u8,
    output: OutputDevice,
    configured: bool,
    stopped: bool,
    powered: bool,
}

impl<I2C, RST, D> Cs43l22<I2C, RST, D>
where
    I2C: I2c,
    RST: OutputPin,
    D: DelayNs,
{
    /// Create a driver for the chip at 7-bit `address`.
    ///
    /// No bus traffic happens until [`CodecDriver::init`].
    pub fn new(i2c: I2C, reset: RST, delay: D, address: u8) -> Self {
        Self {
            i2c,
            reset,
            delay,
            address,
            output: OutputDevice::Auto,
            configured: false,
            stopped: true,
            powered: false,
        }
    }

    /// Give the bus, reset pin and delay back.
    pub fn release(self) -> (I2C, RST, D) {
        (self.i2c, self.reset, self.delay)
    }

    /// `true` between a successful `init` and the next hardware stop or `deinit`.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// `true` after a stop until the next `play`.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// `true` while the chip is powered up (`POWER_CTL1` = `0x9E`).
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Read `REG_ID` and check the chip ID field.
    ///
    /// Returns the raw register (chip ID plus revision).
    pub fn verify_chip_id(&mut self) -> Result<u8, Cs43l22Error<I2C::Error>> {
        let id = self.read_reg(REG_ID)?;
        if id & CHIP_ID_MASK == CHIP_ID {
            Ok(id)
        } else {
            Err(Cs43l22Error::UnexpectedChipId(id))
        }
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Cs43l22Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(Cs43l22Error::I2c)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, Cs43l22Error<I2C::Error>> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut value)
            .map_err(Cs43l22Error::I2c)?;
        let [byte] = value;
        Ok(byte)
    }

    fn ensure_configured(&self) -> Result<(), Cs43l22Error<I2C::Error>> {
        if self.configured {
            Ok(())
        } else {
            Err(Cs43l22Error::NotInitialized)
        }
    }

    fn pulse_reset(&mut self) -> Result<(), Cs43l22Error<I2C::Error>> {
        self.reset.set_low().map_err(|_| Cs43l22Error::ResetPin)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        self.reset.set_high().map_err(|_| Cs43l22Error::ResetPin)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    fn write_master_volume(&mut self, level: VolumeLevel) -> Result<(), Cs43l22Error<I2C::Error>> {
        let raw = master_volume(level);
        self.write_reg(REG_MASTER_A_VOL, raw)?;
        self.write_reg(REG_MASTER_B_VOL, raw)
    }

    fn mute_outputs(&mut self) -> Result<(), Cs43l22Error<I2C::Error>> {
        self.write_reg(REG_POWER_CTL2, POWER_CTL2_ALL_OFF)
    }

    fn unmute_outputs(&mut self) -> Result<(), Cs43l22Error<I2C::Error>> {
        self.write_reg(REG_POWER_CTL2, power_ctl2(self.output))
    }
}

impl<I2C, RST, D> CodecDriver for Cs43l22<I2C, RST, D>
where
    I2C: I2c,
    RST: OutputPin,
    D: DelayNs,
{
    type Error = Cs43l22Error<I2C::Error>;

    fn init(
        &mut self,
        output: OutputDevice,
        volume: VolumePercent,
        frequency: SampleRateHz,
    ) -> Result<(), Self::Error> {
        #[cfg(feature = "defmt")]
        defmt::info!("Initialising CS43L22 at {=u32} Hz", frequency.get());
        // Clock ratio is auto-detected from the bit clock (CLOCKING_AUTO).
        let _ = frequency;

        self.configured = false;
        self.output = output;
        self.pulse_reset()?;

        // Keep the codec powered down while it is configured.
        self.write_reg(REG_POWER_CTL1, POWER_CTL1_DOWN)?;
        self.write_reg(REG_POWER_CTL2, power_ctl2(output))?;
        self.write_reg(REG_CLOCKING_CTL, CLOCKING_AUTO)?;
        self.write_reg(REG_INTERFACE_CTL1, INTERFACE_I2S_SLAVE)?;
        self.write_master_volume(VolumeLevel::from_percent(volume))?;

        if output != OutputDevice::Headphone {
            self.write_reg(REG_PLAYBACK_CTL2, PLAYBACK_CTL2_SPEAKER_MONO)?;
            self.write_reg(REG_SPK_A_VOL, SPK_VOL_0DB)?;
            self.write_reg(REG_SPK_B_VOL, SPK_VOL_0DB)?;
        }

        self.write_reg(REG_POWER_CTL1, POWER_CTL1_UP)?;

        // Pop and click suppression plus output stage tuning.
        self.write_reg(REG_ANALOG_ZC_SR, ANALOG_ZC_SR_OFF)?;
        self.write_reg(REG_MISC_CTL, MISC_SOFT_RAMP)?;
        self.write_reg(REG_LIMIT_CTL1, LIMIT_OFF)?;
        self.write_reg(REG_TONE_CTL, TONE_DEFAULT)?;
        self.write_reg(REG_PCMA_VOL, PCM_VOL_DEFAULT)?;
        self.write_reg(REG_PCMB_VOL, PCM_VOL_DEFAULT)?;

        self.configured = true;
        self.stopped = false;
        self.powered = true;

        #[cfg(feature = "defmt")]
        defmt::info!("CS43L22 initialisation complete");
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        self.configured = false;
        self.stopped = true;
        self.powered = false;
        self.write_reg(REG_POWER_CTL1, POWER_CTL1_FULL_DOWN)?;
        self.reset.set_low().map_err(|_| Cs43l22Error::ResetPin)
    }

    fn play(&mut self) -> Result<(), Self::Error> {
        self.ensure_configured()?;
        // Powered down by a stop or held in power save by a pause.
        if !self.powered {
            self.write_reg(REG_POWER_CTL1, POWER_CTL1_UP)?;
            self.powered = true;
        }
        self.stopped = false;
        self.unmute_outputs()
    }

    fn pause(&mut self) -> Result<(), Self::Error> {
        self.ensure_configured()?;
        self.mute_outputs()?;
        self.write_reg(REG_POWER_CTL1, POWER_CTL1_DOWN)?;
        self.powered = false;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), Self::Error> {
        self.ensure_configured()?;
        self.unmute_outputs()?;
        self.write_reg(REG_POWER_CTL1, POWER_CTL1_UP)?;
        self.powered = true;
        Ok(())
    }

    fn stop(&mut self, mode: PowerDownMode) -> Result<(), Self::Error> {
        self.ensure_configured()?;
        self.mute_outputs()?;
        self.write_reg(REG_POWER_CTL1, POWER_CTL1_FULL_DOWN)?;
        self.stopped = true;
        self.powered = false;
        if mode == PowerDownMode::Hardware {
            // Register file is lost; bring-up must run again.
            self.configured = false;
            self.reset.set_low().map_err(|_| Cs43l22Error::ResetPin)?;
        }
        Ok(())
    }

    fn set_volume(&mut self, level: VolumeLevel) -> Result<(), Self::Error> {
        self.ensure_configured()?;
        self.write_master_volume(level)
    }

    fn set_mute(&mut self, mute: MuteState) -> Result<(), Self::Error> {
        self.ensure_configured()?;
        match mute {
            MuteState::Muted => self.mute_outputs(),
            MuteState::Unmuted => self.unmute_outputs(),
        }
    }
}
