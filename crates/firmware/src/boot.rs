//! Clock tree and boot ordering for the STM32F407.
//!
//! Initialization order:
//!   1. RCC: HSE 8 MHz, PLL (168 MHz core, 48 MHz USB), PLLI2S (I2S kernel clock)
//!   2. I2C1 + codec reset line (codec bring-up happens on the first Init request)
//!   3. I2S + DMA stream task
//!   4. Audio control task, then the USB class driver
//!
//! The USB class driver must start last: its first `SET_INTERFACE` is queued
//! for the control task and would otherwise sit in the queue unserved.

/// Ordered list of boot sequence steps for documentation and testing.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. RCC: HSE + PLL for 168 MHz core, PLLI2S for the I2S kernel clock",
    "2. I2C1 @ 100 kHz + codec reset GPIO",
    "3. I2S TX + DMA stream task",
    "4. Audio control task",
    "5. USB class driver",
];

/// Board crystal.
pub const HSE_HZ: u32 = 8_000_000;

/// PLL input divider shared by the main PLL and PLLI2S (1 MHz VCO input).
pub const PLL_M: u32 = 8;

/// Main PLL multiplier: 336 MHz VCO.
pub const PLL_N: u32 = 336;

/// Main PLL P divider: 168 MHz system clock.
pub const PLL_P: u32 = 2;

/// Main PLL Q divider: 48 MHz USB OTG FS clock.
pub const PLL_Q: u32 = 7;

/// PLLI2S multiplier for the 48 kHz family (RM0090 table 127, MCLK off).
pub const PLLI2S_N: u32 = 192;

/// PLLI2S R divider: 38.4 MHz I2S kernel clock.
pub const PLLI2S_R: u32 = 5;

/// System clock produced by [`build_embassy_config`].
#[allow(clippy::arithmetic_side_effects)] // constant operands
pub const fn sysclk_hz() -> u32 {
    HSE_HZ / PLL_M * PLL_N / PLL_P
}

/// USB clock produced by [`build_embassy_config`].
#[allow(clippy::arithmetic_side_effects)] // constant operands
pub const fn usb_clock_hz() -> u32 {
    HSE_HZ / PLL_M * PLL_N / PLL_Q
}

/// I2S kernel clock (I2SxCLK) produced by [`build_embassy_config`].
#[allow(clippy::arithmetic_side_effects)] // constant operands
pub const fn i2s_kernel_clock_hz() -> u32 {
    HSE_HZ / PLL_M * PLLI2S_N / PLLI2S_R
}

/// Embassy configuration for the STM32F407.
///
/// Always pass this to `embassy_stm32::init`; `Config::default()` runs from
/// HSI with PLLI2S off, and the I2S peripheral then produces no bit clock.
#[cfg(feature = "hardware")]
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;
    use embassy_stm32::time::Hertz;

    let mut config = embassy_stm32::Config::default();

    config.rcc.hse = Some(Hse {
        freq: Hertz(HSE_HZ),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll_src = PllSource::HSE;

    // HSE / 8 = 1 MHz → × 336 = 336 MHz VCO
    config.rcc.pll = Some(Pll {
        prediv: PllPreDiv::DIV8,
        mul: PllMul::MUL336,
        divp: Some(PllPDiv::DIV2), // 168 MHz system clock
        divq: Some(PllQDiv::DIV7), // 48 MHz USB
        divr: None,
    });

    // 1 MHz × 192 = 192 MHz VCO
    config.rcc.plli2s = Some(Pll {
        prediv: PllPreDiv::DIV8,
        mul: PllMul::MUL192,
        divp: None,
        divq: None,
        divr: Some(PllRDiv::DIV5), // 38.4 MHz I2S kernel clock
    });

    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV1; // 168 MHz
    config.rcc.apb1_pre = APBPrescaler::DIV4; // 42 MHz (I2C1, SPI2/3)
    config.rcc.apb2_pre = APBPrescaler::DIV2; // 84 MHz

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_runs_at_168mhz() {
        assert_eq!(sysclk_hz(), 168_000_000);
    }

    #[test]
    fn usb_clock_is_48mhz() {
        assert_eq!(usb_clock_hz(), 48_000_000);
    }

    #[test]
    fn i2s_kernel_clock_divides_to_48khz() {
        // 16-bit stereo, MCLK off: fs = I2SCLK / (32 × (2 × I2SDIV + ODD))
        // with I2SDIV = 12, ODD = 1.
        assert_eq!(i2s_kernel_clock_hz(), 38_400_000);
        assert_eq!(i2s_kernel_clock_hz() / (32 * 25), 48_000);
    }

    #[test]
    fn usb_driver_starts_last() {
        let last = BOOT_SEQUENCE_STEPS.last().copied().unwrap_or_default();
        assert!(last.contains("USB"));
    }
}
