//! Cortex-M4 fault handlers.
//!
//! A fault while the I2S DMA is running leaves the codec playing whatever
//! the stream last held; halting with the stacked frame on RTT is the only
//! useful reaction. Hardware target only.

use cortex_m_rt::{exception, ExceptionFrame};

/// HardFault: bus fault on a bad buffer address, stack overflow into
/// `.bss`, or an escalated usage fault.
///
/// # Safety
///
/// Must never return; the `-> !` signature enforces it.
#[exception]
unsafe fn HardFault(frame: &ExceptionFrame) -> ! {
    defmt::panic!(
        "HardFault: pc={=u32:#010x} lr={=u32:#010x} xpsr={=u32:#010x}",
        frame.pc(),
        frame.lr(),
        frame.xpsr()
    );
}

/// Any enabled interrupt without a handler.
#[exception]
unsafe fn DefaultHandler(irqn: i16) {
    defmt::panic!("Unhandled interrupt: IRQn={=i16}", irqn);
}
