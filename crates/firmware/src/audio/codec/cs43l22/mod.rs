//! CS43L22 audio DAC driver module (Cirrus Logic)
//!
//! The driver is generic over `embedded-hal` 1.0 traits, so it builds and is
//! tested on the host; only the board wiring in `main.rs` is hardware-only.

pub mod registers;

mod driver;

pub use driver::{Cs43l22, Cs43l22Error, NoResetPin};
