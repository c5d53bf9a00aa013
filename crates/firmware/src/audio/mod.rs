//! Audio subsystem: codec driver and the I2S output stream
//!
//! Vertically sliced: one sub-directory per hardware component.
//!
//! # Structure
//!
//! - `codec/` - codec drivers (`Cs43l22`)
//! - `stream` - [`I2sDmaStream`], the DMA handle the state machine drives
//! - `control_task` - the embassy task that owns the audio output (`hardware`)
//!
//! # Dependency Injection
//!
//! The state machine is generic over [`platform::CodecDriver`] and
//! [`platform::DmaStream`]. Concrete types are injected at the call site:
//!
//! ```rust,ignore
//! // Hardware:
//! AudioOutput::new(&STATUS, Cs43l22::new(i2c, reset, Delay, 0x4A), I2sDmaStream::new(), routing);
//! // Tests:
//! AudioOutput::new(&status, MockCodec::new(), MockDma::new(), routing);
//! ```

pub mod codec;
pub mod stream;

#[cfg(feature = "hardware")]
pub mod control_task;

pub use codec::cs43l22::{Cs43l22, Cs43l22Error, NoResetPin};
pub use stream::{I2sDmaStream, StreamControl, StreamDirective, I2S_STREAM};
