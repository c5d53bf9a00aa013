//! Audio codec drivers
//!
//! - `cs43l22`: Cirrus Logic CS43L22 (every supported board)
//!
//! Drivers implement [`platform::CodecDriver`]; the playback state machine
//! never names a concrete chip.

pub mod cs43l22;
