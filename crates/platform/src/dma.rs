//! DMA abstraction layer
//!
//! Describes the buffer handoff between the USB audio endpoint and the
//! memory → I2S DMA stream. The caller owns the sample memory; the DMA engine
//! borrows it from `start` until a completion, error, or `abort`.

use core::ops::Range;

/// Largest sample count a single STM32F4 DMA transfer can carry (NDTR is 16 bits).
pub const DMA_MAX_SAMPLES: u16 = 0xFFFF;

/// Bytes per sample on the I2S bus (16-bit PCM).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Caller-owned audio memory, described by address and length.
///
/// The state machine never reads or writes through this handle; it only
/// forwards it to the [`DmaStream`]. Storing the address as an integer keeps
/// the type `Send`, so it can travel through an embassy channel from the USB
/// task to the audio task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioBuffer {
    address: usize,
    len: usize,
}

impl AudioBuffer {
    /// A buffer with no contents, for commands that carry no audio.
    #[must_use]
    pub const fn empty() -> Self {
        Self { address: 0, len: 0 }
    }

    /// Describe a static sample buffer.
    #[must_use]
    pub fn from_static(bytes: &'static [u8]) -> Self {
        Self {
            address: bytes.as_ptr() as usize,
            len: bytes.len(),
        }
    }

    /// Describe a static buffer of 16-bit samples (always half-word aligned).
    #[must_use]
    pub fn from_samples(samples: &'static [u16]) -> Self {
        Self {
            address: samples.as_ptr() as usize,
            len: core::mem::size_of_val(samples),
        }
    }

    /// Describe memory owned by the USB stack (packet memory, ring slots).
    ///
    /// # Safety
    ///
    /// `ptr..ptr + len` must stay valid and unmodified until the DMA
    /// engine hands it back (transfer complete, transfer error, or abort).
    #[must_use]
    pub unsafe fn from_raw_parts(ptr: *const u8, len: usize) -> Self {
        Self {
            address: ptr as usize,
            len,
        }
    }

    /// Start address of the buffer.
    #[must_use]
    pub const fn address(&self) -> usize {
        self.address
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the buffer holds no complete sample.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len < BYTES_PER_SAMPLE
    }
}

impl Default for AudioBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

/// Reasons a buffer cannot be turned into a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// Fewer than one 16-bit sample.
    #[error("buffer holds no samples")]
    Empty,
    /// 16-bit DMA reads need a half-word aligned start address.
    #[error("buffer address is not half-word aligned")]
    Misaligned,
}

/// Identity of one started transfer.
///
/// The status object hands out a fresh id on every start, so completion,
/// error and abort events from a stream that lags behind its commands can
/// be matched to the transfer they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferId(u32);

impl TransferId {
    /// Id of a transfer that has not been started.
    pub const UNASSIGNED: Self = Self(0);

    /// Wrap a raw id.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw id.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Id following this one. Never [`TransferId::UNASSIGNED`].
    #[must_use]
    pub const fn next(self) -> Self {
        match self.0.wrapping_add(1) {
            0 => Self(1),
            raw => Self(raw),
        }
    }
}

/// One playback transfer: where to read, how many 16-bit samples, and
/// which start it belongs to.
///
/// A single STM32F4 DMA transfer is limited to [`DMA_MAX_SAMPLES`]; longer
/// buffers are played as a chain of segments (see
/// [`TransferRequest::segment`]), so every sample of the buffer is played
/// before completion is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferRequest {
    buffer: AudioBuffer,
    samples: usize,
    id: TransferId,
}

impl TransferRequest {
    /// Build a transfer of `len / 2` samples.
    ///
    /// # Errors
    ///
    /// [`BufferError::Empty`] for buffers shorter than one sample,
    /// [`BufferError::Misaligned`] for odd start addresses.
    pub fn new(buffer: AudioBuffer) -> Result<Self, BufferError> {
        if buffer.is_empty() {
            return Err(BufferError::Empty);
        }
        if buffer.address() % BYTES_PER_SAMPLE != 0 {
            return Err(BufferError::Misaligned);
        }
        Ok(Self {
            buffer,
            samples: buffer.len() / BYTES_PER_SAMPLE,
            id: TransferId::UNASSIGNED,
        })
    }

    /// The same transfer, tagged with `id`.
    #[must_use]
    pub const fn with_id(self, id: TransferId) -> Self {
        Self { id, ..self }
    }

    /// Buffer the transfer reads from.
    #[must_use]
    pub const fn buffer(&self) -> AudioBuffer {
        self.buffer
    }

    /// Number of 16-bit samples in the whole buffer.
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.samples
    }

    /// Id assigned when the transfer was started.
    #[must_use]
    pub const fn id(&self) -> TransferId {
        self.id
    }

    /// Sample range of the segment starting at `offset`, at most `max`
    /// samples long. `None` once `offset` reaches the end of the buffer.
    ///
    /// `max` is clamped to [`DMA_MAX_SAMPLES`] (the 16-bit NDTR limit).
    #[must_use]
    pub fn segment(&self, offset: usize, max: u16) -> Option<Range<usize>> {
        if offset >= self.samples {
            return None;
        }
        let max = usize::from(max.clamp(1, DMA_MAX_SAMPLES));
        let end = offset.saturating_add(max).min(self.samples);
        Some(offset..end)
    }

    /// Number of DMA segments of at most [`DMA_MAX_SAMPLES`] needed for the
    /// whole buffer.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.samples.div_ceil(usize::from(DMA_MAX_SAMPLES))
    }

    /// View the transfer as the sample slice the DMA engine reads.
    ///
    /// # Safety
    ///
    /// The memory described by the originating [`AudioBuffer`] must still be
    /// valid and must not be written for as long as the slice is in use.
    #[must_use]
    pub unsafe fn as_samples(&self) -> &'static [u16] {
        // SAFETY: alignment and non-emptiness were checked in `new`; validity
        // for the borrow is the caller's contract.
        unsafe { core::slice::from_raw_parts(self.buffer.address() as *const u16, self.samples) }
    }
}

/// How a [`DmaStream::abort`] took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AbortCompletion {
    /// The stream is disabled; the buffer is back with the caller.
    Immediate,
    /// The stream stops later and acknowledges through the status object;
    /// until then the DMA engine may still read the buffer.
    Deferred,
}

/// Memory → I2S DMA stream.
///
/// `start` is fire-and-forget: it programs and enables the stream and returns
/// immediately. Completion and errors come back asynchronously through the
/// interrupt entry points of the state machine.
pub trait DmaStream {
    /// Error type
    type Error: core::fmt::Debug;

    /// Start a transfer. If one is already running it is aborted first.
    fn start(&mut self, transfer: TransferRequest) -> Result<(), Self::Error>;

    /// Stop the current transfer, if any.
    fn abort(&mut self) -> AbortCompletion;

    /// Hold the current transfer at its present position.
    fn pause(&mut self);

    /// Continue a paused transfer from where it was held.
    fn resume(&mut self);
}

const FEIF: u32 = 1 << 0;
const DMEIF: u32 = 1 << 2;
const TEIF: u32 = 1 << 3;
const HTIF: u32 = 1 << 4;
const TCIF: u32 = 1 << 5;

/// Decoded interrupt status for one DMA stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)] // mirrors the five hardware flag bits
pub struct DmaInterruptFlags {
    /// TCIF: all samples transferred.
    pub transfer_complete: bool,
    /// HTIF: half of the samples transferred.
    pub half_transfer: bool,
    /// TEIF: bus error during the transfer.
    pub transfer_error: bool,
    /// FEIF: FIFO under/overrun.
    pub fifo_error: bool,
    /// DMEIF: direct mode error.
    pub direct_mode_error: bool,
}

impl DmaInterruptFlags {
    /// Decode the flags of `stream` (0–7) from the matching LISR (streams
    /// 0–3) or HISR (streams 4–7) register value.
    ///
    /// Each stream owns a 6-bit group at bit offset 0, 6, 16 or 22:
    /// FEIF = bit 0, DMEIF = bit 2, TEIF = bit 3, HTIF = bit 4, TCIF = bit 5.
    #[must_use]
    pub fn from_status_register(isr: u32, stream: u8) -> Self {
        let shift = match stream % 4 {
            0 => 0,
            1 => 6,
            2 => 16,
            _ => 22,
        };
        let group = isr >> shift;
        Self {
            fifo_error: group & FEIF != 0,
            direct_mode_error: group & DMEIF != 0,
            transfer_error: group & TEIF != 0,
            half_transfer: group & HTIF != 0,
            transfer_complete: group & TCIF != 0,
        }
    }

    /// Any flag that means the stream can no longer be trusted.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.transfer_error || self.fifo_error || self.direct_mode_error
    }

    /// Returns `true` if no flag is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
