//! I2S output stream: the [`DmaStream`] the playback state machine drives.
//!
//! The state machine runs in the audio control task, the transfer itself in
//! [`i2s_stream_task`]. They are joined by [`I2S_STREAM`], a
//! [`StreamControl`] holding what the stream should be doing right now:
//! which transfer, and whether it is held. `start`, `abort`, `pause` and
//! `resume` only rewrite that directive and wake the task, so they stay
//! non-blocking and callable with the status lock held.
//!
//! ```text
//! AudioOutput ── start/abort/pause/resume ──▶ I2S_STREAM ──▶ i2s_stream_task ──▶ I2S DMA
//!      ▲                                                          │
//!      └──────────── OutputStatus::on_*_for(id) ◀─────────────────┘
//! ```
//!
//! The task writes the buffer in chunks of [`STREAM_CHUNK_SAMPLES`] and
//! reads the directive between chunks. A held transfer keeps its position;
//! a transfer longer than one DMA counter load is simply more chunks.
//!
//! Aborts are [`AbortCompletion::Deferred`]. The hardware may still read the
//! old buffer until the task has dropped its write, so the aborted id is
//! parked in the directive and the task hands it back through
//! [`OutputStatus::on_transfer_aborted`](playback::OutputStatus::on_transfer_aborted).

use core::cell::Cell;
use core::convert::Infallible;
use core::ops::Range;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use platform::{AbortCompletion, DmaStream, TransferId, TransferRequest, DMA_MAX_SAMPLES};

/// Samples per I2S write: one 1 ms USB frame of 48 kHz stereo.
pub const STREAM_CHUNK_SAMPLES: u16 = 96;

const _: () = assert!(STREAM_CHUNK_SAMPLES <= DMA_MAX_SAMPLES);

/// What the state machine wants the stream task to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamDirective {
    /// Transfer to play, if any.
    pub transfer: Option<TransferRequest>,
    /// Hold the transfer at its current position.
    pub paused: bool,
    /// Aborted transfer the task has not acknowledged yet.
    pub retired: Option<TransferId>,
}

impl StreamDirective {
    /// Nothing to play, nothing to acknowledge.
    pub const IDLE: Self = Self {
        transfer: None,
        paused: false,
        retired: None,
    };
}

/// Shared directive plus the wake-up for the stream task.
pub struct StreamControl {
    directive: Mutex<CriticalSectionRawMutex, Cell<StreamDirective>>,
    changed: Signal<CriticalSectionRawMutex, ()>,
}

impl StreamControl {
    /// Idle control block, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            directive: Mutex::new(Cell::new(StreamDirective::IDLE)),
            changed: Signal::new(),
        }
    }

    /// Current directive, leaving any retired id in place.
    pub fn directive(&self) -> StreamDirective {
        self.directive.lock(Cell::get)
    }

    /// Current directive, taking the retired id with it.
    pub fn take(&self) -> StreamDirective {
        self.directive.lock(|cell| {
            let directive = cell.get();
            cell.set(StreamDirective {
                retired: None,
                ..directive
            });
            directive
        })
    }

    /// Drop transfer `id` once the task has reported its end.
    ///
    /// Returns `false` (and changes nothing) if the directive has already
    /// moved on to another transfer.
    pub fn finish(&self, id: TransferId) -> bool {
        self.directive.lock(|cell| {
            let mut directive = cell.get();
            match directive.transfer {
                Some(transfer) if transfer.id() == id => {
                    directive.transfer = None;
                    directive.paused = false;
                    cell.set(directive);
                    true
                }
                _ => false,
            }
        })
    }

    /// Wait until the directive is rewritten.
    pub async fn changed(&self) {
        self.changed.wait().await;
    }

    fn update(&self, f: impl FnOnce(&mut StreamDirective)) {
        self.directive.lock(|cell| {
            let mut directive = cell.get();
            f(&mut directive);
            cell.set(directive);
        });
        self.changed.signal(());
    }
}

impl Default for StreamControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Directive for the one I2S stream task.
pub static I2S_STREAM: StreamControl = StreamControl::new();

/// Handle to the stream task.
#[derive(Clone, Copy)]
pub struct I2sDmaStream {
    control: &'static StreamControl,
}

impl I2sDmaStream {
    /// Handle on [`I2S_STREAM`]. There is one stream task, so one handle.
    pub const fn new() -> Self {
        Self::with_control(&I2S_STREAM)
    }

    /// Handle on another control block.
    pub const fn with_control(control: &'static StreamControl) -> Self {
        Self { control }
    }
}

impl Default for I2sDmaStream {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for I2sDmaStream {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("I2sDmaStream")
            .field("directive", &self.control.directive())
            .finish()
    }
}

impl DmaStream for I2sDmaStream {
    type Error = Infallible;

    fn start(&mut self, transfer: TransferRequest) -> Result<(), Self::Error> {
        self.control.update(|d| {
            d.transfer = Some(transfer);
            d.paused = false;
        });
        Ok(())
    }

    fn abort(&mut self) -> AbortCompletion {
        self.control.update(|d| {
            if let Some(transfer) = d.transfer.take() {
                d.retired = Some(transfer.id());
            }
            d.paused = false;
        });
        AbortCompletion::Deferred
    }

    fn pause(&mut self) {
        self.control.update(|d| d.paused = true);
    }

    fn resume(&mut self) {
        self.control.update(|d| d.paused = false);
    }
}

/// What one finished chunk means for its transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOutcome {
    /// The chunk crossed the middle of the buffer.
    pub half: bool,
    /// The chunk was the last one.
    pub complete: bool,
}

/// Classify the chunk `range` of `transfer` after it has been written.
pub fn chunk_outcome(transfer: &TransferRequest, range: &Range<usize>) -> ChunkOutcome {
    let samples = transfer.samples();
    let middle = samples.div_ceil(2);
    ChunkOutcome {
        half: range.start < middle && range.end >= middle,
        complete: range.end >= samples,
    }
}

#[cfg(feature = "hardware")]
pub use hardware::{i2s_stream_task, CodecI2s};

#[cfg(feature = "hardware")]
mod hardware {
    use embassy_futures::select::{select, Either};
    use embassy_stm32::dma::NoDma;
    use embassy_stm32::i2s::I2S;
    use platform::TransferId;
    use playback::OutputStatus;

    use super::{chunk_outcome, I2S_STREAM, STREAM_CHUNK_SAMPLES};

    /// I2S peripheral wired to the codec on the selected board.
    #[cfg(feature = "board-discovery")]
    pub type CodecI2s = I2S<
        'static,
        embassy_stm32::peripherals::SPI3,
        embassy_stm32::peripherals::DMA1_CH7,
        NoDma,
    >;

    /// I2S peripheral wired to the codec on the selected board.
    #[cfg(not(feature = "board-discovery"))]
    pub type CodecI2s = I2S<
        'static,
        embassy_stm32::peripherals::SPI2,
        embassy_stm32::peripherals::DMA1_CH4,
        NoDma,
    >;

    /// Play the transfer named by [`I2S_STREAM`] and report its progress to
    /// `status`, tagged with its id.
    #[embassy_executor::task]
    pub async fn i2s_stream_task(mut i2s: CodecI2s, status: &'static OutputStatus) {
        // Transfer being played and the offset of its next chunk.
        let mut position: Option<(TransferId, usize)> = None;
        loop {
            // No write is alive here, so a retired buffer is free.
            let directive = I2S_STREAM.take();
            if let Some(id) = directive.retired {
                defmt::debug!("I2S transfer {=u32} aborted", id.get());
                status.on_transfer_aborted(id);
            }

            let Some(transfer) = directive.transfer else {
                position = None;
                I2S_STREAM.changed().await;
                continue;
            };
            let id = transfer.id();
            let offset = match position {
                Some((current, offset)) if current == id => offset,
                _ => 0,
            };
            position = Some((id, offset));

            if directive.paused {
                I2S_STREAM.changed().await;
                continue;
            }

            // SAFETY: the buffer belongs to the DMA engine from `start` until
            // completion, error or an acknowledged abort; the write below is
            // dropped before the abort is acknowledged.
            let samples = unsafe { transfer.as_samples() };
            let chunk = transfer
                .segment(offset, STREAM_CHUNK_SAMPLES)
                .and_then(|range| samples.get(range.clone()).map(|chunk| (range, chunk)));
            let Some((range, chunk)) = chunk else {
                // Nothing left: the last chunk was already reported.
                I2S_STREAM.finish(id);
                continue;
            };

            match select(i2s.write(chunk), I2S_STREAM.changed()).await {
                Either::First(Ok(())) => {
                    let outcome = chunk_outcome(&transfer, &range);
                    if outcome.half {
                        status.on_half_transfer_for(id);
                    }
                    if outcome.complete {
                        status.on_transfer_complete_for(id);
                        I2S_STREAM.finish(id);
                        position = None;
                    } else {
                        position = Some((id, range.end));
                    }
                }
                Either::First(Err(_err)) => {
                    defmt::error!("I2S write failed: {}", defmt::Debug2Format(&_err));
                    status.on_transfer_error_for(id);
                    I2S_STREAM.finish(id);
                    position = None;
                }
                // The interrupted chunk is replayed if the transfer survives.
                Either::Second(()) => {}
            }
        }
    }
}
