//! Shared output status.
//!
//! [`OutputStatus`] is the only state shared between the task that issues
//! commands and the DMA interrupt (or DMA task) that reports transfer
//! events. Every read and write goes through one critical section, so the
//! state, the bring-up latch and the transfer phase are always observed
//! together.
//!
//! # Ownership of the sample buffer
//!
//! ```text
//! caller ──play──▶ DMA (InFlight ─half─▶ HalfComplete) ──complete/error──▶ caller
//!                   │
//!                   └─abort─▶ Draining ──stream acknowledges──▶ caller
//! ```
//!
//! The start of a transfer and the publication of `Playing` happen in the
//! same critical section, so a completion or error interrupt for that
//! transfer always lands after the command's own transition.
//!
//! Every start gets a fresh [`TransferId`]. A stream that runs behind its
//! commands reports through the `*_for` entry points; events carrying the
//! id of a replaced transfer are ignored. While the stream is suspended
//! (output paused) the DMA engine does not progress, so completion and
//! half-transfer events are counted as spurious.
//!
//! # Example
//!
//! ```
//! use playback::{OutputStatus, PlaybackState};
//!
//! static STATUS: OutputStatus = OutputStatus::new();
//! assert_eq!(STATUS.state(), PlaybackState::Inactive);
//! ```

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use platform::{AbortCompletion, DmaInterruptFlags, TransferId, TransferRequest};

use crate::state::{PlaybackState, TransferPhase};

/// Snapshot of everything [`OutputStatus`] tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusSnapshot {
    /// Current lifecycle state.
    pub state: PlaybackState,
    /// Codec bring-up has succeeded at least once.
    pub hardware_ready: bool,
    /// Buffer ownership / progress of the current transfer.
    pub phase: TransferPhase,
    /// Id of the most recently started transfer.
    pub transfer: TransferId,
    /// The stream is held at its position while the output is paused.
    pub stream_suspended: bool,
    /// Transfers that ran to completion.
    pub completed_transfers: u32,
    /// Half-transfer events.
    pub half_transfers: u32,
    /// Transfers that ended in a DMA error.
    pub transfer_errors: u32,
    /// Events that arrived while no transfer was in flight.
    pub spurious_events: u32,
}

impl StatusSnapshot {
    const INITIAL: Self = Self {
        state: PlaybackState::Inactive,
        hardware_ready: false,
        phase: TransferPhase::Idle,
        transfer: TransferId::UNASSIGNED,
        stream_suspended: false,
        completed_transfers: 0,
        half_transfers: 0,
        transfer_errors: 0,
        spurious_events: 0,
    };
}

/// Interrupt-safe playback state, bring-up latch and transfer bookkeeping.
///
/// Place one in a `static` and hand `&'static OutputStatus` to both the
/// [`AudioOutput`](crate::AudioOutput) and the DMA completion path.
pub struct OutputStatus {
    inner: Mutex<CriticalSectionRawMutex, Cell<StatusSnapshot>>,
}

impl OutputStatus {
    /// `Inactive`, latch unset, no transfer.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(StatusSnapshot::INITIAL)),
        }
    }

    /// Run `f` on the status inside the critical section and store the result.
    fn update<R>(&self, f: impl FnOnce(&mut StatusSnapshot) -> R) -> R {
        self.inner.lock(|cell| {
            let mut status = cell.get();
            let result = f(&mut status);
            cell.set(status);
            result
        })
    }

    /// Consistent copy of the whole status.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.lock(Cell::get)
    }

    /// Current state. Safe from interrupt context.
    pub fn state(&self) -> PlaybackState {
        self.snapshot().state
    }

    /// Codec bring-up has succeeded.
    pub fn is_hardware_ready(&self) -> bool {
        self.snapshot().hardware_ready
    }

    /// Phase of the current transfer.
    pub fn transfer_phase(&self) -> TransferPhase {
        self.snapshot().phase
    }

    /// `true` while the DMA engine owns the last played buffer.
    pub fn dma_owns_buffer(&self) -> bool {
        self.transfer_phase().dma_owns_buffer()
    }

    /// Id of the most recently started transfer.
    pub fn current_transfer(&self) -> TransferId {
        self.snapshot().transfer
    }

    /// `true` while the stream is held by a pause.
    pub fn is_stream_suspended(&self) -> bool {
        self.snapshot().stream_suspended
    }

    /// Transfers that ran to completion.
    pub fn completed_transfers(&self) -> u32 {
        self.snapshot().completed_transfers
    }

    /// Half-transfer events.
    pub fn half_transfers(&self) -> u32 {
        self.snapshot().half_transfers
    }

    /// Transfers that ended in a DMA error.
    pub fn transfer_errors(&self) -> u32 {
        self.snapshot().transfer_errors
    }

    /// Events received with no transfer in flight.
    pub fn spurious_events(&self) -> u32 {
        self.snapshot().spurious_events
    }

    // ── Interrupt entry points ──────────────────────────────────────────────

    /// TCIF: the DMA engine has read the whole buffer and returns it.
    ///
    /// The state stays `Playing`; the USB layer supplies the next buffer
    /// with another Play.
    pub fn on_transfer_complete(&self) {
        self.complete(None);
    }

    /// Transfer `id` has been played to the end.
    pub fn on_transfer_complete_for(&self, id: TransferId) {
        self.complete(Some(id));
    }

    /// HTIF: the DMA engine has passed the middle of the buffer.
    pub fn on_half_transfer(&self) {
        self.half(None);
    }

    /// Transfer `id` has passed the middle of its buffer.
    pub fn on_half_transfer_for(&self, id: TransferId) {
        self.half(Some(id));
    }

    /// TEIF / FEIF / DMEIF: the transfer is dead and the buffer returns to
    /// the caller. Forces `Error`.
    pub fn on_transfer_error(&self) {
        self.error(None);
    }

    /// Transfer `id` failed on the bus.
    pub fn on_transfer_error_for(&self, id: TransferId) {
        self.error(Some(id));
    }

    /// The stream has stopped reading the buffer of aborted transfer `id`.
    ///
    /// Only needed for streams whose abort is
    /// [`AbortCompletion::Deferred`]. Acknowledgements for a transfer that
    /// has since been replaced are ignored.
    pub fn on_transfer_aborted(&self, id: TransferId) {
        self.update(|s| {
            if s.transfer == id && s.phase == TransferPhase::Draining {
                s.phase = TransferPhase::Idle;
            }
        });
    }

    /// Dispatch decoded stream flags. Errors win over completion; half
    /// transfer is handled before completion when both are pending.
    pub fn on_dma_interrupt(&self, flags: DmaInterruptFlags) {
        if flags.is_error() {
            self.on_transfer_error();
            return;
        }
        if flags.half_transfer {
            self.on_half_transfer();
        }
        if flags.transfer_complete {
            self.on_transfer_complete();
        }
    }

    fn complete(&self, id: Option<TransferId>) {
        self.update(|s| {
            if !s.is_current(id) {
                s.spurious_events = s.spurious_events.wrapping_add(1);
                return;
            }
            match s.phase {
                TransferPhase::InFlight | TransferPhase::HalfComplete if !s.stream_suspended => {
                    s.phase = TransferPhase::Idle;
                    s.completed_transfers = s.completed_transfers.wrapping_add(1);
                }
                // Played out before the stream saw the abort.
                TransferPhase::Draining => {
                    s.phase = TransferPhase::Idle;
                    s.completed_transfers = s.completed_transfers.wrapping_add(1);
                }
                _ => s.spurious_events = s.spurious_events.wrapping_add(1),
            }
        });
    }

    fn half(&self, id: Option<TransferId>) {
        self.update(|s| match s.phase {
            TransferPhase::InFlight | TransferPhase::HalfComplete
                if s.is_current(id) && !s.stream_suspended =>
            {
                s.phase = TransferPhase::HalfComplete;
                s.half_transfers = s.half_transfers.wrapping_add(1);
            }
            _ => s.spurious_events = s.spurious_events.wrapping_add(1),
        });
    }

    fn error(&self, id: Option<TransferId>) {
        let faulted = self.update(|s| {
            if !s.is_current(id) || !s.phase.dma_owns_buffer() {
                s.spurious_events = s.spurious_events.wrapping_add(1);
                return false;
            }
            let draining = s.phase == TransferPhase::Draining;
            s.phase = TransferPhase::Idle;
            s.stream_suspended = false;
            s.transfer_errors = s.transfer_errors.wrapping_add(1);
            // An aborted transfer can only end; the state has moved on.
            if !draining {
                s.state = PlaybackState::Error;
            }
            !draining
        });
        #[cfg(feature = "defmt")]
        if faulted {
            defmt::error!("audio: DMA transfer error, output faulted");
        }
        #[cfg(not(feature = "defmt"))]
        let _ = faulted;
    }

    // ── Transitions used by AudioOutput ─────────────────────────────────────

    /// Unconditionally enter `state`.
    pub(crate) fn set_state(&self, state: PlaybackState) {
        self.update(|s| s.state = state);
    }

    /// Record a hardware fault.
    pub(crate) fn fault(&self) {
        self.set_state(PlaybackState::Error);
    }

    /// Set the bring-up latch.
    pub(crate) fn mark_hardware_ready(&self) {
        self.update(|s| s.hardware_ready = true);
    }

    /// Tag `transfer` with a fresh id, start it with `start` and publish
    /// `Playing` in one critical section, provided the state is still
    /// `expected`.
    ///
    /// `start` is not called when the state has moved. A start failure
    /// publishes `Error`.
    pub(crate) fn begin_transfer<E>(
        &self,
        expected: PlaybackState,
        transfer: TransferRequest,
        start: impl FnOnce(TransferRequest) -> Result<(), E>,
    ) -> Result<TransferRequest, TransferStartError<E>> {
        self.update(|s| {
            if s.state != expected {
                return Err(TransferStartError::Preempted(s.state));
            }
            let id = s.transfer.next();
            let tagged = transfer.with_id(id);
            s.transfer = id;
            s.stream_suspended = false;
            match start(tagged) {
                Ok(()) => {
                    s.phase = TransferPhase::InFlight;
                    s.state = PlaybackState::Playing;
                    Ok(tagged)
                }
                Err(err) => {
                    s.phase = TransferPhase::Idle;
                    s.state = PlaybackState::Error;
                    Err(TransferStartError::Start(err))
                }
            }
        })
    }

    /// Abort the current transfer with `abort` and, if the state is still
    /// `expected`, publish `next`, all in one critical section.
    ///
    /// `abort` always runs, even when an interrupt moved the state.
    pub(crate) fn end_transfer(
        &self,
        expected: PlaybackState,
        next: PlaybackState,
        abort: impl FnOnce() -> AbortCompletion,
    ) -> Result<(), PlaybackState> {
        self.update(|s| {
            let completion = abort();
            s.after_abort(completion);
            s.compare_and_set(expected, next)
        })
    }

    /// Abort the current transfer, if any, leaving the state alone.
    pub(crate) fn abort_transfer(&self, abort: impl FnOnce() -> AbortCompletion) {
        self.update(|s| {
            if s.phase.dma_owns_buffer() {
                s.after_abort(abort());
            }
        });
    }

    /// Abort the current transfer, if any, and publish `next`.
    ///
    /// `abort` is called only when the DMA engine owns a buffer.
    pub(crate) fn reset_transfer(
        &self,
        next: PlaybackState,
        abort: impl FnOnce() -> AbortCompletion,
    ) {
        self.update(|s| {
            if s.phase.dma_owns_buffer() {
                s.after_abort(abort());
            }
            s.state = next;
        });
    }

    /// Publish `from → to` and hold a running transfer with `pause`, in one
    /// critical section. The transfer phase and position are kept.
    pub(crate) fn suspend_transfer(
        &self,
        from: PlaybackState,
        to: PlaybackState,
        pause: impl FnOnce(),
    ) -> Result<(), PlaybackState> {
        self.update(|s| {
            s.compare_and_set(from, to)?;
            if matches!(s.phase, TransferPhase::InFlight | TransferPhase::HalfComplete) {
                pause();
                s.stream_suspended = true;
            }
            Ok(())
        })
    }

    /// Publish `from → to` and release a suspended transfer with `resume`,
    /// in one critical section.
    pub(crate) fn resume_transfer(
        &self,
        from: PlaybackState,
        to: PlaybackState,
        resume: impl FnOnce(),
    ) -> Result<(), PlaybackState> {
        self.update(|s| {
            s.compare_and_set(from, to)?;
            if s.stream_suspended {
                resume();
                s.stream_suspended = false;
            }
            Ok(())
        })
    }
}

impl StatusSnapshot {
    /// `id` names the current transfer; `None` (raw interrupt path) always does.
    fn is_current(&self, id: Option<TransferId>) -> bool {
        id.map_or(true, |id| id == self.transfer)
    }

    fn compare_and_set(&mut self, from: PlaybackState, to: PlaybackState) -> Result<(), PlaybackState> {
        if self.state == from {
            self.state = to;
            Ok(())
        } else {
            Err(self.state)
        }
    }

    fn after_abort(&mut self, completion: AbortCompletion) {
        self.stream_suspended = false;
        if self.phase.dma_owns_buffer() {
            self.phase = match completion {
                AbortCompletion::Immediate => TransferPhase::Idle,
                AbortCompletion::Deferred => TransferPhase::Draining,
            };
        }
    }
}

impl Default for OutputStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Why [`OutputStatus::begin_transfer`] did not publish `Playing`.
#[derive(Debug)]
pub(crate) enum TransferStartError<E> {
    /// The state moved before the transfer could start.
    Preempted(PlaybackState),
    /// The DMA stream refused the transfer.
    Start(E),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use platform::AudioBuffer;

    use super::*;

    static FRAME: [u16; 96] = [0; 96];

    fn transfer() -> TransferRequest {
        TransferRequest::new(AudioBuffer::from_samples(&FRAME)).unwrap()
    }

    fn start(status: &OutputStatus, from: PlaybackState) -> TransferId {
        status
            .begin_transfer::<()>(from, transfer(), |_| Ok(()))
            .unwrap()
            .id()
    }

    fn playing() -> OutputStatus {
        let status = OutputStatus::new();
        status.set_state(PlaybackState::Active);
        start(&status, PlaybackState::Active);
        status
    }

    #[test]
    fn test_starts_inactive_and_idle() {
        let status = OutputStatus::new();
        assert_eq!(status.snapshot(), StatusSnapshot::INITIAL);
    }

    #[test]
    fn test_begin_transfer_publishes_playing() {
        let status = playing();
        assert_eq!(status.state(), PlaybackState::Playing);
        assert!(status.dma_owns_buffer());
    }

    #[test]
    fn test_begin_transfer_skips_start_when_preempted() {
        let status = OutputStatus::new();
        status.set_state(PlaybackState::Error);
        let mut started = false;
        let result = status.begin_transfer::<()>(PlaybackState::Active, transfer(), |_| {
            started = true;
            Ok(())
        });
        assert!(matches!(
            result,
            Err(TransferStartError::Preempted(PlaybackState::Error))
        ));
        assert!(!started);
    }

    #[test]
    fn test_begin_transfer_failure_is_error() {
        let status = OutputStatus::new();
        status.set_state(PlaybackState::Active);
        let result = status.begin_transfer(PlaybackState::Active, transfer(), |_| Err(()));
        assert!(matches!(result, Err(TransferStartError::Start(()))));
        assert_eq!(status.state(), PlaybackState::Error);
        assert!(!status.dma_owns_buffer());
    }

    #[test]
    fn test_complete_returns_buffer_and_keeps_playing() {
        let status = playing();
        status.on_transfer_complete();
        assert_eq!(status.state(), PlaybackState::Playing);
        assert!(!status.dma_owns_buffer());
        assert_eq!(status.completed_transfers(), 1);
    }

    #[test]
    fn test_half_transfer_only_counts() {
        let status = playing();
        status.on_half_transfer();
        assert_eq!(status.transfer_phase(), TransferPhase::HalfComplete);
        assert_eq!(status.state(), PlaybackState::Playing);
        assert_eq!(status.half_transfers(), 1);
    }

    #[test]
    fn test_transfer_error_forces_error() {
        let status = playing();
        status.on_transfer_error();
        assert_eq!(status.state(), PlaybackState::Error);
        assert!(!status.dma_owns_buffer());
        assert_eq!(status.transfer_errors(), 1);
    }

    #[test]
    fn test_events_without_transfer_are_spurious() {
        let status = OutputStatus::new();
        status.set_state(PlaybackState::Stopped);
        status.on_transfer_complete();
        status.on_half_transfer();
        status.on_transfer_error();
        assert_eq!(status.state(), PlaybackState::Stopped);
        assert_eq!(status.spurious_events(), 3);
        assert_eq!(status.completed_transfers(), 0);
    }

    #[test]
    fn test_dma_interrupt_error_wins_over_complete() {
        let status = playing();
        status.on_dma_interrupt(DmaInterruptFlags {
            transfer_complete: true,
            fifo_error: true,
            ..DmaInterruptFlags::default()
        });
        assert_eq!(status.state(), PlaybackState::Error);
        assert_eq!(status.completed_transfers(), 0);
        assert_eq!(status.transfer_errors(), 1);
    }

    #[test]
    fn test_dma_interrupt_half_then_complete() {
        let status = playing();
        status.on_dma_interrupt(DmaInterruptFlags {
            transfer_complete: true,
            half_transfer: true,
            ..DmaInterruptFlags::default()
        });
        assert_eq!(status.half_transfers(), 1);
        assert_eq!(status.completed_transfers(), 1);
        assert_eq!(status.transfer_phase(), TransferPhase::Idle);
    }

    #[test]
    fn test_end_transfer_reports_preemption() {
        let status = playing();
        status.on_transfer_error();
        let mut aborted = false;
        let result = status.end_transfer(PlaybackState::Playing, PlaybackState::Stopped, || {
            aborted = true;
            AbortCompletion::Immediate
        });
        assert_eq!(result, Err(PlaybackState::Error));
        assert!(aborted);
        assert_eq!(status.state(), PlaybackState::Error);
    }

    #[test]
    fn test_reset_transfer_aborts_only_in_flight() {
        let status = OutputStatus::new();
        let mut aborts = 0;
        status.reset_transfer(PlaybackState::Inactive, || {
            aborts += 1;
            AbortCompletion::Immediate
        });
        assert_eq!(aborts, 0);
        let status = playing();
        status.reset_transfer(PlaybackState::Inactive, || {
            aborts += 1;
            AbortCompletion::Immediate
        });
        assert_eq!(aborts, 1);
        assert_eq!(status.state(), PlaybackState::Inactive);
    }

    #[test]
    fn test_suspend_and_resume_are_compare_and_set() {
        let status = OutputStatus::new();
        status.set_state(PlaybackState::Playing);
        assert_eq!(
            status.suspend_transfer(PlaybackState::Playing, PlaybackState::Paused, || {}),
            Ok(())
        );
        assert_eq!(
            status.suspend_transfer(PlaybackState::Playing, PlaybackState::Paused, || {}),
            Err(PlaybackState::Paused)
        );
        assert_eq!(
            status.resume_transfer(PlaybackState::Stopped, PlaybackState::Playing, || {}),
            Err(PlaybackState::Paused)
        );
    }

    #[test]
    fn test_each_start_gets_a_fresh_id() {
        let status = playing();
        let first = status.current_transfer();
        let second = start(&status, PlaybackState::Playing);
        assert_ne!(first, second);
        assert_eq!(status.current_transfer(), second);
    }

    #[test]
    fn test_events_of_a_replaced_transfer_are_ignored() {
        let status = playing();
        let old = status.current_transfer();
        start(&status, PlaybackState::Playing);

        status.on_transfer_complete_for(old);
        status.on_transfer_error_for(old);
        assert_eq!(status.state(), PlaybackState::Playing);
        assert!(status.dma_owns_buffer());
        assert_eq!(status.completed_transfers(), 0);
        assert_eq!(status.transfer_errors(), 0);
        assert_eq!(status.spurious_events(), 2);

        status.on_transfer_complete_for(status.current_transfer());
        assert!(!status.dma_owns_buffer());
        assert_eq!(status.completed_transfers(), 1);
    }

    #[test]
    fn test_deferred_abort_keeps_buffer_until_acknowledged() {
        let status = playing();
        let id = status.current_transfer();
        status
            .end_transfer(PlaybackState::Playing, PlaybackState::Stopped, || {
                AbortCompletion::Deferred
            })
            .unwrap();
        assert_eq!(status.state(), PlaybackState::Stopped);
        assert_eq!(status.transfer_phase(), TransferPhase::Draining);
        assert!(status.dma_owns_buffer());

        status.on_transfer_aborted(id.next());
        assert!(status.dma_owns_buffer(), "acknowledgement for another transfer");

        status.on_transfer_aborted(id);
        assert_eq!(status.transfer_phase(), TransferPhase::Idle);
    }

    #[test]
    fn test_error_while_draining_returns_buffer_without_fault() {
        let status = playing();
        status.reset_transfer(PlaybackState::Inactive, || AbortCompletion::Deferred);
        status.on_transfer_error_for(status.current_transfer());
        assert_eq!(status.state(), PlaybackState::Inactive);
        assert!(!status.dma_owns_buffer());
        assert_eq!(status.transfer_errors(), 1);
    }

    #[test]
    fn test_suspended_transfer_does_not_complete() {
        let status = playing();
        let mut paused = false;
        status
            .suspend_transfer(PlaybackState::Playing, PlaybackState::Paused, || paused = true)
            .unwrap();
        assert!(paused);
        assert!(status.is_stream_suspended());

        status.on_half_transfer();
        status.on_transfer_complete();
        assert_eq!(status.transfer_phase(), TransferPhase::InFlight);
        assert_eq!(status.completed_transfers(), 0);
        assert_eq!(status.spurious_events(), 2);

        let mut resumed = false;
        status
            .resume_transfer(PlaybackState::Paused, PlaybackState::Playing, || resumed = true)
            .unwrap();
        assert!(resumed);
        assert!(!status.is_stream_suspended());
        status.on_transfer_complete();
        assert_eq!(status.completed_transfers(), 1);
    }

    #[test]
    fn test_suspend_without_transfer_leaves_stream_alone() {
        let status = playing();
        status.on_transfer_complete();
        let mut paused = false;
        status
            .suspend_transfer(PlaybackState::Playing, PlaybackState::Paused, || paused = true)
            .unwrap();
        assert!(!paused);
        assert!(!status.is_stream_suspended());
    }

    #[test]
    fn test_error_while_suspended_still_faults() {
        let status = playing();
        status
            .suspend_transfer(PlaybackState::Playing, PlaybackState::Paused, || {})
            .unwrap();
        status.on_transfer_error();
        assert_eq!(status.state(), PlaybackState::Error);
        assert!(!status.is_stream_suspended());
    }
}
