//! Mock implementations for testing
//!
//! This module provides mock implementations of the platform traits for use
//! in unit and integration tests. Both mocks record every call and can be
//! told to fail specific operations, which is how hardware faults are
//! simulated.

#![cfg(any(test, feature = "std"))]
#![allow(clippy::arithmetic_side_effects)] // call counters in test doubles

use crate::*;

/// Error returned by the mocks when a failure was injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectedFault;

/// Codec operation selector for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CodecOp {
    /// [`CodecDriver::init`]
    Init = 1 << 0,
    /// [`CodecDriver::deinit`]
    Deinit = 1 << 1,
    /// [`CodecDriver::play`]
    Play = 1 << 2,
    /// [`CodecDriver::pause`]
    Pause = 1 << 3,
    /// [`CodecDriver::resume`]
    Resume = 1 << 4,
    /// [`CodecDriver::stop`]
    Stop = 1 << 5,
    /// [`CodecDriver::set_volume`]
    SetVolume = 1 << 6,
    /// [`CodecDriver::set_mute`]
    SetMute = 1 << 7,
}

/// One recorded codec call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecCall {
    /// `init(output, volume, frequency)`
    Init(OutputDevice, VolumePercent, SampleRateHz),
    /// `deinit()`
    Deinit,
    /// `play()`
    Play,
    /// `pause()`
    Pause,
    /// `resume()`
    Resume,
    /// `stop(mode)`
    Stop(PowerDownMode),
    /// `set_volume(level)`
    SetVolume(VolumeLevel),
    /// `set_mute(state)`
    SetMute(MuteState),
}

impl CodecCall {
    fn op(&self) -> CodecOp {
        match self {
            Self::Init(..) => CodecOp::Init,
            Self::Deinit => CodecOp::Deinit,
            Self::Play => CodecOp::Play,
            Self::Pause => CodecOp::Pause,
            Self::Resume => CodecOp::Resume,
            Self::Stop(_) => CodecOp::Stop,
            Self::SetVolume(_) => CodecOp::SetVolume,
            Self::SetMute(_) => CodecOp::SetMute,
        }
    }
}

/// Mock codec — records all calls for test assertions.
pub struct MockCodec {
    calls: heapless::Vec<CodecCall, 64>,
    fail_always: u8,
    fail_once: u8,
    /// Last level set via [`CodecDriver::set_volume`].
    pub volume: Option<VolumeLevel>,
    /// Last mute state set via [`CodecDriver::set_mute`].
    pub mute: MuteState,
    /// Whether the output stage is powered (init/play/resume vs stop/pause).
    pub powered: bool,
}

impl MockCodec {
    /// Create a new mock codec that accepts every call.
    pub fn new() -> Self {
        Self {
            calls: heapless::Vec::new(),
            fail_always: 0,
            fail_once: 0,
            volume: None,
            mute: MuteState::Unmuted,
            powered: false,
        }
    }

    /// Make every future call of `op` fail until [`clear_faults`](Self::clear_faults).
    pub fn fail_on(&mut self, op: CodecOp) {
        self.fail_always |= op as u8;
    }

    /// Make only the next call of `op` fail.
    pub fn fail_next(&mut self, op: CodecOp) {
        self.fail_once |= op as u8;
    }

    /// Remove every injected failure.
    pub fn clear_faults(&mut self) {
        self.fail_always = 0;
        self.fail_once = 0;
    }

    /// All calls in order (capped at 64 entries).
    pub fn calls(&self) -> &[CodecCall] {
        &self.calls
    }

    /// Number of calls of `op`.
    pub fn count(&self, op: CodecOp) -> usize {
        self.calls.iter().filter(|call| call.op() == op).count()
    }

    /// Forget recorded calls, keeping injected faults.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: CodecCall) -> Result<(), InjectedFault> {
        let _ = self.calls.push(call);
        let bit = call.op() as u8;
        if self.fail_once & bit != 0 {
            self.fail_once &= !bit;
            return Err(InjectedFault);
        }
        if self.fail_always & bit != 0 {
            return Err(InjectedFault);
        }
        Ok(())
    }
}

impl Default for MockCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecDriver for MockCodec {
    type Error = InjectedFault;

    fn init(
        &mut self,
        output: OutputDevice,
        volume: VolumePercent,
        frequency: SampleRateHz,
    ) -> Result<(), Self::Error> {
        self.record(CodecCall::Init(output, volume, frequency))?;
        self.volume = Some(VolumeLevel::from_percent(volume));
        self.powered = true;
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        self.record(CodecCall::Deinit)?;
        self.powered = false;
        Ok(())
    }

    fn play(&mut self) -> Result<(), Self::Error> {
        self.record(CodecCall::Play)?;
        self.powered = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), Self::Error> {
        self.record(CodecCall::Pause)?;
        self.powered = false;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), Self::Error> {
        self.record(CodecCall::Resume)?;
        self.powered = true;
        Ok(())
    }

    fn stop(&mut self, mode: PowerDownMode) -> Result<(), Self::Error> {
        self.record(CodecCall::Stop(mode))?;
        self.powered = false;
        Ok(())
    }

    fn set_volume(&mut self, level: VolumeLevel) -> Result<(), Self::Error> {
        self.record(CodecCall::SetVolume(level))?;
        self.volume = Some(level);
        Ok(())
    }

    fn set_mute(&mut self, mute: MuteState) -> Result<(), Self::Error> {
        self.record(CodecCall::SetMute(mute))?;
        self.mute = mute;
        Ok(())
    }
}

/// Mock DMA stream — records started transfers, aborts and pauses.
///
/// `finish` stands in for the hardware reaching the end of the buffer; a
/// paused stream does not progress, so it never finishes.
pub struct MockDma {
    started: heapless::Vec<TransferRequest, 32>,
    active: Option<TransferRequest>,
    aborts: usize,
    paused: bool,
    fail_start: bool,
    defer_aborts: bool,
}

impl MockDma {
    /// Create a new idle mock stream.
    pub fn new() -> Self {
        Self {
            started: heapless::Vec::new(),
            active: None,
            aborts: 0,
            paused: false,
            fail_start: false,
            defer_aborts: false,
        }
    }

    /// Make every future `start` fail (or succeed again with `false`).
    pub fn fail_start(&mut self, fail: bool) {
        self.fail_start = fail;
    }

    /// Report aborts as [`AbortCompletion::Deferred`], the way a stream
    /// serviced by a task does.
    pub fn defer_aborts(&mut self, defer: bool) {
        self.defer_aborts = defer;
    }

    /// Every transfer passed to `start`, in order (capped at 32 entries).
    pub fn started(&self) -> &[TransferRequest] {
        &self.started
    }

    /// Number of `start` calls that reached the stream.
    pub fn start_count(&self) -> usize {
        self.started.len()
    }

    /// Transfer currently programmed into the stream.
    pub fn active(&self) -> Option<TransferRequest> {
        self.active
    }

    /// Number of `abort` calls.
    pub fn abort_count(&self) -> usize {
        self.aborts
    }

    /// `true` between `pause` and `resume`.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Simulate the hardware finishing the active transfer. Returns `None`
    /// while paused.
    pub fn finish(&mut self) -> Option<TransferRequest> {
        if self.paused {
            return None;
        }
        self.active.take()
    }

    /// Simulate a bus error killing the active transfer, paused or not.
    pub fn fault(&mut self) -> Option<TransferRequest> {
        self.paused = false;
        self.active.take()
    }
}

impl Default for MockDma {
    fn default() -> Self {
        Self::new()
    }
}

impl DmaStream for MockDma {
    type Error = InjectedFault;

    fn start(&mut self, transfer: TransferRequest) -> Result<(), Self::Error> {
        if self.fail_start {
            return Err(InjectedFault);
        }
        let _ = self.started.push(transfer);
        self.active = Some(transfer);
        self.paused = false;
        Ok(())
    }

    fn abort(&mut self) -> AbortCompletion {
        self.aborts += 1;
        self.active = None;
        self.paused = false;
        if self.defer_aborts {
            AbortCompletion::Deferred
        } else {
            AbortCompletion::Immediate
        }
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    static SAMPLES: [u16; 32] = [0; 32];

    #[test]
    fn test_mock_codec_records_calls_in_order() {
        let mut codec = MockCodec::new();
        codec
            .init(OutputDevice::Auto, VolumePercent::new(70), SampleRateHz::HZ_48000)
            .unwrap();
        codec.pause().unwrap();
        codec.resume().unwrap();
        assert_eq!(
            codec.calls(),
            &[
                CodecCall::Init(OutputDevice::Auto, VolumePercent::new(70), SampleRateHz::HZ_48000),
                CodecCall::Pause,
                CodecCall::Resume,
            ]
        );
    }

    #[test]
    fn test_mock_codec_fail_next_is_one_shot() {
        let mut codec = MockCodec::new();
        codec.fail_next(CodecOp::SetVolume);
        assert_eq!(codec.set_volume(VolumeLevel::MAX), Err(InjectedFault));
        assert_eq!(codec.set_volume(VolumeLevel::MAX), Ok(()));
        assert_eq!(codec.count(CodecOp::SetVolume), 2);
    }

    #[test]
    fn test_mock_codec_fail_on_persists_until_cleared() {
        let mut codec = MockCodec::new();
        codec.fail_on(CodecOp::Stop);
        assert!(codec.stop(PowerDownMode::Software).is_err());
        assert!(codec.stop(PowerDownMode::Software).is_err());
        codec.clear_faults();
        assert!(codec.stop(PowerDownMode::Software).is_ok());
    }

    #[test]
    fn test_mock_dma_tracks_active_transfer() {
        let mut dma = MockDma::new();
        let transfer = TransferRequest::new(AudioBuffer::from_samples(&SAMPLES)).unwrap();
        dma.start(transfer).unwrap();
        assert_eq!(dma.active(), Some(transfer));
        assert_eq!(dma.abort(), AbortCompletion::Immediate);
        assert_eq!(dma.active(), None);
        assert_eq!(dma.abort_count(), 1);
        assert_eq!(dma.start_count(), 1);
    }

    #[test]
    fn test_mock_dma_fail_start() {
        let mut dma = MockDma::new();
        dma.fail_start(true);
        let transfer = TransferRequest::new(AudioBuffer::from_samples(&SAMPLES)).unwrap();
        assert_eq!(dma.start(transfer), Err(InjectedFault));
        assert_eq!(dma.start_count(), 0);
    }

    #[test]
    fn test_mock_dma_does_not_finish_while_paused() {
        let mut dma = MockDma::new();
        let transfer = TransferRequest::new(AudioBuffer::from_samples(&SAMPLES)).unwrap();
        dma.start(transfer).unwrap();
        dma.pause();
        assert_eq!(dma.finish(), None);
        assert_eq!(dma.active(), Some(transfer));
        dma.resume();
        assert_eq!(dma.finish(), Some(transfer));
    }

    #[test]
    fn test_mock_dma_deferred_abort() {
        let mut dma = MockDma::new();
        dma.defer_aborts(true);
        assert_eq!(dma.abort(), AbortCompletion::Deferred);
    }
}
