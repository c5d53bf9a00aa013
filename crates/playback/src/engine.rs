//! Audio output state machine.
//!
//! `AudioOutput` turns USB class-layer commands into codec and DMA calls
//! and keeps [`OutputStatus`] consistent while DMA events arrive from
//! interrupt context.
//!
//! It owns the codec and the DMA stream; only the task that holds the
//! `AudioOutput` issues commands. Interrupts write the shared status and
//! nothing else.
//!
//! # Transitions
//!
//! | Command | From                        | To        | Hardware                         |
//! |---------|-----------------------------|-----------|----------------------------------|
//! | Play    | `Playing`                   | `Playing` | DMA restart                      |
//! | Play    | `Active`, `Stopped`         | `Playing` | codec play, DMA start            |
//! | Play    | `Paused`                    | `Playing` | codec resume, DMA resume         |
//! | Resume  | `Paused`                    | `Playing` | codec resume, DMA resume         |
//! | Pause   | `Playing`                   | `Paused`  | codec pause, DMA pause           |
//! | Stop    | `Playing`                   | `Stopped` | codec stop (software), DMA abort |
//! | any     | `Inactive`, `Error`         | `Error`   | none                             |
//!
//! Everything else is a sequencing error and leaves the state alone. A
//! failed hardware call moves to `Error`.
//!
//! Deinitialize keeps the codec configured and a later Initialize skips
//! bring-up, so the codec may still be powered down or in power save from
//! the previous session when output starts from `Active`. Play therefore
//! powers it up from `Active` as well as from `Stopped`.
//!
//! # Codec calls and interrupts
//!
//! Codec writes are slow and run outside the critical section. Their
//! result is published with a compare-and-set against the state the
//! command started from; if a DMA error moved the state to `Error` in the
//! meantime, the command fails with [`AudioError::Preempted`] and `Error`
//! stays.

use platform::{
    CodecDriver, DmaStream, MuteState, OutputDevice, PowerDownMode, SampleRateHz,
    TransferRequest, VolumeLevel, VolumePercent,
};

use crate::command::{AudioCommand, PlaybackRequest};
use crate::error::{AudioError, HardwareOp};
use crate::state::PlaybackState;
use crate::status::{OutputStatus, TransferStartError};

/// Audio output state machine over a codec `C` and a DMA stream `D`.
pub struct AudioOutput<'a, C, D> {
    status: &'a OutputStatus,
    codec: C,
    dma: D,
    routing: OutputDevice,
}

impl<'a, C, D> AudioOutput<'a, C, D>
where
    C: CodecDriver,
    D: DmaStream,
{
    /// Wire the state machine to its shared status and hardware.
    ///
    /// `routing` is the board's analog output, passed to the codec at
    /// bring-up.
    pub fn new(status: &'a OutputStatus, codec: C, dma: D, routing: OutputDevice) -> Self {
        Self {
            status,
            codec,
            dma,
            routing,
        }
    }

    /// Bring the output to `Active`.
    ///
    /// The codec is initialized only the first time this succeeds; later
    /// calls reactivate without touching codec registers. A failed bring-up
    /// leaves the latch unset, so the next call retries it. A transfer still
    /// in flight is aborted.
    ///
    /// # Errors
    ///
    /// [`AudioError::Codec`]`(Init)` if bring-up fails; the state is `Error`.
    pub fn initialize(
        &mut self,
        frequency: SampleRateHz,
        volume: VolumePercent,
    ) -> Result<(), AudioError> {
        let dma = &mut self.dma;
        self.status.abort_transfer(|| dma.abort());

        if !self.status.is_hardware_ready() {
            if let Err(_err) = self.codec.init(self.routing, volume, frequency) {
                #[cfg(feature = "defmt")]
                defmt::error!("audio: codec bring-up failed: {}", defmt::Debug2Format(&_err));
                self.status.fault();
                return Err(AudioError::Codec(HardwareOp::Init));
            }
            self.status.mark_hardware_ready();
            #[cfg(feature = "defmt")]
            defmt::info!(
                "audio: codec up ({} Hz, {}%)",
                frequency.get(),
                volume.get()
            );
        }

        self.status.set_state(PlaybackState::Active);
        Ok(())
    }

    /// Return to `Inactive`. Always succeeds.
    ///
    /// The codec stays configured (the bring-up latch is kept); a transfer in
    /// flight is aborted and its buffer returned.
    pub fn deinitialize(&mut self) {
        let dma = &mut self.dma;
        self.status
            .reset_transfer(PlaybackState::Inactive, || dma.abort());
    }

    /// Execute a playback command.
    ///
    /// # Errors
    ///
    /// - [`AudioError::InvalidState`] when `Inactive` or `Error` (state
    ///   becomes `Error`), checked before the tag is decoded
    /// - [`AudioError::UnknownCommand`] for an unrecognised tag
    /// - [`AudioError::NotPermitted`] when the command does not apply to the
    ///   current state
    /// - [`AudioError::EmptyBuffer`] / [`AudioError::MisalignedBuffer`] for
    ///   a Play buffer the DMA engine cannot take
    /// - hardware errors (state becomes `Error`)
    pub fn command(&mut self, request: PlaybackRequest) -> Result<(), AudioError> {
        let state = self.status.state();
        if state.rejects_commands() {
            self.status.fault();
            #[cfg(feature = "defmt")]
            defmt::warn!("audio: command {} rejected in {}", request.code(), state);
            return Err(AudioError::InvalidState(state));
        }

        let command = request.code().decode()?;
        match (command, state) {
            (AudioCommand::Play | AudioCommand::Resume, PlaybackState::Paused) => {
                self.resume_output()
            }
            (
                AudioCommand::Play,
                PlaybackState::Active | PlaybackState::Playing | PlaybackState::Stopped,
            ) => self.start_transfer(state, request),
            (AudioCommand::Pause, PlaybackState::Playing) => self.pause_output(),
            (AudioCommand::Stop, PlaybackState::Playing) => self.stop_output(),
            (command, state) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("audio: {} not permitted in {}", command, state);
                Err(AudioError::NotPermitted { command, state })
            }
        }
    }

    /// Forward a codec-scale volume in any state.
    ///
    /// # Errors
    ///
    /// [`AudioError::Codec`]`(SetVolume)`; the state is `Error`.
    pub fn set_volume(&mut self, level: VolumeLevel) -> Result<(), AudioError> {
        self.codec_call(HardwareOp::SetVolume, |codec| codec.set_volume(level))
    }

    /// Forward a mute change in any state.
    ///
    /// # Errors
    ///
    /// [`AudioError::Codec`]`(SetMute)`; the state is `Error`.
    pub fn set_mute(&mut self, mute: MuteState) -> Result<(), AudioError> {
        self.codec_call(HardwareOp::SetMute, |codec| codec.set_mute(mute))
    }

    /// Periodic bookkeeping hook, called once per USB frame. Reserved.
    #[allow(clippy::unnecessary_wraps, clippy::unused_self)]
    pub fn periodic_tick(&mut self, _cmd: u8) -> Result<(), AudioError> {
        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.status.state()
    }

    /// Shared status this output publishes to.
    pub fn status(&self) -> &'a OutputStatus {
        self.status
    }

    /// Output routing passed to the codec at bring-up.
    pub fn routing(&self) -> OutputDevice {
        self.routing
    }

    /// Codec, for inspection.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Codec, for fault injection in tests and board bring-up.
    pub fn codec_mut(&mut self) -> &mut C {
        &mut self.codec
    }

    /// DMA stream, for inspection.
    pub fn dma(&self) -> &D {
        &self.dma
    }

    /// DMA stream, for fault injection in tests.
    pub fn dma_mut(&mut self) -> &mut D {
        &mut self.dma
    }

    /// Deinitialize, power the codec down and hand back the hardware along
    /// with the result of the codec power-down.
    pub fn release(mut self) -> (C, D, Result<(), C::Error>) {
        let dma = &mut self.dma;
        self.status
            .reset_transfer(PlaybackState::Inactive, || dma.abort());
        let result = self.codec.deinit();
        (self.codec, self.dma, result)
    }

    // ── Command paths ───────────────────────────────────────────────────────

    /// Play from `Active`, `Playing` or `Stopped`.
    fn start_transfer(
        &mut self,
        from: PlaybackState,
        request: PlaybackRequest,
    ) -> Result<(), AudioError> {
        let transfer = TransferRequest::new(request.buffer()).map_err(AudioError::from)?;

        if matches!(from, PlaybackState::Active | PlaybackState::Stopped) {
            if let Err(_err) = self.codec.play() {
                #[cfg(feature = "defmt")]
                defmt::error!("audio: codec play failed: {}", defmt::Debug2Format(&_err));
                self.status.fault();
                return Err(AudioError::Codec(HardwareOp::Play));
            }
        }

        let dma = &mut self.dma;
        match self.status.begin_transfer(from, transfer, |tagged| dma.start(tagged)) {
            Ok(_started) => {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "audio: transfer {} of {} samples started",
                    _started.id().get(),
                    _started.samples()
                );
                Ok(())
            }
            Err(TransferStartError::Preempted(state)) => Err(AudioError::Preempted(state)),
            Err(TransferStartError::Start(_err)) => {
                #[cfg(feature = "defmt")]
                defmt::error!("audio: DMA start failed: {}", defmt::Debug2Format(&_err));
                Err(AudioError::DmaStart)
            }
        }
    }

    /// `Paused → Playing` via codec resume, then the held transfer
    /// continues from the position pause left. No new transfer starts.
    fn resume_output(&mut self) -> Result<(), AudioError> {
        self.codec_call(HardwareOp::Resume, C::resume)?;
        let dma = &mut self.dma;
        let result = self
            .status
            .resume_transfer(PlaybackState::Paused, PlaybackState::Playing, || dma.resume());
        Self::preempted(PlaybackState::Paused, PlaybackState::Playing, result)
    }

    /// `Playing → Paused` via codec pause; the running transfer is held at
    /// its position.
    fn pause_output(&mut self) -> Result<(), AudioError> {
        self.codec_call(HardwareOp::Pause, C::pause)?;
        let dma = &mut self.dma;
        let result = self
            .status
            .suspend_transfer(PlaybackState::Playing, PlaybackState::Paused, || dma.pause());
        Self::preempted(PlaybackState::Playing, PlaybackState::Paused, result)
    }

    /// `Playing → Stopped`: codec software power-down, then DMA abort.
    fn stop_output(&mut self) -> Result<(), AudioError> {
        self.codec_call(HardwareOp::Stop, |codec| codec.stop(PowerDownMode::Software))?;
        let dma = &mut self.dma;
        self.status
            .end_transfer(PlaybackState::Playing, PlaybackState::Stopped, || dma.abort())
            .map_err(AudioError::Preempted)
    }

    /// Run one codec operation; failure faults the output.
    fn codec_call(
        &mut self,
        op: HardwareOp,
        call: impl FnOnce(&mut C) -> Result<(), C::Error>,
    ) -> Result<(), AudioError> {
        call(&mut self.codec).map_err(|_err| {
            #[cfg(feature = "defmt")]
            defmt::error!("audio: codec {} failed: {}", op, defmt::Debug2Format(&_err));
            self.status.fault();
            AudioError::Codec(op)
        })
    }

    /// Map a lost compare-and-set on `from → to` to [`AudioError::Preempted`].
    fn preempted(
        _from: PlaybackState,
        _to: PlaybackState,
        result: Result<(), PlaybackState>,
    ) -> Result<(), AudioError> {
        result.map_err(|state| {
            #[cfg(feature = "defmt")]
            defmt::warn!("audio: {} -> {} preempted by {}", _from, _to, state);
            AudioError::Preempted(state)
        })
    }
}
