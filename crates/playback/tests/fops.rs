//! Raw function-table surface tests.
//!
//! Run with: cargo test -p playback --test fops
#![allow(clippy::unwrap_used)]

use platform::mocks::{CodecCall, CodecOp, MockCodec, MockDma};
use platform::{AudioBuffer, MuteState, OutputDevice, SampleRateHz, VolumeLevel, VolumePercent};
use playback::{AudioOutInterface, AudioOutput, OutputStatus, AUDIO_FAIL, AUDIO_OK};

static BUF: [u16; 1024] = [0; 1024];

const PLAY: u8 = 0x01;
const PAUSE: u8 = 0x02;
const RESUME: u8 = 0x03;
const STOP: u8 = 0x04;

fn output(status: &OutputStatus) -> AudioOutput<'_, MockCodec, MockDma> {
    AudioOutput::new(status, MockCodec::new(), MockDma::new(), OutputDevice::Auto)
}

#[test]
fn init_reports_ok_and_active_code() {
    let status = OutputStatus::new();
    let mut out = output(&status);
    assert_eq!(out.init(48_000, 70, 0), AUDIO_OK);
    assert_eq!(out.get_state(), 0x01);
}

#[test]
fn init_rejects_unsupported_frequency_without_state_change() {
    let status = OutputStatus::new();
    let mut out = output(&status);
    assert_eq!(out.init(192_000, 70, 0), AUDIO_FAIL);
    assert_eq!(out.get_state(), 0x00);
    assert!(out.codec().calls().is_empty());
}

#[test]
fn init_clamps_volume_to_100_percent() {
    let status = OutputStatus::new();
    let mut out = output(&status);
    assert_eq!(out.init(44_100, 250, 0), AUDIO_OK);
    assert_eq!(
        out.codec().calls(),
        &[CodecCall::Init(
            OutputDevice::Auto,
            VolumePercent::new(100),
            SampleRateHz::new(44_100).unwrap()
        )]
    );
}

#[test]
fn command_lifecycle_through_raw_codes() {
    let status = OutputStatus::new();
    let mut out = output(&status);
    out.init(48_000, 70, 0);
    let buffer = AudioBuffer::from_samples(&BUF);

    assert_eq!(out.audio_cmd(buffer, PLAY), AUDIO_OK);
    assert_eq!(out.get_state(), 0x02);
    assert_eq!(out.audio_cmd(AudioBuffer::empty(), PAUSE), AUDIO_OK);
    assert_eq!(out.get_state(), 0x03);
    assert_eq!(out.audio_cmd(AudioBuffer::empty(), RESUME), AUDIO_OK);
    assert_eq!(out.get_state(), 0x02);
    assert_eq!(out.audio_cmd(AudioBuffer::empty(), STOP), AUDIO_OK);
    assert_eq!(out.get_state(), 0x04);
    assert_eq!(out.audio_cmd(AudioBuffer::empty(), STOP), AUDIO_FAIL);
    assert_eq!(out.get_state(), 0x04);
}

#[test]
fn command_before_init_fails_and_reports_error_code() {
    let status = OutputStatus::new();
    let mut out = output(&status);
    assert_eq!(out.audio_cmd(AudioBuffer::from_samples(&BUF), PLAY), AUDIO_FAIL);
    assert_eq!(out.get_state(), 0x05);
}

#[test]
fn unknown_tag_fails() {
    let status = OutputStatus::new();
    let mut out = output(&status);
    out.init(48_000, 70, 0);
    assert_eq!(out.audio_cmd(AudioBuffer::from_samples(&BUF), 0x42), AUDIO_FAIL);
    assert_eq!(out.get_state(), 0x01);
}

#[test]
fn volume_ctl_forwards_codec_scale_level() {
    let status = OutputStatus::new();
    let mut out = output(&status);
    assert_eq!(out.volume_ctl(0xC8), AUDIO_OK);
    assert_eq!(out.codec().volume, Some(VolumeLevel::new(0xC8)));
}

#[test]
fn volume_ctl_failure_reports_error_state() {
    let status = OutputStatus::new();
    let mut out = output(&status);
    out.init(48_000, 70, 0);
    out.codec_mut().fail_next(CodecOp::SetVolume);
    assert_eq!(out.volume_ctl(0x20), AUDIO_FAIL);
    assert_eq!(out.get_state(), 0x05);
}

#[test]
fn mute_ctl_accepts_only_zero_and_one() {
    let status = OutputStatus::new();
    let mut out = output(&status);
    out.init(48_000, 70, 0);

    assert_eq!(out.mute_ctl(1), AUDIO_OK);
    assert_eq!(out.codec().mute, MuteState::Muted);
    assert_eq!(out.mute_ctl(0), AUDIO_OK);
    assert_eq!(out.codec().mute, MuteState::Unmuted);

    let calls = out.codec().calls().len();
    assert_eq!(out.mute_ctl(2), AUDIO_FAIL);
    assert_eq!(out.codec().calls().len(), calls);
    assert_eq!(out.get_state(), 0x01);
}

#[test]
fn deinit_and_periodic_always_ok() {
    let status = OutputStatus::new();
    let mut out = output(&status);
    assert_eq!(out.periodic_tc(0), AUDIO_OK);
    out.init(48_000, 70, 0);
    out.audio_cmd(AudioBuffer::from_samples(&BUF), PLAY);
    assert_eq!(out.deinit(0), AUDIO_OK);
    assert_eq!(out.get_state(), 0x00);
    assert_eq!(out.init(48_000, 70, 0), AUDIO_OK);
    assert_eq!(out.codec().count(CodecOp::Init), 1);
}
