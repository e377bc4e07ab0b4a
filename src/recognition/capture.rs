//! Microphone capture via `cpal` into a shared recording buffer.
//!
//! [`AudioCapture`] opens the default input device and feeds every hardware
//! buffer into a [`CaptureBuffer`]. Samples are only kept between
//! [`CaptureBuffer::begin`] and [`CaptureBuffer::finish`]; the rest of the
//! time the callback drops them. The returned [`StreamHandle`] is a RAII
//! guard: dropping it stops the stream.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use super::event::{RecognitionErrorKind, RecognitionEvent};

/// Sample rate Whisper expects.
pub const TARGET_RATE: u32 = 16_000;

/// Longest recording kept, in seconds.
const MAX_RECORDING_SECS: usize = 60;

// ---------------------------------------------------------------------------
// CaptureBuffer
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Inner {
    /// Mono samples at `sample_rate`.
    samples: Vec<f32>,
    sample_rate: u32,
    recording: bool,
    device_ready: bool,
}

/// Thread-shared recording buffer filled by the cpal callback.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Inner>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear previous audio and start keeping samples.
    pub fn begin(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.samples.clear();
        inner.recording = true;
    }

    /// Stop keeping samples and return the recording as 16 kHz mono.
    pub fn finish(&self) -> Vec<f32> {
        let (samples, rate) = {
            let mut inner = self.inner.lock().unwrap();
            inner.recording = false;
            (std::mem::take(&mut inner.samples), inner.sample_rate)
        };
        resample_to_16k(&samples, rate)
    }

    /// Stop keeping samples and drop what was recorded.
    pub fn discard(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.recording = false;
        inner.samples.clear();
    }

    pub fn is_recording(&self) -> bool {
        self.inner.lock().unwrap().recording
    }

    /// Whether a capture stream is feeding this buffer.
    pub fn device_ready(&self) -> bool {
        self.inner.lock().unwrap().device_ready
    }

    fn set_device_ready(&self, ready: bool) {
        self.inner.lock().unwrap().device_ready = ready;
    }

    /// Append one interleaved hardware buffer, if recording.
    pub fn push_interleaved(&self, data: &[f32], channels: u16, sample_rate: u32) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.recording {
            return;
        }
        inner.sample_rate = sample_rate;
        let room = (sample_rate as usize * MAX_RECORDING_SECS).saturating_sub(inner.samples.len());
        if room == 0 {
            return;
        }
        let mut mono = downmix(data, channels);
        mono.truncate(room);
        inner.samples.extend_from_slice(&mono);
    }
}

// ---------------------------------------------------------------------------
// Sample conversion
// ---------------------------------------------------------------------------

/// Average interleaved channels down to mono.
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Linear-interpolation resample from `source_rate` to 16 kHz.
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == TARGET_RATE || source_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = TARGET_RATE as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos as usize;
            let frac = (src_pos - idx as f64) as f32;
            match (samples.get(idx), samples.get(idx + 1)) {
                (Some(a), Some(b)) => a * (1.0 - frac) + b * frac,
                (Some(a), None) => *a,
                _ => 0.0,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// AudioCapture
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
pub struct StreamHandle {
    _stream: cpal::Stream,
    buffer: CaptureBuffer,
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.buffer.set_device_ready(false);
    }
}

/// Errors that can occur while setting up the audio capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// The default input device and its preferred stream configuration.
pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl AudioCapture {
    pub fn new() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;
        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;

        Ok(Self {
            device,
            config: supported.into(),
            sample_rate,
            channels,
        })
    }

    /// Start the stream, feeding `buffer`. Stream failures are reported on
    /// `events` as [`RecognitionErrorKind::AudioCapture`].
    pub fn start(
        &self,
        buffer: CaptureBuffer,
        events: UnboundedSender<RecognitionEvent>,
    ) -> Result<StreamHandle, CaptureError> {
        let sample_rate = self.sample_rate;
        let channels = self.channels;
        let feed = buffer.clone();

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                feed.push_interleaved(data, channels, sample_rate);
            },
            move |err: cpal::StreamError| {
                log::error!("capture: cpal stream error: {err}");
                let _ = events.send(RecognitionEvent::Error(RecognitionErrorKind::AudioCapture));
            },
            None,
        )?;

        stream.play()?;
        buffer.set_device_ready(true);
        Ok(StreamHandle {
            _stream: stream,
            buffer,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_ignored_unless_recording() {
        let buf = CaptureBuffer::new();
        buf.push_interleaved(&[0.5; 32], 1, TARGET_RATE);
        buf.begin();
        assert!(buf.is_recording());
        assert!(buf.finish().is_empty());
        assert!(!buf.is_recording());
    }

    #[test]
    fn finish_returns_16k_mono() {
        let buf = CaptureBuffer::new();
        buf.begin();
        // 10 ms of 48 kHz stereo.
        buf.push_interleaved(&[0.25; 960], 2, 48_000);
        let audio = buf.finish();
        assert_eq!(audio.len(), 160);
        assert!(audio.iter().all(|s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn begin_clears_previous_recording() {
        let buf = CaptureBuffer::new();
        buf.begin();
        buf.push_interleaved(&[0.1; 100], 1, TARGET_RATE);
        buf.begin();
        buf.push_interleaved(&[0.1; 10], 1, TARGET_RATE);
        assert_eq!(buf.finish().len(), 10);
    }

    #[test]
    fn discard_drops_audio() {
        let buf = CaptureBuffer::new();
        buf.begin();
        buf.push_interleaved(&[0.1; 100], 1, TARGET_RATE);
        buf.discard();
        assert!(!buf.is_recording());
        assert!(buf.finish().is_empty());
    }

    #[test]
    fn recording_is_capped() {
        let buf = CaptureBuffer::new();
        buf.begin();
        let second = vec![0.0; 1_000];
        for _ in 0..(MAX_RECORDING_SECS + 5) {
            buf.push_interleaved(&second, 1, 1_000);
        }
        assert_eq!(buf.finish().len(), MAX_RECORDING_SECS * TARGET_RATE as usize);
    }

    #[test]
    fn no_device_until_stream_starts() {
        assert!(!CaptureBuffer::new().device_ready());
    }

    #[test]
    fn downmix_averages_frames() {
        assert_eq!(downmix(&[1.0, -1.0, 0.5, 0.5], 2), vec![0.0, 0.5]);
        assert_eq!(downmix(&[0.1, 0.2], 1), vec![0.1, 0.2]);
        assert!(downmix(&[1.0], 0).is_empty());
    }

    #[test]
    fn resample_lengths() {
        assert_eq!(resample_to_16k(&[0.5; 480], 48_000).len(), 160);
        assert_eq!(resample_to_16k(&[0.5; 160], TARGET_RATE).len(), 160);
        let out = resample_to_16k(&vec![0.0; 44_100], 44_100);
        assert!(out.len().abs_diff(16_000) <= 1);
    }
}
