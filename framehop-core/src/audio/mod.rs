//! Audio frame carriers.
//!
//! `AudioBuffer` is the unit that flows through every pipeline stage: an
//! ordered run of mono `f32` samples, the stream position of its first frame,
//! and the `AudioFormat` it was produced in. The windowing logic copies and
//! forwards format metadata but never interprets it.

#[cfg(feature = "wav")]
pub mod wav;

#[cfg(feature = "wav")]
pub use wav::WavSource;

use serde::{Deserialize, Serialize};

/// Sample format metadata carried alongside every buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFormat {
    /// Sample rate in Hz (e.g. 16000, 44100, 48000).
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub signed: bool,
    pub big_endian: bool,
}

impl AudioFormat {
    /// Mono, 32-bit signed, little-endian at `sample_rate`.
    pub fn mono_f32(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
            bits_per_sample: 32,
            signed: true,
            big_endian: false,
        }
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::mono_f32(44_100)
    }
}

/// A contiguous block of mono PCM samples starting at a known frame.
///
/// Immutable once built. Stages that need different samples build a new
/// buffer (see [`AudioBuffer::derive`]).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    frame_number: u64,
    samples: Vec<f32>,
    format: AudioFormat,
}

impl AudioBuffer {
    pub fn new(frame_number: u64, samples: Vec<f32>, format: AudioFormat) -> Self {
        Self {
            frame_number,
            samples,
            format,
        }
    }

    /// Build a buffer with the same format as `self` but different content.
    pub fn derive(&self, frame_number: u64, samples: Vec<f32>) -> Self {
        Self::new(frame_number, samples, self.format)
    }

    /// Stream position of the first sample in this buffer.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the duration of this buffer in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.format.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.format.sample_rate as f64
    }

    /// Stream time of the first sample, in seconds.
    pub fn time_position_secs(&self) -> f64 {
        if self.format.sample_rate == 0 {
            return 0.0;
        }
        self.frame_number as f64 / self.format.sample_rate as f64
    }
}
