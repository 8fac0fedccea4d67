//! WAV file source backed by `hound`.
//!
//! Multi-channel files are averaged down to mono as they are read; integer
//! PCM is scaled to `[-1.0, 1.0)`. The file is seekable, so unlike most
//! sources `reset()` really does rewind.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec};
use tracing::{debug, info};

use crate::audio::{AudioBuffer, AudioFormat};
use crate::error::Result;
use crate::signal::SignalSource;

/// Reads a WAV file as a sequence of fixed-size mono buffers.
pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    spec: WavSpec,
    buffer_frames: usize,
    next_frame: u64,
}

impl WavSource {
    /// Open `path`, producing buffers of `buffer_frames` frames (the last one
    /// may be shorter).
    ///
    /// # Errors
    /// Returns `FramehopError::Wav` if the file is missing or not a valid WAV.
    pub fn open(path: impl AsRef<Path>, buffer_frames: usize) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        info!(
            path = %path.as_ref().display(),
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            bits = spec.bits_per_sample,
            frames = reader.duration(),
            "opened WAV source"
        );

        Ok(Self {
            reader,
            spec,
            buffer_frames: buffer_frames.max(1),
            next_frame: 0,
        })
    }

    /// Format of the buffers this source emits (always mono).
    pub fn format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: self.spec.sample_rate,
            channels: 1,
            bits_per_sample: self.spec.bits_per_sample,
            signed: !(self.spec.sample_format == SampleFormat::Int && self.spec.bits_per_sample == 8),
            big_endian: false,
        }
    }

    /// Channel count of the file itself, before mixdown.
    pub fn file_channels(&self) -> u16 {
        self.spec.channels
    }

    /// Total length of the file in frames.
    pub fn duration_frames(&self) -> u32 {
        self.reader.duration()
    }

    fn read_interleaved(&mut self, count: usize) -> Result<Vec<f32>> {
        let samples = match self.spec.sample_format {
            SampleFormat::Float => self
                .reader
                .samples::<f32>()
                .take(count)
                .collect::<std::result::Result<Vec<_>, _>>()?,
            SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (self.spec.bits_per_sample - 1)) as f32;
                self.reader
                    .samples::<i32>()
                    .take(count)
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(samples)
    }
}

impl SignalSource for WavSource {
    fn read(&mut self) -> Result<Option<AudioBuffer>> {
        let ch = self.spec.channels.max(1) as usize;
        let interleaved = self.read_interleaved(self.buffer_frames * ch)?;
        if interleaved.is_empty() {
            return Ok(None);
        }

        let samples: Vec<f32> = if ch == 1 {
            interleaved
        } else {
            interleaved
                .chunks_exact(ch)
                .map(|frame| frame.iter().sum::<f32>() / ch as f32)
                .collect()
        };

        let buffer = AudioBuffer::new(self.next_frame, samples, self.format());
        self.next_frame += buffer.len() as u64;
        Ok(Some(buffer))
    }

    fn reset(&mut self) -> Result<()> {
        self.reader.seek(0)?;
        self.next_frame = 0;
        debug!("WAV source rewound");
        Ok(())
    }
}
