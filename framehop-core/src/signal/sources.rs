//! In-memory sources.

use std::collections::VecDeque;

use crate::audio::AudioBuffer;
use crate::error::Result;
use crate::signal::SignalSource;

/// A source that is always at end-of-stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSource;

impl SignalSource for NullSource {
    fn read(&mut self) -> Result<Option<AudioBuffer>> {
        Ok(None)
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Single-use queue of buffers.
///
/// Each buffer is handed out once; `reset()` does not bring them back.
#[derive(Debug, Clone, Default)]
pub struct BufferSource {
    queue: VecDeque<AudioBuffer>,
}

impl BufferSource {
    pub fn new(buffers: impl IntoIterator<Item = AudioBuffer>) -> Self {
        Self {
            queue: buffers.into_iter().collect(),
        }
    }

    /// Number of buffers not yet read.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl SignalSource for BufferSource {
    fn read(&mut self) -> Result<Option<AudioBuffer>> {
        Ok(self.queue.pop_front())
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioFormat;

    #[test]
    fn null_source_is_empty() {
        let mut source = NullSource;
        assert!(source.read().unwrap().is_none());
        source.reset().unwrap();
        assert!(source.read().unwrap().is_none());
    }

    #[test]
    fn buffer_source_drains_once() {
        let format = AudioFormat::mono_f32(8_000);
        let mut source = BufferSource::new([
            AudioBuffer::new(0, vec![1.0], format),
            AudioBuffer::new(1, vec![2.0], format),
        ]);
        assert_eq!(source.remaining(), 2);
        assert_eq!(source.read().unwrap().unwrap().samples(), &[1.0]);
        assert_eq!(source.read().unwrap().unwrap().samples(), &[2.0]);
        assert!(source.read().unwrap().is_none());

        source.reset().unwrap();
        assert!(source.read().unwrap().is_none());
    }
}
