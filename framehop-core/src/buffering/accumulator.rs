//! Growable sample store with a read cursor.
//!
//! Positions are absolute: frame `i` is the `i`-th sample appended since the
//! last `clear()`. Evicted frames are gone from memory but keep their index,
//! so the cursor never has to be rebased.
//!
//! ```text
//!   evicted          cursor                 end
//!      │               │                     │
//!      ▼               ▼                     ▼
//!  ────┬───────────────┬─────────────────────┐
//!  gone│ retained, dead│  tail (not yet used)│
//!  ────┴───────────────┴─────────────────────┘
//! ```

use crate::audio::{AudioBuffer, AudioFormat};

#[derive(Debug, Clone, Default)]
pub struct SampleAccumulator {
    samples: Vec<f32>,
    /// Absolute index of `samples[0]`.
    evicted: usize,
    /// Absolute index of the next window start. Always `>= evicted`; may run
    /// past `end()` when the hop is longer than the slice.
    cursor: usize,
    /// Frame number of the first buffer appended since the last clear.
    origin_frame: Option<u64>,
    /// Format of the most recently appended buffer.
    format: Option<AudioFormat>,
}

impl SampleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a buffer's samples. Returns the previous format when the new
    /// buffer's format differs from it.
    pub fn append(&mut self, buffer: &AudioBuffer) -> Option<AudioFormat> {
        if self.origin_frame.is_none() {
            self.origin_frame = Some(buffer.frame_number());
        }
        self.samples.extend_from_slice(buffer.samples());

        let incoming = buffer.format();
        let previous = self.format.replace(incoming);
        previous.filter(|p| *p != incoming)
    }

    /// Absolute index one past the last appended sample.
    pub fn end(&self) -> usize {
        self.evicted + self.samples.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Samples from the cursor to the end.
    pub fn available(&self) -> usize {
        self.end().saturating_sub(self.cursor)
    }

    /// Number of samples held in memory.
    pub fn retained(&self) -> usize {
        self.samples.len()
    }

    pub fn evicted(&self) -> usize {
        self.evicted
    }

    pub fn is_empty(&self) -> bool {
        self.end() == 0
    }

    pub fn format(&self) -> Option<AudioFormat> {
        self.format
    }

    /// Stream frame number of the sample under the cursor.
    pub fn cursor_frame(&self) -> u64 {
        self.origin_frame.unwrap_or(0) + self.cursor as u64
    }

    /// `true` when `[cursor, cursor + len)` has been fully appended.
    pub fn has_window(&self, len: usize) -> bool {
        self.cursor + len <= self.end()
    }

    /// The `len` samples starting at the cursor, if all are present.
    pub fn window(&self, len: usize) -> Option<&[f32]> {
        if !self.has_window(len) {
            return None;
        }
        let start = self.cursor - self.evicted;
        Some(&self.samples[start..start + len])
    }

    /// Everything from the cursor to the end (empty if the cursor is past it).
    pub fn tail(&self) -> &[f32] {
        if self.cursor >= self.end() {
            return &[];
        }
        &self.samples[self.cursor - self.evicted..]
    }

    pub fn advance(&mut self, hop: usize) {
        self.cursor += hop;
    }

    /// Move the cursor back to the oldest retained sample.
    ///
    /// Returns `false` if samples were evicted, i.e. the rewind does not
    /// reach the start of the stream.
    pub fn rewind(&mut self) -> bool {
        self.cursor = self.evicted;
        self.evicted == 0
    }

    /// Drop retained samples strictly before the cursor, but only once at
    /// least `min_batch` (at least one) of them have piled up. Returns how
    /// many were dropped.
    pub fn evict_consumed(&mut self, min_batch: usize) -> usize {
        let dead = self.cursor.min(self.end()) - self.evicted;
        if dead < min_batch.max(1) {
            return 0;
        }
        self.samples.drain(..dead);
        self.evicted += dead;
        dead
    }

    /// Back to the freshly constructed state.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.evicted = 0;
        self.cursor = 0;
        self.origin_frame = None;
        self.format = None;
    }
}
