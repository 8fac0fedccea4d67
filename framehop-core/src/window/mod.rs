//! `SlidingWindow`: fixed-length, constant-hop framing of a sample stream.
//!
//! ## Modes
//!
//! ```text
//! pull:  read() ─► window ready? ── yes ─► copy [cursor, cursor+slice), cursor += hop
//!                      │
//!                      no ─► upstream.read() ─► append ─► (repeat)
//!                                 │
//!                                 None ─► Ok(None), tail dropped
//!
//! push:  process(buf) ─► append ─► while window ready: sink.process(copy), cursor += hop
//!        flush()      ─► while tail non-empty: sink.process(tail + zeros), cursor += hop
//! ```
//!
//! Both modes run over one `SampleAccumulator`, so the same stream produces
//! the same windows whether it is pulled or pushed, and however it is chunked.
//!
//! ## Reset
//!
//! With an upstream connected and `EvictionPolicy::Replay`, `reset()` only
//! rewinds the cursor: the upstream is not touched and the next `read()`
//! calls replay the same windows from retained samples. In every other case
//! `reset()` discards the accumulation (and, for `Bounded` pull mode, resets
//! the upstream).
//!
//! Without an upstream there is nothing to replay, so push mode always drops
//! consumed samples regardless of the policy.

pub mod config;
pub mod stats;

pub use config::{EvictionPolicy, WindowConfig, WindowSettings};
pub use stats::WindowStats;

use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::{debug, info, warn};

use crate::audio::AudioBuffer;
use crate::buffering::SampleAccumulator;
use crate::error::{FramehopError, Result};
use crate::signal::{SignalSink, SignalSource};

/// Slices a stream of `AudioBuffer`s into overlapping analysis windows.
///
/// Equality and hashing depend on the [`WindowConfig`] alone, never on
/// buffered data, cursor position or wiring.
pub struct SlidingWindow {
    config: WindowConfig,
    policy: EvictionPolicy,
    acc: SampleAccumulator,
    source: Option<Box<dyn SignalSource>>,
    sink: Option<Box<dyn SignalSink>>,
    /// Upstream has returned end-of-stream; it is not polled again until
    /// the accumulation is discarded.
    source_exhausted: bool,
    flushed: bool,
    stats: WindowStats,
}

impl SlidingWindow {
    /// # Errors
    /// Returns `FramehopError::InvalidConfig` if either length is zero.
    pub fn new(slice_length: usize, hop_size: usize) -> Result<Self> {
        Ok(Self::with_config(WindowConfig::new(slice_length, hop_size)?))
    }

    pub fn with_config(config: WindowConfig) -> Self {
        Self {
            config,
            policy: EvictionPolicy::default(),
            acc: SampleAccumulator::new(),
            source: None,
            sink: None,
            source_exhausted: false,
            flushed: false,
            stats: WindowStats::default(),
        }
    }

    /// Build from file settings (geometry plus eviction policy).
    pub fn from_settings(settings: &WindowSettings) -> Result<Self> {
        Ok(Self::with_config(settings.window_config()?).with_policy(settings.eviction))
    }

    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder form of [`SlidingWindow::connect_source`].
    pub fn with_source<S: SignalSource + 'static>(mut self, source: S) -> Self {
        self.connect_source(source);
        self
    }

    /// Builder form of [`SlidingWindow::connect_sink`].
    pub fn with_sink<K: SignalSink + 'static>(mut self, sink: K) -> Self {
        self.connect_sink(sink);
        self
    }

    /// Wire a pull-mode upstream, replacing any previous one.
    ///
    /// Anything accumulated from the previous upstream is discarded.
    pub fn connect_source<S: SignalSource + 'static>(&mut self, source: S) {
        if self.source.replace(Box::new(source)).is_some() {
            debug!("replacing upstream source");
        }
        self.acc.clear();
        self.source_exhausted = false;
        self.flushed = false;
        info!(config = %self.config, "upstream source connected");
    }

    /// Wire a push-mode downstream, replacing any previous one.
    pub fn connect_sink<K: SignalSink + 'static>(&mut self, sink: K) {
        if self.sink.replace(Box::new(sink)).is_some() {
            debug!("replacing downstream sink");
        }
        info!(config = %self.config, "downstream sink connected");
    }

    /// Detach and return the downstream sink.
    pub fn take_sink(&mut self) -> Option<Box<dyn SignalSink>> {
        self.sink.take()
    }

    pub fn config(&self) -> WindowConfig {
        self.config
    }

    pub fn slice_length(&self) -> usize {
        self.config.slice_length()
    }

    pub fn hop_size(&self) -> usize {
        self.config.hop_size()
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn stats(&self) -> WindowStats {
        self.stats
    }

    /// Zero the counters returned by [`SlidingWindow::stats`].
    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }

    /// Samples currently held in memory.
    pub fn buffered_frames(&self) -> usize {
        self.acc.retained()
    }

    /// Absolute stream index of the next window start.
    pub fn cursor(&self) -> usize {
        self.acc.cursor()
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    /// Pull the next window from the connected upstream.
    ///
    /// Returns `Ok(None)` once the upstream is exhausted and no full window
    /// remains. A trailing partial window is dropped, never padded.
    ///
    /// # Errors
    /// `NoSource` without an upstream. Upstream errors are returned as-is;
    /// the cursor does not move and samples pulled before the failure stay
    /// buffered, so calling `read()` again resumes where it left off.
    pub fn read(&mut self) -> Result<Option<AudioBuffer>> {
        if self.source.is_none() {
            return Err(FramehopError::NoSource);
        }

        loop {
            if let Some(window) = self.next_window() {
                return Ok(Some(window));
            }
            if self.source_exhausted {
                return Ok(None);
            }

            let source = self.source.as_mut().ok_or(FramehopError::NoSource)?;
            match source.read()? {
                Some(buffer) => self.accept(&buffer),
                None => {
                    self.source_exhausted = true;
                    debug!(
                        frames = self.acc.end(),
                        dropped_tail = self.acc.available(),
                        "upstream exhausted"
                    );
                }
            }
        }
    }

    /// Push one buffer in and forward every window it completes downstream.
    ///
    /// # Errors
    /// - `Flushed` after `flush()` until `reset()`.
    /// - `NoSink` if the buffer would complete a window and no sink is
    ///   connected; the buffer is not appended.
    /// - Any error from the sink, after which the windows already forwarded
    ///   stay consumed.
    pub fn process(&mut self, buffer: AudioBuffer) -> Result<()> {
        if self.flushed {
            return Err(FramehopError::Flushed);
        }
        let completes_window =
            self.acc.cursor() + self.config.slice_length() <= self.acc.end() + buffer.len();
        if self.sink.is_none() && completes_window {
            return Err(FramehopError::NoSink);
        }

        self.accept(&buffer);

        let mut emitted = 0usize;
        while let Some(window) = self.next_window() {
            let sink = self.sink.as_mut().ok_or(FramehopError::NoSink)?;
            sink.process(window)?;
            emitted += 1;
        }

        if emitted > 0 {
            debug!(emitted, cursor = self.acc.cursor(), "windows forwarded");
        }
        Ok(())
    }

    /// End of input: forward the buffered tail as zero-padded windows, one
    /// per remaining hop start, then flush the sink.
    ///
    /// A second `flush()` is a no-op.
    ///
    /// # Errors
    /// `NoSink` if tail data is buffered and no sink is connected; errors
    /// from the sink are returned as-is.
    pub fn flush(&mut self) -> Result<()> {
        if self.flushed {
            return Ok(());
        }
        if self.sink.is_none() && !self.acc.tail().is_empty() {
            return Err(FramehopError::NoSink);
        }

        let slice = self.config.slice_length();
        let format = self.acc.format().unwrap_or_default();
        let mut padded = 0usize;

        while !self.acc.tail().is_empty() {
            let tail = self.acc.tail();
            let take = tail.len().min(slice);
            let mut samples = vec![0f32; slice];
            samples[..take].copy_from_slice(&tail[..take]);

            let window = AudioBuffer::new(self.acc.cursor_frame(), samples, format);
            self.acc.advance(self.config.hop_size());
            self.stats.windows_emitted += 1;
            self.stats.padded_windows += 1;

            let sink = self.sink.as_mut().ok_or(FramehopError::NoSink)?;
            sink.process(window)?;
            padded += 1;
        }

        self.flushed = true;
        if let Some(sink) = self.sink.as_mut() {
            sink.flush()?;
        }

        info!(padded, total = self.stats.windows_emitted, "flushed");
        Ok(())
    }

    /// Return to the initial emission state. Idempotent.
    ///
    /// See the module docs for how pull and push modes differ.
    pub fn reset(&mut self) -> Result<()> {
        match (self.source.as_mut(), self.policy) {
            (Some(_), EvictionPolicy::Replay) => {
                if !self.acc.rewind() {
                    warn!(evicted = self.acc.evicted(), "replay starts after evicted frames");
                }
                debug!(frames = self.acc.end(), "rewound for replay");
            }
            (Some(source), EvictionPolicy::Bounded) => {
                source.reset()?;
                self.acc.clear();
                self.source_exhausted = false;
                debug!("accumulation cleared, upstream reset");
            }
            (None, _) => {
                self.acc.clear();
                debug!("accumulation cleared");
            }
        }
        self.flushed = false;
        Ok(())
    }

    fn accept(&mut self, buffer: &AudioBuffer) {
        self.stats.buffers_in += 1;
        self.stats.frames_in += buffer.len();
        if let Some(previous) = self.acc.append(buffer) {
            let current = buffer.format();
            warn!(
                from_rate = previous.sample_rate,
                to_rate = current.sample_rate,
                from_channels = previous.channels,
                to_channels = current.channels,
                "input format changed mid-stream; windows take the latest format"
            );
        }
    }

    /// Only a pull stage replaying under `EvictionPolicy::Replay` keeps
    /// consumed samples; push-mode `reset()` discards them anyway.
    fn evicts(&self) -> bool {
        self.policy == EvictionPolicy::Bounded || self.source.is_none()
    }

    /// Copy out the full window at the cursor, if there is one, and advance.
    fn next_window(&mut self) -> Option<AudioBuffer> {
        let slice = self.config.slice_length();
        let samples = self.acc.window(slice)?.to_vec();
        let frame_number = self.acc.cursor_frame();
        let format = self.acc.format().unwrap_or_default();

        self.acc.advance(self.config.hop_size());
        self.stats.windows_emitted += 1;
        if self.evicts() {
            self.stats.frames_evicted += self.acc.evict_consumed(slice);
        }

        Some(AudioBuffer::new(frame_number, samples, format))
    }
}

impl Default for SlidingWindow {
    /// 1024-frame slices with a 512-frame hop.
    fn default() -> Self {
        Self::with_config(WindowConfig::default())
    }
}

impl SignalSource for SlidingWindow {
    fn read(&mut self) -> Result<Option<AudioBuffer>> {
        SlidingWindow::read(self)
    }

    fn reset(&mut self) -> Result<()> {
        SlidingWindow::reset(self)
    }
}

impl SignalSink for SlidingWindow {
    fn process(&mut self, buffer: AudioBuffer) -> Result<()> {
        SlidingWindow::process(self, buffer)
    }

    fn flush(&mut self) -> Result<()> {
        SlidingWindow::flush(self)
    }

    fn reset(&mut self) -> Result<()> {
        SlidingWindow::reset(self)
    }
}

impl PartialEq for SlidingWindow {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
    }
}

impl Eq for SlidingWindow {}

impl Hash for SlidingWindow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.config.hash(state);
    }
}

impl fmt::Debug for SlidingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlidingWindow")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .field("cursor", &self.acc.cursor())
            .field("buffered", &self.acc.retained())
            .field("has_source", &self.source.is_some())
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioFormat;
    use crate::signal::{BufferSource, Collector, NullSource};
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn format() -> AudioFormat {
        AudioFormat::mono_f32(10_000)
    }

    fn ramp(start: usize, len: usize) -> AudioBuffer {
        let samples = (start..start + len).map(|i| i as f32).collect();
        AudioBuffer::new(start as u64, samples, format())
    }

    fn hash_of(window: &SlidingWindow) -> u64 {
        let mut hasher = DefaultHasher::new();
        window.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn zero_lengths_fail_construction() {
        assert!(matches!(
            SlidingWindow::new(0, 1),
            Err(FramehopError::InvalidConfig { .. })
        ));
        assert!(SlidingWindow::new(1, 0).is_err());
    }

    #[test]
    fn default_is_1024_by_512() {
        let window = SlidingWindow::default();
        assert_eq!(window.slice_length(), 1024);
        assert_eq!(window.hop_size(), 512);
        assert_eq!(window.policy(), EvictionPolicy::Replay);
    }

    #[test]
    fn read_without_source_fails_fast() {
        let mut window = SlidingWindow::new(4, 2).unwrap();
        assert!(matches!(window.read(), Err(FramehopError::NoSource)));
    }

    #[test]
    fn null_source_reads_none_immediately() {
        let mut window = SlidingWindow::default().with_source(NullSource);
        assert!(window.read().unwrap().is_none());
        assert!(window.read().unwrap().is_none());
    }

    #[test]
    fn process_without_sink_fails_only_when_window_is_ready() {
        let mut window = SlidingWindow::new(4, 2).unwrap();
        window.process(ramp(0, 3)).unwrap();
        assert_eq!(window.buffered_frames(), 3);

        let err = window.process(ramp(3, 3)).unwrap_err();
        assert!(matches!(err, FramehopError::NoSink));
        assert_eq!(window.buffered_frames(), 3, "rejected buffer must not be appended");
    }

    #[test]
    fn window_frame_numbers_follow_the_stream() {
        let (collector, handle) = Collector::new();
        let mut window = SlidingWindow::new(4, 3).unwrap().with_sink(collector);
        window
            .process(AudioBuffer::new(500, vec![0.0, 1.0, 2.0, 3.0, 4.0], format()))
            .unwrap();
        window.process(AudioBuffer::new(505, vec![5.0, 6.0, 7.0], format())).unwrap();

        let frames: Vec<u64> = handle.buffers().iter().map(|b| b.frame_number()).collect();
        assert_eq!(frames, vec![500, 503]);
    }

    #[test]
    fn format_change_uses_latest_format() {
        let (collector, handle) = Collector::new();
        let mut window = SlidingWindow::new(6, 6).unwrap().with_sink(collector);
        window.process(ramp(0, 4)).unwrap();
        window
            .process(AudioBuffer::new(4, vec![4.0, 5.0], AudioFormat::mono_f32(20_000)))
            .unwrap();

        let out = handle.buffers();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].format().sample_rate, 20_000);
        assert_eq!(out[0].samples(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn hop_longer_than_slice_skips_samples() {
        let mut window = SlidingWindow::new(2, 5)
            .unwrap()
            .with_source(BufferSource::new([ramp(0, 12)]));
        let mut starts = Vec::new();
        while let Some(w) = window.read().unwrap() {
            assert_eq!(w.len(), 2);
            starts.push(w.samples()[0]);
        }
        assert_eq!(starts, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn flush_with_empty_tail_emits_nothing() {
        let (collector, handle) = Collector::new();
        let mut window = SlidingWindow::new(4, 4).unwrap().with_sink(collector);
        window.process(ramp(0, 8)).unwrap();
        assert_eq!(handle.len(), 2);

        window.flush().unwrap();
        assert_eq!(handle.len(), 2);
        assert_eq!(handle.flush_count(), 1);
        assert_eq!(window.stats().padded_windows, 0);
    }

    #[test]
    fn flush_without_sink_and_empty_tail_is_ok() {
        let mut window = SlidingWindow::new(4, 2).unwrap();
        window.flush().unwrap();
        assert!(window.is_flushed());
    }

    #[test]
    fn flush_without_sink_and_tail_fails() {
        let mut window = SlidingWindow::new(4, 2).unwrap();
        window.process(ramp(0, 2)).unwrap();
        assert!(matches!(window.flush(), Err(FramehopError::NoSink)));
        assert!(!window.is_flushed());
    }

    #[test]
    fn second_flush_is_noop() {
        let (collector, handle) = Collector::new();
        let mut window = SlidingWindow::new(4, 4).unwrap().with_sink(collector);
        window.process(ramp(0, 2)).unwrap();
        window.flush().unwrap();
        window.flush().unwrap();
        assert_eq!(handle.len(), 1);
        assert_eq!(handle.flush_count(), 1);
    }

    #[test]
    fn process_after_flush_requires_reset() {
        let (collector, handle) = Collector::new();
        let mut window = SlidingWindow::new(2, 2).unwrap().with_sink(collector);
        window.process(ramp(0, 3)).unwrap();
        window.flush().unwrap();
        assert!(matches!(window.process(ramp(3, 2)), Err(FramehopError::Flushed)));

        window.reset().unwrap();
        window.process(ramp(0, 2)).unwrap();
        assert_eq!(handle.samples().last().unwrap(), &vec![0.0, 1.0]);
    }

    #[test]
    fn push_reset_starts_from_empty() {
        let (collector, handle) = Collector::new();
        let mut window = SlidingWindow::new(3, 3).unwrap().with_sink(collector);
        window.process(ramp(0, 2)).unwrap();
        window.reset().unwrap();
        window.reset().unwrap();
        assert_eq!(window.buffered_frames(), 0);
        assert_eq!(window.cursor(), 0);

        window.process(ramp(100, 3)).unwrap();
        assert_eq!(handle.samples(), vec![vec![100.0, 101.0, 102.0]]);
        assert_eq!(handle.buffers()[0].frame_number(), 100);
    }

    #[test]
    fn bounded_policy_evicts_consumed_frames() {
        let (collector, handle) = Collector::new();
        let mut window = SlidingWindow::new(64, 32)
            .unwrap()
            .with_policy(EvictionPolicy::Bounded)
            .with_sink(collector);

        for i in 0..100 {
            window.process(ramp(i * 100, 100)).unwrap();
            assert!(
                window.buffered_frames() < 128,
                "buffered={} after chunk {i}",
                window.buffered_frames()
            );
        }

        let stats = window.stats();
        assert!(stats.frames_evicted > 9_000, "evicted={}", stats.frames_evicted);
        assert_eq!(stats.frames_in, 10_000);
        assert_eq!(handle.len(), (10_000 - 64) / 32 + 1);
    }

    #[test]
    fn default_push_mode_stays_bounded() {
        let (collector, handle) = Collector::new();
        let mut window = SlidingWindow::new(1024, 512).unwrap().with_sink(collector);
        assert_eq!(window.policy(), EvictionPolicy::Replay);

        for _ in 0..1_000 {
            window.process(AudioBuffer::new(0, vec![0.0; 4096], format())).unwrap();
            assert!(
                window.buffered_frames() < 2 * 1024 + 4096,
                "buffered={}",
                window.buffered_frames()
            );
        }
        assert_eq!(handle.len(), (4_096_000 - 1024) / 512 + 1);
        assert!(window.stats().frames_evicted > 4_000_000);
    }

    #[test]
    fn replay_pull_mode_keeps_consumed_frames() {
        let mut window = SlidingWindow::new(4, 4)
            .unwrap()
            .with_source(BufferSource::new([ramp(0, 16)]));
        while window.read().unwrap().is_some() {}
        assert_eq!(window.buffered_frames(), 16);
        assert_eq!(window.stats().frames_evicted, 0);
    }

    #[test]
    fn clear_stats_zeroes_window_counters() {
        let (collector, _handle) = Collector::new();
        let mut window = SlidingWindow::new(2, 2).unwrap().with_sink(collector);
        window.process(ramp(0, 4)).unwrap();
        assert_eq!(window.stats().windows_emitted, 2);

        window.clear_stats();
        assert_eq!(window.stats(), WindowStats::default());
    }

    #[test]
    fn bounded_pull_reset_resets_upstream() {
        struct Replayable {
            served: bool,
            resets: usize,
        }
        impl SignalSource for Replayable {
            fn read(&mut self) -> Result<Option<AudioBuffer>> {
                if self.served {
                    return Ok(None);
                }
                self.served = true;
                Ok(Some(ramp(0, 8)))
            }
            fn reset(&mut self) -> Result<()> {
                self.served = false;
                self.resets += 1;
                Ok(())
            }
        }

        let mut window = SlidingWindow::new(4, 4)
            .unwrap()
            .with_policy(EvictionPolicy::Bounded)
            .with_source(Replayable {
                served: false,
                resets: 0,
            });

        let first: Vec<_> = std::iter::from_fn(|| window.read().unwrap()).collect();
        window.reset().unwrap();
        let second: Vec<_> = std::iter::from_fn(|| window.read().unwrap()).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn stats_track_flow() {
        let (collector, _handle) = Collector::new();
        let mut window = SlidingWindow::new(4, 2).unwrap().with_sink(collector);
        window.process(ramp(0, 5)).unwrap();
        window.process(ramp(5, 1)).unwrap();
        window.flush().unwrap();

        let stats = window.stats();
        assert_eq!(stats.buffers_in, 2);
        assert_eq!(stats.frames_in, 6);
        // full windows at 0 and 2, padded at 4
        assert_eq!(stats.windows_emitted, 3);
        assert_eq!(stats.padded_windows, 1);
    }

    #[test]
    fn equality_ignores_runtime_state() {
        let mut busy = SlidingWindow::new(12, 34).unwrap().with_source(NullSource);
        let _ = busy.read().unwrap();
        let idle = SlidingWindow::new(12, 34).unwrap().with_policy(EvictionPolicy::Bounded);
        let other = SlidingWindow::new(12, 36).unwrap();

        assert_eq!(busy, idle);
        assert_eq!(hash_of(&busy), hash_of(&idle));
        assert_ne!(busy, other);
        assert_ne!(hash_of(&busy), hash_of(&other));

        let mut set = HashSet::new();
        set.insert(busy);
        assert!(!set.insert(idle));
        assert!(set.insert(other));
    }
}
