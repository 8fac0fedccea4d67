//! `Collector`: a terminal sink that keeps everything pushed into it.
//!
//! Once a sink is connected it is owned by the upstream stage, so the
//! collected buffers live behind a shared [`CollectorHandle`] the caller keeps.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::audio::AudioBuffer;
use crate::error::Result;
use crate::signal::SignalSink;

#[derive(Debug, Default)]
struct Collected {
    buffers: Vec<AudioBuffer>,
    flushes: usize,
}

/// Sink that records every buffer it receives.
#[derive(Debug, Default)]
pub struct Collector {
    inner: Arc<Mutex<Collected>>,
}

/// Read side of a [`Collector`], usable after the collector has been moved
/// into a pipeline.
///
/// Uses `parking_lot::Mutex` so a panicking stage never poisons the results.
#[derive(Debug, Clone)]
pub struct CollectorHandle {
    inner: Arc<Mutex<Collected>>,
}

impl Collector {
    pub fn new() -> (Self, CollectorHandle) {
        let inner = Arc::new(Mutex::new(Collected::default()));
        let handle = CollectorHandle {
            inner: Arc::clone(&inner),
        };
        (Self { inner }, handle)
    }
}

impl SignalSink for Collector {
    fn process(&mut self, buffer: AudioBuffer) -> Result<()> {
        self.inner.lock().buffers.push(buffer);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.lock().flushes += 1;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.buffers.clear();
        inner.flushes = 0;
        Ok(())
    }
}

impl CollectorHandle {
    /// Clone of every buffer received so far.
    pub fn buffers(&self) -> Vec<AudioBuffer> {
        self.inner.lock().buffers.clone()
    }

    /// Sample vectors only, in arrival order.
    pub fn samples(&self) -> Vec<Vec<f32>> {
        self.inner
            .lock()
            .buffers
            .iter()
            .map(|b| b.samples().to_vec())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().buffers.is_empty()
    }

    /// How many times `flush()` reached this sink.
    pub fn flush_count(&self) -> usize {
        self.inner.lock().flushes
    }

    /// Remove and return everything collected so far.
    pub fn take(&self) -> Vec<AudioBuffer> {
        std::mem::take(&mut self.inner.lock().buffers)
    }
}
