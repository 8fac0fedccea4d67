//! Channel adapters for handing buffers across threads.
//!
//! A pipeline itself is single-threaded; these let one thread produce
//! buffers and another run the windowing stage.

use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

use crate::audio::AudioBuffer;
use crate::error::{FramehopError, Result};
use crate::signal::{SignalSink, SignalSource};

/// Pull source backed by a `crossbeam_channel::Receiver`.
///
/// `read()` blocks until a buffer arrives. All senders dropped means
/// end-of-stream.
pub struct ChannelSource {
    rx: Receiver<AudioBuffer>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<AudioBuffer>) -> Self {
        Self { rx }
    }
}

impl SignalSource for ChannelSource {
    fn read(&mut self) -> Result<Option<AudioBuffer>> {
        match self.rx.recv() {
            Ok(buffer) => Ok(Some(buffer)),
            Err(_) => {
                debug!("channel source disconnected, end of stream");
                Ok(None)
            }
        }
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Push sink that forwards every buffer into a `crossbeam_channel::Sender`.
///
/// `flush()` is a no-op; the receiver sees end-of-stream once this sink is
/// dropped.
pub struct ChannelSink {
    tx: Sender<AudioBuffer>,
}

impl ChannelSink {
    pub fn new(tx: Sender<AudioBuffer>) -> Self {
        Self { tx }
    }
}

impl SignalSink for ChannelSink {
    fn process(&mut self, buffer: AudioBuffer) -> Result<()> {
        self.tx.send(buffer).map_err(|_| FramehopError::SinkClosed)
    }
}
