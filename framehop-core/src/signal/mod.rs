//! Pull / push pipeline contract.
//!
//! Two small capability traits, so one stage can be both:
//!
//! ```text
//!   pull:  caller ──read()──► stage ──read()──► upstream SignalSource
//!   push:  caller ──process()──► stage ──process()──► downstream SignalSink
//! ```
//!
//! `SlidingWindow` implements both over the same accumulation state.

pub mod channel;
pub mod collect;
pub mod pump;
pub mod sources;

pub use channel::{ChannelSink, ChannelSource};
pub use collect::{Collector, CollectorHandle};
pub use pump::{PumpSummary, SignalPump};
pub use sources::{BufferSource, NullSource};

use crate::audio::AudioBuffer;
use crate::error::Result;

/// Something that can be polled for the next buffer.
pub trait SignalSource: Send {
    /// Next buffer, or `Ok(None)` at end-of-stream.
    fn read(&mut self) -> Result<Option<AudioBuffer>>;

    /// Rewind to the start, if the source supports it.
    ///
    /// Sources that cannot replay treat this as a no-op.
    fn reset(&mut self) -> Result<()>;
}

/// Something that accepts buffers pushed into it.
pub trait SignalSink: Send {
    /// Accept one buffer. Called synchronously, in stream order.
    fn process(&mut self, buffer: AudioBuffer) -> Result<()>;

    /// No more input will arrive.
    ///
    /// Default implementation does nothing.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Drop any per-stream state.
    ///
    /// Default implementation does nothing.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: SignalSource + ?Sized> SignalSource for Box<S> {
    fn read(&mut self) -> Result<Option<AudioBuffer>> {
        (**self).read()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }
}

impl<S: SignalSink + ?Sized> SignalSink for Box<S> {
    fn process(&mut self, buffer: AudioBuffer) -> Result<()> {
        (**self).process(buffer)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }
}
