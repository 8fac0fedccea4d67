//! `SignalPump`: drives a push pipeline from a pull source.
//!
//! ```text
//! loop {
//!     source.read()  ── None ──► sink.flush(), stop
//!         │
//!         └─ Some(buffer) ──► sink.process(buffer)
//! }
//! ```

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::signal::{SignalSink, SignalSource};

/// Totals for one [`SignalPump::pump`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpSummary {
    pub buffers: usize,
    pub frames: usize,
}

/// Pulls every buffer out of `source` and pushes it into `sink`.
pub struct SignalPump<S, K> {
    source: S,
    sink: K,
}

impl<S: SignalSource, K: SignalSink> SignalPump<S, K> {
    pub fn new(source: S, sink: K) -> Self {
        Self { source, sink }
    }

    /// Run until the source reports end-of-stream, then flush the sink.
    ///
    /// # Errors
    /// The first error from either side stops the pump; the sink is not
    /// flushed in that case.
    pub fn pump(&mut self) -> Result<PumpSummary> {
        let mut summary = PumpSummary::default();

        while let Some(buffer) = self.source.read()? {
            summary.buffers += 1;
            summary.frames += buffer.len();
            self.sink.process(buffer)?;
        }

        debug!(buffers = summary.buffers, "source exhausted, flushing sink");
        self.sink.flush()?;

        info!(
            buffers = summary.buffers,
            frames = summary.frames,
            "pump finished"
        );
        Ok(summary)
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }
}
