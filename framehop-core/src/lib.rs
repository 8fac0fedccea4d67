//! # framehop-core
//!
//! Streaming framing of audio sample streams into fixed-length,
//! constant-hop analysis windows.
//!
//! ## Architecture
//!
//! ```text
//!             pull: read()                         push: process()
//! SignalSource ──────────► SlidingWindow ◄──────── caller / SignalPump
//!                              │   │
//!                read() ◄──────┘   └──────► SignalSink::process(window)
//! ```
//!
//! Everything is synchronous: a `read()` or `process()` call performs all the
//! upstream pulls and downstream pushes it needs before returning.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod buffering;
pub mod error;
pub mod signal;
pub mod window;

// Convenience re-exports for downstream crates
pub use audio::{AudioBuffer, AudioFormat};
pub use error::{FramehopError, Result};
pub use signal::{SignalPump, SignalSink, SignalSource};
pub use window::{EvictionPolicy, SlidingWindow, WindowConfig, WindowSettings, WindowStats};

#[cfg(feature = "wav")]
pub use audio::WavSource;
